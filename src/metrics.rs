//! Metrics for scrape sessions
//!
//! Tracks success rates, durations and discovery counts per catalog page

use crate::observer::{ScrapeObserver, SessionReport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMetrics {
    pub url: String,
    pub total_sessions: u64,
    pub successful_sessions: u64,
    pub failed_sessions: u64,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub average_duration_ms: f64,
    pub total_duration_ms: u64,
    pub total_rounds: u64,
    pub videos_found: u64,
    pub exercises_emitted: u64,
    pub timeout_count: u64,
}

impl PageMetrics {
    pub fn new(url: String) -> Self {
        Self {
            url,
            total_sessions: 0,
            successful_sessions: 0,
            failed_sessions: 0,
            last_success: None,
            last_failure: None,
            last_error: None,
            average_duration_ms: 0.0,
            total_duration_ms: 0,
            total_rounds: 0,
            videos_found: 0,
            exercises_emitted: 0,
            timeout_count: 0,
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_sessions == 0 {
            0.0
        } else {
            (self.successful_sessions as f64 / self.total_sessions as f64) * 100.0
        }
    }

    pub fn record_success(&mut self, duration: Duration, rounds: usize, videos: usize, exercises: usize) {
        self.total_sessions += 1;
        self.successful_sessions += 1;
        self.last_success = Some(Utc::now());

        self.total_duration_ms += duration.as_millis() as u64;
        self.average_duration_ms = self.total_duration_ms as f64 / self.successful_sessions as f64;

        self.total_rounds += rounds as u64;
        self.videos_found += videos as u64;
        self.exercises_emitted += exercises as u64;
    }

    pub fn record_failure(&mut self, error: String) {
        self.total_sessions += 1;
        self.failed_sessions += 1;
        self.last_failure = Some(Utc::now());

        if error.to_lowercase().contains("timeout") {
            self.timeout_count += 1;
        }
        self.last_error = Some(error);
    }
}

/// Metrics for every catalog page scraped since startup
#[derive(Default)]
pub struct MetricsTracker {
    metrics: Mutex<HashMap<String, PageMetrics>>,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, PageMetrics>> {
        self.metrics.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record(&self, report: &SessionReport) {
        let mut metrics = self.lock();
        let page = metrics
            .entry(report.url.clone())
            .or_insert_with(|| PageMetrics::new(report.url.clone()));

        match &report.error {
            None => {
                page.record_success(report.elapsed, report.rounds, report.urls_found, report.exercises);
                log::info!(
                    "[{}] Success - {}ms - Success rate: {:.2}%",
                    report.url,
                    report.elapsed.as_millis(),
                    page.success_rate()
                );
            }
            Some(e) => {
                page.record_failure(e.clone());
                log::warn!(
                    "[{}] Failure - Error: {} - Success rate: {:.2}%",
                    report.url,
                    e,
                    page.success_rate()
                );
            }
        }
    }

    pub fn get_metrics(&self, url: &str) -> Option<PageMetrics> {
        self.lock().get(url).cloned()
    }

    pub fn get_all_metrics(&self) -> Vec<PageMetrics> {
        let mut all: Vec<PageMetrics> = self.lock().values().cloned().collect();
        all.sort_by(|a, b| a.url.cmp(&b.url));
        all
    }

    pub fn export_json(&self) -> String {
        serde_json::to_string_pretty(&*self.lock()).unwrap_or_else(|_| "{}".to_string())
    }
}

impl ScrapeObserver for MetricsTracker {
    fn on_session_end(&self, report: &SessionReport) {
        self.record(report);
    }
}
