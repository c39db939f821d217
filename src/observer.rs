//! Lifecycle hooks for a scrape session
//!
//! Callers that want progress reporting implement [`ScrapeObserver`]. Every
//! method has a no-op default, and the pipeline behaves identically whether
//! or not an observer is attached.

use std::time::Duration;

/// Progress after one harvest round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    /// 1-based round number
    pub round: usize,
    /// URLs first seen in this round
    pub new_found: usize,
    /// URLs seen so far in the session
    pub total_found: usize,
    /// Consecutive rounds without discoveries, including this one
    pub idle_rounds: usize,
}

/// Summary emitted when a session ends, successfully or not
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub url: String,
    pub rounds: usize,
    pub urls_found: usize,
    pub exercises: usize,
    pub elapsed: Duration,
    /// Set when the session aborted with a fatal error
    pub error: Option<String>,
}

impl SessionReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

pub trait ScrapeObserver: Send + Sync {
    fn on_session_start(&self, _url: &str) {}

    fn on_round_complete(&self, _report: &RoundReport) {}

    fn on_session_end(&self, _report: &SessionReport) {}
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ScrapeObserver for NoopObserver {}

/// Observer that writes session milestones to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ScrapeObserver for LogObserver {
    fn on_session_start(&self, url: &str) {
        log::info!("Scrape session started: {}", url);
    }

    fn on_round_complete(&self, report: &RoundReport) {
        log::debug!(
            "Round {} complete: +{} ({} total)",
            report.round,
            report.new_found,
            report.total_found
        );
    }

    fn on_session_end(&self, report: &SessionReport) {
        match &report.error {
            None => log::info!(
                "Scrape session finished: {} - {} videos, {} exercises in {} rounds ({}ms)",
                report.url,
                report.urls_found,
                report.exercises,
                report.rounds,
                report.elapsed.as_millis()
            ),
            Some(e) => log::warn!("Scrape session failed: {} - {}", report.url, e),
        }
    }
}

/// Fans every event out to several observers in order
#[derive(Default)]
pub struct ObserverSet {
    observers: Vec<std::sync::Arc<dyn ScrapeObserver>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, observer: std::sync::Arc<dyn ScrapeObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl ScrapeObserver for ObserverSet {
    fn on_session_start(&self, url: &str) {
        for o in &self.observers {
            o.on_session_start(url);
        }
    }

    fn on_round_complete(&self, report: &RoundReport) {
        for o in &self.observers {
            o.on_round_complete(report);
        }
    }

    fn on_session_end(&self, report: &SessionReport) {
        for o in &self.observers {
            o.on_session_end(report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Counter {
        starts: AtomicUsize,
        rounds: AtomicUsize,
        ends: AtomicUsize,
    }

    impl ScrapeObserver for Counter {
        fn on_session_start(&self, _url: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
        fn on_round_complete(&self, _report: &RoundReport) {
            self.rounds.fetch_add(1, Ordering::SeqCst);
        }
        fn on_session_end(&self, _report: &SessionReport) {
            self.ends.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn report(error: Option<&str>) -> SessionReport {
        SessionReport {
            url: "https://example.com/exercises/male/biceps/".to_string(),
            rounds: 3,
            urls_found: 4,
            exercises: 2,
            elapsed: Duration::from_millis(1200),
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_noop_observer_accepts_all_events() {
        let observer = NoopObserver;
        observer.on_session_start("https://example.com");
        observer.on_round_complete(&RoundReport {
            round: 1,
            new_found: 0,
            total_found: 0,
            idle_rounds: 1,
        });
        observer.on_session_end(&report(None));
    }

    #[test]
    fn test_observer_set_fans_out() {
        let a = Arc::new(Counter::default());
        let b = Arc::new(Counter::default());
        let set = ObserverSet::new().with(a.clone()).with(b.clone());
        assert_eq!(set.len(), 2);

        set.on_session_start("u");
        set.on_session_end(&report(Some("boom")));

        for c in [&a, &b] {
            assert_eq!(c.starts.load(Ordering::SeqCst), 1);
            assert_eq!(c.rounds.load(Ordering::SeqCst), 0);
            assert_eq!(c.ends.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_session_report_success() {
        assert!(report(None).is_success());
        assert!(!report(Some("timeout")).is_success());
    }
}
