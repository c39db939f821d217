//! Incremental discovery of lazily rendered video resources
//!
//! Catalog pages only attach `<source>` elements to their `<video>` tags once
//! the tag scrolls into view. The collector repeatedly harvests whatever is
//! rendered, scrolls a fixed step, and stops when the round budget runs out
//! or when the page stops producing new URLs.

use crate::browser::BrowserError;
use crate::observer::{RoundReport, ScrapeObserver};
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::time::Duration;

/// A rendered page that can be harvested and scrolled.
///
/// Implemented by [`crate::browser::PageSession`] for real Chrome tabs and by
/// scripted fakes in tests.
pub trait LazyPage {
    /// Source URLs of every video currently rendered, in document order.
    /// Videos without a usable source are omitted.
    fn video_sources(&self) -> Result<Vec<String>, BrowserError>;

    /// Scroll the viewport down by `pixels`.
    fn scroll_by(&self, pixels: u32) -> Result<(), BrowserError>;
}

/// Tuning knobs for the scroll loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    /// Hard cap on harvest rounds
    pub max_rounds: usize,
    /// Consecutive rounds without discoveries that end collection early
    pub max_idle_rounds: usize,
    /// Pixels scrolled after each round
    pub scroll_step_px: u32,
    /// Pause after each scroll so lazy content can render
    pub settle_delay: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_rounds: 8,
            max_idle_rounds: 2,
            scroll_step_px: 500,
            settle_delay: Duration::from_millis(300),
        }
    }
}

/// Result of one collection session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    /// Every raw URL observed, each exactly once, in first-discovery order
    pub urls: Vec<String>,
    /// Harvest rounds performed
    pub rounds: usize,
    /// True when collection stopped because the page ran dry
    pub converged: bool,
}

/// Scroll-and-harvest loop over a [`LazyPage`]
pub struct IncrementalCollector {
    config: CollectorConfig,
}

impl IncrementalCollector {
    pub fn new(config: CollectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Harvest all video URLs reachable by scrolling `page`.
    ///
    /// Element queries and scrolls that fail are fatal for the session.
    pub fn collect<P: LazyPage + ?Sized>(
        &self,
        page: &P,
        observer: &dyn ScrapeObserver,
    ) -> Result<Collection, BrowserError> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut collection = Collection::default();
        let mut idle_rounds = 0usize;

        for round in 1..=self.config.max_rounds {
            collection.rounds = round;

            let mut new_found = 0usize;
            for src in page.video_sources()? {
                if seen.insert(src.clone()) {
                    collection.urls.push(src);
                    new_found += 1;
                }
            }

            if new_found == 0 {
                idle_rounds += 1;
            } else {
                idle_rounds = 0;
            }

            log::debug!(
                "Round {}/{}: {} new, {} total, {} idle",
                round,
                self.config.max_rounds,
                new_found,
                collection.urls.len(),
                idle_rounds
            );
            observer.on_round_complete(&RoundReport {
                round,
                new_found,
                total_found: collection.urls.len(),
                idle_rounds,
            });

            if idle_rounds >= self.config.max_idle_rounds {
                collection.converged = true;
                break;
            }

            page.scroll_by(self.config.scroll_step_px)?;
            if !self.config.settle_delay.is_zero() {
                std::thread::sleep(self.config.settle_delay);
            }
        }

        Ok(collection)
    }
}

impl Default for IncrementalCollector {
    fn default() -> Self {
        Self::new(CollectorConfig::default())
    }
}

/// Extract the source URL of every `<video>` in `html`.
///
/// Only the first `<source>` child of each video is considered; a video with
/// no `<source>`, or whose `<source>` has an empty or missing `src`, is skipped.
pub fn extract_video_sources(html: &str) -> Result<Vec<String>, BrowserError> {
    let video_selector = parse_selector("video")?;
    let source_selector = parse_selector("source")?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&video_selector)
        .filter_map(|video| video.select(&source_selector).next())
        .filter_map(|source| source.value().attr("src"))
        .filter(|src| !src.is_empty())
        .map(str::to_string)
        .collect())
}

fn parse_selector(css: &str) -> Result<Selector, BrowserError> {
    Selector::parse(css)
        .map_err(|e| BrowserError::HtmlExtractionError(format!("Bad selector {}: {}", css, e)))
}
