use super::config::BrowserConfig;
use super::manager::{BrowserError, BrowserManager};
use crate::collector::{extract_video_sources, LazyPage};
use headless_chrome::Tab;
use std::sync::Arc;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Count of resources the page has finished loading so far. Stable across
/// polls means the network has gone quiet.
const RESOURCE_COUNT_SCRIPT: &str = "performance.getEntriesByType('resource').length";
const READY_STATE_SCRIPT: &str = "document.readyState";

/// Chrome stops recording resource entries after 250 by default, which would
/// freeze the count on a heavy page.
const RESOURCE_BUFFER_SCRIPT: &str = "performance.setResourceTimingBufferSize(100000)";

/// Tracks how long a resource count has stayed unchanged
#[derive(Debug)]
pub(crate) struct QuietWatch {
    window: Duration,
    last_count: Option<Option<u64>>,
    quiet_since: Instant,
}

impl QuietWatch {
    pub(crate) fn new(window: Duration, now: Instant) -> Self {
        Self {
            window,
            last_count: None,
            quiet_since: now,
        }
    }

    /// Record a count observed at `now`. True once the same count has been
    /// seen for the whole quiet window.
    pub(crate) fn observe(&mut self, count: Option<u64>, now: Instant) -> bool {
        if self.last_count != Some(count) {
            self.last_count = Some(count);
            self.quiet_since = now;
            return false;
        }
        now.duration_since(self.quiet_since) >= self.window
    }
}

/// One browser process and one tab, alive for a single query.
///
/// Dropping the session closes the tab and terminates the browser, so the
/// process is released on every exit path including failed navigation.
pub struct PageSession {
    // Field order matters: the tab must go before the browser that owns it.
    tab: Arc<Tab>,
    manager: BrowserManager,
}

impl PageSession {
    /// Launch a browser and open a blank tab
    pub fn launch(config: BrowserConfig) -> Result<Self, BrowserError> {
        let manager = BrowserManager::new(config)?;
        let tab = manager.new_tab()?;
        tab.set_default_timeout(manager.config().timeout());

        Ok(Self { tab, manager })
    }

    /// Launch a browser and load `url`, waiting for the page to settle
    pub fn open(config: BrowserConfig, url: &str) -> Result<Self, BrowserError> {
        let session = Self::launch(config)?;
        session.navigate(url)?;
        Ok(session)
    }

    /// Navigate to a URL and wait until network activity has quiesced.
    ///
    /// Loading and settling share one timeout.
    pub fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        log::info!("Browser navigating to: {}", url);
        let deadline = Instant::now() + self.manager.config().timeout();

        self.tab
            .navigate_to(url)
            .map_err(|e| BrowserError::NavigationError(format!("Failed to navigate to {}: {}", url, e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| BrowserError::NavigationError(format!("Navigation timeout for {}: {}", url, e)))?;

        self.wait_for_network_idle(deadline)
    }

    /// Block until the document is complete and no new resources have
    /// finished loading for the configured quiet window.
    fn wait_for_network_idle(&self, deadline: Instant) -> Result<(), BrowserError> {
        let start = Instant::now();
        let mut watch = QuietWatch::new(self.manager.config().network_idle(), start);

        self.evaluate(RESOURCE_BUFFER_SCRIPT)?;

        loop {
            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout("network idle".to_string()));
            }

            let ready = self
                .evaluate(READY_STATE_SCRIPT)?
                .as_str()
                .map(|s| s == "complete")
                .unwrap_or(false);

            if ready {
                let count = self.evaluate(RESOURCE_COUNT_SCRIPT)?.as_u64();
                if watch.observe(count, Instant::now()) {
                    log::debug!(
                        "Network idle after {}ms ({} resources)",
                        start.elapsed().as_millis(),
                        count.unwrap_or(0)
                    );
                    return Ok(());
                }
            }

            std::thread::sleep(POLL_INTERVAL);
        }
    }

    fn evaluate(&self, script: &str) -> Result<serde_json::Value, BrowserError> {
        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| BrowserError::JavaScriptError(e.to_string()))?;
        Ok(result.value.unwrap_or(serde_json::Value::Null))
    }

    /// Get the HTML content of the page
    pub fn get_html(&self) -> Result<String, BrowserError> {
        self.tab
            .get_content()
            .map_err(|e| BrowserError::HtmlExtractionError(e.to_string()))
    }

    /// Get a reference to the underlying tab
    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }
}

impl LazyPage for PageSession {
    fn video_sources(&self) -> Result<Vec<String>, BrowserError> {
        let html = self.get_html()?;
        extract_video_sources(&html)
    }

    fn scroll_by(&self, pixels: u32) -> Result<(), BrowserError> {
        let script = format!("window.scrollBy(0, {});", pixels);
        self.tab
            .evaluate(&script, false)
            .map_err(|e| BrowserError::JavaScriptError(format!("Scroll failed: {}", e)))?;
        Ok(())
    }
}

impl Drop for PageSession {
    fn drop(&mut self) {
        if let Err(e) = self.tab.close(false) {
            log::debug!("Tab already gone on release: {}", e);
        }
    }
}
