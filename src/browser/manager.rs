use super::config::BrowserConfig;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;

/// Owns one Chrome process and creates tabs on it.
///
/// The process is terminated when the manager is dropped.
pub struct BrowserManager {
    browser: Browser,
    config: BrowserConfig,
}

impl BrowserManager {
    /// Launch a browser with the given configuration
    pub fn new(config: BrowserConfig) -> Result<Self, BrowserError> {
        let args = config.launch_args();
        let launch_options = Self::build_launch_options(&config, &args)?;

        let browser = Browser::new(launch_options)
            .map_err(|e| BrowserError::InitializationError(e.to_string()))?;

        log::debug!(
            "Browser launched (headless={}, window={}x{})",
            config.headless,
            config.window_size.0,
            config.window_size.1
        );

        Ok(Self { browser, config })
    }

    /// Build Chrome launch options from our config
    fn build_launch_options<'a>(
        config: &BrowserConfig,
        args: &'a [String],
    ) -> Result<LaunchOptions<'a>, BrowserError> {
        let args: Vec<&OsStr> = args.iter().map(OsStr::new).collect();

        LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some(config.window_size))
            .idle_browser_timeout(config.timeout())
            .args(args)
            .build()
            .map_err(|e| BrowserError::ConfigurationError(e.to_string()))
    }

    /// Create a new tab
    pub fn new_tab(&self) -> Result<Arc<Tab>, BrowserError> {
        self.browser
            .new_tab()
            .map_err(|e| BrowserError::TabCreationError(e.to_string()))
    }

    /// Get the browser configuration
    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }
}

impl Drop for BrowserManager {
    fn drop(&mut self) {
        log::debug!("Browser process released");
    }
}

/// Errors that can occur during browser operations
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error("Browser initialization failed: {0}")]
    InitializationError(String),

    #[error("Browser configuration error: {0}")]
    ConfigurationError(String),

    #[error("Tab creation failed: {0}")]
    TabCreationError(String),

    #[error("Navigation error: {0}")]
    NavigationError(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("JavaScript execution error: {0}")]
    JavaScriptError(String),

    #[error("HTML extraction error: {0}")]
    HtmlExtractionError(String),
}
