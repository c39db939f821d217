use std::time::Duration;

/// Configuration for the browser that renders a catalog page
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,

    /// Browser window size, which is also the scrolled viewport
    pub window_size: (u32, u32),

    /// Custom user agent
    pub user_agent: Option<String>,

    /// Navigation timeout in seconds
    pub timeout_seconds: u64,

    /// How long the page must stay free of new network requests
    /// before it is considered settled
    pub network_idle_ms: u64,

    /// Additional Chrome flags
    pub chrome_flags: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1200, 800),
            user_agent: Some(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36"
                    .to_string(),
            ),
            timeout_seconds: 60,
            network_idle_ms: 500,
            chrome_flags: vec![],
        }
    }
}

impl BrowserConfig {
    /// Create a configuration for debugging (visible browser window)
    pub fn debug_mode() -> Self {
        Self {
            headless: false,
            chrome_flags: vec!["--window-position=100,100".to_string()],
            ..Self::default()
        }
    }

    /// Get navigation timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Get the network quiet window as Duration
    pub fn network_idle(&self) -> Duration {
        Duration::from_millis(self.network_idle_ms)
    }

    /// All launch arguments: the user agent followed by any extra flags
    pub fn launch_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.chrome_flags.len() + 1);
        if let Some(ua) = &self.user_agent {
            args.push(format!("--user-agent={}", ua));
        }
        args.extend(self.chrome_flags.iter().cloned());
        args
    }
}
