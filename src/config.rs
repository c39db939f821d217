use crate::browser::BrowserConfig;
use crate::collector::CollectorConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub browser: BrowserSettings,
    #[serde(default)]
    pub collector: CollectorSettings,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Scheme and host of the exercise catalog, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BrowserSettings {
    /// Browser headless mode
    #[serde(default = "default_true")]
    pub headless: bool,

    #[serde(default = "default_window_width")]
    pub window_width: u32,

    #[serde(default = "default_window_height")]
    pub window_height: u32,

    /// Page load ceiling in seconds
    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout_secs: u64,

    /// Quiet window before the page counts as settled, in milliseconds
    #[serde(default = "default_network_idle")]
    pub network_idle_ms: u64,

    #[serde(default)]
    pub user_agent: Option<String>,

    /// Additional Chrome flags
    #[serde(default)]
    pub chrome_flags: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CollectorSettings {
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,

    #[serde(default = "default_max_idle_rounds")]
    pub max_idle_rounds: usize,

    #[serde(default = "default_scroll_step")]
    pub scroll_step_px: u32,

    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    /// First port tried when binding
    #[serde(default = "default_port_start")]
    pub port_start: u16,

    /// Last port tried when binding
    #[serde(default = "default_port_end")]
    pub port_end: u16,
}

fn default_true() -> bool { true }
fn default_base_url() -> String { "https://musclewiki.com".to_string() }
fn default_window_width() -> u32 { 1200 }
fn default_window_height() -> u32 { 800 }
fn default_navigation_timeout() -> u64 { 60 }
fn default_network_idle() -> u64 { 500 }
fn default_max_rounds() -> usize { 8 }
fn default_max_idle_rounds() -> usize { 2 }
fn default_scroll_step() -> u32 { 500 }
fn default_settle_delay() -> u64 { 300 }
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port_start() -> u16 { 8080 }
fn default_port_end() -> u16 { 8090 }

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1200,
            window_height: 800,
            navigation_timeout_secs: 60,
            network_idle_ms: 500,
            user_agent: None,
            chrome_flags: vec![],
        }
    }
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            max_rounds: 8,
            max_idle_rounds: 2,
            scroll_step_px: 500,
            settle_delay_ms: 300,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port_start: 8080,
            port_end: 8090,
        }
    }
}

impl Config {
    /// Read `config.toml` from the working directory, falling back to
    /// defaults when it is missing or invalid
    pub fn load() -> Self {
        Self::load_from(Path::new("config.toml"))
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content).unwrap_or_else(|e| {
                log::warn!("Invalid {}, using defaults: {}", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                log::warn!("Could not read {}, using defaults: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

impl BrowserSettings {
    pub fn to_browser_config(&self) -> BrowserConfig {
        let defaults = BrowserConfig::default();
        BrowserConfig {
            headless: self.headless,
            window_size: (self.window_width, self.window_height),
            user_agent: self.user_agent.clone().or(defaults.user_agent),
            timeout_seconds: self.navigation_timeout_secs,
            network_idle_ms: self.network_idle_ms,
            chrome_flags: self.chrome_flags.clone(),
        }
    }
}

impl CollectorSettings {
    pub fn to_collector_config(&self) -> CollectorConfig {
        CollectorConfig {
            max_rounds: self.max_rounds,
            max_idle_rounds: self.max_idle_rounds,
            scroll_step_px: self.scroll_step_px,
            settle_delay: Duration::from_millis(self.settle_delay_ms),
        }
    }
}
