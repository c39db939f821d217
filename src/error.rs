use crate::browser::BrowserError;

/// Fatal errors that abort a whole query
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error("Scrape worker failed: {0}")]
    Worker(String),
}

impl From<tokio::task::JoinError> for ScrapeError {
    fn from(e: tokio::task::JoinError) -> Self {
        ScrapeError::Worker(e.to_string())
    }
}

impl ScrapeError {
    /// True when the page did not load within the navigation budget
    pub fn is_timeout(&self) -> bool {
        match self {
            ScrapeError::Browser(BrowserError::Timeout(_)) => true,
            ScrapeError::Browser(BrowserError::NavigationError(msg)) => {
                msg.to_lowercase().contains("timeout")
            }
            _ => false,
        }
    }
}
