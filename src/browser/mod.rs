//! Browser automation for rendering lazily loaded catalog pages
//!
//! A [`PageSession`] owns one headless Chrome process and one tab for the
//! lifetime of a single query. Launch and navigation failures are reported
//! as [`BrowserError`]s; the process is released when the session drops.
//!
//! # Example
//!
//! ```no_run
//! use rust_exercise_scraper::browser::{BrowserConfig, PageSession};
//! use rust_exercise_scraper::collector::LazyPage;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let session = PageSession::open(
//!     BrowserConfig::default(),
//!     "https://musclewiki.com/exercises/male/biceps/",
//! )?;
//!
//! let videos = session.video_sources()?;
//! println!("{} videos rendered before scrolling", videos.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod manager;
pub mod session;

pub use config::BrowserConfig;
pub use manager::{BrowserError, BrowserManager};
pub use session::PageSession;
