// Library interface for rust_exercise_scraper
// The server binary and integration tests both build on these modules

pub mod aggregator;
pub mod app_state;
pub mod browser;
pub mod catalog;
pub mod collector;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod observer;
pub mod orchestrator;
pub mod parser;
pub mod tools;

pub use error::ScrapeError;
pub use models::{ExerciseRecord, MuscleExercises};
pub use orchestrator::QueryOrchestrator;
