//! Application state for the Actix-web server
//!
//! The `AppState` struct is wrapped in `web::Data` and shared by every
//! handler. Queries never share browser sessions; the orchestrator launches
//! a fresh one per request.

use crate::config::Config;
use crate::metrics::MetricsTracker;
use crate::observer::{LogObserver, ObserverSet};
use crate::orchestrator::QueryOrchestrator;
use crate::tools::ToolRegistry;
use std::sync::Arc;

/// Shared application state for Actix-web handlers
pub struct AppState {
    /// Per-page scrape metrics, also registered as a session observer
    pub metrics: Arc<MetricsTracker>,
    /// Query pipeline backed by headless Chrome
    pub orchestrator: Arc<QueryOrchestrator>,
    /// Capability table built once at startup
    pub tools: ToolRegistry,
    /// Application configuration
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let metrics = Arc::new(MetricsTracker::new());
        let observers = ObserverSet::new()
            .with(Arc::new(LogObserver))
            .with(metrics.clone());

        let orchestrator =
            Arc::new(QueryOrchestrator::from_config(&config).with_observer(Arc::new(observers)));
        let tools = ToolRegistry::with_fitness_tools(orchestrator.clone());

        Self {
            metrics,
            orchestrator,
            tools,
            config,
        }
    }
}
