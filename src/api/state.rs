//! Application state for the API server

use crate::{Config, FactFetcher};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// This struct is cloned for each request (cheap Arc clone) and provides
/// access to the fetcher instance and configuration.
#[derive(Clone)]
pub struct AppState {
    /// The fetcher every batch request goes through
    pub fetcher: Arc<FactFetcher>,

    /// Server configuration (read-only). Batch sizing comes from the fetcher's own config.
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(fetcher: Arc<FactFetcher>, config: Arc<Config>) -> Self {
        Self { fetcher, config }
    }
}
