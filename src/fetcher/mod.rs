//! High-level facade tying configuration, the task unit and the coordinator
//! together.
//!
//! The `FactFetcher` struct and its methods are organized by concern:
//! - [`batch`] - batch sizing and fan-out of the task unit
//! - [`lifecycle`] - API server startup

mod batch;
mod lifecycle;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

use std::sync::Arc;

use crate::config::Config;
use crate::coordinator::Coordinator;
use crate::error::Result;
use crate::fetch::{FactSource, HttpFactSource};

/// Main fetcher instance (cloneable - all fields are Arc-wrapped or Copy)
#[derive(Clone)]
pub struct FactFetcher {
    /// Configuration (wrapped in Arc for sharing with the API server)
    pub(crate) config: Arc<Config>,
    /// Task unit invoked once per index (trait object for pluggable implementations)
    pub(crate) source: Arc<dyn FactSource>,
    /// Coordinator carrying the batch guards from `config.batch`
    pub(crate) coordinator: Coordinator,
}

impl FactFetcher {
    /// Create a fetcher that calls the configured HTTP endpoint.
    ///
    /// Validates the configuration and builds the shared HTTP client.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let source = HttpFactSource::new(&config.fetch)?;

        tracing::info!(
            endpoint = %config.fetch.endpoint,
            default_size = config.batch.default_size,
            max_size = config.batch.max_size,
            "Fact fetcher initialized"
        );

        Ok(Self::from_parts(config, Arc::new(source)))
    }

    /// Create a fetcher around a custom task unit.
    ///
    /// Used by tests and by callers that fetch from something other than
    /// HTTP. The configuration is validated the same way as in [`new`](Self::new).
    pub fn with_source(config: Config, source: Arc<dyn FactSource>) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, source))
    }

    fn from_parts(config: Config, source: Arc<dyn FactSource>) -> Self {
        let coordinator = Coordinator::new(config.batch.options());
        Self {
            config: Arc::new(config),
            source,
            coordinator,
        }
    }

    /// The configuration this fetcher was built with
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// The coordinator used for every batch
    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }
}

impl std::fmt::Debug for FactFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactFetcher")
            .field("endpoint", &self.config.fetch.endpoint)
            .field("options", &self.coordinator.options())
            .finish_non_exhaustive()
    }
}
