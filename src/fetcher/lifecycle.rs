//! API server startup.

use std::sync::Arc;

use super::FactFetcher;
use crate::error::Result;

impl FactFetcher {
    /// Spawn the REST API server in a background task.
    ///
    /// Binds to `config.api.bind_address` and serves until the task is
    /// aborted or the listener fails.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use fanout_facts::{Config, FactFetcher};
    /// use std::sync::Arc;
    ///
    /// # async fn example() -> fanout_facts::Result<()> {
    /// let fetcher = Arc::new(FactFetcher::new(Config::default())?);
    /// let handle = fetcher.spawn_api_server();
    /// // ... fetch batches, serve requests ...
    /// handle.abort();
    /// # Ok(())
    /// # }
    /// ```
    pub fn spawn_api_server(self: &Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let fetcher = Arc::clone(self);
        let config = Arc::clone(&self.config);

        tokio::spawn(async move { crate::api::start_api_server(fetcher, config).await })
    }
}
