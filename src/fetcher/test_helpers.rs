//! Shared test helpers for building FactFetcher instances without a network.

use crate::config::Config;
use crate::error::TaskError;
use crate::fetch::FactSource;
use crate::fetcher::FactFetcher;
use crate::types::Fact;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Task unit answering from a fixed script instead of the network.
///
/// Indices listed in `failures` fail with the given error; every other index
/// yields `"fact #<index>"`. An optional delay is applied per index.
#[derive(Default)]
pub(crate) struct ScriptedSource {
    pub(crate) failures: HashMap<usize, TaskError>,
    pub(crate) delays: HashMap<usize, Duration>,
    pub(crate) calls: AtomicUsize,
}

impl ScriptedSource {
    pub(crate) fn failing(failures: impl IntoIterator<Item = (usize, TaskError)>) -> Self {
        Self {
            failures: failures.into_iter().collect(),
            ..Default::default()
        }
    }

    pub(crate) fn with_delay(mut self, index: usize, delay: Duration) -> Self {
        self.delays.insert(index, delay);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl FactSource for ScriptedSource {
    async fn fetch_fact(&self, index: usize) -> Result<Fact, TaskError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(&index) {
            tokio::time::sleep(*delay).await;
        }
        match self.failures.get(&index) {
            Some(error) => Err(error.clone()),
            None => Ok(Fact::new(format!("fact #{index}"))),
        }
    }
}

/// Fetcher with default config around the given source.
pub(crate) fn create_test_fetcher(source: ScriptedSource) -> (FactFetcher, Arc<ScriptedSource>) {
    create_test_fetcher_with_config(Config::default(), source)
}

/// Fetcher with a custom config around the given source.
pub(crate) fn create_test_fetcher_with_config(
    config: Config,
    source: ScriptedSource,
) -> (FactFetcher, Arc<ScriptedSource>) {
    let source = Arc::new(source);
    let fetcher = FactFetcher::with_source(config, source.clone()).unwrap();
    (fetcher, source)
}
