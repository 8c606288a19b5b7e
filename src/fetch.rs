//! Task unit: one fetch of one fact from the external endpoint.
//!
//! [`FactSource`] is the seam between the coordinator and the outside world:
//! production code uses [`HttpFactSource`], tests substitute their own.

use crate::config::FetchConfig;
use crate::error::{Result, TaskError};
use crate::types::Fact;

/// Abstraction over fetching a single fact, enabling testability.
///
/// Implementations never panic or propagate: every failure is returned as a
/// [`TaskError`] so the batch can record it against `index`.
#[async_trait::async_trait]
pub trait FactSource: Send + Sync {
    /// Fetch one fact on behalf of the task at `index`
    async fn fetch_fact(&self, index: usize) -> std::result::Result<Fact, TaskError>;
}

/// Production [`FactSource`] that issues one HTTP GET per task.
///
/// The underlying `reqwest::Client` is shared by every task of every batch,
/// so connections are pooled.
#[derive(Clone, Debug)]
pub struct HttpFactSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpFactSource {
    /// Build a source from the fetch configuration
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self::with_client(client, config.endpoint.clone()))
    }

    /// Build a source around an existing client
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// The URL every task fetches
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl FactSource for HttpFactSource {
    async fn fetch_fact(&self, index: usize) -> std::result::Result<Fact, TaskError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(index, status = status.as_u16(), "Fact endpoint returned error status");
            return Err(TaskError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let fact: Fact = serde_json::from_slice(&body)?;
        if fact.fact.trim().is_empty() {
            return Err(TaskError::Decode("response contained an empty fact".to_string()));
        }

        tracing::debug!(index, length = fact.fact.len(), "Fetched fact");
        Ok(fact)
    }
}
