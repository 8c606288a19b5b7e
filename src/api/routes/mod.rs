//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`facts`] - Batch fetching
//! - [`system`] - Health and OpenAPI

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::TaskError;
use crate::types::{Batch, Fact, Outcome};

mod facts;
mod system;

// Re-export all handlers so `routes::function_name` works
pub use facts::*;
pub use system::*;

// ============================================================================
// Query/Response Types (shared across handlers)
// ============================================================================

/// Query parameters for GET /facts
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FactsQuery {
    /// Number of facts to fetch concurrently (default: `batch.default_size`)
    pub count: Option<usize>,
}

/// Response body for GET /facts
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct FactsResponse {
    /// Number of tasks in the batch
    pub count: usize,
    /// Tasks that produced a fact
    pub succeeded: usize,
    /// Tasks that failed
    pub failed: usize,
    /// One entry per task, in index order
    pub outcomes: Vec<OutcomeResponse>,
}

impl FactsResponse {
    /// Build the response body from a finished batch
    pub fn from_batch(batch: &Batch<Fact>) -> Self {
        Self {
            count: batch.len(),
            succeeded: batch.success_count(),
            failed: batch.failure_count(),
            outcomes: batch.iter().map(OutcomeResponse::from).collect(),
        }
    }
}

/// One task's outcome as exposed over HTTP
///
/// Exactly one of `fact` or `error` is present.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct OutcomeResponse {
    /// Position of the task in the batch (0-based)
    pub index: usize,
    /// The fact text, on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fact: Option<String>,
    /// Length reported by the endpoint, on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    /// Failure cause, on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OutcomeError>,
}

/// Failure cause of a single task
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct OutcomeError {
    /// Machine-readable failure kind (e.g., "timeout", "status", "decode")
    pub code: String,
    /// Human-readable message
    pub message: String,
}

impl From<&TaskError> for OutcomeError {
    fn from(error: &TaskError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

impl From<&Outcome<Fact>> for OutcomeResponse {
    fn from(outcome: &Outcome<Fact>) -> Self {
        match outcome.result() {
            Ok(fact) => Self {
                index: outcome.index(),
                fact: Some(fact.fact.clone()),
                length: fact.length,
                error: None,
            },
            Err(error) => Self {
                index: outcome.index(),
                fact: None,
                length: None,
                error: Some(error.into()),
            },
        }
    }
}

/// Response body for GET /health
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always "ok" while the server is answering
    pub status: String,
    /// Crate version
    pub version: String,
}
