//! Error types for fanout-facts
//!
//! Two layers of errors live here:
//! - [`TaskError`] describes why a single task in a batch failed. It is data,
//!   carried inside an [`Outcome`](crate::types::Outcome), never propagated.
//! - [`Error`] is returned by the facade, configuration loading and the API
//!   server, and maps onto HTTP responses through [`ToHttpStatus`].

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for fanout-facts operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for fanout-facts
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "batch.max_size")
        key: Option<String>,
    },

    /// Requested batch exceeds the configured maximum
    #[error("batch of {requested} tasks exceeds the maximum of {max}")]
    BatchTooLarge {
        /// Number of tasks the caller asked for
        requested: usize,
        /// Configured `batch.max_size`
        max: usize,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error (building the HTTP client, not per-task failures)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

/// Why a single task in a batch did not produce a value.
///
/// Transport and decode failures are kept apart so renderers can tell them
/// apart; the coordinator treats every variant the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// Connection could not be established or was dropped mid-request
    #[error("transport error: {0}")]
    Transport(String),

    /// The task did not finish within its deadline
    #[error("timed out after {}ms", .after.as_millis())]
    Timeout {
        /// The deadline that elapsed
        after: Duration,
    },

    /// The endpoint answered with a non-success HTTP status
    #[error("endpoint returned HTTP {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// The response body could not be decoded into the expected payload
    #[error("decode error: {0}")]
    Decode(String),

    /// The batch was cancelled before this task finished
    #[error("task cancelled")]
    Cancelled,

    /// The task panicked; the payload message is preserved when it is a string
    #[error("task panicked: {0}")]
    Panicked(String),

    /// No outcome was delivered for this index
    #[error("no outcome was recorded for this task")]
    Lost,
}

impl TaskError {
    /// Machine-readable code, stable across releases
    pub fn code(&self) -> &'static str {
        match self {
            TaskError::Transport(_) => "transport",
            TaskError::Timeout { .. } => "timeout",
            TaskError::Status { .. } => "status",
            TaskError::Decode(_) => "decode",
            TaskError::Cancelled => "cancelled",
            TaskError::Panicked(_) => "panicked",
            TaskError::Lost => "lost",
        }
    }
}

impl From<reqwest::Error> for TaskError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            // reqwest does not expose the configured deadline on the error
            TaskError::Timeout {
                after: Duration::ZERO,
            }
        } else if let Some(status) = e.status() {
            TaskError::Status {
                status: status.as_u16(),
            }
        } else if e.is_decode() {
            TaskError::Decode(e.to_string())
        } else {
            TaskError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for TaskError {
    fn from(e: serde_json::Error) -> Self {
        TaskError::Decode(e.to_string())
    }
}

/// API error response format
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "batch_too_large",
///     "message": "batch of 500 tasks exceeds the maximum of 100",
///     "details": { "requested": 500, "max": 100 }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "batch_too_large", "config_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an API error with additional details
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create an "unauthorized" error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", message)
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            Error::Config { .. } => 400,
            Error::BatchTooLarge { .. } => 422,
            Error::Serialization(_) => 400,
            Error::Network(_) => 502,
            Error::Io(_) | Error::ApiServerError(_) | Error::Other(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::BatchTooLarge { .. } => "batch_too_large",
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        match &error {
            Error::Config { key: Some(key), .. } => {
                ApiError::with_details(code, message, serde_json::json!({ "key": key }))
            }
            Error::BatchTooLarge { requested, max } => ApiError::with_details(
                code,
                message,
                serde_json::json!({ "requested": requested, "max": max }),
            ),
            _ => ApiError::new(code, message),
        }
    }
}
