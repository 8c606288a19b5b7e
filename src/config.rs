//! Configuration types for fanout-facts

use crate::coordinator::{BatchOptions, MAX_BATCH_SIZE};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, time::Duration};

/// Main configuration
///
/// Fields are organized into sub-configs:
/// - [`fetch`](FetchConfig) - the external endpoint each task calls
/// - [`batch`](BatchConfig) - batch sizing and the optional worker guards
/// - [`api`](ApiConfig) - the REST API server
///
/// Every field has a default, so `{}` is a valid configuration document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Endpoint and HTTP client settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Batch sizing and worker guards
    #[serde(default)]
    pub batch: BatchConfig,

    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Load a configuration from a JSON file and validate it
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> Result<()> {
        let endpoint = url::Url::parse(&self.fetch.endpoint)
            .map_err(|e| Error::config("fetch.endpoint", format!("invalid URL: {}", e)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::config(
                "fetch.endpoint",
                format!("unsupported scheme '{}'", endpoint.scheme()),
            ));
        }

        if self.fetch.request_timeout.is_zero() {
            return Err(Error::config(
                "fetch.request_timeout",
                "must be at least one second",
            ));
        }

        if self.batch.max_size == 0 {
            return Err(Error::config("batch.max_size", "must be greater than zero"));
        }

        if self.batch.max_size > MAX_BATCH_SIZE {
            return Err(Error::config(
                "batch.max_size",
                format!("must not exceed {}", MAX_BATCH_SIZE),
            ));
        }

        if self.batch.default_size > self.batch.max_size {
            return Err(Error::config(
                "batch.default_size",
                format!(
                    "default size {} exceeds max size {}",
                    self.batch.default_size, self.batch.max_size
                ),
            ));
        }

        match self.batch.max_in_flight {
            Some(0) => {
                return Err(Error::config(
                    "batch.max_in_flight",
                    "must be greater than zero when set",
                ));
            }
            Some(limit) if limit > MAX_BATCH_SIZE => {
                return Err(Error::config(
                    "batch.max_in_flight",
                    format!("must not exceed {}", MAX_BATCH_SIZE),
                ));
            }
            _ => {}
        }

        if self.batch.task_timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::config(
                "batch.task_timeout",
                "must be at least one second when set",
            ));
        }

        Ok(())
    }
}

/// External endpoint configuration for the HTTP task unit
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// URL fetched once per task (default: "https://catfact.ninja/fact")
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout applied by the HTTP client (default: 10 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Batch sizing and worker guards
///
/// The guards (`max_in_flight`, `task_timeout`) are off by default: every
/// task of a batch runs at once and waits as long as its request takes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Batch size used when the caller does not specify one (default: 5)
    #[serde(default = "default_batch_size")]
    pub default_size: usize,

    /// Largest batch a caller may request (default: 100)
    #[serde(default = "default_max_batch_size")]
    pub max_size: usize,

    /// Cap on tasks running at the same time (None = all at once)
    #[serde(default)]
    pub max_in_flight: Option<usize>,

    /// Deadline for each task, in seconds (None = no deadline)
    #[serde(default, with = "optional_duration_serde")]
    pub task_timeout: Option<Duration>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            default_size: default_batch_size(),
            max_size: default_max_batch_size(),
            max_in_flight: None,
            task_timeout: None,
        }
    }
}

impl BatchConfig {
    /// Coordinator options derived from this config
    pub fn options(&self) -> BatchOptions {
        BatchOptions {
            max_in_flight: self.max_in_flight,
            task_timeout: self.task_timeout,
        }
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:6789)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Optional API key for authentication
    #[serde(default)]
    pub api_key: Option<String>,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            api_key: None,
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

// Default value functions
fn default_endpoint() -> String {
    "https://catfact.ninja/fact".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_user_agent() -> String {
    concat!("fanout-facts/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_batch_size() -> usize {
    5
}

fn default_max_batch_size() -> usize {
    100
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 6789))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
