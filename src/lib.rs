//! # fanout-facts
//!
//! Concurrent fan-out/fan-in batch fetcher with index-ordered results.
//!
//! ## Design Philosophy
//!
//! fanout-facts is designed to be:
//! - **Order-preserving** - Outcome `i` always belongs to task `i`, whatever order tasks finish in
//! - **Failure-isolating** - One failed task never aborts or corrupts the others
//! - **Library-first** - No CLI, purely a Rust crate for embedding
//! - **Sensible defaults** - Works out of the box with zero configuration
//!
//! ## Quick Start
//!
//! ```no_run
//! use fanout_facts::{Config, FactFetcher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = FactFetcher::new(Config::default())?;
//!
//!     let batch = fetcher.fetch_batch(5).await?;
//!     for outcome in &batch {
//!         println!("{}", fanout_facts::report::render_outcome(outcome));
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! The coordinator is generic and can fan out any async task:
//!
//! ```no_run
//! use fanout_facts::{TaskError, run_batch};
//!
//! # async fn example() {
//! let batch = run_batch(4, |index| async move {
//!     if index % 2 == 0 { Ok(index) } else { Err(TaskError::Cancelled) }
//! })
//! .await;
//!
//! assert_eq!(batch.success_count(), 2);
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Fan-out/fan-in coordinator
pub mod coordinator;
/// Error types
pub mod error;
/// Task unit: fetching one fact
pub mod fetch;
/// High-level fetcher facade
pub mod fetcher;
/// Plain-text batch rendering
pub mod report;
/// Completion signalling between tasks and the coordinator
pub mod sync;
/// Core types
pub mod types;

// Re-export commonly used types
pub use config::{ApiConfig, BatchConfig, Config, FetchConfig};
pub use coordinator::{BatchOptions, Coordinator, MAX_BATCH_SIZE, run_batch};
pub use error::{ApiError, Error, ErrorDetail, Result, TaskError, ToHttpStatus};
pub use fetch::{FactSource, HttpFactSource};
pub use fetcher::FactFetcher;
pub use types::{Batch, Fact, Outcome};

/// Helper function to run the REST API with graceful signal handling.
///
/// Serves on `config.api.bind_address` until a termination signal arrives,
/// then stops accepting connections and lets in-flight requests finish.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use fanout_facts::{Config, FactFetcher, serve_until_signal};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let fetcher = Arc::new(FactFetcher::new(Config::default())?);
///
///     // Run with automatic signal handling
///     serve_until_signal(fetcher).await?;
///
///     Ok(())
/// }
/// ```
pub async fn serve_until_signal(fetcher: std::sync::Arc<FactFetcher>) -> Result<()> {
    let config = std::sync::Arc::clone(fetcher.config());
    api::start_api_server_with_shutdown(fetcher, config, wait_for_signal()).await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{Signal, SignalKind, signal};

    // Registration can fail in restricted environments
    fn register(kind: SignalKind, name: &'static str) -> Option<Signal> {
        signal(kind)
            .map_err(|e| tracing::warn!(error = %e, signal = name, "Could not register signal handler"))
            .ok()
    }

    async fn next(stream: Option<Signal>) {
        match stream {
            Some(mut stream) => {
                stream.recv().await;
            }
            None => std::future::pending().await,
        }
    }

    let sigterm = register(SignalKind::terminate(), "SIGTERM");
    let sigint = register(SignalKind::interrupt(), "SIGINT");

    if sigterm.is_none() && sigint.is_none() {
        tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
        tokio::signal::ctrl_c().await.ok();
        return;
    }

    tokio::select! {
        _ = next(sigterm) => tracing::info!("Received SIGTERM signal"),
        _ = next(sigint) => tracing::info!("Received SIGINT signal (Ctrl+C)"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
    } else {
        tracing::info!("Received Ctrl+C signal");
    }
}
