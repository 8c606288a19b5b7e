//! REST API server example
//!
//! Runs the fact fetcher behind the REST API until Ctrl+C / SIGTERM.
//!
//! After starting, you can:
//! - View Swagger UI at http://localhost:6789/swagger-ui
//! - Fetch a batch via GET http://localhost:6789/facts?count=8
//! - Check liveness via GET http://localhost:6789/health
//!
//! Every response carries an `X-Request-ID` header; send your own to
//! correlate with the server's logs.

use fanout_facts::config::{ApiConfig, BatchConfig, Config};
use fanout_facts::{FactFetcher, serve_until_signal};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fanout_facts=info,tower_http=info".into()),
        )
        .init();

    let config = Config {
        batch: BatchConfig {
            default_size: 5,
            max_size: 50,
            max_in_flight: Some(16),
            task_timeout: Some(Duration::from_secs(15)),
        },
        api: ApiConfig {
            bind_address: "127.0.0.1:6789".parse::<SocketAddr>()?,
            api_key: std::env::var("FANOUT_API_KEY").ok(),
            ..Default::default()
        },
        ..Default::default()
    };

    let fetcher = Arc::new(FactFetcher::new(config)?);

    println!("REST API listening on http://127.0.0.1:6789");
    println!("Swagger UI: http://127.0.0.1:6789/swagger-ui");
    println!("Press Ctrl+C to stop");

    serve_until_signal(fetcher).await?;

    println!("Server stopped");
    Ok(())
}
