//! Batch fetch example
//!
//! Fetches a batch of facts concurrently and prints one line per index, in
//! submission order, whatever order the requests finished in.
//!
//! ```bash
//! cargo run --example fetch_facts            # default batch size (5)
//! cargo run --example fetch_facts -- 12      # explicit batch size
//! RUST_LOG=fanout_facts=debug cargo run --example fetch_facts
//! ```
//!
//! A JSON config file can be supplied through `FANOUT_CONFIG`.

use fanout_facts::{Config, FactFetcher, report};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fanout_facts=info")),
        )
        .init();

    let config = match std::env::var("FANOUT_CONFIG") {
        Ok(path) => Config::from_file(path)?,
        Err(_) => Config::default(),
    };

    let fetcher = FactFetcher::new(config)?;

    let batch = match std::env::args().nth(1) {
        Some(count) => fetcher.fetch_batch(count.parse()?).await?,
        None => fetcher.fetch_default_batch().await?,
    };

    let stdout = std::io::stdout();
    report::write_batch(&mut stdout.lock(), &batch)?;

    println!(
        "\n{} succeeded, {} failed",
        batch.success_count(),
        batch.failure_count()
    );
    Ok(())
}
