//! Mock fact endpoints and fetcher constructors shared by integration tests

use fanout_facts::{Config, FactFetcher};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path the mock endpoint serves facts on
pub const FACT_PATH: &str = "/fact";

/// JSON body the real endpoint returns for one fact
pub fn fact_body(text: &str) -> serde_json::Value {
    serde_json::json!({ "fact": text, "length": text.len() })
}

/// Mock endpoint that answers every request with the same fact
pub async fn start_fact_server(text: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FACT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(fact_body(text)))
        .mount(&server)
        .await;
    server
}

/// Mock endpoint that answers with `status` and no body
pub async fn start_failing_server(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FACT_PATH))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;
    server
}

/// Mock endpoint that answers every request after `delay`
pub async fn start_slow_server(text: &str, delay: Duration) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FACT_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(fact_body(text))
                .set_delay(delay),
        )
        .mount(&server)
        .await;
    server
}

/// Default config pointed at a mock endpoint
pub fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.fetch.endpoint = format!("{}{}", server.uri(), FACT_PATH);
    config
}

/// Fetcher with default settings pointed at a mock endpoint
pub fn fetcher_for(server: &MockServer) -> FactFetcher {
    FactFetcher::new(config_for(server)).expect("mock config should be valid")
}
