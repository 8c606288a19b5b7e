//! REST API server module
//!
//! Exposes batch fetching over HTTP with an OpenAPI 3 description.

use crate::{Config, FactFetcher, Result};
use axum::{
    Router,
    http::{HeaderValue, Request},
    middleware,
    routing::get,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Facts
/// - `GET /facts?count=N` - Fetch N facts concurrently, outcomes in index order
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
///
/// Every response carries an `X-Request-ID` header: the caller's own value
/// when one was sent, a fresh UUID otherwise.
pub fn create_router(fetcher: Arc<FactFetcher>, config: Arc<Config>) -> Router {
    let state = AppState::new(fetcher, config.clone());

    let router = Router::new()
        // Facts
        .route("/facts", get(routes::get_facts))
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec));

    // SwaggerUi serves its own copy of the document; /openapi.json is taken
    let router = if config.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state);

    // Layers applied later wrap earlier ones: request id and tracing run
    // before auth so rejected requests are still traced and tagged.
    let router = if config.api.api_key.is_some() {
        router.layer(middleware::from_fn_with_state(
            config.api.api_key.clone(),
            auth::require_api_key,
        ))
    } else {
        router
    };

    let router = router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<axum::body::Body>| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id
                    )
                }),
            )
            .layer(PropagateRequestIdLayer::x_request_id()),
    );

    if config.api.cors_enabled {
        let cors = build_cors_layer(&config.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` anywhere in the list (or an empty list) allows any origin.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Runs until the listener fails or the surrounding task is aborted. Use
/// [`start_api_server_with_shutdown`] (or [`crate::serve_until_signal`]) for
/// a graceful stop.
///
/// # Example
///
/// ```no_run
/// use fanout_facts::{Config, FactFetcher};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let fetcher = Arc::new(FactFetcher::new((*config).clone())?);
///
/// // Start API server (blocks until shutdown)
/// fanout_facts::api::start_api_server(fetcher, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(fetcher: Arc<FactFetcher>, config: Arc<Config>) -> Result<()> {
    start_api_server_with_shutdown(fetcher, config, std::future::pending()).await
}

/// Start the API server and stop gracefully once `shutdown` completes.
///
/// In-flight requests, including running batches, finish before this returns.
pub async fn start_api_server_with_shutdown<S>(
    fetcher: Arc<FactFetcher>,
    config: Arc<Config>,
    shutdown: S,
) -> Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let bind_address = config.api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    serve(listener, fetcher, config, shutdown).await
}

/// Serve the API on an already-bound listener until `shutdown` completes
pub async fn serve<S>(
    listener: TcpListener,
    fetcher: Arc<FactFetcher>,
    config: Arc<Config>,
    shutdown: S,
) -> Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr().map_err(crate::error::Error::Io)?;
    let app = create_router(fetcher, config);

    tracing::info!(address = %local_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
