//! Authentication middleware for the REST API
//!
//! Optional API key authentication via the X-Api-Key header. When
//! `ApiConfig::api_key` is set, every request except `GET /health` must carry
//! a matching header or receives 401 Unauthorized.

use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Paths reachable without a key so liveness probes need no secret
const PUBLIC_PATHS: &[&str] = &["/health"];

/// Authentication middleware that checks for a valid API key in the X-Api-Key header
///
/// Returns 401 with an [`ApiError`] body when the key is missing or wrong,
/// otherwise the response of the next handler.
///
/// # Examples
///
/// ```no_run
/// use axum::{Router, middleware};
/// use fanout_facts::api::auth::require_api_key;
///
/// let api_key = Some("secret-key-123".to_string());
/// let router: Router = Router::new()
///     .layer(middleware::from_fn_with_state(api_key, require_api_key));
/// ```
pub async fn require_api_key(
    State(expected_api_key): State<Option<String>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected_key) = expected_api_key else {
        return next.run(request).await;
    };

    if PUBLIC_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(key) if constant_time_eq(key.as_bytes(), expected_key.as_bytes()) => {
            next.run(request).await
        }
        Some(_) => {
            tracing::debug!(path = %request.uri().path(), "Rejected request with invalid API key");
            ApiError::unauthorized("Invalid API key").into_response()
        }
        None => ApiError::unauthorized("Missing X-Api-Key header").into_response(),
    }
}

/// Compares every byte regardless of where the first mismatch occurs.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
