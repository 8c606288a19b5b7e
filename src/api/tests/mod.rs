use super::*;
use crate::Config;
use crate::error::TaskError;
use crate::fetcher::test_helpers::ScriptedSource;
use axum::body::Body;
use axum::http::StatusCode;
use std::time::Duration;
use tower::ServiceExt;


/// Helper to create a router over a scripted source, returning both
fn create_test_app(config: Config, source: ScriptedSource) -> (Router, Arc<ScriptedSource>) {
    let (fetcher, source) =
        crate::fetcher::test_helpers::create_test_fetcher_with_config(config, source);
    let config = Arc::clone(fetcher.config());
    (create_router(Arc::new(fetcher), config), source)
}

/// Send a GET and return status, headers and the parsed JSON body
async fn get_json(
    app: Router,
    uri: &str,
    headers: &[(&str, &str)],
) -> (StatusCode, axum::http::HeaderMap, serde_json::Value) {
    let mut builder = Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
    };
    (status, headers, json)
}

#[tokio::test]
async fn test_cors_enabled() {
    let (app, _) = create_test_app(Config::default(), ScriptedSource::default());

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let mut config = Config::default();
    config.api.cors_enabled = false;
    let (app, _) = create_test_app(config, ScriptedSource::default());

    let (status, headers, _) =
        get_json(app, "/health", &[("Origin", "http://localhost:3000")]).await;

    assert_eq!(status, StatusCode::OK);
    assert!(!headers.contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_cors_specific_origin() {
    let mut config = Config::default();
    config.api.cors_origins = vec!["http://allowed.example".to_string()];
    let (app, _) = create_test_app(config, ScriptedSource::default());

    let (_, headers, _) = get_json(app, "/health", &[("Origin", "http://allowed.example")]).await;

    assert_eq!(
        headers.get("access-control-allow-origin").unwrap(),
        "http://allowed.example"
    );
}

#[tokio::test]
async fn test_request_id_is_generated() {
    let (app, _) = create_test_app(Config::default(), ScriptedSource::default());

    let (_, headers, _) = get_json(app, "/health", &[]).await;

    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .expect("response should carry a request id")
        .to_str()
        .unwrap();
    // Hyphenated UUID
    assert_eq!(request_id.len(), 36);
    assert_eq!(request_id.matches('-').count(), 4);
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let (app, _) = create_test_app(Config::default(), ScriptedSource::default());

    let (_, headers, _) = get_json(app, "/facts?count=1", &[("X-Request-ID", "trace-abc-123")]).await;

    assert_eq!(headers.get(REQUEST_ID_HEADER).unwrap(), "trace-abc-123");
}

#[tokio::test]
async fn test_request_id_on_rejected_request() {
    let mut config = Config::default();
    config.api.api_key = Some("test-secret-key".to_string());
    let (app, _) = create_test_app(config, ScriptedSource::default());

    let (status, headers, _) = get_json(app, "/facts", &[("X-Request-ID", "rejected-1")]).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers.get(REQUEST_ID_HEADER).unwrap(), "rejected-1");
}

#[tokio::test]
async fn test_authentication_with_api_key() {
    let mut config = Config::default();
    config.api.api_key = Some("test-secret-key".to_string());
    let (app, source) = create_test_app(config, ScriptedSource::default());

    let (status, _, body) = get_json(app.clone(), "/facts?count=2", &[]).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");
    assert_eq!(source.calls(), 0, "rejected requests must not start a batch");

    let (status, _, body) = get_json(
        app.clone(),
        "/facts?count=2",
        &[("X-Api-Key", "test-secret-key")],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    let (status, _, _) = get_json(app, "/facts?count=2", &[("X-Api-Key", "wrong-key")]).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_swagger_ui_toggle() {
    let (app, _) = create_test_app(Config::default(), ScriptedSource::default());
    let (status, _, spec) = get_json(app, "/api-docs/openapi.json", &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert!(spec["paths"].get("/facts").is_some());

    let mut config = Config::default();
    config.api.swagger_ui = false;
    let (app, _) = create_test_app(config, ScriptedSource::default());
    let (status, _, _) = get_json(app, "/api-docs/openapi.json", &[]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_server_serves_and_shuts_down_gracefully() {
    let failures = [(1, TaskError::Status { status: 502 })];
    let (fetcher, _) = crate::fetcher::test_helpers::create_test_fetcher(
        ScriptedSource::failing(failures),
    );
    let fetcher = Arc::new(fetcher);
    let config = Arc::clone(fetcher.config());

    // Port 0 = OS assigns a free port
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(serve(listener, fetcher, config, async move {
        stop_rx.await.ok();
    }));

    let body: serde_json::Value = reqwest::get(format!("http://{addr}/facts?count=3"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["succeeded"], 2);
    assert_eq!(body["outcomes"][1]["error"]["code"], "status");

    stop_tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server should stop after the shutdown signal")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_start_api_server_reports_bind_failure() {
    // Occupy a port, then ask the server to bind the same one
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let mut config = Config::default();
    config.api.bind_address = taken.local_addr().unwrap();

    let (fetcher, _) = crate::fetcher::test_helpers::create_test_fetcher_with_config(
        config,
        ScriptedSource::default(),
    );
    let fetcher = Arc::new(fetcher);
    let config = Arc::clone(fetcher.config());

    let result = start_api_server(fetcher, config).await;
    assert!(matches!(result, Err(crate::error::Error::Io(_))));
}

#[tokio::test]
async fn test_spawn_api_server_method() {
    let mut config = Config::default();
    config.api.bind_address = "127.0.0.1:0".parse().unwrap();
    let (fetcher, _) = crate::fetcher::test_helpers::create_test_fetcher_with_config(
        config,
        ScriptedSource::default(),
    );

    let api_handle = Arc::new(fetcher).spawn_api_server();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(!api_handle.is_finished(), "server should still be running");
    api_handle.abort();
}
