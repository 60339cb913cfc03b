//! Remote client-data service integration tests
//!
//! A local axum server on an ephemeral port stands in for the upstream
//! service.

mod common;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use common::{app, bearer, post, send, SECRET};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use wellnessz_gateway::gateway::remote::RemoteFetchErrorKind;
use wellnessz_gateway::{ClientId, ClientSource, RemoteClientFetcher, RemoteConfig};

const UPSTREAM_TOKEN: &str = "upstream-token";

#[derive(Clone, Default)]
struct Upstream {
    auth_headers: Arc<Mutex<Vec<Option<String>>>>,
    delay: Option<Duration>,
}

async fn client_handler(
    State(upstream): State<Upstream>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    upstream.auth_headers.lock().unwrap().push(
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );

    if let Some(delay) = upstream.delay {
        tokio::time::sleep(delay).await;
    }

    match id.as_str() {
        "7" => Json(json!({"client_id": "7", "metrics": {"age": 44, "bmi": 31.0}})).into_response(),
        "8" => Json(json!({"bmi": 22.5, "nickname": "flat"})).into_response(),
        "garbled" => (StatusCode::OK, "<html>not json</html>").into_response(),
        "listed" => Json(json!({"metrics": [44, 31.0]})).into_response(),
        _ => (StatusCode::NOT_FOUND, "<html><body>stack trace: db row 17</body></html>")
            .into_response(),
    }
}

async fn spawn_upstream(upstream: Upstream) -> SocketAddr {
    let router = Router::new()
        .route("/clients/:id", get(client_handler))
        .with_state(upstream);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn fetcher(addr: SocketAddr, timeout_ms: u64) -> RemoteClientFetcher {
    RemoteClientFetcher::new(RemoteConfig {
        enabled: true,
        base_url: Some(format!("http://{}", addr)),
        api_token: Some(UPSTREAM_TOKEN.to_string()),
        timeout_ms,
    })
    .unwrap()
}

#[tokio::test]
async fn test_fetch_sends_upstream_token_not_inbound_secret() {
    let upstream = Upstream::default();
    let addr = spawn_upstream(upstream.clone()).await;
    let (router, engine) = app(ClientSource::Remote(fetcher(addr, 2_000)));

    let (status, body) = send(
        router,
        post("/predict/by-id", Some(&bearer()), r#"{"client_id":"7"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["client_id"], "7");

    let headers = upstream.auth_headers.lock().unwrap().clone();
    assert_eq!(headers, vec![Some(format!("Bearer {}", UPSTREAM_TOKEN))]);
    assert!(!headers[0].as_deref().unwrap().contains(SECRET));

    let seen = engine.seen();
    assert_eq!(seen[0].1.get_f64("age"), Some(44.0));
    assert_eq!(seen[0].1.get_f64("sex"), Some(1.0));
}

#[tokio::test]
async fn test_fetch_accepts_flat_body() {
    let addr = spawn_upstream(Upstream::default()).await;

    let metrics = fetcher(addr, 2_000)
        .fetch(&ClientId::parse("8").unwrap())
        .await
        .unwrap();

    assert_eq!(metrics.get_f64("bmi"), Some(22.5));
    assert_eq!(metrics.get_f64("age"), Some(1.0));
    assert!(metrics.get("nickname").is_none());
}

#[tokio::test]
async fn test_upstream_status_is_reported() {
    let addr = spawn_upstream(Upstream::default()).await;

    let err = fetcher(addr, 2_000)
        .fetch(&ClientId::parse("404").unwrap())
        .await
        .unwrap_err();

    assert_eq!(err.kind, RemoteFetchErrorKind::Upstream);
    assert_eq!(err.status, 404);
    assert_eq!(err.message, "client service returned 404");
}

#[tokio::test]
async fn test_slow_upstream_times_out_as_server_error() {
    let upstream = Upstream {
        delay: Some(Duration::from_millis(1_500)),
        ..Default::default()
    };
    let addr = spawn_upstream(upstream).await;
    let (router, engine) = app(ClientSource::Remote(fetcher(addr, 200)));

    let (status, body) = send(
        router,
        post("/predict/by-id", Some(&bearer()), r#"{"client_id":"7"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "client service timed out after 200ms");
    assert!(engine.seen().is_empty());
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let addr = spawn_upstream(Upstream::default()).await;
    let fetcher = fetcher(addr, 2_000);

    for id in ["garbled", "listed"] {
        let err = fetcher
            .fetch(&ClientId::parse(id).unwrap())
            .await
            .unwrap_err();

        assert_eq!(err.kind, RemoteFetchErrorKind::Malformed, "{}", id);
    }
}

#[tokio::test]
async fn test_upstream_miss_is_server_error_without_upstream_body() {
    let addr = spawn_upstream(Upstream::default()).await;
    let (router, engine) = app(ClientSource::Remote(fetcher(addr, 2_000)));

    let (status, body) = send(
        router,
        post("/predict/by-id", Some(&bearer()), r#"{"client_id":"unknown"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "client service returned 404"}));
    assert!(engine.seen().is_empty());
}
