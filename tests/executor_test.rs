//! Retry behavior of the request executor, measured by exact attempt counts
//! against a mock server.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use lingo::Error;

fn usage_body() -> serde_json::Value {
    json!({"character_count": 100, "character_limit": 1000})
}

/// Routes `GET /v2/usage` through the given handler result sequence: one
/// status per attempt, repeating the last entry once exhausted.
fn usage_router(statuses: &'static [u16], attempts: Arc<AtomicU32>) -> Router {
    Router::new().route(
        "/v2/usage",
        get(move || {
            let attempts = attempts.clone();
            async move {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst) as usize;
                let status = *statuses.get(attempt).or(statuses.last()).unwrap();
                (
                    StatusCode::from_u16(status).unwrap(),
                    Json(usage_body()),
                )
            }
        }),
    )
}

#[tokio::test]
async fn test_retries_transient_503_until_success() {
    let attempts = Arc::new(AtomicU32::new(0));
    let addr = common::serve(usage_router(&[503, 200], attempts.clone())).await;

    let usage = common::client_for(addr).get_usage().await.unwrap();
    assert_eq!(usage.character.count(), Some(100));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_retries_rate_limit_429() {
    let attempts = Arc::new(AtomicU32::new(0));
    let addr = common::serve(usage_router(&[429, 200], attempts.clone())).await;

    common::client_for(addr).get_usage().await.unwrap();
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_exhausts_budget_on_persistent_503() {
    let attempts = Arc::new(AtomicU32::new(0));
    let addr = common::serve(usage_router(&[503], attempts.clone())).await;

    let err = common::client_with_retries(addr, 2)
        .get_usage()
        .await
        .unwrap_err();
    // Initial attempt plus two retries.
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert!(matches!(err, Error::Server { status: 503, .. }));
    assert!(err.should_retry());
}

#[tokio::test]
async fn test_terminal_status_gets_single_attempt() {
    let attempts = Arc::new(AtomicU32::new(0));
    let addr = common::serve(usage_router(&[400], attempts.clone())).await;

    let err = common::client_for(addr).get_usage().await.unwrap_err();
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert!(matches!(err, Error::Server { status: 400, .. }));
    assert!(!err.should_retry());
}

#[tokio::test]
async fn test_authorization_failure() {
    let attempts = Arc::new(AtomicU32::new(0));
    let addr = common::serve(usage_router(&[403], attempts.clone())).await;

    let err = common::client_for(addr).get_usage().await.unwrap_err();
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert!(matches!(err, Error::Authorization { .. }));
    assert_eq!(err.http_status(), Some(403));
}

#[tokio::test]
async fn test_quota_exceeded_456() {
    let attempts = Arc::new(AtomicU32::new(0));
    let addr = common::serve(usage_router(&[456], attempts.clone())).await;

    let err = common::client_for(addr).get_usage().await.unwrap_err();
    assert!(matches!(err, Error::QuotaExceeded { .. }));
    assert!(!err.should_retry());
}

#[tokio::test]
async fn test_connection_refused_retried_then_tagged_terminal() {
    // Bind and immediately drop a listener so the port is closed.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = common::client_with_retries(addr, 1)
        .get_usage()
        .await
        .unwrap_err();
    match err {
        Error::Connection { should_retry, .. } => assert!(!should_retry),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_auth_header_and_user_agent_sent() {
    let attempts = Arc::new(AtomicU32::new(0));
    let seen = attempts.clone();
    let app = Router::new().route(
        "/v2/usage",
        get(move |headers: axum::http::HeaderMap| {
            let seen = seen.clone();
            async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default();
                let agent = headers
                    .get("user-agent")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default();
                if auth == "Lingo-Auth-Key test-key:fx" && agent.starts_with("lingo-rust/") {
                    seen.fetch_add(1, Ordering::SeqCst);
                }
                Json(usage_body())
            }
        }),
    );
    let addr = common::serve(app).await;

    common::client_for(addr).get_usage().await.unwrap();
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}
