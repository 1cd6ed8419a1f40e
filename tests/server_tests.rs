//! Integration tests for the HTTP trigger surface.

mod common;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use bucket_notifier::error::ListingErrorKind;
use bucket_notifier::{
    KeyFilter, Listing, MemorySnapshotStore, NotifierError, NotifyOptions, ObjectLister,
};
use common::{object, orchestrator, static_lister};
use std::sync::Arc;
use tower::ServiceExt;

/// A lister whose credentials are rejected by the store.
struct DeniedLister;

#[async_trait]
impl ObjectLister for DeniedLister {
    async fn list(&self, bucket: &str, _filter: &KeyFilter) -> bucket_notifier::Result<Listing> {
        Err(NotifierError::listing(
            format!("bucket '{bucket}'"),
            ListingErrorKind::Request("AccessDenied: not authorized".to_string()),
        ))
    }

    fn name(&self) -> &'static str {
        "denied"
    }
}

async fn call(
    app: axum::Router,
    method: &str,
    uri: &str,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health() {
    let app = bucket_notifier::server::router(orchestrator(
        static_lister(Vec::new()),
        Arc::new(MemorySnapshotStore::new()),
        NotifyOptions::default(),
    ));

    let (status, body) = call(app, "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({"status": "ok"}));
}

#[tokio::test]
async fn test_check_runs_a_poll() {
    let lister = static_lister(vec![object("a.json", "1")]);
    let poller = orchestrator(
        lister.clone(),
        Arc::new(MemorySnapshotStore::new()),
        NotifyOptions::default(),
    );
    let app = bucket_notifier::server::router(Arc::clone(&poller));

    let (status, body) = call(app.clone(), "POST", "/check").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Check completed");
    assert_eq!(body["outcome"], "bootstrapped");

    lister.set(vec![object("a.json", "2"), object("b.json", "1")]);
    let (status, body) = call(app.clone(), "POST", "/check").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "changed");
    assert_eq!(body["changes"], 2);

    let (status, body) = call(app, "GET", "/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bucket"], "reports");
    assert_eq!(body["phase"], "steady");
    assert_eq!(body["poll_count"], 2);
    assert_eq!(body["total_changes"], 2);
    assert_eq!(body["deliveries"]["webhooks_failed"], 0);
}

#[tokio::test]
async fn test_check_reports_poll_error() {
    let corrupt = bucket_notifier::Snapshot {
        captured_at: common::at(0),
        content_hash: String::new(),
        objects: "garbage".to_string(),
    };
    let app = bucket_notifier::server::router(orchestrator(
        static_lister(Vec::new()),
        Arc::new(MemorySnapshotStore::with_snapshot(corrupt)),
        NotifyOptions::default(),
    ));

    let (status, body) = call(app.clone(), "POST", "/check").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("decoding stored snapshot"));

    let (_, body) = call(app, "GET", "/status").await;
    assert_eq!(body["failed_polls"], 1);
    assert!(body["last_error"].is_string());
}

#[tokio::test]
async fn test_check_error_names_the_root_cause() {
    let app = bucket_notifier::server::router(orchestrator(
        Arc::new(DeniedLister),
        Arc::new(MemorySnapshotStore::new()),
        NotifyOptions::default(),
    ));

    let (status, body) = call(app.clone(), "POST", "/check").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("listing objects"), "{message}");
    assert!(message.contains("AccessDenied: not authorized"), "{message}");

    let (_, body) = call(app, "GET", "/status").await;
    assert!(body["last_error"]
        .as_str()
        .unwrap()
        .contains("AccessDenied"));
}

#[tokio::test]
async fn test_check_requires_post() {
    let app = bucket_notifier::server::router(orchestrator(
        static_lister(Vec::new()),
        Arc::new(MemorySnapshotStore::new()),
        NotifyOptions::default(),
    ));

    let (status, _) = call(app, "GET", "/check").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}
