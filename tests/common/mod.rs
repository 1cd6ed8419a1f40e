//! Shared helpers for integration tests: in-process webhook receivers and
//! listing fixtures.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use bucket_notifier::{
    KeyFilter, MemorySnapshotStore, Notifier, NotifyOptions, ObjectLister, ObjectRecord,
    PollOrchestrator, StaticLister,
};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One request captured by a [`Receiver`].
#[derive(Debug, Clone)]
pub struct Captured {
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

#[derive(Clone)]
struct ReceiverState {
    status: StatusCode,
    requests: Arc<Mutex<Vec<Captured>>>,
}

/// A local HTTP endpoint that records every POST and answers with a fixed
/// status.
pub struct Receiver {
    pub url: String,
    requests: Arc<Mutex<Vec<Captured>>>,
}

impl Receiver {
    pub async fn spawn(status: StatusCode) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/hook", post(capture))
            .with_state(ReceiverState {
                status,
                requests: Arc::clone(&requests),
            });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}/hook"),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.requests.lock().unwrap().clone()
    }

    /// Wait until at least `n` requests arrived, or panic after 5s.
    pub async fn wait_for(&self, n: usize) -> Vec<Captured> {
        for _ in 0..500 {
            let seen = self.requests();
            if seen.len() >= n {
                return seen;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {n} request(s) at {}, got {}", self.url, self.requests().len());
    }
}

async fn capture(
    State(state): State<ReceiverState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let body = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    state.requests.lock().unwrap().push(Captured { headers, body });
    state.status
}

/// A fixed timestamp so expectations do not depend on the clock.
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

pub fn object(key: &str, etag: &str) -> ObjectRecord {
    ObjectRecord::new(key, etag, at(0))
}

/// Notifier options posting to the given webhook URLs with a shared token.
pub fn webhook_options<S: AsRef<str>>(urls: &[S]) -> NotifyOptions {
    NotifyOptions {
        webhook_urls: urls.iter().map(|u| u.as_ref().to_string()).collect(),
        webhook_token: Some("test-token".to_string()),
        timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

/// An orchestrator over a static lister and an in-memory store.
pub fn orchestrator(
    lister: Arc<dyn ObjectLister>,
    store: Arc<MemorySnapshotStore>,
    options: NotifyOptions,
) -> Arc<PollOrchestrator> {
    Arc::new(PollOrchestrator::new(
        "reports",
        KeyFilter::default(),
        lister,
        store,
        Arc::new(Notifier::new("reports", options).unwrap()),
    ))
}

pub fn static_lister(objects: Vec<ObjectRecord>) -> Arc<StaticLister> {
    Arc::new(StaticLister::new(objects))
}
