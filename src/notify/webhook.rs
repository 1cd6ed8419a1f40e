//! Generic webhook fan-out.

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::task::{self, JoinSet};

use super::payload::WebhookPayload;
use crate::error::{DeliveryErrorKind, NotifierError, Result};

/// Header carrying the shared secret.
pub const TOKEN_HEADER: &str = "x-webhook-token";

/// Response bodies longer than this are cut in error messages.
const MAX_ERROR_BODY: usize = 512;

/// Outcome of one fan-out round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub delivered: Vec<String>,
    pub failed: Vec<DeliveryFailure>,
}

/// A destination that did not accept the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryFailure {
    pub url: String,
    pub error: String,
}

impl DeliveryReport {
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }
}

/// POSTs one shared payload to every configured destination.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    urls: Vec<String>,
    token: Option<String>,
    timeout: Duration,
}

impl WebhookNotifier {
    pub fn new(
        client: reqwest::Client,
        urls: Vec<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            urls,
            token,
            timeout,
        }
    }

    /// Deliver `payload` to every destination concurrently.
    ///
    /// Each destination gets its own task and timeout. Failures are logged
    /// and collected in the report; none of them stop the others.
    pub async fn deliver(&self, payload: &WebhookPayload) -> DeliveryReport {
        if self.urls.is_empty() {
            return DeliveryReport::default();
        }

        let body = match serde_json::to_vec(payload) {
            Ok(body) => Bytes::from(body),
            Err(e) => {
                tracing::warn!("Failed to encode webhook payload: {e}");
                return DeliveryReport {
                    delivered: Vec::new(),
                    failed: self
                        .urls
                        .iter()
                        .map(|url| DeliveryFailure {
                            url: url.clone(),
                            error: e.to_string(),
                        })
                        .collect(),
                };
            }
        };

        let client = self.client.clone();
        let token = self.token.clone();
        let timeout = self.timeout;
        fan_out(&self.urls, move |url| {
            let client = client.clone();
            let token = token.clone();
            let body = body.clone();
            async move { post(&client, &url, token.as_deref(), body, timeout).await }
        })
        .await
    }
}

/// Run `send` for every URL on its own task and collect the outcomes.
///
/// A task that panics or is cancelled is reported as a failure of the URL it
/// was delivering to.
pub(crate) async fn fan_out<F, Fut>(urls: &[String], send: F) -> DeliveryReport
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let mut report = DeliveryReport::default();
    let mut tasks = JoinSet::new();
    let mut pending: HashMap<task::Id, String> = HashMap::with_capacity(urls.len());
    for url in urls {
        let handle = tasks.spawn(send(url.clone()));
        pending.insert(handle.id(), url.clone());
    }

    while let Some(joined) = tasks.join_next_with_id().await {
        let (id, outcome) = match joined {
            Ok((id, result)) => (id, result.map_err(|e| e.chain())),
            Err(e) => (e.id(), Err(format!("delivery task did not complete: {e}"))),
        };
        let Some(url) = pending.remove(&id) else {
            continue;
        };
        match outcome {
            Ok(()) => {
                tracing::debug!("Webhook delivered to {url}");
                report.delivered.push(url);
            }
            Err(error) => {
                tracing::warn!("Webhook delivery to {url} failed: {error}");
                report.failed.push(DeliveryFailure { url, error });
            }
        }
    }

    report
}

/// POST a JSON body and require a 2xx response.
pub(crate) async fn post(
    client: &reqwest::Client,
    url: &str,
    token: Option<&str>,
    body: Bytes,
    timeout: Duration,
) -> Result<()> {
    let mut request = client
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .timeout(timeout)
        .body(body);
    if let Some(token) = token {
        request = request.header(TOKEN_HEADER, token);
    }

    let response = request.send().await.map_err(|e| {
        let kind = if e.is_timeout() {
            DeliveryErrorKind::Timeout(timeout)
        } else {
            DeliveryErrorKind::Network(e.to_string())
        };
        NotifierError::delivery(url, kind)
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    Err(NotifierError::delivery(
        url,
        DeliveryErrorKind::Status {
            status: status.as_u16(),
            body,
        },
    ))
}
