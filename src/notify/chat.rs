//! Chat (block message) delivery.

use bytes::Bytes;
use std::time::Duration;

use super::payload::ChatMessage;
use super::webhook::post;
use crate::error::{DeliveryErrorKind, NotifierError, Result};

/// Posts block messages to a single chat incoming-webhook URL.
#[derive(Debug, Clone)]
pub struct ChatNotifier {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl ChatNotifier {
    pub fn new(client: reqwest::Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            timeout,
        }
    }

    /// Send one message. Transport errors and non-2xx responses are
    /// returned to the caller.
    pub async fn send(&self, message: &ChatMessage) -> Result<()> {
        let body = serde_json::to_vec(message).map_err(|e| {
            NotifierError::delivery("chat message", DeliveryErrorKind::Encode(e.to_string()))
        })?;
        post(&self.client, &self.url, None, Bytes::from(body), self.timeout).await
    }
}
