//! Change notification delivery.
//!
//! A [`Notifier`] turns a [`ChangeSet`] into two independent deliveries:
//!
//! - a generic JSON payload POSTed to every webhook destination,
//! - an optional block-formatted chat message.
//!
//! Delivery is best-effort. [`Notifier::notify`] never fails; outcomes are
//! logged, counted in [`DeliveryStats`], and returned as a [`NotifyReport`].

mod chat;
mod payload;
mod webhook;

pub use chat::ChatNotifier;
pub use payload::{
    format_time, resolve_zone, ChatBlock, ChatMessage, ChatText, WebhookChange, WebhookPayload,
    DEFAULT_DISPLAY_ZONE, MAX_CHAT_BLOCKS,
};
pub use webhook::{DeliveryFailure, DeliveryReport, WebhookNotifier, TOKEN_HEADER};

use chrono_tz::Tz;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::{NotifierError, Result};
use crate::model::ChangeSet;

/// Default per-request timeout for outbound deliveries.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Destinations and formatting for a [`Notifier`].
#[derive(Debug, Clone)]
pub struct NotifyOptions {
    pub webhook_urls: Vec<String>,
    pub webhook_token: Option<String>,
    pub chat_url: Option<String>,
    /// IANA zone name for chat timestamps
    pub display_zone: String,
    pub timeout: Duration,
}

impl Default for NotifyOptions {
    fn default() -> Self {
        Self {
            webhook_urls: Vec::new(),
            webhook_token: None,
            chat_url: None,
            display_zone: DEFAULT_DISPLAY_ZONE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// What happened to the chat message for one change set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "error")]
pub enum ChatOutcome {
    /// No chat destination configured
    Skipped,
    Delivered,
    Failed(String),
}

/// Result of delivering one change set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotifyReport {
    pub changes: usize,
    pub webhooks: DeliveryReport,
    pub chat: ChatOutcome,
}

impl NotifyReport {
    fn empty() -> Self {
        Self {
            changes: 0,
            webhooks: DeliveryReport::default(),
            chat: ChatOutcome::Skipped,
        }
    }
}

/// Running delivery counters.
#[derive(Debug, Default)]
pub struct DeliveryStats {
    delivered: AtomicU64,
    failed: AtomicU64,
    chat_delivered: AtomicU64,
    chat_failed: AtomicU64,
}

/// Point-in-time copy of [`DeliveryStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryCounters {
    pub webhooks_delivered: u64,
    pub webhooks_failed: u64,
    pub chat_delivered: u64,
    pub chat_failed: u64,
}

impl DeliveryStats {
    fn record(&self, report: &NotifyReport) {
        self.delivered
            .fetch_add(report.webhooks.delivered.len() as u64, Ordering::Relaxed);
        self.failed
            .fetch_add(report.webhooks.failed.len() as u64, Ordering::Relaxed);
        match report.chat {
            ChatOutcome::Delivered => {
                self.chat_delivered.fetch_add(1, Ordering::Relaxed);
            }
            ChatOutcome::Failed(_) => {
                self.chat_failed.fetch_add(1, Ordering::Relaxed);
            }
            ChatOutcome::Skipped => {}
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> DeliveryCounters {
        DeliveryCounters {
            webhooks_delivered: self.delivered.load(Ordering::Relaxed),
            webhooks_failed: self.failed.load(Ordering::Relaxed),
            chat_delivered: self.chat_delivered.load(Ordering::Relaxed),
            chat_failed: self.chat_failed.load(Ordering::Relaxed),
        }
    }
}

/// Fans a change set out to the webhook and chat destinations.
#[derive(Debug)]
pub struct Notifier {
    bucket: String,
    webhooks: WebhookNotifier,
    chat: Option<ChatNotifier>,
    zone: Tz,
    stats: DeliveryStats,
}

impl Notifier {
    /// Build a notifier for `bucket`.
    ///
    /// An unknown display zone falls back to UTC with a warning.
    pub fn new(bucket: impl Into<String>, options: NotifyOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("bucket-notifier/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NotifierError::config(format!("building HTTP client: {e}")))?;

        let chat = options
            .chat_url
            .filter(|url| !url.trim().is_empty())
            .map(|url| ChatNotifier::new(client.clone(), url, options.timeout));

        Ok(Self {
            bucket: bucket.into(),
            webhooks: WebhookNotifier::new(
                client,
                options.webhook_urls,
                options.webhook_token,
                options.timeout,
            ),
            chat,
            zone: resolve_zone(&options.display_zone),
            stats: DeliveryStats::default(),
        })
    }

    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    #[must_use]
    pub fn has_chat(&self) -> bool {
        self.chat.is_some()
    }

    #[must_use]
    pub fn stats(&self) -> DeliveryCounters {
        self.stats.snapshot()
    }

    /// Deliver a change set to every destination.
    ///
    /// Webhook and chat delivery run concurrently. Per-destination failures
    /// are logged and reported, never returned.
    pub async fn notify(&self, changes: &ChangeSet) -> NotifyReport {
        if changes.is_empty() {
            tracing::debug!("No changes to notify");
            return NotifyReport::empty();
        }

        let payload = WebhookPayload::from_changes(&self.bucket, changes);
        let (webhooks, chat) = tokio::join!(self.webhooks.deliver(&payload), self.send_chat(changes));

        let report = NotifyReport {
            changes: changes.len(),
            webhooks,
            chat,
        };
        self.stats.record(&report);

        tracing::info!(
            "Notified {} change(s): {}/{} webhook(s) delivered, chat {}",
            report.changes,
            report.webhooks.delivered.len(),
            report.webhooks.attempted(),
            match &report.chat {
                ChatOutcome::Skipped => "skipped",
                ChatOutcome::Delivered => "delivered",
                ChatOutcome::Failed(_) => "failed",
            }
        );
        report
    }

    async fn send_chat(&self, changes: &ChangeSet) -> ChatOutcome {
        let Some(chat) = &self.chat else {
            return ChatOutcome::Skipped;
        };
        let message = ChatMessage::from_changes(&self.bucket, changes, self.zone);
        match chat.send(&message).await {
            Ok(()) => ChatOutcome::Delivered,
            Err(e) => {
                let error = e.chain();
                tracing::error!("Chat notification failed: {error}");
                ChatOutcome::Failed(error)
            }
        }
    }
}
