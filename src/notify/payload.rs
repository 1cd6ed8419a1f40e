//! Wire payloads for webhook and chat delivery.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::model::{ChangeAction, ChangeSet};

/// Maximum number of blocks the chat service accepts in one message.
pub const MAX_CHAT_BLOCKS: usize = 50;

/// Zone used for chat timestamps unless configured otherwise.
pub const DEFAULT_DISPLAY_ZONE: &str = "America/Los_Angeles";

// ============================================================================
// Generic webhook payload
// ============================================================================

/// Body POSTed to every generic webhook destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub bucket: String,
    pub changes: Vec<WebhookChange>,
}

/// One change as seen by webhook consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookChange {
    #[serde(rename = "s3key")]
    pub key: String,
    pub action: ChangeAction,
    /// First path segment of the key
    #[serde(rename = "workstream")]
    pub group_tag: String,
    #[serde(rename = "file_url")]
    pub location: String,
}

impl WebhookPayload {
    #[must_use]
    pub fn from_changes(bucket: &str, changes: &ChangeSet) -> Self {
        Self {
            bucket: bucket.to_string(),
            changes: changes
                .iter()
                .map(|c| WebhookChange {
                    key: c.key.clone(),
                    action: c.action,
                    group_tag: c.group_tag().to_string(),
                    location: c.location.clone(),
                })
                .collect(),
        }
    }
}

// ============================================================================
// Chat block message
// ============================================================================

/// A block-formatted chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub blocks: Vec<ChatBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatBlock {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: ChatText,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatText {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl ChatBlock {
    /// A markdown section block.
    pub fn section(text: impl Into<String>) -> Self {
        Self {
            kind: "section".to_string(),
            text: ChatText {
                kind: "mrkdwn".to_string(),
                text: text.into(),
            },
        }
    }
}

impl ChatMessage {
    /// Render a change set as a summary block followed by one block per
    /// change.
    ///
    /// When the change set would exceed [`MAX_CHAT_BLOCKS`], the final block
    /// reports how many changes were left out instead.
    #[must_use]
    pub fn from_changes(bucket: &str, changes: &ChangeSet, zone: Tz) -> Self {
        let total = changes.len();
        let mut blocks = Vec::with_capacity((total + 1).min(MAX_CHAT_BLOCKS));
        blocks.push(ChatBlock::section(format!(
            "*Detected {total} changes in S3 bucket `{bucket}`*"
        )));

        let shown = if total + 1 > MAX_CHAT_BLOCKS {
            MAX_CHAT_BLOCKS - 2
        } else {
            total
        };

        for change in changes.iter().take(shown) {
            blocks.push(ChatBlock::section(format!(
                "*Action:* `{}`\n*Key:* `{}`\n*S3 URI:* `{}`\n*Time:* {}",
                change.action.title(),
                change.key,
                change.location,
                format_time(change.time, zone)
            )));
        }

        if shown < total {
            blocks.push(ChatBlock::section(format!(
                "_...and {} more changes not shown_",
                total - shown
            )));
        }

        Self { blocks }
    }
}

// ============================================================================
// Time rendering
// ============================================================================

/// Resolve a display zone by IANA name, falling back to UTC.
pub fn resolve_zone(name: &str) -> Tz {
    match name.parse::<Tz>() {
        Ok(zone) => zone,
        Err(e) => {
            tracing::warn!("Unknown display timezone '{name}' ({e}), using UTC");
            Tz::UTC
        }
    }
}

/// Render a timestamp as `YYYY-MM-DD HH:MM:SS ZZZ` in `zone`.
#[must_use]
pub fn format_time(time: DateTime<Utc>, zone: Tz) -> String {
    time.with_timezone(&zone)
        .format("%Y-%m-%d %H:%M:%S %Z")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Change;
    use chrono::TimeZone;

    fn changes(n: usize) -> ChangeSet {
        let time = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        (0..n)
            .map(|i| {
                let key = format!("team/file-{i}.json");
                Change {
                    location: Change::location_for("reports", &key),
                    key,
                    action: ChangeAction::Created,
                    time,
                }
            })
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_webhook_payload_shape() {
        let payload = WebhookPayload::from_changes("reports", &changes(1));
        insta::assert_json_snapshot!(payload, @r###"
        {
          "bucket": "reports",
          "changes": [
            {
              "s3key": "team/file-0.json",
              "action": "created",
              "workstream": "team",
              "file_url": "s3://reports/team/file-0.json"
            }
          ]
        }
        "###);
    }

    #[test]
    fn test_chat_message_blocks() {
        let zone = resolve_zone("America/Los_Angeles");
        let message = ChatMessage::from_changes("reports", &changes(2), zone);

        assert_eq!(message.blocks.len(), 3);
        assert_eq!(
            message.blocks[0].text.text,
            "*Detected 2 changes in S3 bucket `reports`*"
        );
        assert_eq!(
            message.blocks[1].text.text,
            "*Action:* `Created`\n*Key:* `team/file-0.json`\n*S3 URI:* `s3://reports/team/file-0.json`\n*Time:* 2024-07-01 05:00:00 PDT"
        );
        assert!(message.blocks.iter().all(|b| b.kind == "section"));
        assert!(message.blocks.iter().all(|b| b.text.kind == "mrkdwn"));
    }

    #[test]
    fn test_chat_message_is_capped() {
        let message = ChatMessage::from_changes("reports", &changes(120), Tz::UTC);

        assert_eq!(message.blocks.len(), MAX_CHAT_BLOCKS);
        assert!(message.blocks[0].text.text.contains("Detected 120 changes"));
        assert_eq!(
            message.blocks[MAX_CHAT_BLOCKS - 1].text.text,
            "_...and 72 more changes not shown_"
        );
    }

    #[test]
    fn test_chat_message_at_limit_is_not_truncated() {
        let message = ChatMessage::from_changes("reports", &changes(49), Tz::UTC);
        assert_eq!(message.blocks.len(), MAX_CHAT_BLOCKS);
        assert!(message.blocks[49].text.text.starts_with("*Action:*"));
    }

    #[test]
    fn test_unknown_zone_falls_back_to_utc() {
        let zone = resolve_zone("Mars/Olympus_Mons");
        let time = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_time(time, zone), "2024-01-02 03:04:05 UTC");
    }
}
