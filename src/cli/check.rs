//! CLI handler for the `check` subcommand.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::AppConfig;
use crate::model::ChangeSet;
use crate::notify::NotifyReport;
use crate::poll::{OutcomeKind, PollOutcome};

/// What a one-shot check did, printed as JSON.
#[derive(Debug, Serialize)]
pub struct CheckSummary {
    pub bucket: String,
    pub outcome: OutcomeKind,
    pub changes: ChangeSet,
    /// Present when changes were found and delivery was awaited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<NotifyReport>,
}

/// Run a single poll, wait for notification delivery, and print a summary.
pub async fn run_check(config: AppConfig) -> Result<CheckSummary> {
    let orchestrator = super::build_orchestrator(&config)
        .await
        .context("failed to initialize")?;

    let outcome = orchestrator.execute_poll().await.context("check failed")?;
    let kind = outcome.kind();
    let changes = match &outcome {
        PollOutcome::Changed { changes, .. } => changes.clone(),
        _ => ChangeSet::new(),
    };

    // The process exits after this; delivery must finish first.
    let delivery = outcome.wait_for_delivery().await;

    let summary = CheckSummary {
        bucket: config.bucket.name,
        outcome: kind,
        changes,
        delivery,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(summary)
}
