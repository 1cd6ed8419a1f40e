//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler implements the business logic for a specific CLI subcommand.

mod check;
mod serve;

pub use check::{run_check, CheckSummary};
pub use serve::run_serve;

use std::sync::Arc;

use crate::config::{AppConfig, StoreBackend};
use crate::error::Result;
use crate::lister::ObjectLister;
use crate::notify::Notifier;
use crate::poll::PollOrchestrator;
use crate::store::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore};

/// Wire an orchestrator from validated configuration.
pub async fn build_orchestrator(config: &AppConfig) -> Result<Arc<PollOrchestrator>> {
    let lister = build_lister(config).await?;
    let orchestrator = build_orchestrator_with(config, lister)?;
    orchestrator.detect_baseline().await;
    Ok(orchestrator)
}

/// Wire an orchestrator around a caller-supplied lister.
pub fn build_orchestrator_with(
    config: &AppConfig,
    lister: Arc<dyn ObjectLister>,
) -> Result<Arc<PollOrchestrator>> {
    let store: Arc<dyn SnapshotStore> = match config.store.backend {
        StoreBackend::File => {
            let path = config.store.resolved_path()?;
            tracing::info!("Snapshot file: {}", path.display());
            Arc::new(FileSnapshotStore::new(path)?)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory snapshot store; state is lost on restart");
            Arc::new(MemorySnapshotStore::new())
        }
    };

    let notifier = Notifier::new(config.bucket.name.clone(), config.notify.options()?)?;
    tracing::info!(
        "Notifying {} webhook(s){}",
        config.notify.webhook_urls.len(),
        if notifier.has_chat() { " and chat" } else { "" }
    );

    Ok(Arc::new(PollOrchestrator::new(
        config.bucket.name.clone(),
        config.filter.key_filter(),
        lister,
        store,
        Arc::new(notifier),
    )))
}

#[cfg(feature = "s3")]
async fn build_lister(config: &AppConfig) -> Result<Arc<dyn ObjectLister>> {
    let lister = crate::lister::S3ObjectLister::connect(&config.bucket.lister_config()).await?;
    Ok(Arc::new(lister))
}

#[cfg(not(feature = "s3"))]
async fn build_lister(_config: &AppConfig) -> Result<Arc<dyn ObjectLister>> {
    Err(crate::error::NotifierError::config(
        "built without the `s3` feature; no object lister available",
    ))
}
