//! The poll cycle: list, compare, notify, persist.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::state::{OutcomeKind, PollState, PollStatus};
use crate::diff::DiffEngine;
use crate::error::{ErrorContext, Result};
use crate::lister::{KeyFilter, ObjectLister};
use crate::model::{ChangeSet, Snapshot};
use crate::notify::{DeliveryCounters, Notifier, NotifyReport};
use crate::store::SnapshotStore;

/// Result of one successful poll.
#[derive(Debug)]
pub enum PollOutcome {
    /// No snapshot existed; the current listing became the baseline.
    Bootstrapped { objects: usize },
    /// The listing matches the baseline.
    Unchanged,
    /// Changes were found and handed to the notifier.
    ///
    /// Delivery runs on its own task. Awaiting `delivery` is optional;
    /// dropping it does not cancel the notification.
    Changed {
        changes: ChangeSet,
        delivery: JoinHandle<NotifyReport>,
    },
}

impl PollOutcome {
    #[must_use]
    pub const fn kind(&self) -> OutcomeKind {
        match self {
            Self::Bootstrapped { .. } => OutcomeKind::Bootstrapped,
            Self::Unchanged => OutcomeKind::Unchanged,
            Self::Changed { .. } => OutcomeKind::Changed,
        }
    }

    #[must_use]
    pub fn change_count(&self) -> usize {
        match self {
            Self::Changed { changes, .. } => changes.len(),
            _ => 0,
        }
    }

    /// Wait for notification delivery, if this poll started one.
    pub async fn wait_for_delivery(self) -> Option<NotifyReport> {
        match self {
            Self::Changed { delivery, .. } => match delivery.await {
                Ok(report) => Some(report),
                Err(e) => {
                    tracing::warn!("Notification task did not complete: {e}");
                    None
                }
            },
            _ => None,
        }
    }
}

/// Owns the read-modify-write cycle of the baseline snapshot.
///
/// Polls are serialized: a poll requested while another is running waits
/// for it to finish, then runs against the freshly saved baseline.
pub struct PollOrchestrator {
    bucket: String,
    filter: KeyFilter,
    lister: Arc<dyn ObjectLister>,
    store: Arc<dyn SnapshotStore>,
    notifier: Arc<Notifier>,
    differ: DiffEngine,
    lock: Mutex<()>,
    state: PollState,
}

impl std::fmt::Debug for PollOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollOrchestrator")
            .field("bucket", &self.bucket)
            .field("filter", &self.filter)
            .field("lister", &self.lister.name())
            .field("store", &self.store.name())
            .finish_non_exhaustive()
    }
}

impl PollOrchestrator {
    pub fn new(
        bucket: impl Into<String>,
        filter: KeyFilter,
        lister: Arc<dyn ObjectLister>,
        store: Arc<dyn SnapshotStore>,
        notifier: Arc<Notifier>,
    ) -> Self {
        let bucket = bucket.into();
        Self {
            differ: DiffEngine::new(bucket.clone()),
            bucket,
            filter,
            lister,
            store,
            notifier,
            lock: Mutex::new(()),
            state: PollState::new(),
        }
    }

    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    #[must_use]
    pub fn status(&self) -> PollStatus {
        self.state.snapshot()
    }

    #[must_use]
    pub fn delivery_stats(&self) -> DeliveryCounters {
        self.notifier.stats()
    }

    /// Check the store for an existing baseline and reflect it in
    /// [`PollStatus::phase`].
    ///
    /// Store errors are logged and leave the phase unchanged; the next poll
    /// reports them properly.
    pub async fn detect_baseline(&self) {
        match self.store.load_latest().await {
            Ok(Some(snapshot)) => {
                tracing::info!(
                    "Found baseline snapshot of '{}' captured at {}",
                    self.bucket,
                    snapshot.captured_at
                );
                self.state.mark_steady();
            }
            Ok(None) => tracing::info!("No baseline snapshot yet; the first poll creates one"),
            Err(e) => tracing::warn!("Could not check for a baseline snapshot: {}", e.chain()),
        }
    }

    /// Run one poll.
    ///
    /// Listing and store failures abort the poll and leave the baseline
    /// untouched. A stored snapshot that cannot be decoded is an error, never
    /// an empty baseline. Once changes are handed to the notifier the new
    /// baseline is saved regardless of delivery.
    pub async fn execute_poll(&self) -> Result<PollOutcome> {
        let _guard = self.lock.lock().await;

        let result = self.poll_locked().await;
        match &result {
            Ok(outcome) => self
                .state
                .record_success(outcome.kind(), outcome.change_count()),
            Err(e) => {
                let error = e.chain();
                tracing::error!("Poll of bucket '{}' failed: {error}", self.bucket);
                if e.is_snapshot_corruption() {
                    tracing::error!(
                        "The stored baseline cannot be decoded; polls will keep failing until it is repaired or removed"
                    );
                }
                self.state.record_failure(&error);
            }
        }
        result
    }

    async fn poll_locked(&self) -> Result<PollOutcome> {
        let now = Utc::now();
        tracing::debug!("Polling bucket '{}' via {}", self.bucket, self.lister.name());

        let listing = self
            .lister
            .list(&self.bucket, &self.filter)
            .await
            .context("listing objects")?
            .canonicalize();
        let current = Snapshot::capture(&listing, now)?;

        let Some(previous) = self
            .store
            .load_latest()
            .await
            .context("loading snapshot")?
        else {
            self.store
                .create(&current)
                .await
                .context("creating first snapshot")?;
            tracing::info!(
                "Created baseline snapshot of '{}' with {} object(s)",
                self.bucket,
                listing.len()
            );
            return Ok(PollOutcome::Bootstrapped {
                objects: listing.len(),
            });
        };

        let baseline = previous.listing().context("decoding stored snapshot")?;
        if previous.matches_hash(&current.content_hash) {
            tracing::debug!("Listing hash {} matches baseline", current.content_hash);
        }

        let changes = self.differ.diff_at(&baseline, &listing, now);
        let outcome = if changes.is_empty() {
            tracing::info!("No changes detected in '{}'", self.bucket);
            PollOutcome::Unchanged
        } else {
            tracing::info!(
                "Detected {} change(s) in '{}': {} created, {} updated, {} deleted",
                changes.len(),
                self.bucket,
                changes.count(crate::model::ChangeAction::Created),
                changes.count(crate::model::ChangeAction::Updated),
                changes.count(crate::model::ChangeAction::Deleted),
            );
            let notifier = Arc::clone(&self.notifier);
            let to_send = changes.clone();
            let delivery = tokio::spawn(async move { notifier.notify(&to_send).await });
            PollOutcome::Changed { changes, delivery }
        };

        self.store
            .save(&current)
            .await
            .context("saving snapshot")?;
        Ok(outcome)
    }
}
