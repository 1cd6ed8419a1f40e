//! Snapshot persistence capability.
//!
//! Exactly one logical snapshot exists at a time. The orchestrator calls
//! [`SnapshotStore::create`] on the first successful poll and
//! [`SnapshotStore::save`] on every poll after that.

mod file;
mod memory;

pub use file::FileSnapshotStore;
pub use memory::MemorySnapshotStore;

use crate::error::Result;
use crate::model::Snapshot;
use async_trait::async_trait;

/// Durable home of the single baseline snapshot.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the active snapshot, if one has been created.
    async fn load_latest(&self) -> Result<Option<Snapshot>>;

    /// Persist the first snapshot. Fails if one already exists.
    async fn create(&self, snapshot: &Snapshot) -> Result<()>;

    /// Overwrite the existing snapshot. Fails if none exists.
    async fn save(&self, snapshot: &Snapshot) -> Result<()>;

    /// Short name for logs (e.g. "file").
    fn name(&self) -> &'static str;
}
