//! In-memory snapshot store.

use super::SnapshotStore;
use crate::error::{NotifierError, Result, StoreErrorKind};
use crate::model::Snapshot;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Keeps the snapshot in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    current: Mutex<Option<Snapshot>>,
    writes: AtomicUsize,
}

impl MemorySnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing snapshot already stored.
    #[must_use]
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            current: Mutex::new(Some(snapshot)),
            writes: AtomicUsize::new(0),
        }
    }

    /// The stored snapshot, if any.
    #[must_use]
    pub fn current(&self) -> Option<Snapshot> {
        self.lock().clone()
    }

    /// Number of successful `create` and `save` calls.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Snapshot>> {
        self.current
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load_latest(&self) -> Result<Option<Snapshot>> {
        Ok(self.current())
    }

    async fn create(&self, snapshot: &Snapshot) -> Result<()> {
        let mut guard = self.lock();
        if guard.is_some() {
            return Err(NotifierError::store(
                "creating in-memory snapshot",
                StoreErrorKind::AlreadyExists,
            ));
        }
        *guard = Some(snapshot.clone());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let mut guard = self.lock();
        match guard.as_mut() {
            Some(existing) => {
                *existing = snapshot.clone();
                self.writes.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            None => Err(NotifierError::store(
                "saving in-memory snapshot",
                StoreErrorKind::NotFound,
            )),
        }
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
