//! File-backed snapshot store.

use super::SnapshotStore;
use crate::error::{NotifierError, Result, StoreErrorKind};
use crate::model::Snapshot;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// On-disk record wrapping the snapshot with bookkeeping timestamps.
#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(flatten)]
    snapshot: Snapshot,
}

/// Stores the snapshot as a single JSON document.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// record, so a crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Create a store at `path`, creating the parent directory if needed.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| NotifierError::io(parent, e))?;
            }
        }
        Ok(Self { path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_record(&self) -> Result<Option<StoredRecord>> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(NotifierError::io(&self.path, e)),
        };
        let record = serde_json::from_str(&data).map_err(|e| {
            NotifierError::store(
                format!("reading {}", self.path.display()),
                StoreErrorKind::Corrupt(e.to_string()),
            )
        })?;
        Ok(Some(record))
    }

    async fn write_record(&self, record: &StoredRecord) -> Result<()> {
        let data = serde_json::to_vec_pretty(record).map_err(|e| {
            NotifierError::store("encoding record", StoreErrorKind::Corrupt(e.to_string()))
        })?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, data)
            .await
            .map_err(|e| NotifierError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| NotifierError::io(&self.path, e))?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load_latest(&self) -> Result<Option<Snapshot>> {
        Ok(self.read_record().await?.map(|record| record.snapshot))
    }

    async fn create(&self, snapshot: &Snapshot) -> Result<()> {
        if tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| NotifierError::io(&self.path, e))?
        {
            return Err(NotifierError::store(
                format!("creating {}", self.path.display()),
                StoreErrorKind::AlreadyExists,
            ));
        }
        let now = Utc::now();
        self.write_record(&StoredRecord {
            created_at: now,
            updated_at: now,
            snapshot: snapshot.clone(),
        })
        .await
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let existing = self.read_record().await?.ok_or_else(|| {
            NotifierError::store(
                format!("saving {}", self.path.display()),
                StoreErrorKind::NotFound,
            )
        })?;
        self.write_record(&StoredRecord {
            created_at: existing.created_at,
            updated_at: Utc::now(),
            snapshot: snapshot.clone(),
        })
        .await
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
