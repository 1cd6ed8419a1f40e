//! Listing diff engine implementation.

use chrono::{DateTime, Utc};

use crate::model::{Change, ChangeAction, ChangeSet, Listing};

/// Compares two listings of the same bucket.
///
/// The engine is pure: given the same inputs and the same `now` it always
/// produces the same change set.
#[derive(Debug, Clone)]
pub struct DiffEngine {
    bucket: String,
}

impl DiffEngine {
    /// Create a diff engine for a bucket; the name is used for location URIs.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }

    /// Bucket this engine builds locations for.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Diff two listings, stamping deletions with the current time.
    #[must_use]
    pub fn diff(&self, previous: &Listing, current: &Listing) -> ChangeSet {
        self.diff_at(previous, current, Utc::now())
    }

    /// Diff two listings, stamping deletions with `now`.
    ///
    /// Deletions and updates come first, in `previous` order, followed by
    /// creations in `current` order. Callers should not rely on the order.
    #[must_use]
    pub fn diff_at(&self, previous: &Listing, current: &Listing, now: DateTime<Utc>) -> ChangeSet {
        let prev = previous.index();
        let curr = current.index();
        let mut changes = ChangeSet::new();

        for (key, old) in &prev {
            match curr.get(key) {
                None => changes.push(self.change(key, ChangeAction::Deleted, now)),
                Some(new) if old.differs_from(new) => {
                    changes.push(self.change(key, ChangeAction::Updated, new.last_modified));
                }
                Some(_) => {}
            }
        }

        for (key, new) in &curr {
            if !prev.contains_key(key) {
                changes.push(self.change(key, ChangeAction::Created, new.last_modified));
            }
        }

        changes
    }

    fn change(&self, key: &str, action: ChangeAction, time: DateTime<Utc>) -> Change {
        Change {
            key: key.to_string(),
            action,
            time,
            location: Change::location_for(&self.bucket, key),
        }
    }
}
