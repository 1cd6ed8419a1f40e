//! Persisted baseline snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Listing;
use crate::error::Result;

/// The persisted comparison baseline for the next poll.
///
/// `objects` holds the listing exactly as serialized when the snapshot was
/// captured, so a corrupt record is detected at decode time rather than
/// when the store loads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// When the listing was captured
    pub captured_at: DateTime<Utc>,
    /// Content hash of the serialized listing
    pub content_hash: String,
    /// Serialized listing (JSON array of objects)
    pub objects: String,
}

impl Snapshot {
    /// Capture a listing as a new snapshot.
    pub fn capture(listing: &Listing, captured_at: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            captured_at,
            content_hash: listing.content_hash()?,
            objects: listing.to_json()?,
        })
    }

    /// Decode the stored listing.
    ///
    /// Fails with a snapshot deserialization error when the stored bytes are
    /// corrupt; callers must not treat that as an empty baseline.
    pub fn listing(&self) -> Result<Listing> {
        Listing::from_json(&self.objects)
    }

    /// Whether this snapshot was captured from content hashing to `hash`.
    #[must_use]
    pub fn matches_hash(&self, hash: &str) -> bool {
        self.content_hash == hash
    }
}
