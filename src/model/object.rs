//! Bucket objects and listings.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::error::{NotifierError, Result, SnapshotErrorKind};

/// One object as observed in a bucket listing.
///
/// The serialized field names are part of the stored snapshot format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Object key, unique within a listing
    pub key: String,
    /// Opaque change-detection token (the object's ETag)
    #[serde(rename = "etag")]
    pub content_tag: String,
    /// Last modification time reported by the store
    pub last_modified: DateTime<Utc>,
}

impl ObjectRecord {
    /// Create a new object record.
    pub fn new(
        key: impl Into<String>,
        content_tag: impl Into<String>,
        last_modified: DateTime<Utc>,
    ) -> Self {
        Self {
            key: key.into(),
            content_tag: content_tag.into(),
            last_modified,
        }
    }

    /// Whether `other` describes different content for the same key.
    ///
    /// Either a different content tag or a different modification time
    /// counts as a change.
    #[must_use]
    pub fn differs_from(&self, other: &Self) -> bool {
        self.content_tag != other.content_tag || self.last_modified != other.last_modified
    }
}

/// The full set of relevant objects observed at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Listing {
    objects: Vec<ObjectRecord>,
}

impl Listing {
    /// Create an empty listing.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    /// Append an object as observed.
    pub fn push(&mut self, object: ObjectRecord) {
        self.objects.push(object);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ObjectRecord> {
        self.objects.iter()
    }

    /// Index the listing by key.
    ///
    /// Later duplicates overwrite earlier ones but keep the position of the
    /// first occurrence.
    #[must_use]
    pub fn index(&self) -> IndexMap<&str, &ObjectRecord> {
        let mut map = IndexMap::with_capacity(self.objects.len());
        for object in &self.objects {
            map.insert(object.key.as_str(), object);
        }
        map
    }

    /// Canonical form: keys de-duplicated (last write wins) and sorted.
    ///
    /// Two listings with the same members canonicalize to the same value
    /// regardless of the order the store returned them in.
    #[must_use]
    pub fn canonicalize(self) -> Self {
        let mut by_key: IndexMap<String, ObjectRecord> =
            IndexMap::with_capacity(self.objects.len());
        for object in self.objects {
            by_key.insert(object.key.clone(), object);
        }
        by_key.sort_keys();
        Self {
            objects: by_key.into_values().collect(),
        }
    }

    /// Serialize to the JSON array stored in snapshots.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.objects).map_err(|e| {
            NotifierError::snapshot(
                "encoding listing",
                SnapshotErrorKind::Serialization(e.to_string()),
            )
        })
    }

    /// Decode a listing previously written by [`Listing::to_json`].
    pub fn from_json(data: &str) -> Result<Self> {
        let objects: Vec<ObjectRecord> = serde_json::from_str(data).map_err(|e| {
            NotifierError::snapshot(
                "decoding stored listing",
                SnapshotErrorKind::Deserialization(e.to_string()),
            )
        })?;
        Ok(Self { objects })
    }

    /// Content hash over the serialized listing, as 16 lowercase hex digits.
    ///
    /// The hash is over the listing as-is; callers canonicalize first when
    /// order independence matters.
    pub fn content_hash(&self) -> Result<String> {
        let data = self.to_json()?;
        Ok(format!("{:016x}", xxh3_64(data.as_bytes())))
    }
}

impl From<Vec<ObjectRecord>> for Listing {
    fn from(objects: Vec<ObjectRecord>) -> Self {
        Self { objects }
    }
}

impl FromIterator<ObjectRecord> for Listing {
    fn from_iter<I: IntoIterator<Item = ObjectRecord>>(iter: I) -> Self {
        Self {
            objects: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Listing {
    type Item = ObjectRecord;
    type IntoIter = std::vec::IntoIter<ObjectRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.into_iter()
    }
}

impl<'a> IntoIterator for &'a Listing {
    type Item = &'a ObjectRecord;
    type IntoIter = std::slice::Iter<'a, ObjectRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}
