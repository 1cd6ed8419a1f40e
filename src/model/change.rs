//! Detected changes between two listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened to an object between two polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

impl ChangeAction {
    /// Wire name, as sent in webhook payloads.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }

    /// Title-cased name for human-readable messages.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Updated => "Updated",
            Self::Deleted => "Deleted",
        }
    }
}

impl std::fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single object change, derived during one poll and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub key: String,
    pub action: ChangeAction,
    /// Object modification time, or detection time for deletions
    pub time: DateTime<Utc>,
    /// `s3://<bucket>/<key>`
    pub location: String,
}

impl Change {
    /// Build the location URI for a key in a bucket.
    #[must_use]
    pub fn location_for(bucket: &str, key: &str) -> String {
        format!("s3://{bucket}/{key}")
    }

    /// Coarse grouping tag: the first `/`-separated segment of the key.
    #[must_use]
    pub fn group_tag(&self) -> &str {
        group_tag(&self.key)
    }
}

/// First path segment of an object key; the whole key when it has no `/`.
#[must_use]
pub fn group_tag(key: &str) -> &str {
    key.split('/').next().unwrap_or_default()
}

/// The changes detected by one poll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            changes: Vec::new(),
        }
    }

    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.changes.iter()
    }

    /// Number of changes with the given action.
    #[must_use]
    pub fn count(&self, action: ChangeAction) -> usize {
        self.changes.iter().filter(|c| c.action == action).count()
    }

    /// Find the change recorded for a key, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Change> {
        self.changes.iter().find(|c| c.key == key)
    }

    /// The change set viewed as an order-free set of `(key, action)` pairs.
    #[must_use]
    pub fn keyed(&self) -> std::collections::BTreeSet<(String, ChangeAction)> {
        self.changes
            .iter()
            .map(|c| (c.key.clone(), c.action))
            .collect()
    }
}

impl From<Vec<Change>> for ChangeSet {
    fn from(changes: Vec<Change>) -> Self {
        Self { changes }
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_tag() {
        assert_eq!(group_tag("finance/2024/q1.json"), "finance");
        assert_eq!(group_tag("top-level.json"), "top-level.json");
        assert_eq!(group_tag("/leading.json"), "");
        assert_eq!(group_tag(""), "");
    }

    #[test]
    fn test_action_names() {
        assert_eq!(ChangeAction::Created.to_string(), "created");
        assert_eq!(ChangeAction::Deleted.title(), "Deleted");
        assert_eq!(
            serde_json::to_string(&ChangeAction::Updated).unwrap(),
            "\"updated\""
        );
    }

    #[test]
    fn test_location_for() {
        assert_eq!(
            Change::location_for("reports", "a/b.json"),
            "s3://reports/a/b.json"
        );
    }

    #[test]
    fn test_change_set_counts() {
        let now = Utc::now();
        let set = ChangeSet::from(vec![
            Change {
                key: "a.json".into(),
                action: ChangeAction::Created,
                time: now,
                location: "s3://b/a.json".into(),
            },
            Change {
                key: "b.json".into(),
                action: ChangeAction::Deleted,
                time: now,
                location: "s3://b/b.json".into(),
            },
        ]);
        assert_eq!(set.count(ChangeAction::Created), 1);
        assert_eq!(set.count(ChangeAction::Updated), 0);
        assert_eq!(set.get("b.json").map(|c| c.action), Some(ChangeAction::Deleted));
        assert!(set.keyed().contains(&("a.json".to_string(), ChangeAction::Created)));
    }
}
