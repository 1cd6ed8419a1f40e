//! Key inclusion rules applied while listing.

use serde::{Deserialize, Serialize};

/// Decides which object keys take part in change detection.
///
/// A key is eligible when it ends with `suffix`. Eligible keys that contain
/// any `exclude` substring are skipped and logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFilter {
    suffix: String,
    exclude: Vec<String>,
}

impl KeyFilter {
    /// Create a filter from a required suffix and exclusion substrings.
    ///
    /// An empty suffix admits every key.
    pub fn new(suffix: impl Into<String>, exclude: Vec<String>) -> Self {
        Self {
            suffix: suffix.into(),
            exclude: exclude.into_iter().filter(|s| !s.is_empty()).collect(),
        }
    }

    /// A filter that admits every key.
    #[must_use]
    pub fn allow_all() -> Self {
        Self::new("", Vec::new())
    }

    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    #[must_use]
    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Whether a key should be included in the listing.
    #[must_use]
    pub fn admits(&self, key: &str) -> bool {
        if !key.ends_with(&self.suffix) {
            return false;
        }
        match self.exclude.iter().find(|pattern| key.contains(pattern.as_str())) {
            Some(pattern) => {
                tracing::info!("Skipping '{key}': key contains excluded pattern '{pattern}'");
                false
            }
            None => true,
        }
    }
}

impl Default for KeyFilter {
    fn default() -> Self {
        Self::new(".json", vec!["assets".to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        let filter = KeyFilter::default();
        assert!(filter.admits("team/report.json"));
        assert!(!filter.admits("team/report.csv"));
        assert!(!filter.admits("team/assets/logo.json"));
        assert!(!filter.admits("assets.json"));
    }

    #[test]
    fn test_allow_all() {
        let filter = KeyFilter::allow_all();
        assert!(filter.admits("anything"));
        assert!(filter.admits("assets/x.png"));
    }

    #[test]
    fn test_empty_exclusions_are_dropped() {
        let filter = KeyFilter::new(".json", vec![String::new(), "tmp".to_string()]);
        assert_eq!(filter.exclude(), ["tmp".to_string()]);
        assert!(filter.admits("a.json"));
        assert!(!filter.admits("tmp/a.json"));
    }
}
