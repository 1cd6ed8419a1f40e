//! Listing diff engine.
//!
//! Computes the set of created, updated and deleted objects between the
//! stored baseline listing and the freshly observed one.
//!
//! # Example
//!
//! ```
//! use bucket_notifier::diff::DiffEngine;
//! use bucket_notifier::model::{ChangeAction, Listing, ObjectRecord};
//! use chrono::Utc;
//!
//! let now = Utc::now();
//! let previous = Listing::from(vec![ObjectRecord::new("a.json", "etag1", now)]);
//! let current = Listing::from(vec![
//!     ObjectRecord::new("a.json", "etag1", now),
//!     ObjectRecord::new("b.json", "etag2", now),
//! ]);
//!
//! let changes = DiffEngine::new("reports").diff(&previous, &current);
//! assert_eq!(changes.len(), 1);
//! assert_eq!(changes.count(ChangeAction::Created), 1);
//! ```

mod engine;

pub use engine::DiffEngine;
