//! Core data model: observed objects, listings, snapshots and changes.

mod change;
mod object;
mod snapshot;

pub use change::{group_tag, Change, ChangeAction, ChangeSet};
pub use object::{Listing, ObjectRecord};
pub use snapshot::Snapshot;
