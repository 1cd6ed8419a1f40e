//! **Change detection and notification for object-storage buckets.**
//!
//! `bucket-notifier` periodically lists a bucket, compares the listing with
//! the last persisted snapshot, and tells webhook and chat endpoints which
//! objects were created, updated, or deleted.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: [`ObjectRecord`], [`Listing`], [`Snapshot`] and the
//!   derived [`Change`] / [`ChangeSet`].
//! - **[`diff`]**: the pure [`DiffEngine`] comparing two listings.
//! - **[`lister`]**: the [`ObjectLister`] capability and its S3
//!   implementation (feature `s3`).
//! - **[`store`]**: the [`SnapshotStore`] capability with file and memory
//!   backends.
//! - **[`notify`]**: the best-effort [`Notifier`] fanning changes out to
//!   generic webhooks and a chat endpoint.
//! - **[`poll`]**: the [`PollOrchestrator`] owning the snapshot
//!   read-modify-write, and the interval scheduler.
//! - **[`server`]**: the HTTP trigger surface (`/health`, `/check`,
//!   `/status`).
//! - **[`config`]**: layered configuration (YAML file, environment, CLI).
//!
//! ## Diffing Two Listings
//!
//! ```
//! use bucket_notifier::{ChangeAction, DiffEngine, Listing, ObjectRecord};
//! use chrono::Utc;
//!
//! let now = Utc::now();
//! let previous = Listing::from(vec![ObjectRecord::new("team/a.json", "v1", now)]);
//! let current = Listing::from(vec![
//!     ObjectRecord::new("team/a.json", "v1", now),
//!     ObjectRecord::new("team/b.json", "v1", now),
//! ]);
//!
//! let changes = DiffEngine::new("reports").diff(&previous, &current);
//! assert_eq!(changes.len(), 1);
//! assert_eq!(changes.count(ChangeAction::Created), 1);
//! ```
//!
//! ## Running One Poll
//!
//! ```no_run
//! use std::sync::Arc;
//! use bucket_notifier::{
//!     KeyFilter, MemorySnapshotStore, Notifier, NotifyOptions, PollOrchestrator, StaticLister,
//! };
//!
//! # async fn run() -> bucket_notifier::Result<()> {
//! let notifier = Notifier::new(
//!     "reports",
//!     NotifyOptions {
//!         webhook_urls: vec!["https://hooks.example.com/bucket".into()],
//!         ..Default::default()
//!     },
//! )?;
//! let orchestrator = PollOrchestrator::new(
//!     "reports",
//!     KeyFilter::default(),
//!     Arc::new(StaticLister::default()),
//!     Arc::new(MemorySnapshotStore::new()),
//!     Arc::new(notifier),
//! );
//!
//! let outcome = orchestrator.execute_poll().await?;
//! println!("{}: {} change(s)", outcome.kind(), outcome.change_count());
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `s3` (default): the AWS SDK based [`lister::S3ObjectLister`].

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod lister;
pub mod model;
pub mod notify;
pub mod poll;
pub mod server;
pub mod store;

// Re-export main types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigError, Validatable};
pub use diff::DiffEngine;
pub use error::{ErrorContext, NotifierError, Result};
pub use lister::{KeyFilter, ObjectLister, StaticLister};
pub use model::{Change, ChangeAction, ChangeSet, Listing, ObjectRecord, Snapshot};
pub use notify::{Notifier, NotifyOptions, NotifyReport};
pub use poll::{PollOrchestrator, PollOutcome, PollStatus};
pub use store::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore};
