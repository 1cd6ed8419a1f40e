//! Unified error types for bucket-notifier.
//!
//! Every fallible library operation returns [`NotifierError`]. Variants that
//! originate in a subsystem carry a context string plus a `#[source]` kind, so
//! callers can match on the failure class while logs show the full chain.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for bucket-notifier operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum NotifierError {
    /// Errors while listing objects from the bucket
    #[error("Failed to list objects: {context}")]
    Listing {
        context: String,
        #[source]
        source: ListingErrorKind,
    },

    /// Errors from the snapshot store
    #[error("Snapshot store failed: {context}")]
    Store {
        context: String,
        #[source]
        source: StoreErrorKind,
    },

    /// Errors encoding or decoding a stored snapshot
    #[error("Snapshot is unusable: {context}")]
    Snapshot {
        context: String,
        #[source]
        source: SnapshotErrorKind,
    },

    /// Errors delivering a notification
    #[error("Notification delivery failed: {context}")]
    Delivery {
        context: String,
        #[source]
        source: DeliveryErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Specific listing error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ListingErrorKind {
    #[error("Client setup failed: {0}")]
    Client(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Object without a key in listing page")]
    MissingKey,
}

/// Specific snapshot store error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StoreErrorKind {
    #[error("No snapshot exists to update")]
    NotFound,

    #[error("A snapshot already exists")]
    AlreadyExists,

    #[error("Stored record is unreadable: {0}")]
    Corrupt(String),
}

/// Specific snapshot encoding error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SnapshotErrorKind {
    #[error("Failed to deserialize stored objects: {0}")]
    Deserialization(String),

    #[error("Failed to serialize objects: {0}")]
    Serialization(String),
}

/// Specific delivery error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DeliveryErrorKind {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to encode payload: {0}")]
    Encode(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for bucket-notifier operations
pub type Result<T> = std::result::Result<T, NotifierError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl NotifierError {
    /// Create a listing error with context
    pub fn listing(context: impl Into<String>, source: ListingErrorKind) -> Self {
        Self::Listing {
            context: context.into(),
            source,
        }
    }

    /// Create a store error with context
    pub fn store(context: impl Into<String>, source: StoreErrorKind) -> Self {
        Self::Store {
            context: context.into(),
            source,
        }
    }

    /// Create a snapshot error with context
    pub fn snapshot(context: impl Into<String>, source: SnapshotErrorKind) -> Self {
        Self::Snapshot {
            context: context.into(),
            source,
        }
    }

    /// Create a delivery error with context
    pub fn delivery(context: impl Into<String>, source: DeliveryErrorKind) -> Self {
        Self::Delivery {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Render the error followed by every underlying cause, separated by
    /// `": "`.
    ///
    /// `Display` alone shows only the top-level context; this is the form
    /// used for logs, poll status and HTTP responses.
    #[must_use]
    pub fn chain(&self) -> String {
        let mut rendered = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            let text = cause.to_string();
            // Io already embeds its source in the message.
            if !rendered.ends_with(&text) {
                rendered.push_str(": ");
                rendered.push_str(&text);
            }
            source = std::error::Error::source(cause);
        }
        rendered
    }

    /// Whether this error came from decoding the stored snapshot.
    #[must_use]
    pub const fn is_snapshot_corruption(&self) -> bool {
        matches!(
            self,
            Self::Snapshot {
                source: SnapshotErrorKind::Deserialization(_),
                ..
            }
        )
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for NotifierError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<reqwest::Error> for NotifierError {
    fn from(err: reqwest::Error) -> Self {
        Self::delivery("HTTP client", DeliveryErrorKind::Network(err.to_string()))
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// The new context is prepended to whatever context the error already
/// carries, so a failure deep in the store reads like
/// `"executing poll: loading snapshot: reading /var/lib/..."`.
///
/// # Example
///
/// ```ignore
/// use bucket_notifier::error::ErrorContext;
///
/// let snapshot = store.load_latest().await.context("loading snapshot")?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure (lazy evaluation).
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<NotifierError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: NotifierError, new_ctx: &str) -> NotifierError {
    match err {
        NotifierError::Listing {
            context: existing,
            source,
        } => NotifierError::Listing {
            context: chain_context(new_ctx, &existing),
            source,
        },
        NotifierError::Store {
            context: existing,
            source,
        } => NotifierError::Store {
            context: chain_context(new_ctx, &existing),
            source,
        },
        NotifierError::Snapshot {
            context: existing,
            source,
        } => NotifierError::Snapshot {
            context: chain_context(new_ctx, &existing),
            source,
        },
        NotifierError::Delivery {
            context: existing,
            source,
        } => NotifierError::Delivery {
            context: chain_context(new_ctx, &existing),
            source,
        },
        NotifierError::Io {
            path,
            message,
            source,
        } => NotifierError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        NotifierError::Config(msg) => NotifierError::Config(chain_context(new_ctx, &msg)),
    }
}

/// Chain two context strings together as "`new`: `existing`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NotifierError::store("loading snapshot", StoreErrorKind::NotFound);
        let display = err.to_string();
        assert!(
            display.contains("Snapshot store") && display.contains("loading snapshot"),
            "Error message should mention the store and context: {display}"
        );

        let err = NotifierError::listing(
            "bucket 'reports'",
            ListingErrorKind::Request("access denied".to_string()),
        );
        assert!(err.to_string().contains("bucket 'reports'"));
    }

    #[test]
    fn test_io_error_keeps_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = NotifierError::io("/var/lib/bucket-notifier/snapshot.json", io_err);

        assert!(err
            .to_string()
            .contains("/var/lib/bucket-notifier/snapshot.json"));
    }

    #[test]
    fn test_context_chaining() {
        let initial: Result<()> = Err(NotifierError::snapshot(
            "decoding objects",
            SnapshotErrorKind::Deserialization("expected value".to_string()),
        ));

        match initial.context("executing poll") {
            Err(NotifierError::Snapshot { context, .. }) => {
                assert_eq!(context, "executing poll: decoding objects");
            }
            other => panic!("Expected Snapshot error, got {other:?}"),
        }
    }

    #[test]
    fn test_context_chaining_multiple_levels() {
        fn inner() -> Result<()> {
            Err(NotifierError::store("base", StoreErrorKind::NotFound))
        }

        fn middle() -> Result<()> {
            inner().context("middle layer")
        }

        fn outer() -> Result<()> {
            middle().context("outer layer")
        }

        match outer() {
            Err(NotifierError::Store { context, .. }) => {
                assert_eq!(context, "outer layer: middle layer: base");
            }
            other => panic!("Expected Store error, got {other:?}"),
        }
    }

    #[test]
    fn test_with_context_lazy_evaluation() {
        let mut called = false;

        let ok_result: Result<i32> = Ok(42);
        let _ = ok_result.with_context(|| {
            called = true;
            "should not be called"
        });
        assert!(!called, "Closure should not be called for Ok result");

        let err_result: Result<i32> = Err(NotifierError::config("error"));
        let _ = err_result.with_context(|| {
            called = true;
            "should be called"
        });
        assert!(called, "Closure should be called for Err result");
    }

    #[test]
    fn test_chain_includes_every_cause() {
        let err = NotifierError::listing(
            "bucket 'reports'",
            ListingErrorKind::Request("AccessDenied: not authorized".to_string()),
        );
        assert_eq!(
            err.chain(),
            "Failed to list objects: bucket 'reports': Request failed: AccessDenied: not authorized"
        );

        let config = NotifierError::config("bad interval");
        assert_eq!(config.chain(), config.to_string());
    }

    #[test]
    fn test_chain_does_not_repeat_io_cause() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied");
        let err = NotifierError::io("/data/snapshot.json", io_err);
        assert_eq!(err.chain().matches("permission denied").count(), 1);
    }

    #[test]
    fn test_snapshot_corruption_detection() {
        let corrupt = NotifierError::snapshot(
            "decoding",
            SnapshotErrorKind::Deserialization("eof".to_string()),
        );
        assert!(corrupt.is_snapshot_corruption());

        let encode = NotifierError::snapshot(
            "encoding",
            SnapshotErrorKind::Serialization("bad".to_string()),
        );
        assert!(!encode.is_snapshot_corruption());
    }

    #[test]
    fn test_chain_context_helper() {
        assert_eq!(chain_context("new", ""), "new");
        assert_eq!(chain_context("new", "existing"), "new: existing");
    }
}
