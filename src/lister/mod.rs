//! Object listing capability.
//!
//! The poll orchestrator only depends on the [`ObjectLister`] trait. The
//! S3 implementation lives behind the `s3` feature; [`StaticLister`] serves
//! a listing held in memory.

mod filter;
#[cfg(feature = "s3")]
mod s3;

pub use filter::KeyFilter;
#[cfg(feature = "s3")]
pub use s3::{S3ListerConfig, S3ObjectLister};

use crate::error::Result;
use crate::model::{Listing, ObjectRecord};
use async_trait::async_trait;
use std::sync::RwLock;

/// Lists the current objects of a bucket.
///
/// Implementations page through the store internally and apply `filter`
/// to each page, so memory use is bounded by the admitted objects rather
/// than the raw bucket size.
#[async_trait]
pub trait ObjectLister: Send + Sync {
    /// List every admitted object in `bucket`.
    async fn list(&self, bucket: &str, filter: &KeyFilter) -> Result<Listing>;

    /// Short name for logs (e.g. "s3").
    fn name(&self) -> &'static str;
}

/// A lister serving objects held in memory.
///
/// Useful for dry runs and tests; the contents can be replaced between
/// polls to simulate bucket changes.
#[derive(Debug, Default)]
pub struct StaticLister {
    objects: RwLock<Vec<ObjectRecord>>,
}

impl StaticLister {
    pub fn new(objects: Vec<ObjectRecord>) -> Self {
        Self {
            objects: RwLock::new(objects),
        }
    }

    /// Replace the served objects.
    pub fn set(&self, objects: Vec<ObjectRecord>) {
        let mut guard = self
            .objects
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = objects;
    }
}

#[async_trait]
impl ObjectLister for StaticLister {
    async fn list(&self, _bucket: &str, filter: &KeyFilter) -> Result<Listing> {
        let guard = self
            .objects
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(guard
            .iter()
            .filter(|object| filter.admits(&object.key))
            .cloned()
            .collect())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
