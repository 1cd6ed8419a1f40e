//! S3 object lister backed by the AWS SDK.

use super::{KeyFilter, ObjectLister};
use crate::error::{ListingErrorKind, NotifierError, Result};
use crate::model::{Listing, ObjectRecord};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};

/// Connection settings for the S3 lister.
#[derive(Debug, Clone, Default)]
pub struct S3ListerConfig {
    /// Region override; the SDK default chain is used when unset
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible stores
    pub endpoint_url: Option<String>,
    /// Static access key id (paired with `secret_access_key`)
    pub access_key_id: Option<String>,
    /// Static secret access key
    pub secret_access_key: Option<String>,
    /// Role to assume before listing
    pub role_arn: Option<String>,
}

/// Lists bucket objects with `ListObjectsV2`, page by page.
#[derive(Debug, Clone)]
pub struct S3ObjectLister {
    client: Client,
}

fn client_error(msg: impl Into<String>) -> NotifierError {
    NotifierError::listing("S3 client", ListingErrorKind::Client(msg.into()))
}

impl S3ObjectLister {
    /// Wrap an existing SDK client.
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from configuration.
    ///
    /// Static credentials, when both halves are present, replace the SDK
    /// default provider chain. A configured role is then assumed on top of
    /// whichever base credentials were resolved.
    pub async fn connect(config: &S3ListerConfig) -> Result<Self> {
        let defaults = || {
            let loader = aws_config::defaults(BehaviorVersion::latest());
            match &config.region {
                Some(region) => loader.region(Region::new(region.clone())),
                None => loader,
            }
        };

        let mut loader = defaults();
        match (&config.access_key_id, &config.secret_access_key) {
            (Some(key_id), Some(secret)) => {
                let credentials =
                    Credentials::new(key_id, secret, None, None, "bucket-notifier-static");
                loader = loader.credentials_provider(credentials);
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(client_error(
                    "access key id and secret access key must be set together",
                ));
            }
            (None, None) => {}
        }
        let base = loader.load().await;

        let sdk_config = match &config.role_arn {
            Some(role_arn) => {
                tracing::debug!("Assuming role {role_arn} for bucket access");
                let provider = aws_config::sts::AssumeRoleProvider::builder(role_arn)
                    .session_name("bucket-notifier")
                    .configure(&base)
                    .build()
                    .await;
                defaults().credentials_provider(provider).load().await
            }
            None => base,
        };

        let mut s3_config = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint_url {
            s3_config = s3_config.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self::new(Client::from_conf(s3_config.build())))
    }
}

/// Convert an SDK timestamp, falling back to the epoch when out of range.
fn to_chrono(ts: Option<&aws_sdk_s3::primitives::DateTime>) -> DateTime<Utc> {
    ts.and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos()))
        .unwrap_or_default()
}

#[async_trait]
impl ObjectLister for S3ObjectLister {
    async fn list(&self, bucket: &str, filter: &KeyFilter) -> Result<Listing> {
        let mut listing = Listing::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .into_paginator()
            .send();

        let mut page_count = 0usize;
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                NotifierError::listing(
                    format!("bucket '{bucket}'"),
                    ListingErrorKind::Request(DisplayErrorContext(&e).to_string()),
                )
            })?;
            page_count += 1;

            for item in page.contents() {
                let Some(key) = item.key() else {
                    return Err(NotifierError::listing(
                        format!("bucket '{bucket}'"),
                        ListingErrorKind::MissingKey,
                    ));
                };
                if !filter.admits(key) {
                    continue;
                }
                listing.push(ObjectRecord::new(
                    key,
                    item.e_tag().unwrap_or_default(),
                    to_chrono(item.last_modified()),
                ));
            }
        }

        tracing::debug!(
            "Listed {} admitted objects from '{bucket}' across {page_count} page(s)",
            listing.len()
        );
        Ok(listing)
    }

    fn name(&self) -> &'static str {
        "s3"
    }
}
