//! Promoter blacklist loaded from a JSON blob:
//! `{ "promoters": { "gleam": ["pattern", ...] } }`.
//!
//! Patterns are regexes matched case-insensitively against the source URL.
//! The list is fetched, compiled and used once per ingestion run.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use tracing::info;

use crate::error::{IngestError, Result};

/// Read-only blob access, keyed by bucket and key.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
}

pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
}

impl S3BlobStore {
    pub fn from_sdk_config(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(config),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| IngestError::Blacklist(DisplayErrorContext(&e).to_string()))?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| IngestError::Blacklist(format!("read s3://{bucket}/{key}: {e}")))?;

        Ok(bytes.into_bytes().to_vec())
    }
}

/// In-memory blobs, keyed by `bucket/key`.
#[derive(Default)]
pub struct StaticBlobStore {
    objects: HashMap<String, Vec<u8>>,
}

impl StaticBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, bucket: &str, key: &str, body: impl Into<Vec<u8>>) -> Self {
        self.objects.insert(format!("{bucket}/{key}"), body.into());
        self
    }
}

#[async_trait]
impl BlobStore for StaticBlobStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.objects
            .get(&format!("{bucket}/{key}"))
            .cloned()
            .ok_or_else(|| IngestError::Blacklist(format!("no such object: {bucket}/{key}")))
    }
}

#[derive(Debug, Deserialize)]
struct BlacklistDocument {
    promoters: PromoterPatterns,
}

#[derive(Debug, Deserialize)]
struct PromoterPatterns {
    #[serde(default)]
    gleam: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Blacklist {
    patterns: Vec<Regex>,
}

impl Blacklist {
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                RegexBuilder::new(p.as_ref())
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| IngestError::Blacklist(format!("bad pattern {:?}: {e}", p.as_ref())))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let doc: BlacklistDocument = serde_json::from_slice(bytes)
            .map_err(|e| IngestError::Blacklist(format!("invalid blacklist JSON: {e}")))?;
        Self::from_patterns(&doc.promoters.gleam)
    }

    /// The first pattern matching `url`, if any.
    pub fn matches(&self, url: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|re| re.is_match(url))
            .map(|re| re.as_str())
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

pub async fn load_blacklist(store: &dyn BlobStore, bucket: &str, key: &str) -> Result<Blacklist> {
    let bytes = store.get_object(bucket, key).await?;
    let blacklist = Blacklist::from_json(&bytes)?;
    info!(bucket, key, patterns = blacklist.len(), "Blacklist loaded");
    Ok(blacklist)
}
