use std::sync::Arc;
use std::time::Duration;

use gleam_client::GleamClient;
use tracing::{info, warn};

use crate::blacklist::{load_blacklist, BlobStore};
use crate::config::{BlacklistLocation, IngestConfig};
use crate::error::{IngestError, Result};
use crate::normalize::normalize;
use crate::publisher::QueuePublisher;
use crate::region::classify_region;
use crate::types::{QueueMessage, RegionCode};

/// What a successful run queued.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutcome {
    pub canonical_id: String,
    pub region: RegionCode,
}

/// One source URL in, one queued competition out:
/// blacklist → fetch → extract → normalize → classify → publish.
pub struct Ingestor {
    gleam: GleamClient,
    publisher: Arc<dyn QueuePublisher>,
    blobs: Option<Arc<dyn BlobStore>>,
    source_id: String,
    region_override: Option<RegionCode>,
    blacklist: Option<BlacklistLocation>,
    publish_timeout: Duration,
    blacklist_timeout: Duration,
}

impl Ingestor {
    pub fn new(config: &IngestConfig, gleam: GleamClient, publisher: Arc<dyn QueuePublisher>) -> Self {
        Self {
            gleam,
            publisher,
            blobs: None,
            source_id: config.source_id.clone(),
            region_override: config.region_override,
            blacklist: config.blacklist.clone(),
            publish_timeout: config.publish_timeout,
            blacklist_timeout: config.blacklist_timeout,
        }
    }

    pub fn with_blob_store(mut self, blobs: Arc<dyn BlobStore>) -> Self {
        self.blobs = Some(blobs);
        self
    }

    pub async fn ingest(&self, source_url: &str) -> Result<IngestOutcome> {
        let source_url = source_url.trim();
        info!(source_url, "Received new competition");

        self.check_blacklist(source_url).await?;

        let (page, fragments) = self.gleam.fetch_campaign(source_url).await?;
        if fragments.entrant_count.is_none() {
            warn!(canonical_id = page.canonical_id.as_str(), "No entrant count on page");
        }

        let record = normalize(
            &page.canonical_id,
            &fragments.campaign,
            fragments.entrant_count,
            &self.source_id,
        )?;

        let region = self
            .region_override
            .unwrap_or_else(|| classify_region(fragments.campaign.terms()));

        let message = QueueMessage::post(region, record);
        match tokio::time::timeout(self.publish_timeout, self.publisher.publish(&message)).await {
            Ok(published) => published?,
            Err(_) => {
                return Err(IngestError::Timeout(format!(
                    "queue publish exceeded {:?}",
                    self.publish_timeout
                )))
            }
        }

        info!(
            canonical_id = page.canonical_id.as_str(),
            region_id = region.id(),
            "Competition ingested"
        );

        Ok(IngestOutcome {
            canonical_id: page.canonical_id,
            region,
        })
    }

    async fn check_blacklist(&self, source_url: &str) -> Result<()> {
        let (Some(location), Some(blobs)) = (&self.blacklist, &self.blobs) else {
            return Ok(());
        };

        let load = load_blacklist(blobs.as_ref(), &location.bucket, &location.key);
        let blacklist = match tokio::time::timeout(self.blacklist_timeout, load).await {
            Ok(loaded) => loaded?,
            Err(_) => {
                return Err(IngestError::Timeout(format!(
                    "blacklist fetch exceeded {:?}",
                    self.blacklist_timeout
                )))
            }
        };
        match blacklist.matches(source_url) {
            Some(pattern) => {
                warn!(source_url, pattern, "Source URL is blacklisted");
                Err(IngestError::Blacklisted {
                    pattern: pattern.to_string(),
                })
            }
            None => Ok(()),
        }
    }
}
