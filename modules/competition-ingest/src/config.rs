use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;

use crate::types::RegionCode;

const DEFAULT_AWS_REGION: &str = "eu-west-1";

/// Where the blacklist blob lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlacklistLocation {
    pub bucket: String,
    pub key: String,
}

/// Ingestor configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Stamped onto every record as `source_id`.
    pub source_id: String,
    pub persistor_queue_url: String,

    /// Fixed region; when set the classifier is skipped.
    pub region_override: Option<RegionCode>,
    pub blacklist: Option<BlacklistLocation>,

    pub fetch_timeout: Duration,
    pub publish_timeout: Duration,
    pub blacklist_timeout: Duration,

    // HTTP server
    pub host: String,
    pub port: u16,
}

impl IngestConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let region_override = match env::var("REGION_ID").ok().filter(|v| !v.trim().is_empty()) {
            Some(raw) => Some(parse_region(&raw)?),
            None => None,
        };

        let blacklist = match (env::var("BLACKLIST_BUCKET"), env::var("BLACKLIST_KEY")) {
            (Ok(bucket), Ok(key)) if !bucket.is_empty() && !key.is_empty() => {
                Some(BlacklistLocation { bucket, key })
            }
            _ => None,
        };

        let config = Self {
            source_id: env::var("SOURCE_ID").context("SOURCE_ID environment variable is required")?,
            persistor_queue_url: env::var("PERSISTOR_QUEUE_URL")
                .context("PERSISTOR_QUEUE_URL environment variable is required")?,
            region_override,
            blacklist,
            fetch_timeout: Duration::from_secs(env_or("FETCH_TIMEOUT_SECS", 30)?),
            publish_timeout: Duration::from_secs(env_or("PUBLISH_TIMEOUT_SECS", 10)?),
            blacklist_timeout: Duration::from_secs(env_or("BLACKLIST_TIMEOUT_SECS", 10)?),
            host: env::var("INGEST_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_or("INGEST_PORT", 3000)?,
        };

        config.log_summary();
        Ok(config)
    }

    fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  SOURCE_ID: {}", self.source_id);
        tracing::info!("  PERSISTOR_QUEUE_URL: {}", self.persistor_queue_url);
        match self.region_override {
            Some(region) => tracing::info!("  REGION_ID: {} (classifier disabled)", region.id()),
            None => tracing::info!("  REGION_ID: <not set>"),
        }
        match &self.blacklist {
            Some(loc) => tracing::info!("  BLACKLIST: s3://{}/{}", loc.bucket, loc.key),
            None => tracing::info!("  BLACKLIST: <not set>"),
        }
    }
}

/// Parse a `REGION_ID` value into a known region code.
pub fn parse_region(raw: &str) -> Result<RegionCode> {
    let id: u8 = raw
        .trim()
        .parse()
        .with_context(|| format!("REGION_ID must be a number, got {raw:?}"))?;
    RegionCode::from_id(id).with_context(|| format!("REGION_ID {id} is not a known region"))
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got {raw:?}")),
        Err(_) => Ok(default),
    }
}

/// Shared AWS configuration for the queue and blob clients.
pub async fn aws_sdk_config() -> aws_config::SdkConfig {
    let region_provider = RegionProviderChain::default_provider().or_else(DEFAULT_AWS_REGION);
    aws_config::defaults(BehaviorVersion::latest())
        .region(region_provider)
        .load()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_ids_parse() {
        assert_eq!(parse_region("4").unwrap(), RegionCode::Canada);
        assert_eq!(parse_region(" 1 ").unwrap(), RegionCode::Global);
    }

    #[test]
    fn unknown_region_is_rejected() {
        assert!(parse_region("9").is_err());
        assert!(parse_region("canada").is_err());
    }
}
