pub mod error;
pub mod extract;
pub mod types;

pub use error::{GleamError, Result};
pub use extract::{canonical_id, extract_fragments, find_canonical_link, CampaignFragments};
pub use types::{Campaign, CampaignInfo, EntryMethod, Incentive};

use std::time::Duration;

use tracing::{debug, info};
use url::Url;

pub const CANONICAL_HOST: &str = "https://gleam.io";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Markup of a canonical campaign page plus the id it is known by.
#[derive(Debug, Clone)]
pub struct CampaignPage {
    /// `<group>/<slug>` path on the canonical host.
    pub canonical_id: String,
    pub markup: String,
}

pub struct GleamClient {
    client: reqwest::Client,
    canonical_host: Url,
}

impl GleamClient {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            canonical_host: parse_url(CANONICAL_HOST)?,
        })
    }

    /// Point the client at a different canonical host (local fakes in tests).
    pub fn with_canonical_host(mut self, host: &str) -> Result<Self> {
        self.canonical_host = parse_url(host)?;
        Ok(self)
    }

    fn host_prefix(&self) -> &str {
        self.canonical_host.as_str().trim_end_matches('/')
    }

    /// Fetch `source_url`, following redirects. When the final page is not on
    /// the canonical host it is treated as an intermediate page: the first
    /// embedded campaign link is followed instead.
    pub async fn resolve_and_fetch(&self, source_url: &str) -> Result<CampaignPage> {
        let source = parse_url(source_url.trim())?;
        let (final_url, markup) = self.get(source.as_str()).await?;

        if final_url.origin() == self.canonical_host.origin() {
            let canonical_id = canonical_id(final_url.path());
            info!(source_url, canonical_id = canonical_id.as_str(), "Source resolved to campaign page");
            return Ok(CampaignPage {
                canonical_id,
                markup,
            });
        }

        debug!(
            source_url,
            resolved = %final_url,
            "Intermediate page, searching for campaign link"
        );

        let path = find_canonical_link(&markup, self.host_prefix()).ok_or_else(|| {
            GleamError::Extraction(format!(
                "no {} campaign link found on {}",
                self.host_prefix(),
                final_url
            ))
        })?;

        let campaign_url = format!("{}/{}", self.host_prefix(), path);
        let (_, markup) = self.get(&campaign_url).await?;
        let canonical_id = canonical_id(&path);

        info!(source_url, canonical_id = canonical_id.as_str(), "Campaign link followed from intermediate page");

        Ok(CampaignPage {
            canonical_id,
            markup,
        })
    }

    /// Resolve, fetch and extract both embedded fragments.
    pub async fn fetch_campaign(&self, source_url: &str) -> Result<(CampaignPage, CampaignFragments)> {
        let page = self.resolve_and_fetch(source_url).await?;
        let fragments = extract_fragments(&page.markup)?;
        Ok((page, fragments))
    }

    async fn get(&self, url: &str) -> Result<(Url, String)> {
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        let final_url = resp.url().clone();
        if !status.is_success() {
            return Err(GleamError::Http {
                status: status.as_u16(),
                url: final_url.to_string(),
            });
        }

        let markup = resp.text().await?;
        debug!(url = %final_url, bytes = markup.len(), "Fetched page");
        Ok((final_url, markup))
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| GleamError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(GleamError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }
    Ok(url)
}
