//! Shapes of the campaign JSON embedded in gleam.io page markup.
//!
//! Only the fields the ingestor reads are modelled; everything else in the
//! payload is ignored by serde.

use serde::Deserialize;

/// The object passed to `initCampaign(...)` on a campaign page.
#[derive(Debug, Clone, Deserialize)]
pub struct Campaign {
    pub campaign: CampaignInfo,
    #[serde(default)]
    pub incentives: Vec<Incentive>,
    #[serde(default)]
    pub entry_methods: Vec<EntryMethod>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CampaignInfo {
    pub name: String,
    pub site_url: String,
    #[serde(default)]
    pub site_name: String,
    /// Epoch seconds.
    pub starts_at: i64,
    /// Epoch seconds.
    pub ends_at: i64,
    #[serde(default)]
    pub terms_and_conditions: Option<String>,
}

/// A prize descriptor. Image incentives carry `url` and usually `medium_url`;
/// embedded media (video, iframes) carry `src` instead.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Incentive {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub medium_url: Option<String>,
    #[serde(default)]
    pub src: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntryMethod {
    pub entry_type: String,
}

impl Campaign {
    pub fn terms(&self) -> &str {
        self.campaign.terms_and_conditions.as_deref().unwrap_or("")
    }
}
