use chrono::{DateTime, SecondsFormat};
use gleam_client::{Campaign, EntryMethod, Incentive};
use sha2::{Digest, Sha256};

use crate::error::{IngestError, Result};
use crate::types::{CompetitionData, CompetitionRecord, Promoter, Resource};

const FAVICON_SERVICE: &str = "https://www.google.com/s2/favicons?domain=";

/// Map an extracted campaign onto the persistor's competition record.
pub fn normalize(
    canonical_id: &str,
    campaign: &Campaign,
    entrant_count: Option<u64>,
    source_id: &str,
) -> Result<CompetitionRecord> {
    let info = &campaign.campaign;
    let media = select_media(&campaign.incentives)?;

    Ok(CompetitionRecord {
        entrants: entrant_count.map(|n| n.to_string()),
        source_id: source_id.to_string(),
        entry_methods: dedup_entry_methods(&campaign.entry_methods),
        media,
        end_date: epoch_seconds_to_iso(info.ends_at)?,
        data: CompetitionData {
            resource: Resource {
                resource_id: canonical_id.to_string(),
                text: info.name.clone(),
                posted: epoch_seconds_to_iso(info.starts_at)?,
            },
            promoter: Promoter {
                homepage: info.site_url.clone(),
                resource_id: promoter_id(&info.site_url),
                screen_name: info.site_name.clone(),
                name: info.site_name.clone(),
                thumbnail: favicon_url(&info.site_url),
            },
        },
    })
}

/// Hex SHA-256 of the promoter's homepage. Same URL, same id.
pub fn promoter_id(site_url: &str) -> String {
    hex::encode(Sha256::digest(site_url.as_bytes()))
}

pub fn favicon_url(homepage: &str) -> String {
    format!("{FAVICON_SERVICE}{homepage}")
}

/// First incentive exposing an image, preferring the full-size `url` over
/// `medium_url`. Incentives with neither are skipped.
pub fn select_media(incentives: &[Incentive]) -> Result<String> {
    incentives
        .iter()
        .find_map(|incentive| {
            non_empty(incentive.url.as_deref()).or_else(|| non_empty(incentive.medium_url.as_deref()))
        })
        .map(str::to_string)
        .ok_or_else(|| {
            IngestError::InvalidMedia(format!(
                "none of {} incentives has an image url",
                incentives.len()
            ))
        })
}

/// Earlier selection rule: only the first incentive is considered and it is
/// rejected outright when it is embedded media (`src`). Superseded by
/// [`select_media`], which scans past non-image incentives.
#[deprecated(note = "use select_media")]
pub fn legacy_select_media(incentives: &[Incentive]) -> Result<String> {
    match incentives.first() {
        Some(first) if first.src.is_none() => first
            .url
            .clone()
            .ok_or_else(|| IngestError::InvalidMedia("first incentive has no url".to_string())),
        _ => Err(IngestError::InvalidMedia(
            "first incentive is not an image".to_string(),
        )),
    }
}

/// Entry-method tags with duplicates removed, first occurrence kept.
pub fn dedup_entry_methods(methods: &[EntryMethod]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    methods
        .iter()
        .filter(|m| seen.insert(m.entry_type.as_str()))
        .map(|m| m.entry_type.clone())
        .collect()
}

/// Epoch seconds to ISO-8601 UTC with millisecond precision, e.g.
/// `1970-01-01T00:33:20.000Z`.
pub fn epoch_seconds_to_iso(seconds: i64) -> Result<String> {
    DateTime::from_timestamp(seconds, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .ok_or_else(|| IngestError::Extraction(format!("timestamp out of range: {seconds}")))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
