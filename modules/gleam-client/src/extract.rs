use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::error::{GleamError, Result};
use crate::types::Campaign;

/// Entrant counter initializer, e.g. `initEntryCount(42)`.
static ENTRY_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"initEntryCount\((\d+)\)").expect("valid regex"));

/// Campaign initializer. The argument is a JSON literal, usually entity-encoded
/// because it sits inside an `ng-init` attribute.
static CAMPAIGN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"initCampaign\((.*)\)").expect("valid regex"));

/// The two fragments a campaign page embeds in its markup.
#[derive(Debug, Clone)]
pub struct CampaignFragments {
    pub entrant_count: Option<u64>,
    pub campaign: Campaign,
}

/// Pull the entrant count and campaign JSON out of raw campaign markup.
///
/// The entrant count is optional (some campaigns hide it). The campaign
/// fragment is required: a missing or malformed fragment is an extraction error.
pub fn extract_fragments(markup: &str) -> Result<CampaignFragments> {
    let entrant_count = extract_entrant_count(markup);
    let campaign = extract_campaign(markup)?;
    Ok(CampaignFragments {
        entrant_count,
        campaign,
    })
}

pub fn extract_entrant_count(markup: &str) -> Option<u64> {
    let raw = ENTRY_COUNT_RE.captures(markup)?.get(1)?.as_str();
    match raw.parse() {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!(raw, error = %e, "Unparseable entrant count, ignoring");
            None
        }
    }
}

/// The capture runs to the last `)` on the line, which may belong to a later
/// call (`ng-init="initCampaign({..})" ng-click="go()"`). Candidates are tried
/// from the longest down to each earlier `)` until one parses.
pub fn extract_campaign(markup: &str) -> Result<Campaign> {
    let raw = CAMPAIGN_RE
        .captures(markup)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| GleamError::Extraction("initCampaign fragment not found".to_string()))?;

    let ends = std::iter::once(raw.len()).chain(raw.rmatch_indices(')').map(|(i, _)| i));
    let mut first_error = None;
    for end in ends {
        let decoded = html_escape::decode_html_entities(&raw[..end]);
        match serde_json::from_str(&decoded) {
            Ok(campaign) => return Ok(campaign),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    let reason = first_error.map(|e| e.to_string()).unwrap_or_default();
    Err(GleamError::Extraction(format!("invalid campaign JSON: {reason}")))
}

/// Find the first link (`href` or `src`) to a campaign page on `canonical_host`
/// and return its `<group>/<slug>` path.
pub fn find_canonical_link(markup: &str, canonical_host: &str) -> Option<String> {
    let host = regex::escape(canonical_host.trim_end_matches('/'));
    let pattern = format!(r#"(?:href|src)="{host}/(([a-z0-9]+?)/([a-z0-9-]+?))""#);
    let re = RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .ok()?;
    re.captures(markup)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// Turn a request path into a canonical campaign id: query dropped, single
/// leading slash removed.
pub fn canonical_id(path: &str) -> String {
    let without_query = path.split('?').next().unwrap_or_default();
    without_query
        .strip_prefix('/')
        .unwrap_or(without_query)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAMPAIGN_JSON: &str = r#"{"campaign":{"site_url":"https://x.com","site_name":"X","name":"Win a Prize","starts_at":1000,"ends_at":2000,"terms_and_conditions":"Open to Canada residents"}, "incentives":[{"url":"https://img/a.png"}], "entry_methods":[{"entry_type":"twitter"}]}"#;

    fn page(body: &str) -> String {
        format!("<html><body>{body}</body></html>")
    }

    // --- Entrant count ---

    #[test]
    fn entrant_count_is_extracted() {
        let markup = page(r#"<div ng-init="initEntryCount(42)"></div>"#);
        assert_eq!(extract_entrant_count(&markup), Some(42));
    }

    #[test]
    fn missing_entrant_count_is_none() {
        let markup = page(&format!("<div>initCampaign({CAMPAIGN_JSON})</div>"));
        let fragments = extract_fragments(&markup).unwrap();
        assert_eq!(fragments.entrant_count, None);
    }

    #[test]
    fn non_numeric_entrant_count_is_not_matched() {
        let markup = page("initEntryCount(abc)");
        assert_eq!(extract_entrant_count(&markup), None);
    }

    // --- Campaign fragment ---

    #[test]
    fn plain_campaign_json_is_parsed() {
        let markup = page(&format!("<div>initEntryCount(42)</div><div>initCampaign({CAMPAIGN_JSON})</div>"));
        let fragments = extract_fragments(&markup).unwrap();
        assert_eq!(fragments.entrant_count, Some(42));
        assert_eq!(fragments.campaign.campaign.name, "Win a Prize");
        assert_eq!(fragments.campaign.campaign.ends_at, 2000);
        assert_eq!(fragments.campaign.incentives.len(), 1);
        assert_eq!(fragments.campaign.entry_methods[0].entry_type, "twitter");
    }

    #[test]
    fn entity_encoded_campaign_json_is_decoded() {
        let encoded = CAMPAIGN_JSON.replace('"', "&quot;");
        let markup = page(&format!(r#"<div ng-init="initCampaign({encoded})"></div>"#));
        let campaign = extract_campaign(&markup).unwrap();
        assert_eq!(campaign.campaign.site_url, "https://x.com");
        assert_eq!(campaign.terms(), "Open to Canada residents");
    }

    #[test]
    fn missing_campaign_fragment_is_an_extraction_error() {
        let markup = page("initEntryCount(42)");
        let err = extract_fragments(&markup).unwrap_err();
        assert!(matches!(err, GleamError::Extraction(_)));
    }

    #[test]
    fn trailing_call_on_the_same_line_is_not_captured() {
        let markup = page(&format!(
            r#"<div ng-init="initCampaign({CAMPAIGN_JSON})" ng-click="go()">Enter</div>"#
        ));
        let campaign = extract_campaign(&markup).unwrap();
        assert_eq!(campaign.campaign.name, "Win a Prize");
    }

    #[test]
    fn encoded_campaign_followed_by_another_call_is_parsed() {
        let encoded = CAMPAIGN_JSON.replace('"', "&quot;");
        let markup = format!(
            r#"<div ng-init="initCampaign({encoded}); track('view')" ng-click="enter(1)"></div>"#
        );
        let campaign = extract_campaign(&markup).unwrap();
        assert_eq!(campaign.campaign.site_url, "https://x.com");
    }

    #[test]
    fn parentheses_inside_campaign_strings_survive() {
        let markup = r#"<div ng-init="initCampaign({"campaign":{"site_url":"https://x.com","name":"Win (big)","starts_at":1,"ends_at":2,"terms_and_conditions":"See rules (US only)"}})" ng-click="go()"></div>"#;
        let campaign = extract_campaign(markup).unwrap();
        assert_eq!(campaign.campaign.name, "Win (big)");
        assert_eq!(campaign.terms(), "See rules (US only)");
    }

    #[test]
    fn malformed_campaign_json_is_an_extraction_error() {
        let markup = page("initCampaign({not json})");
        let err = extract_campaign(&markup).unwrap_err();
        assert!(matches!(err, GleamError::Extraction(msg) if msg.contains("invalid campaign JSON")));
    }

    #[test]
    fn campaign_without_terms_has_empty_terms() {
        let markup = r#"initCampaign({"campaign":{"site_url":"https://x.com","name":"N","starts_at":1,"ends_at":2}})"#;
        let campaign = extract_campaign(markup).unwrap();
        assert_eq!(campaign.terms(), "");
        assert!(campaign.incentives.is_empty());
        assert!(campaign.entry_methods.is_empty());
    }

    // --- Canonical links ---

    #[test]
    fn canonical_href_is_found() {
        let markup = page(r#"<a href="https://gleam.io/abc/my-slug">Enter</a>"#);
        assert_eq!(
            find_canonical_link(&markup, "https://gleam.io"),
            Some("abc/my-slug".to_string())
        );
    }

    #[test]
    fn canonical_src_is_found() {
        let markup = page(r#"<iframe src="https://gleam.io/X1y2Z/giveaway-2024"></iframe>"#);
        assert_eq!(
            find_canonical_link(&markup, "https://gleam.io/"),
            Some("X1y2Z/giveaway-2024".to_string())
        );
    }

    #[test]
    fn first_canonical_link_wins() {
        let markup = page(
            r#"<a href="https://gleam.io/first/one">1</a><a href="https://gleam.io/second/two">2</a>"#,
        );
        assert_eq!(
            find_canonical_link(&markup, "https://gleam.io"),
            Some("first/one".to_string())
        );
    }

    #[test]
    fn links_to_other_hosts_are_ignored() {
        let markup = page(r#"<a href="https://gleam.io.evil.com/abc/slug">x</a><a href="https://example.com/abc/slug">y</a>"#);
        assert_eq!(find_canonical_link(&markup, "https://gleam.io"), None);
    }

    #[test]
    fn links_with_query_strings_are_not_campaigns() {
        let markup = page(r#"<a href="https://gleam.io/abc/slug?ref=x">x</a>"#);
        assert_eq!(find_canonical_link(&markup, "https://gleam.io"), None);
    }

    // --- Canonical ids ---

    #[test]
    fn canonical_id_strips_leading_slash_and_query() {
        assert_eq!(canonical_id("/abc/my-slug?utm=1&x=2"), "abc/my-slug");
        assert_eq!(canonical_id("abc/my-slug"), "abc/my-slug");
        assert_eq!(canonical_id("//abc"), "/abc");
    }
}
