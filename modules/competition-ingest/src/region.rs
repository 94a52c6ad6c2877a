//! Region classification from free-text terms and conditions.
//!
//! Rules are evaluated top to bottom and the first rule with any matching
//! pattern wins. The rules overlap ("North America" hits the US rule, a
//! Canadian page often mentions the USA too), so their order is fixed.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::RegionCode;

struct RegionRule {
    patterns: Vec<Regex>,
    code: RegionCode,
}

fn rule(patterns: &[&str], code: RegionCode) -> RegionRule {
    RegionRule {
        patterns: patterns
            .iter()
            .map(|p| Regex::new(p).expect("valid regex"))
            .collect(),
        code,
    }
}

// Two-letter abbreviations stay case-sensitive and whitespace-delimited so
// ordinary words ("can", "us") never trigger them.
static RULES: LazyLock<Vec<RegionRule>> = LazyLock::new(|| {
    vec![
        rule(&[r"(?i)canada", r"\sCA\s"], RegionCode::Canada),
        rule(&[r"(?i)\saus\s|australia"], RegionCode::Australia),
        rule(
            &[r"(?i)united\sstates|\susa\s|america", r"\s(US|U\.S\.)\s"],
            RegionCode::UnitedStates,
        ),
    ]
});

/// Total: text that matches no rule (including empty text) is `Global`.
pub fn classify_region(terms: &str) -> RegionCode {
    RULES
        .iter()
        .find(|rule| rule.patterns.iter().any(|re| re.is_match(terms)))
        .map(|rule| rule.code)
        .unwrap_or(RegionCode::Global)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_global() {
        assert_eq!(classify_region(""), RegionCode::Global);
    }

    #[test]
    fn unrelated_text_is_global() {
        assert_eq!(
            classify_region("Open worldwide to anyone over 18."),
            RegionCode::Global
        );
    }

    #[test]
    fn canada_is_detected_case_insensitively() {
        assert_eq!(classify_region("Open to CANADA residents"), RegionCode::Canada);
        assert_eq!(classify_region("Open to Canada residents"), RegionCode::Canada);
    }

    #[test]
    fn canada_wins_over_usa_by_position() {
        assert_eq!(
            classify_region("Open to residents of the usa and canada only"),
            RegionCode::Canada
        );
    }

    #[test]
    fn australia_wins_over_usa() {
        assert_eq!(
            classify_region("Residents of Australia and the United States"),
            RegionCode::Australia
        );
    }

    #[test]
    fn aus_abbreviation_needs_whitespace() {
        assert_eq!(classify_region("Open to AUS residents"), RegionCode::Australia);
        assert_eq!(classify_region("Terms: sausages"), RegionCode::Global);
    }

    #[test]
    fn united_states_markers() {
        assert_eq!(classify_region("legal residents of the United States"), RegionCode::UnitedStates);
        assert_eq!(classify_region("Open in the usa only"), RegionCode::UnitedStates);
        assert_eq!(classify_region("North America"), RegionCode::UnitedStates);
        assert_eq!(classify_region("Open to US residents"), RegionCode::UnitedStates);
        assert_eq!(classify_region("Open to U.S. residents"), RegionCode::UnitedStates);
    }

    #[test]
    fn abbreviations_are_case_sensitive() {
        assert_eq!(classify_region("tell us more"), RegionCode::Global);
        assert_eq!(classify_region("you ca n't"), RegionCode::Global);
        assert_eq!(classify_region("Open to CA residents"), RegionCode::Canada);
    }
}
