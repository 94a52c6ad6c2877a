use serde::{Deserialize, Serialize};

/// Normalized competition, the payload the persistence service consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionRecord {
    /// Decimal entrant count; null when the page hides it.
    pub entrants: Option<String>,
    pub source_id: String,
    pub entry_methods: Vec<String>,
    pub media: String,
    /// ISO-8601, millisecond precision, UTC.
    pub end_date: String,
    pub data: CompetitionData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionData {
    pub resource: Resource,
    pub promoter: Promoter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Canonical `<group>/<slug>` campaign id.
    pub resource_id: String,
    pub text: String,
    /// ISO-8601, millisecond precision, UTC.
    pub posted: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promoter {
    pub homepage: String,
    /// Hex SHA-256 of `homepage`.
    pub resource_id: String,
    pub screen_name: String,
    pub name: String,
    pub thumbnail: String,
}

/// Eligible geography of a campaign. Discriminants are the wire ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionCode {
    Global = 1,
    UnitedStates = 2,
    Australia = 3,
    Canada = 4,
}

impl RegionCode {
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(RegionCode::Global),
            2 => Some(RegionCode::UnitedStates),
            3 => Some(RegionCode::Australia),
            4 => Some(RegionCode::Canada),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueMethod {
    #[serde(rename = "POST")]
    Post,
}

/// Envelope sent to the persistor queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueMessage {
    pub region_id: u8,
    pub competitions: Vec<CompetitionRecord>,
    pub method: QueueMethod,
}

impl QueueMessage {
    pub fn post(region: RegionCode, competition: CompetitionRecord) -> Self {
        Self {
            region_id: region.id(),
            competitions: vec![competition],
            method: QueueMethod::Post,
        }
    }
}
