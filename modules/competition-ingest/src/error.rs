//! Typed errors for a single ingestion run. Every variant is terminal for
//! the run; nothing is retried in-process.

use gleam_client::GleamError;
use thiserror::Error;

/// Result type alias for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Debug, Error)]
pub enum IngestError {
    /// Network or HTTP failure on any GET
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Required fragment absent or malformed
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// No incentive carries a displayable image
    #[error("Resource not in a valid format: {0}")]
    InvalidMedia(String),

    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    /// Blacklist blob could not be fetched or compiled
    #[error("Blacklist unavailable: {0}")]
    Blacklist(String),

    #[error("Source URL matches blacklisted pattern {pattern}")]
    Blacklisted { pattern: String },
}

impl IngestError {
    /// Stable kind tag for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::Fetch(_) => "fetch",
            IngestError::Extraction(_) => "extraction",
            IngestError::InvalidMedia(_) => "invalid_media",
            IngestError::Publish(_) => "publish",
            IngestError::Timeout(_) => "timeout",
            IngestError::Blacklist(_) => "blacklist",
            IngestError::Blacklisted { .. } => "blacklisted",
        }
    }
}

impl From<GleamError> for IngestError {
    fn from(err: GleamError) -> Self {
        match err {
            GleamError::Timeout(msg) => IngestError::Timeout(msg),
            GleamError::Extraction(msg) => IngestError::Extraction(msg),
            other @ (GleamError::Fetch(_) | GleamError::Http { .. } | GleamError::InvalidUrl { .. }) => {
                IngestError::Fetch(other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gleam_errors_map_to_ingest_kinds() {
        let cases = [
            (GleamError::Timeout("30s".into()), "timeout"),
            (GleamError::Extraction("nope".into()), "extraction"),
            (GleamError::Fetch("refused".into()), "fetch"),
            (
                GleamError::Http {
                    status: 500,
                    url: "https://gleam.io/a/b".into(),
                },
                "fetch",
            ),
        ];
        for (err, kind) in cases {
            assert_eq!(IngestError::from(err).kind(), kind);
        }
    }

    #[test]
    fn http_status_survives_in_message() {
        let err: IngestError = GleamError::Http {
            status: 503,
            url: "https://gleam.io/a/b".into(),
        }
        .into();
        assert!(err.to_string().contains("503"));
    }
}
