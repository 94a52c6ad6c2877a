use thiserror::Error;

pub type Result<T> = std::result::Result<T, GleamError>;

#[derive(Debug, Error)]
pub enum GleamError {
    #[error("Network error: {0}")]
    Fetch(String),

    #[error("HTTP error (status {status}) fetching {url}")]
    Http { status: u16, url: String },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl From<reqwest::Error> for GleamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GleamError::Timeout(err.to_string())
        } else {
            GleamError::Fetch(err.to_string())
        }
    }
}
