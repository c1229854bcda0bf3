use thiserror::Error;

/// Structural failures while reading a listing page. These are fatal for the
/// listing they occur on.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("no listing id in url {0}")]
    MissingListingId(String),
    #[error("no correlation token found on page {0}")]
    MissingCorrelationToken(String),
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected http status {0}")]
    HttpStatusCode(u16),
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;
