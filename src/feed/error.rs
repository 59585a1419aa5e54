use thiserror::Error;

/// Reasons a feed fetch produces no document.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("non-200 response: {code}")]
    Status { code: u16 },

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("failed to parse feed: {0}")]
    Parse(String),

    #[error("fetch cancelled")]
    Cancelled,
}
