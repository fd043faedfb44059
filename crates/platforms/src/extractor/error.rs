use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("streamer not found")]
    StreamerNotFound,
}

impl ExtractorError {
    /// The URL does not identify a room; retrying cannot help.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::InvalidUrl(_) | Self::StreamerNotFound)
    }
}
