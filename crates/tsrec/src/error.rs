use std::path::PathBuf;

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("capture cancelled")]
    Cancelled,

    #[error("room not found for `{url}`")]
    RoomNotFound { url: String },

    #[error("live status resolution failed for `{url}`: {reason}")]
    Resolve { url: String, reason: String },

    #[error("manifest `{url}` unavailable: {reason}")]
    ManifestUnavailable { url: String, reason: String },

    #[error("failed to fetch segment `{segment}`: {source}")]
    SegmentFetchFailed {
        segment: String,
        #[source]
        source: Box<CaptureError>,
    },

    #[error("failed to write segment to {}: {source}", .path.display())]
    SegmentWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read segment {} for merge: {source}", .path.display())]
    MergeReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to append segment {} to output: {source}", .path.display())]
    MergeWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create output file {}: {source}", .path.display())]
    OutputCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to prepare session directory {}: {source}", .path.display())]
    SessionDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("resource not found: {url}")]
    NotFound { url: String },

    #[error("HTTP request failed: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    #[error("request failed with HTTP {status} for {url}")]
    HttpStatus { status: StatusCode, url: String },

    #[error("configuration error: {reason}")]
    Configuration { reason: String },
}

impl CaptureError {
    pub fn room_not_found(url: impl Into<String>) -> Self {
        Self::RoomNotFound { url: url.into() }
    }

    pub fn resolve(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolve {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn manifest_unavailable(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ManifestUnavailable {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn segment_fetch(segment: impl Into<String>, source: CaptureError) -> Self {
        Self::SegmentFetchFailed {
            segment: segment.into(),
            source: Box::new(source),
        }
    }

    pub fn http_status(status: StatusCode, url: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            url: url.into(),
        }
    }

    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Fatal errors abort the capture; everything else is recovered by the
    /// next poll cycle.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::RoomNotFound { .. }
            | Self::OutputCreateFailed { .. }
            | Self::SessionDir { .. }
            | Self::Configuration { .. } => true,
            Self::Cancelled
            | Self::Resolve { .. }
            | Self::ManifestUnavailable { .. }
            | Self::SegmentFetchFailed { .. }
            | Self::SegmentWriteFailed { .. }
            | Self::MergeReadFailed { .. }
            | Self::MergeWriteFailed { .. }
            | Self::NotFound { .. }
            | Self::Network { .. }
            | Self::HttpStatus { .. } => false,
        }
    }
}
