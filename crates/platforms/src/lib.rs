//! Live-status extraction for streaming platforms.
//!
//! Resolves a room page URL to the HLS playlist of its current broadcast.

pub mod extractor;

pub use extractor::error::ExtractorError;
pub use extractor::platforms::showroom::Showroom;
