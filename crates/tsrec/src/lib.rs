//! Live HLS capture engine.
//!
//! Polls a live playlist, downloads newly listed `.ts` segments, backfills
//! segments that rolled out of the playlist window between polls and, on
//! shutdown, concatenates everything it acquired in segment order.

pub mod backfill;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod ledger;
pub mod live;
pub mod manifest;
pub mod orchestrator;
pub mod reassembler;
pub mod segment;
pub mod session;
pub mod transport;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use backfill::plan_backfill;
pub use config::{CaptureConfig, DEFAULT_USER_AGENT, HttpConfig};
pub use error::CaptureError;
pub use fetcher::{FetchOutcome, SegmentFetcher};
pub use ledger::Ledger;
pub use live::{LiveStatus, RoomResolver, await_manifest};
pub use manifest::{Manifest, ManifestReader};
pub use orchestrator::{CaptureCycles, CaptureOrchestrator, CaptureReport, CaptureState};
pub use reassembler::{MergeReport, merge};
pub use segment::SegmentId;
pub use session::CaptureSession;
pub use transport::{HttpFetch, ReqwestFetcher};
