// Live-Start Detector: waits until the room reports a playable manifest.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::CaptureError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveStatus {
    /// Room exists but is not broadcasting yet
    Offline,
    Live { manifest_url: String },
}

/// Resolves a room page URL to its current live status.
///
/// Implementations return [`CaptureError::RoomNotFound`] when the URL does not
/// identify a room; any other error is treated as transient.
#[async_trait]
pub trait RoomResolver: Send + Sync {
    async fn resolve(&self, room_url: &str) -> Result<LiveStatus, CaptureError>;

    /// Directory-name slug for captures of this room.
    fn session_slug(&self, room_url: &str) -> String {
        crate::session::slug_from_url(room_url)
    }
}

/// Polls `resolver` every `interval` until the room goes live.
pub async fn await_manifest(
    resolver: &dyn RoomResolver,
    room_url: &str,
    interval: Duration,
    token: &CancellationToken,
) -> Result<String, CaptureError> {
    loop {
        if token.is_cancelled() {
            return Err(CaptureError::Cancelled);
        }

        match resolver.resolve(room_url).await {
            Ok(LiveStatus::Live { manifest_url }) => {
                info!(room = room_url, manifest = %manifest_url, "live stream found");
                return Ok(manifest_url);
            }
            Ok(LiveStatus::Offline) => {
                info!(room = room_url, "waiting for live stream to start");
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(room = room_url, error = %e, "live status check failed, retrying");
            }
        }

        tokio::select! {
            _ = token.cancelled() => return Err(CaptureError::Cancelled),
            _ = tokio::time::sleep(interval) => {}
        }
    }
}
