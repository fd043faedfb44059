use async_trait::async_trait;
use platforms_parser::Showroom;
use tracing::debug;
use tsrec_engine::session::slug_from_url;
use tsrec_engine::{CaptureError, LiveStatus, RoomResolver};

/// Resolves rooms through the Showroom page scrape and live-status API.
pub struct ShowroomResolver {
    showroom: Showroom,
}

impl ShowroomResolver {
    pub fn new(showroom: Showroom) -> Self {
        Self { showroom }
    }
}

#[async_trait]
impl RoomResolver for ShowroomResolver {
    async fn resolve(&self, room_url: &str) -> Result<LiveStatus, CaptureError> {
        match self.showroom.live_playlist(room_url).await {
            Ok(Some(manifest_url)) => Ok(LiveStatus::Live { manifest_url }),
            Ok(None) => Ok(LiveStatus::Offline),
            Err(e) if e.is_not_found() => {
                debug!(room = room_url, error = %e, "room lookup failed");
                Err(CaptureError::room_not_found(room_url))
            }
            Err(e) => Err(CaptureError::resolve(room_url, e.to_string())),
        }
    }

    fn session_slug(&self, room_url: &str) -> String {
        Showroom::session_slug(room_url).unwrap_or_else(|| slug_from_url(room_url))
    }
}
