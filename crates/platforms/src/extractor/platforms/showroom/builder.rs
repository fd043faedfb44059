use std::sync::LazyLock;

use regex::Regex;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::extractor::{
    error::ExtractorError,
    platforms::showroom::models::StreamingUrlResponse,
    utils::{capture_group_1, capture_group_1_or_invalid_url},
};

pub static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.)?showroom-live\.com/(?:r/)?([A-Za-z0-9_-]+)").unwrap()
});

static ROOM_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"room_id=(\d+)").unwrap());

/// Finds the numeric room id embedded in a room page.
pub fn parse_room_id(html: &str) -> Option<&str> {
    capture_group_1(&ROOM_ID_REGEX, html)
}

/// Picks the playlist URL from a `streaming_url` API body.
///
/// An empty object (or an empty list) means the room is not broadcasting.
/// The entry flagged `is_default` wins, otherwise the first one.
pub fn parse_streaming_url(body: &str) -> Result<Option<String>, ExtractorError> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "{}" {
        return Ok(None);
    }

    let response: StreamingUrlResponse = serde_json::from_str(trimmed)?;
    let selected = response
        .streaming_url_list
        .iter()
        .find(|stream| stream.is_default)
        .or_else(|| response.streaming_url_list.first());

    Ok(selected.map(|stream| {
        debug!(
            url = %stream.url,
            stream_type = ?stream.stream_type,
            label = ?stream.label,
            quality = ?stream.quality,
            "selected stream"
        );
        stream.url.clone()
    }))
}

pub struct Showroom {
    client: Client,
    api_base: String,
}

impl Showroom {
    const BASE_URL: &'static str = "https://www.showroom-live.com";

    pub fn new(client: Client) -> Self {
        Self::with_api_base(client, Self::BASE_URL)
    }

    /// Points API queries at another origin, e.g. a mirror.
    pub fn with_api_base(client: Client, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_owned(),
        }
    }

    pub fn is_supported(url: &str) -> bool {
        URL_REGEX.is_match(url)
    }

    /// The `room_url_key` part of a room URL, e.g. `48_Mion`.
    pub fn room_url_key(url: &str) -> Result<&str, ExtractorError> {
        capture_group_1_or_invalid_url(&URL_REGEX, url)
    }

    pub fn session_slug(url: &str) -> Option<String> {
        Self::room_url_key(url)
            .ok()
            .map(|key| format!("showroom-{key}"))
    }

    async fn get_text(&self, url: &str) -> Result<String, ExtractorError> {
        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ExtractorError::StreamerNotFound);
        }
        Ok(response.error_for_status()?.text().await?)
    }

    /// Loads the room page and reads its numeric room id.
    pub async fn room_id(&self, room_url: &str) -> Result<String, ExtractorError> {
        let html = self.get_text(room_url).await?;
        parse_room_id(&html)
            .map(ToOwned::to_owned)
            .ok_or(ExtractorError::StreamerNotFound)
    }

    /// `Some(playlist_url)` while the room is live, `None` otherwise.
    pub async fn live_playlist(&self, room_url: &str) -> Result<Option<String>, ExtractorError> {
        let room_id = self.room_id(room_url).await?;
        let api_url = format!(
            "{}/api/live/streaming_url?room_id={}",
            self.api_base, room_id
        );
        debug!(room_id = %room_id, "querying streaming url");
        let body = self.get_text(&api_url).await?;
        parse_streaming_url(&body)
    }
}
