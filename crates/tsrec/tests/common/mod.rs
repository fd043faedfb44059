use std::ops::Deref;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tsrec_engine::test_support::MemoryFetcher;
use tsrec_engine::{CaptureError, HttpFetch};

pub const MANIFEST_URL: &str = "https://hls.example/live/abc/chunklist.m3u8";
pub const SEGMENT_BASE: &str = "https://hls.example/live/abc/";

/// Scriptable CDN: a playlist that can be swapped between polls plus a set of
/// segment bodies.
#[derive(Default)]
pub struct FakeCdn(MemoryFetcher);

impl Deref for FakeCdn {
    type Target = MemoryFetcher;

    fn deref(&self) -> &MemoryFetcher {
        &self.0
    }
}

#[async_trait]
impl HttpFetch for FakeCdn {
    async fn fetch_text(&self, url: &str) -> Result<String, CaptureError> {
        self.0.fetch_text(url).await
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, CaptureError> {
        self.0.fetch_bytes(url).await
    }
}

impl FakeCdn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish_playlist(&self, indices: impl IntoIterator<Item = u64>) {
        let mut body = String::from("#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-TARGETDURATION:2\n");
        for i in indices {
            body.push_str(&format!("#EXTINF:2.000,\n{}?txspiseq=1\n", segment_name(i)));
        }
        self.set_text(MANIFEST_URL, &body);
    }

    pub fn publish_segment(&self, index: u64) {
        self.set_bytes(&segment_url(index), segment_body(index));
    }

    /// Requests for segment `index` stall for `delay`.
    pub fn stall_segment(&self, index: u64, delay: Duration) {
        self.set_delay(&segment_url(index), delay);
    }

    pub fn requests_for(&self, index: u64) -> usize {
        self.request_count(&segment_url(index))
    }
}

pub fn segment_name(index: u64) -> String {
    format!("3cdabee90af8604-{index}.ts")
}

pub fn segment_url(index: u64) -> String {
    format!("{SEGMENT_BASE}{}", segment_name(index))
}

pub fn segment_body(index: u64) -> Vec<u8> {
    format!("[segment {index}]").into_bytes()
}
