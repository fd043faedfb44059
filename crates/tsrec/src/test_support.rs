//! In-memory transport for engine tests.
//!
//! Available to local unit tests and, with the `test-utils` feature, to
//! integration tests and downstream crates.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use crate::CaptureError;
use crate::transport::HttpFetch;

/// `HttpFetch` over a map of URL to body. Unknown URLs answer `NotFound`.
#[derive(Default)]
pub struct MemoryFetcher {
    resources: Mutex<HashMap<String, Bytes>>,
    delays: Mutex<HashMap<String, Duration>>,
    requests: Mutex<HashMap<String, usize>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(&self, url: &str, body: &str) {
        self.set_bytes(url, body.as_bytes().to_vec());
    }

    pub fn set_bytes(&self, url: &str, data: impl Into<Bytes>) {
        self.resources.lock().insert(url.to_owned(), data.into());
    }

    /// Every request for `url` sleeps `delay` before answering.
    pub fn set_delay(&self, url: &str, delay: Duration) {
        self.delays.lock().insert(url.to_owned(), delay);
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests.lock().get(url).copied().unwrap_or(0)
    }

    async fn lookup(&self, url: &str) -> Result<Bytes, CaptureError> {
        *self.requests.lock().entry(url.to_owned()).or_default() += 1;

        let delay = self.delays.lock().get(url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.resources
            .lock()
            .get(url)
            .cloned()
            .ok_or_else(|| CaptureError::NotFound {
                url: url.to_owned(),
            })
    }
}

#[async_trait]
impl HttpFetch for MemoryFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, CaptureError> {
        let data = self.lookup(url).await?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, CaptureError> {
        self.lookup(url).await
    }
}
