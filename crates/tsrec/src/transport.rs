// Transport primitives: text and byte GETs with uniform error mapping.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use tracing::trace;

use crate::CaptureError;

/// Raw HTTP access used by the manifest reader and the segment fetcher.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, CaptureError>;

    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, CaptureError>;
}

/// `reqwest` backed fetcher. Per-request timeouts come from the client.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, CaptureError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        trace!(url, %status, version = ?response.version(), "GET");

        if status == StatusCode::NOT_FOUND {
            return Err(CaptureError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(CaptureError::http_status(status, url));
        }
        Ok(response)
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, CaptureError> {
        Ok(self.get(url).await?.text().await?)
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, CaptureError> {
        Ok(self.get(url).await?.bytes().await?)
    }
}
