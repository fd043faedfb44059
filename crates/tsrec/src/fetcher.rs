// Segment Fetcher: downloads one segment, persists it, records it in the ledger.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::CaptureError;
use crate::ledger::Ledger;
use crate::transport::HttpFetch;

#[derive(Debug)]
pub enum FetchOutcome {
    /// Bytes written and the ledger entry marked
    Stored { bytes: usize },
    /// Already downloaded, or another cycle is fetching it right now
    Skipped,
    /// Left unmarked; the next cycle that lists it retries
    Failed(CaptureError),
}

impl FetchOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored { .. })
    }
}

#[derive(Clone)]
pub struct SegmentFetcher {
    http: Arc<dyn HttpFetch>,
    ledger: Arc<Ledger>,
    url_prefix: String,
    session_dir: PathBuf,
}

impl SegmentFetcher {
    pub fn new(
        http: Arc<dyn HttpFetch>,
        ledger: Arc<Ledger>,
        url_prefix: impl Into<String>,
        session_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            http,
            ledger,
            url_prefix: url_prefix.into(),
            session_dir: session_dir.into(),
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    /// Fetches `segment` from `url_prefix + segment` into the session
    /// directory. Failures are logged and reported, never propagated: the
    /// ledger entry stays unmarked so a later cycle picks it up again.
    pub async fn fetch_and_store(&self, segment: &str) -> FetchOutcome {
        let Some(claim) = self.ledger.try_claim(segment) else {
            debug!(segment, "segment already downloaded or in flight");
            return FetchOutcome::Skipped;
        };

        let url = format!("{}{}", self.url_prefix, segment);
        let data = match self.http.fetch_bytes(&url).await {
            Ok(data) => data,
            Err(e) => {
                warn!(segment, url = %url, error = %e, "segment fetch failed, will retry next cycle");
                return FetchOutcome::Failed(CaptureError::segment_fetch(segment, e));
            }
        };

        let path = self.session_dir.join(segment);
        if let Err(source) = tokio::fs::write(&path, &data).await {
            warn!(segment, path = %path.display(), error = %source, "segment write failed, will retry next cycle");
            return FetchOutcome::Failed(CaptureError::SegmentWriteFailed { path, source });
        }

        claim.complete();
        info!(segment, bytes = data.len(), "segment stored");
        FetchOutcome::Stored { bytes: data.len() }
    }

    /// Fetches every listed segment that is not yet downloaded, in order.
    /// Returns how many were stored.
    pub async fn fetch_all<I, S>(&self, segments: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stored = 0;
        for segment in segments {
            let segment = segment.as_ref();
            if self.ledger.is_downloaded(segment) {
                continue;
            }
            if self.fetch_and_store(segment).await.is_stored() {
                stored += 1;
            }
        }
        stored
    }
}
