// Capture Orchestrator: AwaitingStream -> Capturing -> Finalizing -> Done.
//
// Capturing runs the new-segment cycle and the gap-recovery cycle as two
// independently ticking tasks over one shared ledger. Shutdown stops the
// tickers, gives in-flight cycles a bounded grace period, then merges a
// snapshot of the ledger.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use futures::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::CaptureError;
use crate::backfill::plan_backfill;
use crate::config::CaptureConfig;
use crate::fetcher::SegmentFetcher;
use crate::ledger::Ledger;
use crate::live::{RoomResolver, await_manifest};
use crate::manifest::ManifestReader;
use crate::reassembler::{MergeReport, merge};
use crate::segment::SegmentId;
use crate::session::{CaptureSession, session_dir_name};
use crate::transport::HttpFetch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    AwaitingStream,
    Capturing,
    Finalizing,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleKind {
    NewSegments,
    GapRecovery,
}

impl CycleKind {
    fn name(self) -> &'static str {
        match self {
            Self::NewSegments => "new_segments",
            Self::GapRecovery => "gap_recovery",
        }
    }
}

/// Outcome of a session that went live; a run stopped while offline has none.
#[derive(Debug, Clone)]
pub struct CaptureReport {
    pub session_dir: PathBuf,
    pub output_path: PathBuf,
    pub merge: MergeReport,
}

/// The two polling cycles of one session, sharing a ledger.
pub struct CaptureCycles {
    manifest_url: String,
    lookback: u64,
    reader: ManifestReader,
    fetcher: SegmentFetcher,
}

impl CaptureCycles {
    pub fn new(session: &CaptureSession, http: Arc<dyn HttpFetch>, ledger: Arc<Ledger>) -> Self {
        Self {
            manifest_url: session.manifest_url.clone(),
            lookback: session.config.lookback,
            reader: ManifestReader::new(Arc::clone(&http)),
            fetcher: SegmentFetcher::new(
                http,
                ledger,
                session.url_prefix.clone(),
                session.session_dir.clone(),
            ),
        }
    }

    /// Fetches every listed segment not yet downloaded, in manifest order.
    pub async fn poll_new_segments(&self) -> Result<usize, CaptureError> {
        let manifest = self.reader.read(&self.manifest_url).await?;
        Ok(self.fetcher.fetch_all(&manifest.segments).await)
    }

    /// Re-requests the `lookback` indices below the oldest listed segment.
    pub async fn recover_gaps(&self) -> Result<usize, CaptureError> {
        let manifest = self.reader.read(&self.manifest_url).await?;
        let Some(first) = manifest.first() else {
            return Ok(0);
        };
        let planned = plan_backfill(&SegmentId::parse(first), self.lookback);
        debug!(from = first, planned = planned.len(), "gap recovery planned");
        Ok(self.fetcher.fetch_all(&planned).await)
    }

    pub async fn run_cycle(&self, kind: CycleKind) {
        let result = match kind {
            CycleKind::NewSegments => self.poll_new_segments().await,
            CycleKind::GapRecovery => self.recover_gaps().await,
        };
        match result {
            Ok(0) => {}
            Ok(stored) => debug!(cycle = kind.name(), stored, "cycle finished"),
            Err(e) => warn!(cycle = kind.name(), error = %e, "cycle failed, retrying next tick"),
        }
    }
}

fn spawn_cycle(
    cycles: Arc<CaptureCycles>,
    kind: CycleKind,
    period: Duration,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }
            cycles
                .run_cycle(kind)
                .instrument(info_span!("cycle", kind = kind.name()))
                .await;
        }
        debug!(cycle = kind.name(), "cycle task stopped");
    })
}

pub struct CaptureOrchestrator {
    config: CaptureConfig,
    http: Arc<dyn HttpFetch>,
    resolver: Arc<dyn RoomResolver>,
    dest_root: PathBuf,
    state_tx: watch::Sender<CaptureState>,
}

impl CaptureOrchestrator {
    pub fn new(
        config: CaptureConfig,
        http: Arc<dyn HttpFetch>,
        resolver: Arc<dyn RoomResolver>,
        dest_root: impl Into<PathBuf>,
    ) -> Self {
        let (state_tx, _) = watch::channel(CaptureState::AwaitingStream);
        Self {
            config,
            http,
            resolver,
            dest_root: dest_root.into(),
            state_tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<CaptureState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> CaptureState {
        *self.state_tx.borrow()
    }

    fn set_state(&self, state: CaptureState) {
        info!(?state, "capture state changed");
        self.state_tx.send_replace(state);
    }

    /// Waits for `source_url` to go live, captures until `token` is
    /// cancelled, then merges. Returns `Ok(None)` when shutdown arrives
    /// before the stream starts.
    pub async fn run(
        &self,
        source_url: &str,
        token: CancellationToken,
    ) -> Result<Option<CaptureReport>, CaptureError> {
        self.config.validate()?;
        let date = Local::now().date_naive();

        self.set_state(CaptureState::AwaitingStream);
        let manifest_url = match await_manifest(
            self.resolver.as_ref(),
            source_url,
            self.config.live_check_interval,
            &token,
        )
        .await
        {
            Ok(url) => url,
            Err(CaptureError::Cancelled) => {
                info!("shutdown before the stream went live");
                self.set_state(CaptureState::Done);
                return Ok(None);
            }
            Err(e) => {
                error!(error = %e, "cannot resolve live stream");
                self.set_state(CaptureState::Done);
                return Err(e);
            }
        };

        let dir_name = session_dir_name(date, &self.resolver.session_slug(source_url));
        let session = CaptureSession::new(
            source_url,
            manifest_url,
            &self.dest_root,
            &dir_name,
            self.config.clone(),
        );
        self.capture(&session, token).await.map(Some)
    }

    /// Capturing and Finalizing for an already resolved session.
    pub async fn capture(
        &self,
        session: &CaptureSession,
        token: CancellationToken,
    ) -> Result<CaptureReport, CaptureError> {
        if let Err(e) = session.prepare().await {
            self.set_state(CaptureState::Done);
            return Err(e);
        }

        let ledger = Arc::new(Ledger::new());
        let cycles = Arc::new(CaptureCycles::new(
            session,
            Arc::clone(&self.http),
            Arc::clone(&ledger),
        ));

        self.set_state(CaptureState::Capturing);
        info!(
            manifest = %session.manifest_url,
            dir = %session.session_dir.display(),
            "capture started"
        );
        let handles = vec![
            spawn_cycle(
                Arc::clone(&cycles),
                CycleKind::NewSegments,
                session.config.poll_interval,
                token.child_token(),
            ),
            spawn_cycle(
                Arc::clone(&cycles),
                CycleKind::GapRecovery,
                session.config.recover_interval,
                token.child_token(),
            ),
        ];

        token.cancelled().await;
        info!("shutdown requested");
        self.set_state(CaptureState::Finalizing);

        match tokio::time::timeout(session.config.drain_timeout, join_all(handles)).await {
            Ok(results) => {
                for result in results {
                    if let Err(e) = result {
                        error!(error = %e, "cycle task panicked");
                    }
                }
            }
            Err(_) => warn!(
                timeout = ?session.config.drain_timeout,
                "in-flight cycles did not finish, merging what is on disk"
            ),
        }

        let snapshot = ledger.snapshot();
        let result = merge(&snapshot, &session.session_dir, &session.output_path).await;
        self.set_state(CaptureState::Done);

        Ok(CaptureReport {
            session_dir: session.session_dir.clone(),
            output_path: session.output_path.clone(),
            merge: result?,
        })
    }
}
