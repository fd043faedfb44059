use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Waits for SIGINT or SIGTERM (Ctrl-C elsewhere) and cancels `token`.
pub async fn shutdown_signal(token: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                    _ = token.cancelled() => return,
                }
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM, only Ctrl-C will stop the capture");
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = token.cancelled() => return,
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = token.cancelled() => return,
        }
    }

    info!("Shutdown signal received. Finalizing capture...");
    token.cancel();
}
