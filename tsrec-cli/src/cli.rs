use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tsrec_engine::config::DEFAULT_LOOKBACK;
use tsrec_engine::{CaptureConfig, DEFAULT_USER_AGENT, HttpConfig};

use crate::error::AppError;
use crate::utils::parse_headers;

/// Records a live HLS broadcast segment by segment and merges it on exit.
#[derive(Parser, Debug)]
#[command(name = "tsrec", version, about)]
pub struct Args {
    /// Room or channel page of the live stream
    pub source_url: String,

    /// Directory in which the session folder is created
    #[arg(default_value = ".")]
    pub destination: PathBuf,

    /// Segments below the oldest listed one that gap recovery re-requests
    #[arg(long, env = "TSREC_LOOKBACK", default_value_t = DEFAULT_LOOKBACK)]
    pub lookback: u64,

    /// Seconds between new-segment polls
    #[arg(long, env = "TSREC_POLL_INTERVAL", value_name = "SECS", default_value_t = 2)]
    pub poll_interval: u64,

    /// Seconds between gap-recovery polls
    #[arg(long, env = "TSREC_RECOVER_INTERVAL", value_name = "SECS", default_value_t = 10)]
    pub recover_interval: u64,

    /// Seconds between live-status checks while the stream is offline
    #[arg(long, env = "TSREC_LIVE_CHECK_INTERVAL", value_name = "SECS", default_value_t = 10)]
    pub live_check_interval: u64,

    /// Per-request timeout in seconds
    #[arg(long, env = "TSREC_TIMEOUT", value_name = "SECS", default_value_t = 15)]
    pub timeout: u64,

    /// Seconds shutdown waits for in-flight downloads before merging
    #[arg(long, env = "TSREC_DRAIN_TIMEOUT", value_name = "SECS", default_value_t = 5)]
    pub drain_timeout: u64,

    #[arg(long, env = "TSREC_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Extra request header, repeatable
    #[arg(short = 'H', long = "header", value_name = "NAME=VALUE")]
    pub headers: Vec<String>,

    /// Debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Errors only
    #[arg(short, long)]
    pub quiet: bool,

    /// Also write logs to a daily rotated file in this directory
    #[arg(long, env = "TSREC_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Args {
    pub fn capture_config(&self) -> Result<CaptureConfig, AppError> {
        let http = HttpConfig {
            timeout: Duration::from_secs(self.timeout),
            user_agent: self.user_agent.clone(),
            ..HttpConfig::default()
        }
        .with_headers(parse_headers(&self.headers)?);

        let config = CaptureConfig::default()
            .with_lookback(self.lookback)
            .with_poll_interval(Duration::from_secs(self.poll_interval))
            .with_recover_interval(Duration::from_secs(self.recover_interval))
            .with_live_check_interval(Duration::from_secs(self.live_check_interval))
            .with_drain_timeout(Duration::from_secs(self.drain_timeout))
            .with_http(http);
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["tsrec", "https://www.showroom-live.com/r/abc"]).unwrap();
        assert_eq!(args.destination, PathBuf::from("."));

        let config = args.capture_config().unwrap();
        assert_eq!(config.lookback, 50);
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.recover_interval, Duration::from_secs(10));
        assert_eq!(config.live_check_interval, Duration::from_secs(10));
        assert_eq!(config.http.timeout, Duration::from_secs(15));
    }

    #[test]
    fn overrides_and_headers() {
        let args = Args::try_parse_from([
            "tsrec",
            "https://www.showroom-live.com/r/abc",
            "/data/rec",
            "--lookback",
            "120",
            "--poll-interval",
            "1",
            "-H",
            "Referer=https://www.showroom-live.com/",
        ])
        .unwrap();
        assert_eq!(args.destination, PathBuf::from("/data/rec"));

        let config = args.capture_config().unwrap();
        assert_eq!(config.lookback, 120);
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(
            config.http.headers["referer"],
            "https://www.showroom-live.com/"
        );
    }

    #[test]
    fn zero_interval_is_rejected() {
        let args = Args::try_parse_from([
            "tsrec",
            "https://www.showroom-live.com/r/abc",
            "--recover-interval",
            "0",
        ])
        .unwrap();
        assert!(matches!(args.capture_config(), Err(AppError::Capture(_))));
    }

    #[test]
    fn verbose_conflicts_with_quiet() {
        assert!(Args::try_parse_from(["tsrec", "https://x", "-v", "-q"]).is_err());
    }
}
