use std::time::Duration;

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};

use crate::CaptureError;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36";

pub const DEFAULT_LOOKBACK: u64 = 50;

/// HTTP client options shared by manifest, segment and live-status requests.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Upper bound for a single request, body included
    pub timeout: Duration,

    /// Time allowed to establish the connection
    pub connect_timeout: Duration,

    /// User agent string
    pub user_agent: String,

    /// Extra headers, merged over the defaults
    pub headers: HeaderMap,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            connect_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            headers: HttpConfig::get_default_headers(),
        }
    }
}

impl HttpConfig {
    pub fn get_default_headers() -> HeaderMap {
        let mut default_headers = HeaderMap::new();

        default_headers.insert(
            reqwest::header::CONNECTION,
            HeaderValue::from_static("keep-alive"),
        );

        default_headers.insert(reqwest::header::ACCEPT, HeaderValue::from_static("*/*"));

        default_headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("ja-JP,ja;q=0.9,en-US;q=0.8,en;q=0.5"),
        );
        default_headers
    }

    /// Merge custom headers over the defaults; custom values win.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        for (name, value) in headers.iter() {
            self.headers.insert(name.clone(), value.clone());
        }
        self
    }

    pub fn build_client(&self) -> Result<Client, CaptureError> {
        Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent.as_str())
            .default_headers(self.headers.clone())
            .build()
            .map_err(CaptureError::from)
    }
}

/// Session-wide capture options. Immutable once the capture starts.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// How many indices below the oldest listed segment gap recovery re-requests
    pub lookback: u64,

    /// Tick of the new-segment cycle
    pub poll_interval: Duration,

    /// Tick of the gap-recovery cycle
    pub recover_interval: Duration,

    /// Retry interval while waiting for the broadcast to start
    pub live_check_interval: Duration,

    /// How long shutdown waits for in-flight cycles before merging anyway
    pub drain_timeout: Duration,

    pub http: HttpConfig,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            lookback: DEFAULT_LOOKBACK,
            poll_interval: Duration::from_secs(2),
            recover_interval: Duration::from_secs(10),
            live_check_interval: Duration::from_secs(10),
            drain_timeout: Duration::from_secs(5),
            http: HttpConfig::default(),
        }
    }
}

impl CaptureConfig {
    pub fn with_lookback(mut self, lookback: u64) -> Self {
        self.lookback = lookback;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_recover_interval(mut self, interval: Duration) -> Self {
        self.recover_interval = interval;
        self
    }

    pub fn with_live_check_interval(mut self, interval: Duration) -> Self {
        self.live_check_interval = interval;
        self
    }

    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    pub fn with_http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Rejects settings that would make `tokio::time::interval` panic or
    /// turn a cycle into a busy loop.
    pub fn validate(&self) -> Result<(), CaptureError> {
        let intervals = [
            ("poll_interval", self.poll_interval),
            ("recover_interval", self.recover_interval),
            ("live_check_interval", self.live_check_interval),
        ];
        for (name, value) in intervals {
            if value.is_zero() {
                return Err(CaptureError::configuration(format!(
                    "{name} must be greater than zero"
                )));
            }
        }
        if self.http.timeout.is_zero() {
            return Err(CaptureError::configuration(
                "request timeout must be greater than zero",
            ));
        }
        Ok(())
    }
}
