use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use url::Url;

use crate::CaptureError;
use crate::config::CaptureConfig;
use crate::manifest::url_prefix;

/// Root context of one capture, created once the manifest URL is known.
#[derive(Debug, Clone)]
pub struct CaptureSession {
    pub source_url: String,
    pub manifest_url: String,
    pub url_prefix: String,
    pub session_dir: PathBuf,
    pub output_path: PathBuf,
    pub config: CaptureConfig,
}

impl CaptureSession {
    pub fn new(
        source_url: impl Into<String>,
        manifest_url: impl Into<String>,
        dest_root: &Path,
        dir_name: &str,
        config: CaptureConfig,
    ) -> Self {
        let manifest_url = manifest_url.into();
        let session_dir = dest_root.join(dir_name);
        let output_path = session_dir.join(format!("{dir_name}.ts"));
        Self {
            source_url: source_url.into(),
            url_prefix: url_prefix(&manifest_url).to_owned(),
            manifest_url,
            session_dir,
            output_path,
            config,
        }
    }

    /// Creates the session directory. An existing directory is reused.
    pub async fn prepare(&self) -> Result<(), CaptureError> {
        tokio::fs::create_dir_all(&self.session_dir)
            .await
            .map_err(|source| CaptureError::SessionDir {
                path: self.session_dir.clone(),
                source,
            })
    }
}

/// `<YYYYMMDD>-<slug>`
pub fn session_dir_name(date: NaiveDate, slug: &str) -> String {
    format!("{}-{}", date.format("%Y%m%d"), slug)
}

/// Filesystem-safe slug: host without `www.` plus the path segments, joined
/// by `-`.
pub fn slug_from_url(source_url: &str) -> String {
    let raw = match Url::parse(source_url) {
        Ok(url) => {
            let host = url.host_str().unwrap_or_default();
            let host = host.strip_prefix("www.").unwrap_or(host);
            let mut parts = vec![host.to_owned()];
            if let Some(segments) = url.path_segments() {
                parts.extend(segments.filter(|s| !s.is_empty()).map(str::to_owned));
            }
            parts.retain(|p| !p.is_empty());
            parts.join("-")
        }
        Err(_) => source_url.to_owned(),
    };
    sanitize(&raw)
}

fn sanitize(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches(|c| c == '-' || c == '_');
    if trimmed.is_empty() {
        "capture".to_owned()
    } else {
        trimmed.to_owned()
    }
}
