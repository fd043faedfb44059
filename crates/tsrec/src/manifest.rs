// Manifest Reader: fetches the live playlist and extracts segment filenames.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, trace};

use crate::CaptureError;
use crate::transport::HttpFetch;

/// A media-segment line: word characters and hyphens, `.ts` extension, with
/// an optional query string that is not part of the filename.
static SEGMENT_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_-]+\.ts)(?:[?#].*)?$").expect("segment line regex is valid")
});

/// Segment filenames listed by one playlist fetch, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Base URL under which `url_prefix + filename` is fetchable
    pub url_prefix: String,
    pub segments: Vec<String>,
}

impl Manifest {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The oldest entry of the playlist's sliding window.
    pub fn first(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }
}

/// Everything up to and including the last `/` of the manifest URL.
pub fn url_prefix(manifest_url: &str) -> &str {
    match manifest_url.rfind('/') {
        Some(pos) => &manifest_url[..=pos],
        None => "",
    }
}

/// Extracts segment filenames in playlist order. Directives and blank lines
/// are ignored; a playlist with no media lines yields an empty list.
pub fn parse_segment_names(playlist: &str) -> Vec<String> {
    playlist
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let name = SEGMENT_LINE_REGEX
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_owned());
            if name.is_none() {
                trace!(line, "ignoring non-segment playlist line");
            }
            name
        })
        .collect()
}

#[derive(Clone)]
pub struct ManifestReader {
    fetcher: Arc<dyn HttpFetch>,
}

impl ManifestReader {
    pub fn new(fetcher: Arc<dyn HttpFetch>) -> Self {
        Self { fetcher }
    }

    pub async fn read(&self, manifest_url: &str) -> Result<Manifest, CaptureError> {
        let playlist = self
            .fetcher
            .fetch_text(manifest_url)
            .await
            .map_err(|e| CaptureError::manifest_unavailable(manifest_url, e.to_string()))?;

        let segments = parse_segment_names(&playlist);
        debug!(
            url = manifest_url,
            segments = segments.len(),
            "manifest refreshed"
        );

        Ok(Manifest {
            url_prefix: url_prefix(manifest_url).to_owned(),
            segments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryFetcher;

    const PLAYLIST: &str = "#EXTM3U
#EXT-X-VERSION:3
#EXT-X-ALLOW-CACHE:NO
#EXT-X-MEDIA-SEQUENCE:1723210480
#EXT-X-TARGETDURATION:3
#EXTINF:1.967,
3cdabee90af8604be7e1045ba1ecc01cecd654429f97d487f4023d3025b863b9-1723210480.ts?txspiseq=106197697587716559759
#EXTINF:2.008,
3cdabee90af8604be7e1045ba1ecc01cecd654429f97d487f4023d3025b863b9-1723210481.ts?txspiseq=106197697587716559759
#EXTINF:2.008,
3cdabee90af8604be7e1045ba1ecc01cecd654429f97d487f4023d3025b863b9-1723210482.ts?txspiseq=106197697587716559759
";

    #[test]
    fn extracts_segment_names_without_query() {
        let names = parse_segment_names(PLAYLIST);
        assert_eq!(
            names,
            vec![
                "3cdabee90af8604be7e1045ba1ecc01cecd654429f97d487f4023d3025b863b9-1723210480.ts",
                "3cdabee90af8604be7e1045ba1ecc01cecd654429f97d487f4023d3025b863b9-1723210481.ts",
                "3cdabee90af8604be7e1045ba1ecc01cecd654429f97d487f4023d3025b863b9-1723210482.ts",
            ]
        );
    }

    #[test]
    fn directive_only_playlist_is_empty() {
        let playlist = "#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-TARGETDURATION:2\n\n";
        assert!(parse_segment_names(playlist).is_empty());
        assert!(parse_segment_names("").is_empty());
    }

    #[test]
    fn skips_lines_that_are_not_ts_segments() {
        let playlist = "#EXTM3U\nmedia_5.m4s\nhttps://cdn.example/abs-1.ts\nmedia_b406154_5820.ts\r\nmedia_6.tsx\n";
        assert_eq!(parse_segment_names(playlist), vec!["media_b406154_5820.ts"]);
    }

    #[test]
    fn derives_prefix_from_last_slash() {
        assert_eq!(
            url_prefix(
                "https://hls-css.live.showroom-live.com/live/3cdabee90af8604be7e1045ba1ecc01cecd654429f97d487f4023d3025b863b9.m3u8"
            ),
            "https://hls-css.live.showroom-live.com/live/"
        );
        assert_eq!(
            url_prefix(
                "https://hls-origin230.showroom-cdn.com/liveedge/352abe11_source/chunklist.m3u8"
            ),
            "https://hls-origin230.showroom-cdn.com/liveedge/352abe11_source/"
        );
        assert_eq!(url_prefix("chunklist.m3u8"), "");
    }

    #[tokio::test]
    async fn read_returns_prefix_and_segments() {
        let fetcher = Arc::new(MemoryFetcher::new());
        fetcher.set_text("https://cdn.example/live/chunklist.m3u8", PLAYLIST);
        let reader = ManifestReader::new(fetcher);

        let manifest = reader
            .read("https://cdn.example/live/chunklist.m3u8")
            .await
            .unwrap();
        assert_eq!(manifest.url_prefix, "https://cdn.example/live/");
        assert_eq!(manifest.segments.len(), 3);
        assert!(manifest.first().unwrap().ends_with("-1723210480.ts"));
    }

    #[tokio::test]
    async fn unreachable_manifest_is_transient() {
        let reader = ManifestReader::new(Arc::new(MemoryFetcher::new()));
        let err = reader
            .read("https://cdn.example/live/chunklist.m3u8")
            .await
            .unwrap_err();
        assert!(matches!(err, CaptureError::ManifestUnavailable { .. }));
        assert!(!err.is_fatal());
    }
}
