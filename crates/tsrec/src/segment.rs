//! Segment identifiers parsed from transport-stream filenames.

use std::cmp::Ordering;
use std::fmt;

use tracing::debug;

const TS_SUFFIX: &str = ".ts";

/// Stable ordering key of a segment, parsed from `<prefix><index>.ts`.
///
/// Ordering compares `index` numerically; `prefix` only breaks ties, since it
/// is constant within one capture session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SegmentId {
    pub prefix: String,
    pub index: u64,
}

impl SegmentId {
    pub fn new(prefix: impl Into<String>, index: u64) -> Self {
        Self {
            prefix: prefix.into(),
            index,
        }
    }

    /// Parses a segment filename.
    ///
    /// When the trailing digit run is missing or does not fit in a `u64`, the
    /// index falls back to `1` and the prefix is the name without its
    /// `<digits>.ts` suffix. Distinct names may collide under the fallback.
    pub fn parse(filename: &str) -> Self {
        let Some(stem) = filename.strip_suffix(TS_SUFFIX) else {
            debug!(segment = filename, "segment name has no .ts suffix, using index 1");
            return Self::new(filename, 1);
        };

        let digits_start = stem
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_digit())
            .last()
            .map(|(i, _)| i)
            .unwrap_or(stem.len());
        let (prefix, digits) = stem.split_at(digits_start);

        match digits.parse::<u64>() {
            Ok(index) => Self::new(prefix, index),
            Err(_) => {
                debug!(segment = filename, "segment name has no usable index, using index 1");
                Self::new(prefix, 1)
            }
        }
    }

    /// Sibling identifier sharing this prefix.
    pub fn with_index(&self, index: u64) -> Self {
        Self::new(self.prefix.clone(), index)
    }

    pub fn file_name(&self) -> String {
        format!("{}{}{}", self.prefix, self.index, TS_SUFFIX)
    }
}

impl Ord for SegmentId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index
            .cmp(&other.index)
            .then_with(|| self.prefix.cmp(&other.prefix))
    }
}

impl PartialOrd for SegmentId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.prefix, self.index, TS_SUFFIX)
    }
}
