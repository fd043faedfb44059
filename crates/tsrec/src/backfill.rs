// Gap Recovery Planner: which earlier segments may have rolled out of the playlist
// window before the new-segment cycle saw them.

use crate::segment::SegmentId;

/// Filenames for indices `max(1, latest.index - lookback) .. latest.index`,
/// ascending, sharing `latest`'s prefix. `latest` itself is excluded.
pub fn plan_backfill(latest: &SegmentId, lookback: u64) -> Vec<String> {
    let start = latest.index.saturating_sub(lookback).max(1);
    (start..latest.index)
        .map(|index| latest.with_index(index).file_name())
        .collect()
}
