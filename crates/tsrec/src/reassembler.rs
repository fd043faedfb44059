// Reassembler: concatenates downloaded segments into one transport stream,
// ordered by segment index.

use std::io::SeekFrom;
use std::path::Path;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::CaptureError;
use crate::segment::SegmentId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub merged: usize,
    pub skipped: usize,
    pub bytes_written: u64,
}

/// Ledger keys sorted ascending by [`SegmentId`].
pub fn merge_order(snapshot: &[String]) -> Vec<String> {
    let mut ids: Vec<(SegmentId, &String)> = snapshot
        .iter()
        .map(|name| (SegmentId::parse(name), name))
        .collect();
    ids.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    ids.into_iter().map(|(_, name)| name.clone()).collect()
}

/// Merge destination that can drop a partially appended segment.
#[async_trait]
trait MergeSink: AsyncWrite + Unpin + Send {
    /// Cuts the sink back to `len` bytes and continues writing from there.
    async fn truncate_to(&mut self, len: u64) -> std::io::Result<()>;
}

#[async_trait]
impl MergeSink for File {
    async fn truncate_to(&mut self, len: u64) -> std::io::Result<()> {
        self.set_len(len).await?;
        self.seek(SeekFrom::Start(len)).await?;
        Ok(())
    }
}

/// Writes the byte-exact concatenation of every snapshot segment to
/// `output_path`. Only creating the output is fatal; a segment that cannot be
/// read or appended is logged and skipped.
pub async fn merge(
    snapshot: &[String],
    session_dir: &Path,
    output_path: &Path,
) -> Result<MergeReport, CaptureError> {
    let ordered = merge_order(snapshot);
    info!(segments = ordered.len(), output = %output_path.display(), "merging segments");

    let mut output = File::create(output_path)
        .await
        .map_err(|source| CaptureError::OutputCreateFailed {
            path: output_path.to_path_buf(),
            source,
        })?;

    let report = append_segments(&mut output, &ordered, session_dir, output_path).await;

    if let Err(e) = output.flush().await {
        warn!(output = %output_path.display(), error = %e, "failed to flush merged output");
    }

    info!(
        merged = report.merged,
        skipped = report.skipped,
        bytes = report.bytes_written,
        "merge finished"
    );
    Ok(report)
}

async fn append_segments<S: MergeSink>(
    sink: &mut S,
    ordered: &[String],
    session_dir: &Path,
    output_path: &Path,
) -> MergeReport {
    let mut report = MergeReport::default();
    for name in ordered {
        let path = session_dir.join(name);
        if path == output_path {
            continue;
        }

        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(source) => {
                let e = CaptureError::MergeReadFailed { path, source };
                warn!(segment = %name, error = %e, "skipping segment");
                report.skipped += 1;
                continue;
            }
        };

        if let Err(source) = sink.write_all(&data).await {
            let e = CaptureError::MergeWriteFailed { path, source };
            warn!(segment = %name, error = %e, "skipping segment");
            report.skipped += 1;
            // drop whatever part of the segment made it into the output
            if let Err(e) = sink.truncate_to(report.bytes_written).await {
                warn!(segment = %name, error = %e, "failed to roll back partial segment");
            }
            continue;
        }

        report.merged += 1;
        report.bytes_written += data.len() as u64;
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn orders_by_numeric_index() {
        let snapshot = keys(&[
            "3cdabee90af8604-111.ts",
            "3cdabee90af8604-3.ts",
            "3cdabee90af8604-11.ts",
            "3cdabee90af8604-6.ts",
            "3cdabee90af8604-20.ts",
            "3cdabee90af8604-10.ts",
            "3cdabee90af8604-99.ts",
            "3cdabee90af8604-1.ts",
            "3cdabee90af8604-19.ts",
            "3cdabee90af8604-100.ts",
            "3cdabee90af8604-1000.ts",
            "3cdabee90af8604-21.ts",
            "3cdabee90af8604-300.ts",
            "3cdabee90af8604-32.ts",
            "3cdabee90af8604-101.ts",
            "3cdabee90af8604-110.ts",
            "3cdabee90af8604-200.ts",
        ]);
        let expected: Vec<String> = [
            1, 3, 6, 10, 11, 19, 20, 21, 32, 99, 100, 101, 110, 111, 200, 300, 1000,
        ]
        .iter()
        .map(|i| format!("3cdabee90af8604-{i}.ts"))
        .collect();
        assert_eq!(merge_order(&snapshot), expected);
    }

    #[tokio::test]
    async fn concatenates_in_index_order() {
        let temp_dir = TempDir::new().unwrap();
        for (name, body) in [("s-100.ts", "C"), ("s-3.ts", "A"), ("s-21.ts", "B")] {
            tokio::fs::write(temp_dir.path().join(name), body)
                .await
                .unwrap();
        }
        let output = temp_dir.path().join("out.ts");

        let report = merge(
            &keys(&["s-100.ts", "s-3.ts", "s-21.ts"]),
            temp_dir.path(),
            &output,
        )
        .await
        .unwrap();

        assert_eq!(tokio::fs::read(&output).await.unwrap(), b"ABC");
        assert_eq!(
            report,
            MergeReport {
                merged: 3,
                skipped: 0,
                bytes_written: 3
            }
        );
    }

    #[tokio::test]
    async fn missing_segment_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        tokio::fs::write(temp_dir.path().join("s-1.ts"), "one")
            .await
            .unwrap();
        tokio::fs::write(temp_dir.path().join("s-3.ts"), "three")
            .await
            .unwrap();
        let output = temp_dir.path().join("out.ts");

        let report = merge(
            &keys(&["s-1.ts", "s-2.ts", "s-3.ts"]),
            temp_dir.path(),
            &output,
        )
        .await
        .unwrap();

        assert_eq!(tokio::fs::read(&output).await.unwrap(), b"onethree");
        assert_eq!(report.merged, 2);
        assert_eq!(report.skipped, 1);
    }

    #[tokio::test]
    async fn output_create_failure_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("missing-dir").join("out.ts");

        let err = merge(&keys(&["s-1.ts"]), temp_dir.path(), &output)
            .await
            .unwrap_err();
        assert!(matches!(err, CaptureError::OutputCreateFailed { .. }));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn empty_snapshot_creates_empty_output() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.ts");

        let report = merge(&[], temp_dir.path(), &output).await.unwrap();
        assert_eq!(report, MergeReport::default());
        assert!(tokio::fs::read(&output).await.unwrap().is_empty());
    }

    /// In-memory sink that accepts `budget` bytes, then fails one write.
    struct ShortSink {
        data: Vec<u8>,
        budget: Option<usize>,
    }

    impl AsyncWrite for ShortSink {
        fn poll_write(
            mut self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            buf: &[u8],
        ) -> std::task::Poll<std::io::Result<usize>> {
            let accepted = match self.budget {
                Some(0) => {
                    self.budget = None;
                    return std::task::Poll::Ready(Err(std::io::Error::other("no space left")));
                }
                Some(left) => {
                    let n = left.min(buf.len());
                    self.budget = Some(left - n);
                    n
                }
                None => buf.len(),
            };
            self.data.extend_from_slice(&buf[..accepted]);
            std::task::Poll::Ready(Ok(accepted))
        }

        fn poll_flush(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }
    }

    #[async_trait]
    impl MergeSink for ShortSink {
        async fn truncate_to(&mut self, len: u64) -> std::io::Result<()> {
            self.data.truncate(len as usize);
            Ok(())
        }
    }

    #[tokio::test]
    async fn failed_append_leaves_no_partial_bytes() {
        let temp_dir = TempDir::new().unwrap();
        for (name, body) in [("s-1.ts", "aaaa"), ("s-2.ts", "bbbbbb"), ("s-3.ts", "cc")] {
            tokio::fs::write(temp_dir.path().join(name), body)
                .await
                .unwrap();
        }
        let mut sink = ShortSink {
            data: Vec::new(),
            budget: Some(7),
        };

        let report = append_segments(
            &mut sink,
            &keys(&["s-1.ts", "s-2.ts", "s-3.ts"]),
            temp_dir.path(),
            &temp_dir.path().join("out.ts"),
        )
        .await;

        assert_eq!(sink.data, b"aaaacc");
        assert_eq!(
            report,
            MergeReport {
                merged: 2,
                skipped: 1,
                bytes_written: 6
            }
        );
    }

    #[tokio::test]
    async fn file_truncate_rewinds_write_position() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.ts");
        let mut file = File::create(&path).await.unwrap();
        file.write_all(b"keepdrop").await.unwrap();

        file.truncate_to(4).await.unwrap();
        file.write_all(b"-next").await.unwrap();
        file.flush().await.unwrap();

        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"keep-next");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        /// Whatever order the ledger hands keys over in, the merge order is
        /// ascending by numeric index.
        #[test]
        fn prop_merge_order_is_numeric(
            indices in proptest::collection::hash_set(any::<u64>(), 0..64)
                .prop_flat_map(|set| Just(set.into_iter().collect::<Vec<_>>()).prop_shuffle())
        ) {
            let snapshot: Vec<String> = indices
                .iter()
                .map(|i| format!("3cdabee90af8604-{i}.ts"))
                .collect();

            let mut sorted = indices.clone();
            sorted.sort_unstable();
            let expected: Vec<String> = sorted
                .iter()
                .map(|i| format!("3cdabee90af8604-{i}.ts"))
                .collect();

            prop_assert_eq!(merge_order(&snapshot), expected);
        }
    }
}
