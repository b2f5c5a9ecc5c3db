//! Result types returned by a completed download run.

use crate::pipeline::plan::PageRange;
use serde::Serialize;
use std::path::PathBuf;

/// Summary of a successful download run.
///
/// Returned by [`crate::download`]; serialisable so the CLI `--json` flag
/// can emit it verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadOutput {
    /// Path of the merged output document.
    pub output_path: PathBuf,
    /// The resolved page range that was downloaded.
    pub range: PageRange,
    /// True when at least one bound came from detail-page detection.
    pub range_detected: bool,
    /// Run statistics.
    pub stats: DownloadStats,
}

/// Timing and volume statistics for a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DownloadStats {
    /// Number of batch downloads performed.
    pub batches: usize,
    /// Total pages in the requested window.
    pub total_pages: u32,
    /// Raw bytes received across all batch downloads.
    pub bytes_downloaded: u64,
    /// Time spent detecting the page range (0 when both bounds were given).
    pub detect_duration_ms: u64,
    /// Time spent downloading and stripping batches.
    pub fetch_duration_ms: u64,
    /// Time spent merging batches into the output.
    pub merge_duration_ms: u64,
    /// Wall-clock time for the whole run.
    pub total_duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_serialises_to_json() {
        let out = DownloadOutput {
            output_path: PathBuf::from("/tmp/doc.pdf"),
            range: PageRange::new(12, 47).unwrap(),
            range_detected: true,
            stats: DownloadStats {
                batches: 2,
                total_pages: 36,
                bytes_downloaded: 1024,
                detect_duration_ms: 80,
                fetch_duration_ms: 900,
                merge_duration_ms: 40,
                total_duration_ms: 1020,
            },
        };
        let json = serde_json::to_string(&out).unwrap();
        assert!(json.contains("\"batches\":2"));
        assert!(json.contains("\"start\":12"));
        assert!(json.contains("doc.pdf"));
    }
}
