//! Progress-callback trait for per-stage download events.
//!
//! Inject an [`Arc<dyn DownloadProgressCallback>`] via
//! [`crate::config::DownloadConfigBuilder::progress_callback`] to receive
//! real-time events as the pipeline moves through its stages.
//!
//! # Why callbacks instead of an unbuffered output stream?
//!
//! The original tool wrapped stdout in an unbuffering shim so dots and stage
//! lines appeared immediately. A callback is the least-invasive equivalent:
//! the library stays silent on stdout, and the host application decides how
//! to surface events (the bundled CLI renders a terminal progress bar).
//! The trait is `Send + Sync` so a callback can be shared freely, even
//! though the pipeline itself drives events from a single sequential task.

use std::sync::Arc;

/// Called by the download pipeline as it progresses through its stages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Batch indices are 0-based; page numbers are the
/// 1-based positions within the requested window that go on the wire.
pub trait DownloadProgressCallback: Send + Sync {
    /// Called when page-range detection starts (only when at least one
    /// bound was not supplied explicitly).
    fn on_detect_start(&self) {}

    /// Called once the full page range is known.
    ///
    /// `detected` is true when at least one bound came from the detail page
    /// rather than from explicit input.
    fn on_range_resolved(&self, start: u32, end: u32, detected: bool) {
        let _ = (start, end, detected);
    }

    /// Called once after planning, before the first batch request.
    fn on_download_start(&self, total_batches: usize) {
        let _ = total_batches;
    }

    /// Called just before a batch request is sent.
    fn on_batch_start(&self, index: usize, total_batches: usize, first_page: u32, last_page: u32) {
        let _ = (index, total_batches, first_page, last_page);
    }

    /// Called repeatedly while a batch body streams in.
    ///
    /// `bytes_downloaded` is cumulative for the current batch.
    fn on_batch_progress(&self, index: usize, bytes_downloaded: u64) {
        let _ = (index, bytes_downloaded);
    }

    /// Called when a batch has been downloaded and its leading page
    /// stripped.
    fn on_batch_complete(&self, index: usize, total_batches: usize, bytes: u64) {
        let _ = (index, total_batches, bytes);
    }

    /// Called once before the merge tool runs.
    fn on_merge_start(&self, artifact_count: usize) {
        let _ = artifact_count;
    }

    /// Called once after the final output has been written.
    fn on_download_complete(&self, total_batches: usize, total_bytes: u64) {
        let _ = (total_batches, total_bytes);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl DownloadProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in
/// [`crate::config::DownloadConfig`].
pub type ProgressCallback = Arc<dyn DownloadProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        batches_started: AtomicUsize,
        batches_completed: AtomicUsize,
        bytes_seen: AtomicU64,
        merges: AtomicUsize,
    }

    impl DownloadProgressCallback for TrackingCallback {
        fn on_batch_start(&self, _index: usize, _total: usize, _first: u32, _last: u32) {
            self.batches_started.fetch_add(1, Ordering::SeqCst);
        }

        fn on_batch_complete(&self, _index: usize, _total: usize, bytes: u64) {
            self.batches_completed.fetch_add(1, Ordering::SeqCst);
            self.bytes_seen.fetch_add(bytes, Ordering::SeqCst);
        }

        fn on_merge_start(&self, _artifact_count: usize) {
            self.merges.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_detect_start();
        cb.on_range_resolved(1, 45, true);
        cb.on_download_start(3);
        cb.on_batch_start(0, 3, 1, 20);
        cb.on_batch_progress(0, 2048);
        cb.on_batch_complete(0, 3, 4096);
        cb.on_merge_start(3);
        cb.on_download_complete(3, 12288);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let cb = TrackingCallback::default();

        cb.on_batch_start(0, 2, 1, 20);
        cb.on_batch_complete(0, 2, 100);
        cb.on_batch_start(1, 2, 21, 25);
        cb.on_batch_complete(1, 2, 50);
        cb.on_merge_start(2);

        assert_eq!(cb.batches_started.load(Ordering::SeqCst), 2);
        assert_eq!(cb.batches_completed.load(Ordering::SeqCst), 2);
        assert_eq!(cb.bytes_seen.load(Ordering::SeqCst), 150);
        assert_eq!(cb.merges.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn DownloadProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_download_start(5);
        cb.on_batch_start(0, 5, 1, 10);
    }
}
