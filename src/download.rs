//! Download entry points: the sequential pipeline controller.
//!
//! One run is a single pass through four stages: resolve the page range
//! (explicit bounds or detail-page detection), plan batches, fetch each
//! batch strictly in order, merge once. Every network call and every
//! external process is awaited to completion before the next starts; the
//! first failure at any stage aborts the whole run. There is no retry, no
//! partial-success mode, and no resumption across runs.

use crate::config::{DocumentRef, DownloadConfig};
use crate::error::KrameriusError;
use crate::output::{DownloadOutput, DownloadStats};
use crate::pipeline::plan::{BatchPlan, PageRange};
use crate::pipeline::{assemble, detect, fetch};
use crate::tools::{CliPdfTools, PdfTools};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tempfile::TempDir;
use tracing::{info, warn};

/// Download document `id` and write the merged PDF to `output`.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `id` — server-side document identifier
/// * `output` — path of the final merged PDF
/// * `config` — run configuration (server instance, bounds, batch limit)
///
/// # Errors
/// Any stage failure aborts the run and is returned as the matching
/// [`KrameriusError`] variant. The scratch directory holding the batches
/// downloaded so far is kept on failure; its path is logged at warn level.
pub async fn download(
    id: impl AsRef<str>,
    output: impl AsRef<Path>,
    config: &DownloadConfig,
) -> Result<DownloadOutput, KrameriusError> {
    let total_start = Instant::now();
    let id = id.as_ref();
    let output = output.as_ref();
    info!("Starting download of document {} from {}", id, config.base_url);

    // ── Step 1: Transport + collaborators ────────────────────────────────
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(std::time::Duration::from_secs(secs));
    }
    let client = builder
        .build()
        .map_err(|e| KrameriusError::Internal(format!("HTTP client: {e}")))?;

    let doc = config.document_ref(id);

    // Discover the external tools before any network traffic, so a missing
    // pdftk fails the run immediately rather than after megabytes of
    // downloads.
    let tools: Arc<dyn PdfTools> = match &config.tools {
        Some(tools) => Arc::clone(tools),
        None => Arc::new(CliPdfTools::from_path()?),
    };

    // ── Step 2: Resolve the page range ───────────────────────────────────
    let detect_start = Instant::now();
    let (range, range_detected) = if let (Some(from), Some(to)) = (config.from, config.to) {
        (PageRange::new(from, to)?, false)
    } else {
        if let Some(cb) = &config.progress_callback {
            cb.on_detect_start();
        }
        let detected = detect::detect_range(&client, &doc).await?;
        let range = PageRange::new(
            config.from.unwrap_or(detected.start),
            config.to.unwrap_or(detected.end),
        )?;
        (range, true)
    };
    let detect_duration_ms = if range_detected {
        detect_start.elapsed().as_millis() as u64
    } else {
        0
    };
    info!("Downloading pages in range {}-{}", range.start, range.end);
    if let Some(cb) = &config.progress_callback {
        cb.on_range_resolved(range.start, range.end, range_detected);
    }

    // ── Step 3: Plan batches ─────────────────────────────────────────────
    let plan = BatchPlan::new(range, config.limit)?;
    let total_batches = plan.batch_count();
    if let Some(cb) = &config.progress_callback {
        cb.on_download_start(total_batches);
    }

    // ── Step 4: Scratch area ─────────────────────────────────────────────
    let scratch = TempDir::new()
        .map_err(|e| KrameriusError::Internal(format!("scratch directory: {e}")))?;

    // ── Steps 5+6: Fetch sequentially, then merge ────────────────────────
    let result = fetch_and_merge(&client, &doc, plan, scratch.path(), &*tools, output, config).await;

    let (bytes_downloaded, fetch_duration_ms, merge_duration_ms) = match result {
        Ok(r) => r,
        Err(e) => {
            // Keep what was downloaded so a failed run can be inspected.
            let kept = scratch.keep();
            warn!(
                "Run failed; scratch directory kept for inspection: {}",
                kept.display()
            );
            return Err(e);
        }
    };

    // ── Step 7: Stats ────────────────────────────────────────────────────
    let stats = DownloadStats {
        batches: total_batches,
        total_pages: range.total_pages(),
        bytes_downloaded,
        detect_duration_ms,
        fetch_duration_ms,
        merge_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        "Download complete: {} pages in {} batches, {} bytes, {}ms total",
        stats.total_pages, stats.batches, stats.bytes_downloaded, stats.total_duration_ms
    );
    if let Some(cb) = &config.progress_callback {
        cb.on_download_complete(total_batches, bytes_downloaded);
    }

    Ok(DownloadOutput {
        output_path: output.to_path_buf(),
        range,
        range_detected,
        stats,
    })
}

/// Synchronous wrapper around [`download`].
///
/// Creates a temporary tokio runtime internally.
pub fn download_sync(
    id: impl AsRef<str>,
    output: impl AsRef<Path>,
    config: &DownloadConfig,
) -> Result<DownloadOutput, KrameriusError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| KrameriusError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(download(id, output, config))
}

/// The failable middle of the run: every batch in order, then one merge.
///
/// Split out so [`download`] can keep the scratch directory alive on any
/// error that happens here.
async fn fetch_and_merge(
    client: &reqwest::Client,
    doc: &DocumentRef,
    plan: BatchPlan,
    scratch: &Path,
    tools: &dyn PdfTools,
    output: &Path,
    config: &DownloadConfig,
) -> Result<(u64, u64, u64), KrameriusError> {
    let total_batches = plan.batch_count();
    let fetch_start = Instant::now();
    let mut bytes_downloaded: u64 = 0;

    for batch in plan {
        info!(
            "Downloading pages [{}-{}] ({}/{})",
            batch.first_page,
            batch.last_page,
            batch.index + 1,
            total_batches
        );
        if let Some(cb) = &config.progress_callback {
            cb.on_batch_start(batch.index, total_batches, batch.first_page, batch.last_page);
        }
        let (_artifact, bytes) = fetch::fetch_batch(
            client,
            doc,
            &batch,
            scratch,
            tools,
            config.progress_callback.as_ref(),
        )
        .await?;
        bytes_downloaded += bytes;
        if let Some(cb) = &config.progress_callback {
            cb.on_batch_complete(batch.index, total_batches, bytes);
        }
    }
    let fetch_duration_ms = fetch_start.elapsed().as_millis() as u64;

    if let Some(cb) = &config.progress_callback {
        cb.on_merge_start(total_batches);
    }
    let merge_start = Instant::now();
    assemble::assemble(scratch, output, tools).await?;
    let merge_duration_ms = merge_start.elapsed().as_millis() as u64;

    Ok((bytes_downloaded, fetch_duration_ms, merge_duration_ms))
}
