//! Batch download: stream one page window to disk and strip its cover page.
//!
//! ## The leading-page quirk
//!
//! The on-the-fly PDF endpoint prepends one extra page (a server-generated
//! cover sheet) to every batch it serves: a request for pages 1-20 comes
//! back as a 21-page document. Concatenating raw batches would therefore
//! sprinkle cover sheets through the output, so after the raw bytes are on
//! disk the strip tool keeps pages `2..=(n+1)` of the raw file and the raw
//! intermediate is deleted.
//!
//! Batch files are named by their zero-padded first local page
//! (`00021` raw, `00021.pdf` stripped) so that lexical and numeric ordering
//! agree when the assembler later collects them.

use crate::config::DocumentRef;
use crate::error::KrameriusError;
use crate::pipeline::plan::Batch;
use crate::progress::ProgressCallback;
use crate::tools::PdfTools;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Download one batch into `scratch` and return the stripped artifact path
/// together with the number of raw bytes received.
///
/// Any transport failure, including one in the middle of the body stream,
/// aborts the run; batches are never retried.
pub async fn fetch_batch(
    client: &reqwest::Client,
    doc: &DocumentRef,
    batch: &Batch,
    scratch: &Path,
    tools: &dyn PdfTools,
    progress: Option<&ProgressCallback>,
) -> Result<(PathBuf, u64), KrameriusError> {
    let url = doc.download_url(batch.first_page, batch.last_page);
    let raw_path = scratch.join(format!("{:05}", batch.first_page));
    debug!("Downloading batch {} from {}", batch.index, url);

    let transport_err = |reason: String| KrameriusError::BatchDownloadFailed {
        url: url.clone(),
        first_page: batch.first_page,
        last_page: batch.last_page,
        reason,
    };

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| transport_err(e.to_string()))?;

    if !response.status().is_success() {
        return Err(transport_err(format!("HTTP {}", response.status())));
    }

    // Stream the body chunk-by-chunk; batches can be tens of megabytes and
    // there is no reason to hold one in memory.
    let mut file = tokio::fs::File::create(&raw_path)
        .await
        .map_err(|e| KrameriusError::BatchWriteFailed {
            path: raw_path.clone(),
            source: e,
        })?;

    let mut stream = response.bytes_stream();
    let mut bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| transport_err(e.to_string()))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| KrameriusError::BatchWriteFailed {
                path: raw_path.clone(),
                source: e,
            })?;
        bytes += chunk.len() as u64;
        if let Some(cb) = progress {
            cb.on_batch_progress(batch.index, bytes);
        }
    }
    file.flush()
        .await
        .map_err(|e| KrameriusError::BatchWriteFailed {
            path: raw_path.clone(),
            source: e,
        })?;
    drop(file);

    // The server always prepends one spurious page, so a batch of n pages
    // arrives as n+1 pages; keep 2..=(n+1).
    let artifact = raw_path.with_extension("pdf");
    let end_page = batch.page_count() + 1;
    tools.strip_leading(&raw_path, end_page, &artifact).await?;

    tokio::fs::remove_file(&raw_path)
        .await
        .map_err(|e| KrameriusError::BatchWriteFailed {
            path: raw_path.clone(),
            source: e,
        })?;

    debug!(
        "Batch {} complete: {} bytes -> {}",
        batch.index,
        bytes,
        artifact.display()
    );
    Ok((artifact, bytes))
}
