//! Error types for the kramerius-dl library.
//!
//! Every variant corresponds to one failure mode of one pipeline stage, and
//! every failure is fatal: the run aborts at the first error, nothing is
//! retried, and no partial output is produced. The variant names carry the
//! stage, so the CLI can print a stage-identifying message without any
//! additional bookkeeping.
//!
//! The scratch directory holding already-downloaded batches is deliberately
//! kept on failure (its path is logged at warn level), so a failed run can
//! be inspected after the fact.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the kramerius-dl library.
#[derive(Debug, Error)]
pub enum KrameriusError {
    // ── Range detection ───────────────────────────────────────────────────
    /// The detail-page request failed (network error or non-2xx status).
    #[error("Failed to fetch the document detail page '{url}': {reason}\nCheck the server URL (--url) and your network connection.")]
    DetailRequestFailed { url: String, reason: String },

    /// The detail page was fetched but does not carry the expected
    /// page-range form field. Fatal when no explicit range was supplied.
    #[error("Detail page '{url}' does not expose a page range (field '{field}' not found).\nPass the range explicitly with --from and --to.")]
    PageRangeNotFound { url: String, field: &'static str },

    // ── Planning ──────────────────────────────────────────────────────────
    /// The resolved page range is empty or reversed.
    #[error("Invalid page range {start}-{end}: the end page must not precede the start page")]
    InvalidRange { start: u32, end: u32 },

    // ── Batch fetching ────────────────────────────────────────────────────
    /// A batch download failed (network error, non-2xx status, or a broken
    /// body stream). The whole run aborts; batches are never retried.
    #[error("Failed to download pages {first_page}-{last_page} from '{url}': {reason}")]
    BatchDownloadFailed {
        url: String,
        first_page: u32,
        last_page: u32,
        reason: String,
    },

    /// Could not write a downloaded batch to the scratch directory.
    #[error("Failed to write batch file '{path}': {source}")]
    BatchWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// pdftk exited non-zero (or could not be spawned) while removing the
    /// spurious leading page from a batch.
    #[error("Failed to strip the leading page of '{path}': {detail}")]
    PageStripFailed { path: PathBuf, detail: String },

    // ── Assembly ──────────────────────────────────────────────────────────
    /// pdfunite exited non-zero (or could not be spawned) while merging the
    /// batch files into the final output.
    #[error("Failed to merge batches into '{path}': {detail}")]
    MergeFailed { path: PathBuf, detail: String },

    // ── Environment ───────────────────────────────────────────────────────
    /// A required external tool is not on the PATH.
    #[error("Required tool '{tool}' was not found on PATH.\nInstall it (e.g. apt install pdftk poppler-utils) or pass an explicit path.")]
    ToolNotFound { tool: &'static str },

    // ── Config ────────────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
