//! # kramerius-dl
//!
//! Download paginated scanned documents from Kramerius digital-library
//! servers as a single PDF.
//!
//! ## Why this crate?
//!
//! Kramerius instances serve scanned documents page-range by page-range:
//! there is no "download the whole document" endpoint, the valid page range
//! is only published inside the human-readable detail page, and every batch
//! the server produces carries a spurious leading cover page. This crate
//! hides all of that: it scrapes the range when you don't know it, fetches
//! the document in bounded batches, strips the cover pages with `pdftk`,
//! and merges everything into one PDF with `pdfunite`.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document id
//!  │
//!  ├─ 1. Detect    scrape first/last page off the detail page
//!  │               (skipped when --from/--to are both given)
//!  ├─ 2. Plan      split the window into batches of at most `limit` pages
//!  ├─ 3. Fetch     stream each batch to scratch, drop its leading page
//!  └─ 4. Assemble  merge the batches, in page order, into the output
//! ```
//!
//! The pipeline is strictly sequential and single-pass: one request at a
//! time, first failure aborts the run, nothing is retried.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kramerius_dl::{download, DownloadConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Range detected from the detail page; pdftk/pdfunite found on PATH.
//!     let config = DownloadConfig::default();
//!     let output = download("23022", "dejiny.pdf", &config).await?;
//!     eprintln!(
//!         "pages {}-{} in {} batches",
//!         output.range.start, output.range.end, output.stats.batches
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `kramerius-dl` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! kramerius-dl = { version = "0.2", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod download;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod tools;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{DocumentRef, DownloadConfig, DownloadConfigBuilder, DEFAULT_BASE_URL, DEFAULT_BATCH_LIMIT};
pub use download::{download, download_sync};
pub use error::KrameriusError;
pub use output::{DownloadOutput, DownloadStats};
pub use pipeline::plan::{Batch, BatchPlan, PageRange};
pub use progress::{DownloadProgressCallback, NoopProgressCallback, ProgressCallback};
pub use tools::{CliPdfTools, PdfTools};
