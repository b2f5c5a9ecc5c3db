//! Pipeline stages for document retrieval and assembly.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets tests stub a
//! single stage (a mock HTTP server, a fake tool runner) without touching
//! the others.
//!
//! ## Data Flow
//!
//! ```text
//! detect ──▶ plan ──▶ fetch (per batch) ──▶ assemble
//! (scrape    (split    (stream + strip       (merge into
//!  range)     window)   leading page)         one PDF)
//! ```
//!
//! 1. [`detect`]   — scrape the valid page range off the document's detail
//!    page (skipped when both bounds are supplied explicitly)
//! 2. [`plan`]     — split the requested window into contiguous batches of
//!    at most `limit` pages
//! 3. [`fetch`]    — download one batch to the scratch directory and drop
//!    the server's spurious leading page
//! 4. [`assemble`] — merge all batch files, in page order, into the final
//!    output

pub mod assemble;
pub mod detect;
pub mod fetch;
pub mod plan;
