//! Configuration types for a document download run.
//!
//! All run behaviour is controlled through [`DownloadConfig`], built via its
//! [`DownloadConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share a config between the CLI and library callers, serialise
//! the plain parts for logging, and diff two runs to understand why their
//! outputs differ.
//!
//! # Design choice: builder over constructor
//! The original tool grew its knobs one positional argument at a time. A
//! builder lets callers set only what they care about and rely on documented
//! defaults for the rest, and gives us one place to validate cross-field
//! constraints before a run starts.

use crate::error::KrameriusError;
use crate::progress::ProgressCallback;
use crate::tools::PdfTools;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Base URL of the public Kramerius instance used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://kramerius.nkp.cz/kramerius/";

/// Default maximum number of pages requested in one batch download.
///
/// The on-the-fly PDF endpoint refuses (or times out on) large ranges, so
/// documents are fetched in windows of at most this many pages.
pub const DEFAULT_BATCH_LIMIT: u32 = 20;

// ── DocumentRef ──────────────────────────────────────────────────────────

/// Identifies one remote document on one server instance.
///
/// Owns the URL construction for both endpoints this crate talks to, so the
/// endpoint formats live in exactly one place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRef {
    /// Server-side document identifier, passed through verbatim.
    pub id: String,
    /// Base URL of the Kramerius instance, normalised to end with `/`.
    pub base_url: String,
}

impl DocumentRef {
    /// Create a reference, normalising the base URL to a single trailing `/`.
    pub fn new(id: impl Into<String>, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            id: id.into(),
            base_url,
        }
    }

    /// URL of the human-readable detail page carrying the page-range fields.
    pub fn detail_url(&self) -> String {
        format!("{}MShowMonograph.do?id={}", self.base_url, self.id)
    }

    /// URL of the range-download endpoint for one batch.
    ///
    /// `first` and `last` are 1-based positions within the requested window
    /// (counts of pages into the window), not absolute document page ids.
    pub fn download_url(&self, first: u32, last: u32) -> String {
        format!(
            "{}ontheflypdf_MGetPdf?app=9&id={}&start={}&end={}",
            self.base_url, self.id, first, last
        )
    }
}

// ── DownloadConfig ───────────────────────────────────────────────────────

/// Configuration for a download run.
///
/// Built via [`DownloadConfig::builder()`] or [`DownloadConfig::default()`].
///
/// # Example
/// ```rust
/// use kramerius_dl::DownloadConfig;
///
/// let config = DownloadConfig::builder()
///     .base_url("http://kramerius.mzk.cz/kramerius/")
///     .from(12)
///     .to(47)
///     .limit(10)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct DownloadConfig {
    /// Base URL of the Kramerius instance. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// Explicit first page. When `None`, detection fills it in.
    pub from: Option<u32>,

    /// Explicit last page. When `None`, detection fills it in.
    pub to: Option<u32>,

    /// Maximum pages per batch download. Default: [`DEFAULT_BATCH_LIMIT`].
    ///
    /// Always at least 1; the builder clamps smaller values.
    pub limit: u32,

    /// Per-request timeout in seconds. Default: `None`.
    ///
    /// `None` means the transport's own defaults apply and a hung request
    /// hangs the run, matching the original tool. Set it when talking to a
    /// flaky instance.
    pub timeout_secs: Option<u64>,

    /// External page-manipulation tools. When `None`, `pdftk` and
    /// `pdfunite` are discovered on PATH at the start of the run.
    pub tools: Option<Arc<dyn PdfTools>>,

    /// Progress observer. When `None`, the run is silent apart from tracing.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            from: None,
            to: None,
            limit: DEFAULT_BATCH_LIMIT,
            timeout_secs: None,
            tools: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for DownloadConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadConfig")
            .field("base_url", &self.base_url)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("limit", &self.limit)
            .field("timeout_secs", &self.timeout_secs)
            .field("tools", &self.tools.as_ref().map(|_| "<dyn PdfTools>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl DownloadConfig {
    /// Create a new builder for `DownloadConfig`.
    pub fn builder() -> DownloadConfigBuilder {
        DownloadConfigBuilder {
            config: Self::default(),
        }
    }

    /// Build the [`DocumentRef`] for the given document id under this
    /// config's server instance.
    pub fn document_ref(&self, id: impl Into<String>) -> DocumentRef {
        DocumentRef::new(id, self.base_url.clone())
    }
}

/// Builder for [`DownloadConfig`].
#[derive(Debug)]
pub struct DownloadConfigBuilder {
    config: DownloadConfig,
}

impl DownloadConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn from(mut self, page: u32) -> Self {
        self.config.from = Some(page);
        self
    }

    pub fn to(mut self, page: u32) -> Self {
        self.config.to = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.config.limit = limit.max(1);
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = Some(secs);
        self
    }

    pub fn tools(mut self, tools: Arc<dyn PdfTools>) -> Self {
        self.config.tools = Some(tools);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<DownloadConfig, KrameriusError> {
        let c = &self.config;
        if c.base_url.is_empty() {
            return Err(KrameriusError::InvalidConfig(
                "Server base URL must not be empty".into(),
            ));
        }
        if let Some(from) = c.from {
            if from < 1 {
                return Err(KrameriusError::InvalidConfig(format!(
                    "Pages are 1-indexed, --from must be >= 1 (got {from})"
                )));
            }
        }
        if let (Some(from), Some(to)) = (c.from, c.to) {
            if to < from {
                return Err(KrameriusError::InvalidRange {
                    start: from,
                    end: to,
                });
            }
        }
        Ok(self.config)
    }
}
