//! External PDF tool invocation: page stripping and merging.
//!
//! Page manipulation is delegated to two trusted, pre-existing tools:
//! `pdftk` drops the spurious leading page from every downloaded batch, and
//! `pdfunite` concatenates the batch files into the final output. The
//! pipeline only ever needs those two operations, so they are modelled as a
//! narrow [`PdfTools`] trait; the production implementation shells out,
//! while tests inject a recording fake and never spawn a process.

use crate::error::KrameriusError;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// The two external page-manipulation operations the pipeline relies on.
#[async_trait]
pub trait PdfTools: Send + Sync {
    /// Drop the first page of `input`, keeping pages `2..=end_page`, and
    /// write the result to `output`. `input` is left untouched.
    async fn strip_leading(
        &self,
        input: &Path,
        end_page: u32,
        output: &Path,
    ) -> Result<(), KrameriusError>;

    /// Concatenate `inputs`, in the order given, into `output`.
    async fn unite(&self, inputs: &[PathBuf], output: &Path) -> Result<(), KrameriusError>;
}

// ── Command lines ────────────────────────────────────────────────────────

/// Arguments for `pdftk {input} cat 2-{end} output {output}`.
fn pdftk_args(input: &Path, end_page: u32, output: &Path) -> Vec<OsString> {
    vec![
        input.as_os_str().to_os_string(),
        OsString::from("cat"),
        OsString::from(format!("2-{end_page}")),
        OsString::from("output"),
        output.as_os_str().to_os_string(),
    ]
}

/// Arguments for `pdfunite {input...} {output}`.
fn pdfunite_args(inputs: &[PathBuf], output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = inputs
        .iter()
        .map(|p| p.as_os_str().to_os_string())
        .collect();
    args.push(output.as_os_str().to_os_string());
    args
}

// ── CLI implementation ───────────────────────────────────────────────────

/// Production [`PdfTools`] implementation executing the external `pdftk`
/// and `pdfunite` binaries.
///
/// # Examples
///
/// ```no_run
/// use kramerius_dl::CliPdfTools;
/// use std::path::PathBuf;
///
/// // Explicit paths
/// let tools = CliPdfTools::new(
///     PathBuf::from("/usr/bin/pdftk"),
///     PathBuf::from("/usr/bin/pdfunite"),
/// );
///
/// // Or auto-discover both from PATH
/// let tools = CliPdfTools::from_path().expect("pdftk/pdfunite not found in PATH");
/// ```
pub struct CliPdfTools {
    pdftk_path: PathBuf,
    pdfunite_path: PathBuf,
}

impl CliPdfTools {
    /// Create a handler with explicit binary paths.
    pub fn new(pdftk_path: PathBuf, pdfunite_path: PathBuf) -> Self {
        Self {
            pdftk_path,
            pdfunite_path,
        }
    }

    /// Discover both binaries on PATH.
    ///
    /// Returns [`KrameriusError::ToolNotFound`] naming the first missing
    /// tool.
    pub fn from_path() -> Result<Self, KrameriusError> {
        let pdftk_path =
            which::which("pdftk").map_err(|_| KrameriusError::ToolNotFound { tool: "pdftk" })?;
        let pdfunite_path = which::which("pdfunite")
            .map_err(|_| KrameriusError::ToolNotFound { tool: "pdfunite" })?;
        Ok(Self::new(pdftk_path, pdfunite_path))
    }

    /// Use the given binary paths where supplied, discovering the rest on
    /// PATH.
    pub fn with_overrides(
        pdftk: Option<PathBuf>,
        pdfunite: Option<PathBuf>,
    ) -> Result<Self, KrameriusError> {
        let pdftk_path = match pdftk {
            Some(path) => path,
            None => {
                which::which("pdftk").map_err(|_| KrameriusError::ToolNotFound { tool: "pdftk" })?
            }
        };
        let pdfunite_path = match pdfunite {
            Some(path) => path,
            None => which::which("pdfunite")
                .map_err(|_| KrameriusError::ToolNotFound { tool: "pdfunite" })?,
        };
        Ok(Self::new(pdftk_path, pdfunite_path))
    }

    async fn run(binary: &Path, args: &[OsString]) -> Result<(), String> {
        let output = Command::new(binary)
            .args(args)
            .output()
            .await
            .map_err(|e| format!("failed to execute {}: {}", binary.display(), e))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(format!(
                "{} exited with {}: {}",
                binary.display(),
                output.status,
                stderr.trim()
            ))
        }
    }
}

#[async_trait]
impl PdfTools for CliPdfTools {
    async fn strip_leading(
        &self,
        input: &Path,
        end_page: u32,
        output: &Path,
    ) -> Result<(), KrameriusError> {
        Self::run(&self.pdftk_path, &pdftk_args(input, end_page, output))
            .await
            .map_err(|detail| KrameriusError::PageStripFailed {
                path: input.to_path_buf(),
                detail,
            })
    }

    async fn unite(&self, inputs: &[PathBuf], output: &Path) -> Result<(), KrameriusError> {
        Self::run(&self.pdfunite_path, &pdfunite_args(inputs, output))
            .await
            .map_err(|detail| KrameriusError::MergeFailed {
                path: output.to_path_buf(),
                detail,
            })
    }
}

/// Recording fake for unit tests elsewhere in the crate: captures every
/// invocation instead of spawning processes, and fabricates output files so
/// downstream stages have something to look at.
#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub(crate) struct RecordingTools {
        pub strips: Mutex<Vec<(PathBuf, u32, PathBuf)>>,
        pub unites: Mutex<Vec<(Vec<PathBuf>, PathBuf)>>,
        fail_strip: bool,
    }

    impl RecordingTools {
        pub(crate) fn failing_strip() -> Self {
            Self {
                fail_strip: true,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl PdfTools for RecordingTools {
        async fn strip_leading(
            &self,
            input: &Path,
            end_page: u32,
            output: &Path,
        ) -> Result<(), KrameriusError> {
            self.strips.lock().unwrap().push((
                input.to_path_buf(),
                end_page,
                output.to_path_buf(),
            ));
            if self.fail_strip {
                return Err(KrameriusError::PageStripFailed {
                    path: input.to_path_buf(),
                    detail: "forced failure".into(),
                });
            }
            tokio::fs::copy(input, output)
                .await
                .map_err(|e| KrameriusError::Internal(e.to_string()))?;
            Ok(())
        }

        async fn unite(
            &self,
            inputs: &[PathBuf],
            output: &Path,
        ) -> Result<(), KrameriusError> {
            self.unites
                .lock()
                .unwrap()
                .push((inputs.to_vec(), output.to_path_buf()));
            let mut merged = Vec::new();
            for input in inputs {
                let part = tokio::fs::read(input)
                    .await
                    .map_err(|e| KrameriusError::Internal(e.to_string()))?;
                merged.extend_from_slice(&part);
            }
            tokio::fs::write(output, merged)
                .await
                .map_err(|e| KrameriusError::Internal(e.to_string()))?;
            Ok(())
        }
    }
}
