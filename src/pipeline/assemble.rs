//! Assembly: merge all stripped batch files into the final output.
//!
//! Ordering is the whole job here. Batch files are named by their first
//! local page, and the merge must follow page order, so the assembler sorts
//! by the numeric value of each file stem rather than trusting whatever
//! order the directory listing happens to return (which is unspecified, and
//! lexical ordering would put `10` before `9` anyway).

use crate::error::KrameriusError;
use crate::tools::PdfTools;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Merge every `*.pdf` batch artifact in `scratch` into `output`,
/// in ascending page order. Returns the number of merged artifacts.
pub async fn assemble(
    scratch: &Path,
    output: &Path,
    tools: &dyn PdfTools,
) -> Result<usize, KrameriusError> {
    let mut artifacts: Vec<(u32, PathBuf)> = Vec::new();

    let mut entries = tokio::fs::read_dir(scratch).await.map_err(|e| {
        KrameriusError::Internal(format!(
            "scratch directory '{}' unreadable: {e}",
            scratch.display()
        ))
    })?;
    while let Some(entry) = entries.next_entry().await.map_err(|e| {
        KrameriusError::Internal(format!(
            "scratch directory '{}' unreadable: {e}",
            scratch.display()
        ))
    })? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("pdf") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let Ok(first_page) = stem.parse::<u32>() else {
            continue;
        };
        artifacts.push((first_page, path));
    }

    if artifacts.is_empty() {
        return Err(KrameriusError::MergeFailed {
            path: output.to_path_buf(),
            detail: format!(
                "no batch files found in scratch directory '{}'",
                scratch.display()
            ),
        });
    }

    artifacts.sort_by_key(|(first_page, _)| *first_page);
    let inputs: Vec<PathBuf> = artifacts.into_iter().map(|(_, path)| path).collect();
    debug!("Merging {} batch files into {}", inputs.len(), output.display());

    tools.unite(&inputs, output).await?;
    Ok(inputs.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::fake::RecordingTools;

    async fn touch(dir: &Path, name: &str) {
        tokio::fs::write(dir.join(name), b"%PDF-part").await.unwrap();
    }

    #[tokio::test]
    async fn merges_in_numeric_order_not_lexical() {
        let scratch = tempfile::tempdir().unwrap();
        // Unpadded names on purpose: lexical order would be 1, 10, 2.
        touch(scratch.path(), "2.pdf").await;
        touch(scratch.path(), "10.pdf").await;
        touch(scratch.path(), "1.pdf").await;

        let tools = RecordingTools::default();
        let output = scratch.path().join("out.pdf");
        let merged = assemble(scratch.path(), &output, &tools).await.unwrap();
        assert_eq!(merged, 3);

        let unites = tools.unites.lock().unwrap();
        assert_eq!(unites.len(), 1, "exactly one merge invocation");
        let (inputs, out) = &unites[0];
        let names: Vec<_> = inputs
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["1.pdf", "2.pdf", "10.pdf"]);
        assert_eq!(out, &output);
    }

    #[tokio::test]
    async fn ignores_raw_and_foreign_files() {
        let scratch = tempfile::tempdir().unwrap();
        touch(scratch.path(), "00001.pdf").await;
        // A leftover raw intermediate and an unrelated file must not be
        // passed to the merge tool.
        touch(scratch.path(), "00021").await;
        touch(scratch.path(), "notes.txt").await;

        let tools = RecordingTools::default();
        let output = scratch.path().join("out.pdf");
        assemble(scratch.path(), &output, &tools).await.unwrap();

        let unites = tools.unites.lock().unwrap();
        assert_eq!(unites[0].0.len(), 1);
    }

    #[tokio::test]
    async fn empty_scratch_is_a_merge_failure() {
        let scratch = tempfile::tempdir().unwrap();
        let tools = RecordingTools::default();
        let err = assemble(scratch.path(), Path::new("/tmp/out.pdf"), &tools)
            .await
            .unwrap_err();
        assert!(matches!(err, KrameriusError::MergeFailed { .. }));
        assert!(tools.unites.lock().unwrap().is_empty());
    }
}
