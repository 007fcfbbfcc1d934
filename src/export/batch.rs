//! Folder-to-folder conversion.
//!
//! One file at a time: read, decode, render, then write the PDF atomically
//! next to its siblings. A failing file is recorded and skipped; nothing
//! stops the batch once it has started.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{ConvertError, Result};
use crate::export::pdf::{render_pdf, RenderOptions};
use crate::i18n;
use crate::parser::read_message;

/// Name of the output folder created inside the input folder by default.
pub const DEFAULT_OUTPUT_DIR: &str = "pdf_output";

/// Extension of the files picked up from the input folder.
pub const DEFAULT_EXTENSION: &str = "eml";

/// `<input_dir>/pdf_output`.
pub fn default_output_dir(input_dir: &Path) -> PathBuf {
    input_dir.join(DEFAULT_OUTPUT_DIR)
}

/// The files a batch will convert, and where the PDFs go.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Input files in sorted order.
    pub files: Vec<PathBuf>,
}

/// List the `.eml` files of `input_dir`.
pub fn plan_batch(input_dir: &Path, output_dir: &Path) -> Result<BatchPlan> {
    plan_batch_matching(input_dir, output_dir, DEFAULT_EXTENSION)
}

/// List the files of `input_dir` whose extension matches `extension`
/// (case-insensitive, without the dot). Sub-folders are not descended.
pub fn plan_batch_matching(input_dir: &Path, output_dir: &Path, extension: &str) -> Result<BatchPlan> {
    if !input_dir.is_dir() {
        return Err(ConvertError::InputFolderMissing(input_dir.to_path_buf()));
    }

    let entries = std::fs::read_dir(input_dir).map_err(|e| ConvertError::unreadable(input_dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                warn!(dir = %input_dir.display(), error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    info!(
        input = %input_dir.display(),
        output = %output_dir.display(),
        files = files.len(),
        "Planned batch"
    );
    Ok(BatchPlan {
        input_dir: input_dir.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        files,
    })
}

/// `<output_dir>/<stem>.pdf` for an input file.
pub fn output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "message".into());
    let mut name = stem;
    name.push(".pdf");
    output_dir.join(name)
}

/// Convert one message file into `<output_dir>/<stem>.pdf`.
///
/// Returns the output path and its size. On error no output file is left
/// behind.
pub fn convert_file(input: &Path, output_dir: &Path, options: &RenderOptions) -> Result<(PathBuf, u64)> {
    let record = read_message(input)?;
    let pdf = render_pdf(&record, options).map_err(|source| ConvertError::Render {
        path: input.to_path_buf(),
        source,
    })?;

    let output = output_path(input, output_dir);
    write_atomic(&output, &pdf)?;
    info!(input = %input.display(), output = %output.display(), bytes = pdf.len(), "Converted");
    Ok((output, pdf.len() as u64))
}

/// Write through a temporary file in the destination folder, then rename it
/// over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::Builder::new()
        .prefix(".eml2pdf-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| ConvertError::write(path, e))?;
    tmp.write_all(bytes).map_err(|e| ConvertError::write(path, e))?;
    tmp.persist(path).map_err(|e| ConvertError::write(path, e.error))?;
    Ok(())
}

/// Result of converting one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Converted {
        input: PathBuf,
        output: PathBuf,
        bytes: u64,
    },
    Failed {
        input: PathBuf,
        error: String,
    },
}

impl FileOutcome {
    pub fn input(&self) -> &Path {
        match self {
            Self::Converted { input, .. } | Self::Failed { input, .. } => input,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Converted { .. })
    }

    /// File name of the input, for display.
    pub fn file_name(&self) -> String {
        self.input()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.input().display().to_string())
    }
}

/// Totals reported when a batch ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub output_dir: PathBuf,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Combined size of the written PDFs.
    pub output_bytes: u64,
    pub outcomes: Vec<FileOutcome>,
}

impl BatchSummary {
    /// One-line localized result, e.g. `Done: 3/4 succeeded, 1 failed`.
    pub fn headline(&self) -> String {
        let mut line = format!(
            "{}: {}/{} {}",
            i18n::msg_summary_done(),
            self.succeeded,
            self.total,
            i18n::msg_succeeded()
        );
        if self.failed > 0 {
            line.push_str(&format!(", {} {}", self.failed, i18n::msg_failed()));
        }
        line
    }

    fn record(&mut self, outcome: FileOutcome) {
        match &outcome {
            FileOutcome::Converted { bytes, .. } => {
                self.succeeded += 1;
                self.output_bytes += bytes;
            }
            FileOutcome::Failed { .. } => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }
}

/// A running batch, advanced one file per [`Batch::step`].
#[derive(Debug)]
pub struct Batch {
    files: Vec<PathBuf>,
    output_dir: PathBuf,
    options: RenderOptions,
    next: usize,
    summary: BatchSummary,
}

impl Batch {
    /// Create the output folder and prepare to convert the planned files.
    pub fn start(plan: BatchPlan, options: RenderOptions) -> Result<Self> {
        std::fs::create_dir_all(&plan.output_dir).map_err(|e| ConvertError::write(&plan.output_dir, e))?;
        let summary = BatchSummary {
            output_dir: plan.output_dir.clone(),
            total: plan.files.len(),
            ..BatchSummary::default()
        };
        Ok(Self {
            files: plan.files,
            output_dir: plan.output_dir,
            options,
            next: 0,
            summary,
        })
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }

    /// Number of files processed so far.
    pub fn done(&self) -> usize {
        self.next
    }

    pub fn is_finished(&self) -> bool {
        self.next >= self.files.len()
    }

    /// The file the next [`Batch::step`] will convert.
    pub fn current_file(&self) -> Option<&Path> {
        self.files.get(self.next).map(PathBuf::as_path)
    }

    pub fn summary(&self) -> &BatchSummary {
        &self.summary
    }

    pub fn into_summary(self) -> BatchSummary {
        self.summary
    }

    /// Convert the next file. Returns `None` once every file was processed.
    pub fn step(&mut self) -> Option<FileOutcome> {
        let input = self.files.get(self.next)?.clone();
        self.next += 1;

        let outcome = match convert_file(&input, &self.output_dir, &self.options) {
            Ok((output, bytes)) => FileOutcome::Converted { input, output, bytes },
            Err(e) => {
                warn!(error = %e, "Conversion failed");
                FileOutcome::Failed {
                    input,
                    error: e.to_string(),
                }
            }
        };
        self.summary.record(outcome.clone());
        Some(outcome)
    }

    /// Convert every remaining file.
    ///
    /// The progress callback receives `(done, total, outcome)` after each file.
    pub fn run(mut self, progress: &dyn Fn(usize, usize, &FileOutcome)) -> BatchSummary {
        let total = self.total();
        while let Some(outcome) = self.step() {
            progress(self.next, total, &outcome);
        }
        info!(
            succeeded = self.summary.succeeded,
            failed = self.summary.failed,
            "Batch finished"
        );
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESSAGE: &[u8] = b"From: a@example.com\nSubject: Hi\n\nbody\n";

    #[test]
    fn test_default_output_dir() {
        assert_eq!(
            default_output_dir(Path::new("/mail")),
            PathBuf::from("/mail/pdf_output")
        );
    }

    #[test]
    fn test_output_path_replaces_extension() {
        assert_eq!(
            output_path(Path::new("/in/report.EML"), Path::new("/out")),
            PathBuf::from("/out/report.pdf")
        );
    }

    #[test]
    fn test_plan_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = plan_batch(&missing, &default_output_dir(&missing)).unwrap_err();
        assert!(matches!(err, ConvertError::InputFolderMissing(_)));
    }

    #[test]
    fn test_plan_lists_eml_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.eml", "a.EML", "notes.txt"] {
            std::fs::write(dir.path().join(name), MESSAGE).unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.eml")).unwrap();

        let plan = plan_batch(dir.path(), &default_output_dir(dir.path())).unwrap();
        let names: Vec<_> = plan
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.EML", "b.eml"]);
    }

    #[test]
    fn test_step_records_failures_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("1-good.eml"), MESSAGE).unwrap();
        std::fs::write(dir.path().join("2-empty.eml"), b"").unwrap();
        std::fs::write(dir.path().join("3-good.eml"), MESSAGE).unwrap();

        let out = default_output_dir(dir.path());
        let plan = plan_batch(dir.path(), &out).unwrap();
        let mut batch = Batch::start(plan, RenderOptions::default()).unwrap();
        assert_eq!(batch.total(), 3);

        assert!(batch.step().unwrap().is_success());
        assert!(!batch.step().unwrap().is_success());
        assert!(batch.step().unwrap().is_success());
        assert!(batch.step().is_none());
        assert!(batch.is_finished());

        let summary = batch.into_summary();
        assert_eq!((summary.succeeded, summary.failed), (2, 1));
        assert!(out.join("1-good.pdf").is_file());
        assert!(!out.join("2-empty.pdf").exists());

        // Only the two PDFs, no leftover temporary files
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 2);
    }

    #[test]
    fn test_run_reports_progress() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.eml"), MESSAGE).unwrap();
        std::fs::write(dir.path().join("b.eml"), MESSAGE).unwrap();

        let plan = plan_batch(dir.path(), &dir.path().join("out")).unwrap();
        let batch = Batch::start(plan, RenderOptions::default()).unwrap();
        let calls = std::cell::RefCell::new(Vec::new());
        let summary = batch.run(&|done, total, _| calls.borrow_mut().push((done, total)));

        assert_eq!(calls.into_inner(), vec![(1, 2), (2, 2)]);
        assert_eq!(summary.total, 2);
        assert!(summary.output_bytes > 0);
    }
}
