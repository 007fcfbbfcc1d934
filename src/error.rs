//! Centralized error types for eml2pdf.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while turning raw bytes into a [`MessageRecord`].
///
/// Charset and transfer-encoding problems are *not* errors: they degrade to
/// best-effort substitution. Only input that is not a message at all fails.
///
/// [`MessageRecord`]: crate::model::message::MessageRecord
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// The input contained no bytes.
    #[error("message is empty")]
    Empty,

    /// No RFC 5322 header field was found before the body.
    #[error("no header fields found, not an internet message")]
    NotAMessage,
}

/// Errors produced while building the PDF document.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The PDF object model could not be serialized.
    #[error("PDF generation failed: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Writing the serialized document failed.
    #[error("PDF write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced by the batch driver for a single file or folder.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The input file could not be opened or read.
    #[error("cannot read '{path}': {source}")]
    FileUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The input file is not a parseable message.
    #[error("cannot decode '{path}': {source}")]
    Decode { path: PathBuf, source: DecodeError },

    /// The PDF for this file could not be produced.
    #[error("cannot render '{path}': {source}")]
    Render { path: PathBuf, source: RenderError },

    /// The output file or folder could not be written.
    #[error("cannot write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The input folder does not exist or is not a directory.
    #[error("input folder not found: {0}")]
    InputFolderMissing(PathBuf),
}

/// Convenience alias for `Result<T, ConvertError>`.
pub type Result<T> = std::result::Result<T, ConvertError>;

impl ConvertError {
    /// Create a `FileUnreadable` variant from a path and an `io::Error`.
    pub fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileUnreadable {
            path: path.into(),
            source,
        }
    }

    /// Create a `Write` variant from a path and an `io::Error`.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}
