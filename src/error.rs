//! Pipeline error types

use std::path::PathBuf;

use thiserror::Error;

use crate::document::DocumentError;
use crate::ocr::OcrError;

/// Fatal pipeline errors; no partial result is returned alongside them
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Opening or rendering a document for OCR failed
    #[error("Failed to rasterize {}: {source}", path.display())]
    Rasterization {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },

    /// The OCR batch call failed
    #[error("OCR failed: {0}")]
    Ocr(#[from] OcrError),

    /// Page filter, document and OCR output disagree
    #[error("Page filter mismatch: {detail}")]
    PageFilterMismatch { detail: String },

    /// Two surviving records claim the same page
    #[error("Duplicate page {0} in merged result")]
    DuplicatePage(usize),

    #[error("Invalid watermark pattern: {0}")]
    InvalidWatermarkPattern(#[from] regex::Error),

    #[error("File too large: {size} bytes (limit {limit})")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking document task panicked or was cancelled
    #[error("Task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for PipelineError {
    fn from(err: tokio::task::JoinError) -> Self {
        PipelineError::Task(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
