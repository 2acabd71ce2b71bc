//! Document error types
//!
//! Unified error handling for the document capability (open, structure edits,
//! text extraction, rasterization).

use thiserror::Error;

/// Unified document error type
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Failed to open or parse the document
    #[error("Failed to open document: {0}")]
    Open(String),

    /// Page index out of range
    #[error("Page {0} not found (document has {1} pages)")]
    PageNotFound(usize, usize),

    /// Failed to read or rewrite page content (annotations, streams)
    #[error("Content error: {0}")]
    Content(String),

    /// Text extraction error
    #[error("Text extraction error: {0}")]
    TextExtraction(String),

    /// Failed to rasterize a page
    #[error("Render error: {0}")]
    Render(String),

    /// Image encoding error
    #[error("Image error: {0}")]
    Image(String),
}

/// Result type alias for document operations
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Alias for Result (used by callers outside the module)
pub type DocumentResult<T> = Result<T>;

impl From<mupdf::Error> for DocumentError {
    fn from(err: mupdf::Error) -> Self {
        DocumentError::Render(err.to_string())
    }
}

impl From<lopdf::Error> for DocumentError {
    fn from(err: lopdf::Error) -> Self {
        DocumentError::Content(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_not_found_message() {
        let err = DocumentError::PageNotFound(3, 2);
        assert_eq!(err.to_string(), "Page 3 not found (document has 2 pages)");
    }
}
