//! Page records

use serde::{Deserialize, Serialize};

/// Text result for one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Zero-based page index in the source document
    pub page_no: usize,
    /// `None` marks a page awaiting OCR
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Text came from OCR
    #[serde(default)]
    pub ocr: bool,
}

impl PageRecord {
    pub fn native(page_no: usize, text: String) -> Self {
        Self {
            page_no,
            text: Some(text),
            ocr: false,
        }
    }

    pub fn ocr(page_no: usize, text: String) -> Self {
        Self {
            page_no,
            text: Some(text),
            ocr: true,
        }
    }

    /// Placeholder for a page whose native text was rejected
    pub fn needs_ocr(page_no: usize) -> Self {
        Self {
            page_no,
            text: None,
            ocr: false,
        }
    }

    /// Non-empty text present
    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|text| !text.is_empty())
    }
}
