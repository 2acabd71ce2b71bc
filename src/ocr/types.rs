//! OCR Types
//!
//! Defines types for batch OCR of rasterized pages.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// OCR provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrProvider {
    /// Tesseract OCR (local CLI)
    #[default]
    Tesseract,
    /// Ollama vision model (local LLM)
    Ollama,
}

impl FromStr for OcrProvider {
    type Err = OcrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tesseract" => Ok(Self::Tesseract),
            "ollama" => Ok(Self::Ollama),
            other => Err(OcrError::ProviderNotAvailable(format!(
                "unknown OCR provider: {}",
                other
            ))),
        }
    }
}

/// One recognized line of text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
}

/// Recognition result for one input image
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrPrediction {
    pub text_lines: Vec<TextLine>,
}

impl OcrPrediction {
    /// Split raw engine output into lines, dropping blank ones
    pub fn from_text(raw: &str) -> Self {
        Self {
            text_lines: raw
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(|line| TextLine {
                    text: line.to_string(),
                })
                .collect(),
        }
    }

    /// Page text: lines joined with `\n`
    pub fn text(&self) -> String {
        self.text_lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR provider not available: {0}")]
    ProviderNotAvailable(String),

    #[error("OCR processing failed: {0}")]
    ProcessingError(String),

    #[error("Invalid language code: {0}")]
    InvalidLanguage(String),

    #[error("API error: {0}")]
    ApiError(String),
}
