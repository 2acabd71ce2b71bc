//! Hybrid OCR
//!
//! Page-ordered text extraction for PDFs and images. Native PDF text is used
//! wherever it survives sanitization and a word-count heuristic; only the
//! remaining pages are rasterized and sent to an OCR engine.
//!
//! # Modules
//!
//! - `document`: document capability traits and format detection
//! - `pdf`: MuPDF/lopdf backend and the content sanitizer
//! - `text`: watermark-aware normalization and page classification
//! - `ocr`: batch OCR engines (Tesseract, Ollama)
//! - `pipeline`: native stage, OCR fallback, merge and the orchestrator
//! - `config`: environment configuration

pub mod config;
pub mod document;
pub mod error;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod text;

pub use config::{Config, PipelineConfig};
pub use error::PipelineError;
pub use pipeline::{Extraction, PageRecord, Pipeline, Route};
