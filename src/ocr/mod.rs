//! OCR Module
//!
//! Batch OCR for pages whose native text is unusable.
//!
//! Supports multiple backends:
//! - Tesseract (local, requires installation)
//! - Ollama vision models (local LLM)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hybrid_ocr::ocr::{build_engine, OcrConfig};
//!
//! let engine = build_engine(&OcrConfig::default());
//! if engine.is_available().await {
//!     let predictions = engine.recognize_batch(&images, &["vi".into()]).await?;
//!     assert_eq!(predictions.len(), images.len());
//! }
//! ```

mod provider;
mod service;
mod types;

pub use provider::{tesseract_language, validate_language, OcrEngine, OllamaEngine, TesseractEngine};
pub use service::{build_engine, OcrConfig};
pub use types::{OcrError, OcrPrediction, OcrProvider, TextLine};
