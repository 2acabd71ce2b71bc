//! Hybrid extraction pipeline
//!
//! - `native`: sanitize, extract, normalize and classify each page
//! - `fallback`: rasterize rejected pages and OCR them in one batch
//! - `merge`: filter, order and de-duplicate page records
//! - `orchestrator`: [`Pipeline`], which routes a document through the stages

mod fallback;
mod merge;
mod native;
mod orchestrator;
mod record;

pub use fallback::{ocr_fallback, rasterize_pages};
pub use merge::merge;
pub use native::extract_native;
pub use orchestrator::{Extraction, Pipeline, Route};
pub use record::PageRecord;
