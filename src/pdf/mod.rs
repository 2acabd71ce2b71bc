//! PDF backend
//!
//! - `handle`: [`PdfBackend`]/[`PdfHandle`], the production document capability
//! - `sanitizer`: content cleanup ahead of native text extraction
//! - `raster`: pixmap to PNG encoding

mod handle;
mod raster;
mod sanitizer;

pub use handle::{PdfBackend, PdfHandle};
pub use sanitizer::{ContentSanitizer, SanitizeReport};
