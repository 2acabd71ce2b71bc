//! Document capability
//!
//! Format-agnostic interfaces the extraction pipeline consumes. The
//! production implementation lives in [`crate::pdf`]; tests plug in fakes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │              Pipeline                    │
//! └──────────────────────────────────────────┘
//!                     │ open(path)
//!                     ▼
//! ┌──────────────────────────────────────────┐
//! │  DocumentBackend ──► DocumentHandle      │
//! │  (annotations, content streams, text,    │
//! │   rasterization; closed on drop)         │
//! └──────────────────────────────────────────┘
//! ```

mod error;
mod traits;
mod types;

pub use error::{DocumentError, DocumentResult, Result};
pub use traits::{DocumentBackend, DocumentHandle};
pub use types::{AnnotationRef, DocumentFormat, ObjectRef, PageImage, RasterZoom};
