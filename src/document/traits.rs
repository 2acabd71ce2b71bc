//! Document capability traits
//!
//! The pipeline never touches a PDF library directly. It opens a handle
//! through a [`DocumentBackend`] and drives it through [`DocumentHandle`].
//! Closing the document is the handle's `Drop`.

use std::path::Path;

use super::error::Result;
use super::types::{AnnotationRef, ObjectRef, PageImage, RasterZoom};

/// Opens document handles
///
/// Shared across concurrent pipeline runs; each run opens its own handle.
pub trait DocumentBackend: Send + Sync + 'static {
    type Handle: DocumentHandle;

    /// Open the document at `path`
    fn open(&self, path: &Path) -> Result<Self::Handle>;
}

/// An open document, owned by exactly one pipeline stage
pub trait DocumentHandle {
    /// Number of pages
    fn page_count(&self) -> usize;

    /// Annotations attached to a page, in array order
    fn annotations(&mut self, page: usize) -> Result<Vec<AnnotationRef>>;

    /// Remove one annotation from a page
    fn delete_annotation(&mut self, page: usize, annotation: &AnnotationRef) -> Result<()>;

    /// Content stream objects that make up a page
    fn content_streams(&mut self, page: usize) -> Result<Vec<ObjectRef>>;

    /// Decoded bytes of a content stream
    fn read_stream(&mut self, stream: ObjectRef) -> Result<Vec<u8>>;

    /// Replace a content stream's bytes
    fn update_stream(&mut self, stream: ObjectRef, content: Vec<u8>) -> Result<()>;

    /// Plain text of a page, reflecting any edits made so far
    fn extract_text(&mut self, page: usize) -> Result<String>;

    /// Render a page to a PNG image
    fn rasterize(&mut self, page: usize, zoom: RasterZoom) -> Result<PageImage>;
}
