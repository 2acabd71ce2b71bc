//! PDF document handle
//!
//! Two libraries back one handle:
//!
//! - MuPDF opens the file, extracts text and rasterizes pages.
//! - `lopdf` loads the object graph lazily, on the first structural call, and
//!   performs annotation and content-stream edits.
//!
//! Structural edits mark the handle dirty. The next text or raster call
//! re-serializes the edited object graph and re-opens it in MuPDF, so
//! extraction always sees the sanitized page.

use std::path::{Path, PathBuf};

use lopdf::{Object, ObjectId};
use mupdf::{Colorspace, Matrix};

use crate::document::{
    AnnotationRef, DocumentBackend, DocumentError, DocumentHandle, DocumentResult, ObjectRef,
    PageImage, RasterZoom,
};

use super::raster::encode_png;

/// Opens [`PdfHandle`]s from disk
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfBackend;

impl DocumentBackend for PdfBackend {
    type Handle = PdfHandle;

    fn open(&self, path: &Path) -> DocumentResult<PdfHandle> {
        PdfHandle::open(path)
    }
}

/// An open PDF. Dropping the handle closes both library views.
pub struct PdfHandle {
    path: PathBuf,
    page_count: usize,
    /// MuPDF view used for text and rasterization
    render: Option<mupdf::Document>,
    /// Object graph, loaded on first structural access
    structure: Option<lopdf::Document>,
    /// Page object ids in page order (filled with `structure`)
    pages: Vec<ObjectId>,
    /// `structure` has edits the render view has not seen
    dirty: bool,
}

impl PdfHandle {
    /// Open a PDF from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> DocumentResult<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let path_str = path_buf.to_string_lossy();

        let doc = mupdf::Document::open(&*path_str)
            .map_err(|e| DocumentError::Open(format!("{}: {}", path_buf.display(), e)))?;
        let page_count = doc
            .page_count()
            .map_err(|e| DocumentError::Open(format!("{}: {}", path_buf.display(), e)))?
            as usize;

        Ok(Self {
            path: path_buf,
            page_count,
            render: Some(doc),
            structure: None,
            pages: Vec::new(),
            dirty: false,
        })
    }

    fn check_page(&self, page: usize) -> DocumentResult<()> {
        if page >= self.page_count {
            return Err(DocumentError::PageNotFound(page, self.page_count));
        }
        Ok(())
    }

    /// Load the object graph if needed and return the page's object id
    fn page_id(&mut self, page: usize) -> DocumentResult<ObjectId> {
        self.check_page(page)?;

        if self.structure.is_none() {
            let doc = lopdf::Document::load(&self.path)?;
            let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
            if pages.len() != self.page_count {
                return Err(DocumentError::Content(format!(
                    "page tree has {} pages, renderer reports {}",
                    pages.len(),
                    self.page_count
                )));
            }
            self.pages = pages;
            self.structure = Some(doc);
        }

        self.pages
            .get(page)
            .copied()
            .ok_or(DocumentError::PageNotFound(page, self.page_count))
    }

    fn structure_mut(&mut self) -> DocumentResult<&mut lopdf::Document> {
        self.structure
            .as_mut()
            .ok_or_else(|| DocumentError::Content("document structure not loaded".to_string()))
    }

    /// MuPDF view reflecting every edit made so far
    fn render_view(&mut self) -> DocumentResult<&mupdf::Document> {
        if self.dirty || self.render.is_none() {
            let doc = match self.structure.as_mut() {
                Some(structure) if self.dirty => {
                    let mut buffer = Vec::new();
                    structure.save_to(&mut buffer)?;
                    mupdf::Document::from_bytes(&buffer, "application/pdf")?
                }
                _ => mupdf::Document::open(&*self.path.to_string_lossy())?,
            };
            self.render = Some(doc);
            self.dirty = false;
        }

        self.render
            .as_ref()
            .ok_or_else(|| DocumentError::Render("render view unavailable".to_string()))
    }
}

/// Entries of a page's `/Annots` array, following an indirect array
fn annotation_entries(doc: &lopdf::Document, page_id: ObjectId) -> DocumentResult<Vec<Object>> {
    let page = doc.get_dictionary(page_id)?;
    let annots = match page.get(b"Annots") {
        Ok(annots) => annots,
        Err(_) => return Ok(Vec::new()),
    };
    let array = match annots {
        Object::Reference(id) => doc.get_object(*id)?.as_array()?,
        other => other.as_array()?,
    };
    Ok(array.clone())
}

fn annotation_subtype(doc: &lopdf::Document, entry: &Object) -> Option<String> {
    let dict = match entry {
        Object::Reference(id) => doc.get_dictionary(*id).ok()?,
        other => other.as_dict().ok()?,
    };
    dict.get(b"Subtype")
        .and_then(Object::as_name)
        .ok()
        .map(|name| String::from_utf8_lossy(name).into_owned())
}

impl DocumentHandle for PdfHandle {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn annotations(&mut self, page: usize) -> DocumentResult<Vec<AnnotationRef>> {
        let page_id = self.page_id(page)?;
        let doc: &lopdf::Document = self.structure_mut()?;

        let entries = annotation_entries(doc, page_id)?;
        Ok(entries
            .iter()
            .enumerate()
            .map(|(index, entry)| AnnotationRef {
                index,
                object: entry.as_reference().ok(),
                subtype: annotation_subtype(doc, entry),
            })
            .collect())
    }

    fn delete_annotation(&mut self, page: usize, annotation: &AnnotationRef) -> DocumentResult<()> {
        let page_id = self.page_id(page)?;
        let doc = self.structure_mut()?;

        let indirect = match doc.get_dictionary(page_id)?.get(b"Annots") {
            Ok(Object::Reference(id)) => Some(*id),
            Ok(_) => None,
            Err(_) => {
                return Err(DocumentError::Content(format!(
                    "page {} has no annotations",
                    page
                )))
            }
        };

        let now_empty = {
            let array = match indirect {
                Some(id) => doc.get_object_mut(id)?.as_array_mut()?,
                None => doc
                    .get_dictionary_mut(page_id)?
                    .get_mut(b"Annots")?
                    .as_array_mut()?,
            };

            let matches = array
                .get(annotation.index)
                .map(|entry| entry.as_reference().ok() == annotation.object)
                .unwrap_or(false);
            if !matches {
                return Err(DocumentError::Content(format!(
                    "annotation {} on page {} moved or was already removed",
                    annotation.index, page
                )));
            }

            array.remove(annotation.index);
            array.is_empty()
        };

        if now_empty && indirect.is_none() {
            doc.get_dictionary_mut(page_id)?.remove(b"Annots");
        }

        self.dirty = true;
        Ok(())
    }

    fn content_streams(&mut self, page: usize) -> DocumentResult<Vec<ObjectRef>> {
        let page_id = self.page_id(page)?;
        let doc = self.structure_mut()?;
        Ok(doc.get_page_contents(page_id))
    }

    fn read_stream(&mut self, stream: ObjectRef) -> DocumentResult<Vec<u8>> {
        let doc = self.structure_mut()?;
        let stream = doc.get_object(stream)?.as_stream()?;

        if stream.dict.has(b"Filter") {
            stream.decompressed_content().map_err(Into::into)
        } else {
            Ok(stream.content.clone())
        }
    }

    fn update_stream(&mut self, stream: ObjectRef, content: Vec<u8>) -> DocumentResult<()> {
        let doc = self.structure_mut()?;
        doc.get_object_mut(stream)?
            .as_stream_mut()?
            .set_plain_content(content);
        self.dirty = true;
        Ok(())
    }

    fn extract_text(&mut self, page: usize) -> DocumentResult<String> {
        self.check_page(page)?;
        let doc = self.render_view()?;
        let loaded = doc.load_page(page as i32)?;
        loaded
            .to_text()
            .map_err(|e| DocumentError::TextExtraction(format!("page {}: {}", page, e)))
    }

    fn rasterize(&mut self, page: usize, zoom: RasterZoom) -> DocumentResult<PageImage> {
        self.check_page(page)?;
        let doc = self.render_view()?;
        let loaded = doc.load_page(page as i32)?;

        let matrix = Matrix::new_scale(zoom.x, zoom.y);
        let colorspace = Colorspace::device_rgb();
        // to_pixmap signature: (ctm, colorspace, alpha, show_extras) -> Pixmap
        let pixmap = loaded.to_pixmap(&matrix, &colorspace, false, true)?;

        encode_png(&pixmap, page)
    }
}
