//! OCR fallback
//!
//! Rasterizes the requested pages, sends them to the engine as one batch and
//! maps each prediction back to the page it came from.

use std::path::Path;

use crate::document::{DocumentError, DocumentHandle, PageImage, RasterZoom};
use crate::error::{PipelineError, Result};
use crate::ocr::OcrEngine;

use super::record::PageRecord;

/// Rasterize pages for OCR.
///
/// With a filter, pages are rendered in filter order; without one, every
/// page in document order. `path` only labels errors.
pub fn rasterize_pages<H>(
    doc: &mut H,
    path: &Path,
    page_filter: Option<&[usize]>,
    zoom: RasterZoom,
) -> Result<Vec<PageImage>>
where
    H: DocumentHandle + ?Sized,
{
    let page_count = doc.page_count();
    let pages: Vec<usize> = match page_filter {
        Some(filter) => {
            if let Some(&page) = filter.iter().find(|&&page| page >= page_count) {
                return Err(PipelineError::PageFilterMismatch {
                    detail: format!("page {} requested but document has {} pages", page, page_count),
                });
            }
            filter.to_vec()
        }
        None => (0..page_count).collect(),
    };

    let mut images = Vec::with_capacity(pages.len());
    for page in pages {
        let image = doc
            .rasterize(page, zoom)
            .map_err(|source| rasterization_error(path, source))?;
        images.push(image);
    }

    tracing::debug!(path = %path.display(), pages = images.len(), "Rasterized pages for OCR");
    Ok(images)
}

pub(crate) fn rasterization_error(path: &Path, source: DocumentError) -> PipelineError {
    PipelineError::Rasterization {
        path: path.to_path_buf(),
        source,
    }
}

/// Recognize rasterized pages in a single batch call.
///
/// Record `i` carries the page number of image `i`. No call is made for an
/// empty batch.
pub async fn ocr_fallback(
    engine: &dyn OcrEngine,
    images: Vec<PageImage>,
    languages: &[String],
) -> Result<Vec<PageRecord>> {
    if images.is_empty() {
        return Ok(Vec::new());
    }

    let predictions = engine.recognize_batch(&images, languages).await?;
    if predictions.len() != images.len() {
        return Err(PipelineError::PageFilterMismatch {
            detail: format!(
                "{} images sent to OCR but {} predictions returned",
                images.len(),
                predictions.len()
            ),
        });
    }

    Ok(images
        .iter()
        .zip(predictions)
        .map(|(image, prediction)| PageRecord::ocr(image.page_no, prediction.text()))
        .collect())
}
