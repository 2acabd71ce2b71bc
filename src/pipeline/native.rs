//! Native text extraction stage

use crate::document::{DocumentHandle, DocumentResult};
use crate::pdf::ContentSanitizer;
use crate::text::{classify, PageUsability, TextNormalizer};

use super::record::PageRecord;

/// Sanitize, extract, normalize and classify every page.
///
/// Returns one record per page in document order. A document-level failure
/// is logged and yields an empty vector, which sends the whole document to
/// OCR.
pub fn extract_native<H>(
    doc: &mut H,
    sanitizer: &ContentSanitizer,
    normalizer: &TextNormalizer,
    min_words: usize,
) -> Vec<PageRecord>
where
    H: DocumentHandle + ?Sized,
{
    match try_extract(doc, sanitizer, normalizer, min_words) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!("Native extraction failed, falling back to full OCR: {}", e);
            Vec::new()
        }
    }
}

fn try_extract<H>(
    doc: &mut H,
    sanitizer: &ContentSanitizer,
    normalizer: &TextNormalizer,
    min_words: usize,
) -> DocumentResult<Vec<PageRecord>>
where
    H: DocumentHandle + ?Sized,
{
    let page_count = doc.page_count();

    // Sanitizing is page-local; finishing it first lets the backend rebuild
    // its render view once
    for page in 0..page_count {
        sanitizer.sanitize_page(doc, page);
    }

    let mut records = Vec::with_capacity(page_count);
    for page in 0..page_count {
        let raw = doc.extract_text(page)?;
        let text = normalizer.normalize(&raw);

        let record = match classify(normalizer, &text, min_words) {
            PageUsability::Usable => PageRecord::native(page, text),
            PageUsability::NeedsOcr => PageRecord::needs_ocr(page),
        };
        tracing::trace!(page, usable = record.text.is_some(), "Classified page");
        records.push(record);
    }

    Ok(records)
}
