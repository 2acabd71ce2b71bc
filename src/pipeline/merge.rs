//! Result merging

use crate::error::{PipelineError, Result};

use super::record::PageRecord;

/// Combine native and OCR records into one page-ordered result.
///
/// Records without text are dropped. The survivors are sorted by page and
/// must not repeat a page.
pub fn merge(native: Vec<PageRecord>, ocr: Vec<PageRecord>) -> Result<Vec<PageRecord>> {
    let mut pages: Vec<PageRecord> = native
        .into_iter()
        .chain(ocr)
        .filter(PageRecord::has_text)
        .collect();

    // Stable: equal page numbers keep arrival order, which only matters for
    // the duplicate error below
    pages.sort_by_key(|record| record.page_no);

    if let Some(pair) = pages.windows(2).find(|pair| pair[0].page_no == pair[1].page_no) {
        return Err(PipelineError::DuplicatePage(pair[0].page_no));
    }

    Ok(pages)
}
