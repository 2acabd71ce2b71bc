//! In-memory document backend and OCR engine for pipeline tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use hybrid_ocr::document::{
    AnnotationRef, DocumentBackend, DocumentError, DocumentHandle, DocumentResult, ObjectRef,
    PageImage, RasterZoom,
};
use hybrid_ocr::ocr::{OcrEngine, OcrError, OcrPrediction, OcrProvider};
use hybrid_ocr::PipelineConfig;

/// One page: the text MuPDF would return, plus an annotation whose text
/// leaks into extraction until it is deleted
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub text: String,
    pub annotation_text: Option<String>,
    pub stream: Vec<u8>,
}

impl FakePage {
    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Default::default()
        }
    }

    pub fn annotated(text: &str, annotation: &str) -> Self {
        Self {
            text: text.to_string(),
            annotation_text: Some(annotation.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    pub pages: Vec<FakePage>,
    /// Every `open` call fails
    pub fail_open: bool,
    /// `extract_text` fails on this page
    pub fail_text_on: Option<usize>,
    /// `rasterize` fails on this page
    pub fail_raster_on: Option<usize>,
    pub opens: Arc<AtomicUsize>,
    /// Pages in the order they were rasterized
    pub rasterized: Arc<Mutex<Vec<usize>>>,
}

impl FakeBackend {
    pub fn with_pages(texts: &[&str]) -> Self {
        Self {
            pages: texts.iter().map(|t| FakePage::text(t)).collect(),
            ..Default::default()
        }
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl DocumentBackend for FakeBackend {
    type Handle = FakeHandle;

    fn open(&self, path: &Path) -> DocumentResult<FakeHandle> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.fail_open {
            return Err(DocumentError::Open(format!("{}: corrupt", path.display())));
        }
        Ok(FakeHandle {
            pages: self.pages.clone(),
            fail_text_on: self.fail_text_on,
            fail_raster_on: self.fail_raster_on,
            rasterized: Arc::clone(&self.rasterized),
        })
    }
}

pub struct FakeHandle {
    pub pages: Vec<FakePage>,
    fail_text_on: Option<usize>,
    fail_raster_on: Option<usize>,
    rasterized: Arc<Mutex<Vec<usize>>>,
}

impl FakeHandle {
    fn page(&self, page: usize) -> DocumentResult<&FakePage> {
        self.pages
            .get(page)
            .ok_or(DocumentError::PageNotFound(page, self.pages.len()))
    }

    fn stream_page(stream: ObjectRef) -> usize {
        stream.0 as usize
    }
}

impl DocumentHandle for FakeHandle {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn annotations(&mut self, page: usize) -> DocumentResult<Vec<AnnotationRef>> {
        Ok(match self.page(page)?.annotation_text {
            Some(_) => vec![AnnotationRef {
                index: 0,
                object: None,
                subtype: Some("FreeText".to_string()),
            }],
            None => Vec::new(),
        })
    }

    fn delete_annotation(&mut self, page: usize, _annotation: &AnnotationRef) -> DocumentResult<()> {
        self.page(page)?;
        self.pages[page].annotation_text = None;
        Ok(())
    }

    fn content_streams(&mut self, page: usize) -> DocumentResult<Vec<ObjectRef>> {
        self.page(page)?;
        Ok(vec![(page as u32, 0)])
    }

    fn read_stream(&mut self, stream: ObjectRef) -> DocumentResult<Vec<u8>> {
        Ok(self.page(Self::stream_page(stream))?.stream.clone())
    }

    fn update_stream(&mut self, stream: ObjectRef, content: Vec<u8>) -> DocumentResult<()> {
        let page = Self::stream_page(stream);
        self.page(page)?;
        self.pages[page].stream = content;
        Ok(())
    }

    fn extract_text(&mut self, page: usize) -> DocumentResult<String> {
        if self.fail_text_on == Some(page) {
            return Err(DocumentError::TextExtraction(format!("page {} unreadable", page)));
        }
        let page = self.page(page)?;
        Ok(match &page.annotation_text {
            Some(annotation) => format!("{} {}", page.text, annotation),
            None => page.text.clone(),
        })
    }

    fn rasterize(&mut self, page: usize, _zoom: RasterZoom) -> DocumentResult<PageImage> {
        self.page(page)?;
        if self.fail_raster_on == Some(page) {
            return Err(DocumentError::Render(format!("page {} failed to render", page)));
        }
        self.rasterized.lock().push(page);
        Ok(PageImage {
            page_no: page,
            width: 1,
            height: 1,
            png: vec![page as u8],
        })
    }
}

/// Returns canned text per page and records every batch it receives
#[derive(Default)]
pub struct FakeEngine {
    pub texts: HashMap<usize, String>,
    /// Predictions withheld from the end of each batch
    pub drop_last: usize,
    pub fail: bool,
    pub batches: Mutex<Vec<Vec<usize>>>,
    pub languages: Mutex<Vec<String>>,
}

impl FakeEngine {
    pub fn with_texts(texts: &[(usize, &str)]) -> Self {
        Self {
            texts: texts.iter().map(|(page, text)| (*page, text.to_string())).collect(),
            ..Default::default()
        }
    }

    pub fn batches(&self) -> Vec<Vec<usize>> {
        self.batches.lock().clone()
    }
}

#[async_trait]
impl OcrEngine for FakeEngine {
    fn provider_type(&self) -> OcrProvider {
        OcrProvider::Tesseract
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn recognize_batch(
        &self,
        images: &[PageImage],
        languages: &[String],
    ) -> Result<Vec<OcrPrediction>, OcrError> {
        self.batches
            .lock()
            .push(images.iter().map(|image| image.page_no).collect());
        *self.languages.lock() = languages.to_vec();

        if self.fail {
            return Err(OcrError::ProcessingError("engine crashed".to_string()));
        }

        let keep = images.len().saturating_sub(self.drop_last);
        Ok(images[..keep]
            .iter()
            .map(|image| {
                let text = self
                    .texts
                    .get(&image.page_no)
                    .cloned()
                    .unwrap_or_else(|| format!("ocr page {}", image.page_no));
                OcrPrediction::from_text(&text)
            })
            .collect())
    }
}

pub fn config(min_words: usize, watermark: &str) -> PipelineConfig {
    PipelineConfig {
        supported_languages: vec!["vi".to_string(), "en".to_string()],
        min_words_per_page: min_words,
        watermark_patterns: watermark.to_string(),
        ..PipelineConfig::default()
    }
}
