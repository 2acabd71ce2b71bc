//! Pipeline orchestrator
//!
//! Per-document state machine:
//!
//! ```text
//! Start ──► NativeExtracted ──┬─ no records ────────────► FullOcr
//!                             ├─ every page has text ───► NativeOnly
//!                             └─ some pages need OCR ──► Merged
//! ```
//!
//! Document work runs on the blocking pool. Each stage opens its own handle
//! inside the blocking closure and drops it there.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncReadExt;

use crate::config::PipelineConfig;
use crate::document::{DocumentBackend, DocumentFormat, PageImage};
use crate::error::{PipelineError, Result};
use crate::ocr::OcrEngine;
use crate::pdf::{ContentSanitizer, PdfBackend};
use crate::text::TextNormalizer;

use super::fallback::{ocr_fallback, rasterization_error, rasterize_pages};
use super::merge::merge;
use super::native::extract_native;
use super::record::PageRecord;

/// Terminal state that produced an [`Extraction`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Every page kept its native text
    NativeOnly,
    /// Native extraction produced nothing; all pages went to OCR
    FullOcr,
    /// Native pages merged with OCR of the rejected pages
    Merged,
    /// Image input, recognized directly
    ImageOcr,
}

/// Page-ordered result of one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub pages: Vec<PageRecord>,
    pub route: Route,
}

/// Hybrid native/OCR extraction pipeline.
///
/// Holds only immutable state, so one pipeline serves concurrent documents.
pub struct Pipeline<B: DocumentBackend = PdfBackend> {
    config: Arc<PipelineConfig>,
    backend: Arc<B>,
    engine: Arc<dyn OcrEngine>,
    normalizer: Arc<TextNormalizer>,
    sanitizer: Arc<ContentSanitizer>,
}

impl<B: DocumentBackend> Clone for Pipeline<B> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            backend: Arc::clone(&self.backend),
            engine: Arc::clone(&self.engine),
            normalizer: Arc::clone(&self.normalizer),
            sanitizer: Arc::clone(&self.sanitizer),
        }
    }
}

impl<B: DocumentBackend> Pipeline<B> {
    /// Build a pipeline; fails if the watermark pattern does not compile
    pub fn new(config: PipelineConfig, backend: B, engine: Arc<dyn OcrEngine>) -> Result<Self> {
        let normalizer = TextNormalizer::new(&config.watermark_patterns)?;

        Ok(Self {
            config: Arc::new(config),
            backend: Arc::new(backend),
            engine,
            normalizer: Arc::new(normalizer),
            sanitizer: Arc::new(ContentSanitizer::new()),
        })
    }

    /// Size-check a file, detect its format and dispatch it
    pub async fn process_file(&self, path: &Path) -> Result<Extraction> {
        let size = tokio::fs::metadata(path).await?.len();
        if size > self.config.max_file_size {
            return Err(PipelineError::FileTooLarge {
                size,
                limit: self.config.max_file_size,
            });
        }

        let mut header = Vec::with_capacity(8);
        tokio::fs::File::open(path)
            .await?
            .take(8)
            .read_to_end(&mut header)
            .await?;

        match DocumentFormat::from_magic_bytes(&header) {
            Some(DocumentFormat::Pdf) => self.process_pdf(path).await,
            Some(format) if format.is_image() => self.recognize_image(path).await,
            _ => Err(PipelineError::UnsupportedFormat(format!(
                "{}: unrecognized file signature",
                path.display()
            ))),
        }
    }

    /// Extract a PDF: native text where usable, OCR for the rest
    pub async fn process_pdf(&self, path: &Path) -> Result<Extraction> {
        tracing::info!(path = %path.display(), "Processing PDF");

        let native = self.native_stage(path).await?;

        let extraction = if native.is_empty() {
            tracing::info!(path = %path.display(), "No native text, running full OCR");
            let ocr = self.ocr_stage(path, None).await?;
            Extraction {
                pages: merge(Vec::new(), ocr)?,
                route: Route::FullOcr,
            }
        } else {
            let (usable, pending): (Vec<_>, Vec<_>) =
                native.into_iter().partition(PageRecord::has_text);

            if pending.is_empty() {
                Extraction {
                    pages: usable,
                    route: Route::NativeOnly,
                }
            } else {
                let filter: Vec<usize> = pending.iter().map(|record| record.page_no).collect();
                tracing::info!(
                    path = %path.display(),
                    native = usable.len(),
                    ocr = filter.len(),
                    "Running OCR on rejected pages"
                );
                let ocr = self.ocr_stage(path, Some(filter)).await?;
                Extraction {
                    pages: merge(usable, ocr)?,
                    route: Route::Merged,
                }
            }
        };

        tracing::info!(
            path = %path.display(),
            route = ?extraction.route,
            pages = extraction.pages.len(),
            "Extraction complete"
        );
        Ok(extraction)
    }

    /// OCR a single PNG or JPEG image as page 0
    pub async fn recognize_image(&self, path: &Path) -> Result<Extraction> {
        tracing::info!(path = %path.display(), "Recognizing image");

        let bytes = tokio::fs::read(path).await?;
        let image = tokio::task::spawn_blocking(move || decode_image(&bytes)).await??;

        let records = ocr_fallback(self.engine.as_ref(), vec![image], &self.config.supported_languages).await?;
        Ok(Extraction {
            pages: merge(Vec::new(), records)?,
            route: Route::ImageOcr,
        })
    }

    async fn native_stage(&self, path: &Path) -> Result<Vec<PageRecord>> {
        let backend = Arc::clone(&self.backend);
        let sanitizer = Arc::clone(&self.sanitizer);
        let normalizer = Arc::clone(&self.normalizer);
        let min_words = self.config.min_words_per_page;
        let path = path.to_path_buf();

        let records = tokio::task::spawn_blocking(move || match backend.open(&path) {
            Ok(mut doc) => extract_native(&mut doc, &sanitizer, &normalizer, min_words),
            Err(e) => {
                tracing::warn!(path = %path.display(), "Failed to open for native extraction: {}", e);
                Vec::new()
            }
        })
        .await?;

        Ok(records)
    }

    async fn ocr_stage(&self, path: &Path, page_filter: Option<Vec<usize>>) -> Result<Vec<PageRecord>> {
        if page_filter.as_ref().is_some_and(|filter| filter.is_empty()) {
            return Ok(Vec::new());
        }

        let backend = Arc::clone(&self.backend);
        let zoom = self.config.raster_zoom;
        let path: PathBuf = path.to_path_buf();

        let images = tokio::task::spawn_blocking(move || {
            let mut doc = backend
                .open(&path)
                .map_err(|source| rasterization_error(&path, source))?;
            rasterize_pages(&mut doc, &path, page_filter.as_deref(), zoom)
        })
        .await??;

        ocr_fallback(self.engine.as_ref(), images, &self.config.supported_languages).await
    }
}

/// Validate image bytes and re-encode them as an RGB PNG
fn decode_image(bytes: &[u8]) -> Result<PageImage> {
    let decoded = image::load_from_memory(bytes).map_err(|e| PipelineError::InvalidImage(e.to_string()))?;
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut png = Vec::new();
    image::DynamicImage::ImageRgb8(rgb)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| PipelineError::InvalidImage(e.to_string()))?;

    Ok(PageImage {
        page_no: 0,
        width,
        height,
        png,
    })
}
