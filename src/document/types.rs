//! Core document types
//!
//! Format detection plus the small value types that cross the document
//! capability boundary.

use serde::{Deserialize, Serialize};

/// Input format accepted by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Png,
    Jpeg,
}

impl DocumentFormat {
    /// Detect format from magic bytes
    pub fn from_magic_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        if bytes.starts_with(b"%PDF") {
            return Some(Self::Pdf);
        }

        if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
            return Some(Self::Png);
        }

        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        None
    }

    /// Whether the format is a raster image (OCR only, no native text)
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Png | Self::Jpeg)
    }
}

/// Object identifier inside a document (object number, generation)
pub type ObjectRef = (u32, u16);

/// An annotation attached to a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRef {
    /// Position in the page's annotation array
    pub index: usize,
    /// Indirect object backing the annotation, if any
    pub object: Option<ObjectRef>,
    /// Annotation subtype (`Link`, `Text`, `Watermark`, ...)
    pub subtype: Option<String>,
}

/// Rasterization scale factors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterZoom {
    pub x: f32,
    pub y: f32,
}

impl Default for RasterZoom {
    fn default() -> Self {
        Self { x: 1.5, y: 1.5 }
    }
}

/// A rasterized page, PNG encoded
#[derive(Debug, Clone)]
pub struct PageImage {
    /// Zero-based page index in the source document
    pub page_no: usize,
    pub width: u32,
    pub height: u32,
    /// PNG bytes
    pub png: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_magic_bytes() {
        assert_eq!(
            DocumentFormat::from_magic_bytes(b"%PDF-1.7\n"),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(
            DocumentFormat::from_magic_bytes(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A]),
            Some(DocumentFormat::Png)
        );
        assert_eq!(
            DocumentFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(DocumentFormat::Jpeg)
        );
        assert_eq!(DocumentFormat::from_magic_bytes(b"PK\x03\x04"), None);
        assert_eq!(DocumentFormat::from_magic_bytes(b"%P"), None);
    }

    #[test]
    fn test_image_formats() {
        assert!(DocumentFormat::Png.is_image());
        assert!(DocumentFormat::Jpeg.is_image());
        assert!(!DocumentFormat::Pdf.is_image());
    }

    #[test]
    fn test_default_zoom() {
        let zoom = RasterZoom::default();
        assert_eq!(zoom.x, 1.5);
        assert_eq!(zoom.y, 1.5);
    }
}
