//! Pixmap encoding for rasterized pages

use std::io::Cursor;

use crate::document::{DocumentError, DocumentResult, PageImage};

/// Encode a MuPDF pixmap as an RGB PNG
pub fn encode_png(pixmap: &mupdf::Pixmap, page_no: usize) -> DocumentResult<PageImage> {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let samples = pixmap.samples();
    let n = pixmap.n() as usize; // components per pixel

    let rgb = to_rgb(samples, width as usize, height as usize, n);

    let img = image::RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| DocumentError::Image("Failed to create image buffer".to_string()))?;

    let mut png = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| DocumentError::Image(e.to_string()))?;

    Ok(PageImage {
        page_no,
        width,
        height,
        png,
    })
}

/// Repack `n`-component samples into tightly packed RGB.
///
/// Grayscale (`n < 3`) is expanded; any alpha or extra channel is dropped.
fn to_rgb(samples: &[u8], width: usize, height: usize, n: usize) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            let offset = (y * width + x) * n;
            if n >= 3 {
                let r = samples.get(offset).copied().unwrap_or(0);
                let g = samples.get(offset + 1).copied().unwrap_or(0);
                let b = samples.get(offset + 2).copied().unwrap_or(0);
                rgb.extend_from_slice(&[r, g, b]);
            } else {
                let v = samples.get(offset).copied().unwrap_or(0);
                rgb.extend_from_slice(&[v, v, v]);
            }
        }
    }
    rgb
}
