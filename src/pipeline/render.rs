//! PDF page classification and rasterisation via pdfium.
//!
//! ## Text layer first
//!
//! Most uploaded PDFs are born-digital: their text layer is exact and costs
//! nothing to read. Only pages whose trimmed text layer has fewer than
//! `text_threshold` characters are treated as scans and rasterised for OCR.
//! A handful of stray characters (a page number, a stamp) is not enough to
//! skip OCR, which is why the threshold is not zero.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which is not safe to call
//! from async contexts. All pdfium work runs on the blocking thread pool so
//! request handlers never stall a Tokio worker.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

const PDF_POINTS_PER_INCH: f32 = 72.0;

/// The content of one PDF page after classification.
pub enum PageContent {
    /// Trimmed text layer, at or above the threshold.
    Text(String),
    /// Rasterised page, to be OCR'd.
    Scanned(DynamicImage),
}

/// One classified page.
pub struct ClassifiedPage {
    /// 1-indexed.
    pub page_num: usize,
    pub content: PageContent,
}

/// Whether a page's text layer is too thin to trust.
pub fn needs_ocr(text: &str, threshold: usize) -> bool {
    text.trim().chars().count() < threshold
}

/// Pixel size for a page rendered at `dpi`, longest edge capped at `max_pixels`.
pub fn target_size(width_pt: f32, height_pt: f32, dpi: u32, max_pixels: u32) -> (i32, i32) {
    let scale = dpi as f32 / PDF_POINTS_PER_INCH;
    let mut w = width_pt * scale;
    let mut h = height_pt * scale;
    let longest = w.max(h);
    if longest > max_pixels as f32 {
        let shrink = max_pixels as f32 / longest;
        w *= shrink;
        h *= shrink;
    }
    ((w.round() as i32).max(1), (h.round() as i32).max(1))
}

/// Classify every page of a PDF, rasterising the ones that need OCR.
pub async fn classify_pages(
    bytes: Vec<u8>,
    config: &ExtractionConfig,
) -> Result<Vec<ClassifiedPage>, ExtractError> {
    let dpi = config.dpi;
    let max_pixels = config.max_rendered_pixels;
    let threshold = config.text_threshold;
    let lib_path = config.pdfium_lib_path.clone();

    tokio::task::spawn_blocking(move || {
        let pdfium = bind_pdfium(lib_path.as_deref())?;
        classify_pages_blocking(&pdfium, &bytes, dpi, max_pixels, threshold)
    })
    .await
    .map_err(|e| ExtractError::Internal(format!("Render task panicked: {}", e)))?
}

/// Bind to libpdfium: the configured directory, else `./`, else the system library.
pub fn bind_pdfium(lib_path: Option<&Path>) -> Result<Pdfium, ExtractError> {
    let bindings = match lib_path {
        Some(dir) => Pdfium::bind_to_library(&Pdfium::pdfium_platform_library_name_at_path(dir)),
        None => Pdfium::bind_to_library(&Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| ExtractError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

fn classify_pages_blocking(
    pdfium: &Pdfium,
    bytes: &[u8],
    dpi: u32,
    max_pixels: u32,
    threshold: usize,
) -> Result<Vec<ClassifiedPage>, ExtractError> {
    let document = pdfium.load_pdf_from_byte_slice(bytes, None).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            ExtractError::PasswordRequired
        } else {
            ExtractError::CorruptPdf { detail: err_str }
        }
    })?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut results = Vec::with_capacity(pages.len() as usize);

    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx + 1;
        let text = page
            .text()
            .map_err(|e| ExtractError::TextLayerFailed {
                page: page_num,
                detail: format!("{:?}", e),
            })?
            .all();
        let text = text.trim();

        if !needs_ocr(text, threshold) {
            debug!("Page {}: text layer ({} chars)", page_num, text.chars().count());
            results.push(ClassifiedPage {
                page_num,
                content: PageContent::Text(text.to_string()),
            });
            continue;
        }

        let (w, h) = target_size(page.width().value, page.height().value, dpi, max_pixels);
        let render_config = PdfRenderConfig::new()
            .set_target_width(w)
            .set_target_height(h);

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            ExtractError::RasterisationFailed {
                page: page_num,
                detail: format!("{:?}", e),
            }
        })?;
        let image = bitmap.as_image();
        debug!(
            "Page {}: scanned ({} chars), rendered {}x{} px",
            page_num,
            text.chars().count(),
            image.width(),
            image.height()
        );

        results.push(ClassifiedPage {
            page_num,
            content: PageContent::Scanned(image),
        });
    }

    Ok(results)
}

/// Decode an uploaded PNG/JPEG.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, ExtractError> {
    Ok(image::load_from_memory(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_counts_trimmed_chars() {
        assert!(needs_ocr("", 20));
        assert!(needs_ocr("   page 3   \n", 20));
        assert!(needs_ocr(&"x".repeat(19), 20));
        assert!(!needs_ocr(&"x".repeat(20), 20));
        // Unicode scalar values, not bytes.
        assert!(needs_ocr(&"é".repeat(19), 20));
    }

    #[test]
    fn letter_page_at_200_dpi() {
        assert_eq!(target_size(612.0, 792.0, 200, 4000), (1700, 2200));
    }

    #[test]
    fn oversized_page_is_capped() {
        let (w, h) = target_size(2384.0, 3370.0, 200, 4000);
        assert_eq!(h, 4000);
        assert!(w < 4000 && w > 2800, "got {w}");
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            decode_image(b"not an image"),
            Err(ExtractError::ImageDecode(_))
        ));
    }
}
