//! Page rasterization for classifier input
//!
//! Renders every page of a PDF to a JPEG via Pdfium. The render runs inside
//! `spawn_blocking` on a single thread; Pdfium handles are not `Send`.

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use pdfium_render::prelude::*;

use crate::error::{AnalyzeError, Result};

/// JPEG quality for classifier input images
const JPEG_QUALITY: u8 = 90;

/// Initialize Pdfium, trying the vendored library first, then falling back to system
fn init_pdfium() -> std::result::Result<Pdfium, PdfiumError> {
    // Try to load from vendor directory (relative to workspace root)
    let vendor_path = std::env::current_dir().ok().and_then(|mut p| {
        p.push("vendor/pdfium/lib");
        if p.exists() { Some(p) } else { None }
    });

    if let Some(vendor_path) = vendor_path {
        if let Ok(binding) =
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&vendor_path))
        {
            return Ok(Pdfium::new(binding));
        }
    }

    // Fallback to system library or default search paths
    Pdfium::bind_to_system_library().map(Pdfium::new)
}

/// Render every page of the PDF at `path` to a JPEG of the given pixel width.
///
/// Returns the encoded pages in document order, ready to hand to
/// [`GeminiClient::analyze`](crate::GeminiClient::analyze).
pub async fn render_pages_jpeg(path: impl AsRef<Path>, target_width: u32) -> Result<Vec<Vec<u8>>> {
    let path = path.as_ref().to_owned();

    tokio::task::spawn_blocking(move || {
        let pdfium = init_pdfium().map_err(|e| AnalyzeError::Render(e.to_string()))?;
        let document = pdfium
            .load_pdf_from_file(&path, None)
            .map_err(|e| AnalyzeError::Render(e.to_string()))?;

        let config = PdfRenderConfig::new().set_target_width(target_width as i32);
        let page_count = document.pages().len();

        let mut images = Vec::with_capacity(page_count as usize);
        for index in 0..page_count {
            let page = document
                .pages()
                .get(index)
                .map_err(|e| AnalyzeError::Render(e.to_string()))?;
            let bitmap = page
                .render_with_config(&config)
                .map_err(|e| AnalyzeError::Render(e.to_string()))?;

            let width = bitmap.width() as u32;
            let height = bitmap.height() as u32;
            let rgba = image::RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes().to_vec())
                .ok_or_else(|| AnalyzeError::Image("bitmap size mismatch".to_string()))?;

            let mut jpeg = Vec::new();
            let encoder = JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY);
            image::DynamicImage::ImageRgba8(rgba)
                .to_rgb8()
                .write_with_encoder(encoder)
                .map_err(|e| AnalyzeError::Image(e.to_string()))?;
            images.push(jpeg);
        }

        log::debug!(
            "rendered {} pages at target width {target_width}",
            images.len()
        );
        Ok(images)
    })
    .await?
}
