//! PDFium page rendering. The shared library is loaded once per process
//! from the platform library path (`libpdfium.so` inside the Android APK).

use std::sync::OnceLock;

use image::RgbaImage;
use pdfium_render::prelude::{PdfRenderConfig, Pdfium, PdfiumError};

use super::layout::PageLayout;
use super::render::PageRasterizer;
use crate::error::{Error, Result};

static PDFIUM: OnceLock<std::result::Result<Pdfium, String>> = OnceLock::new();

fn pdfium_error(error: PdfiumError) -> Error {
    Error::Pdf(format!("PDFium: {error}"))
}

fn out_of_range(what: &str) -> Error {
    Error::Pdf(format!("{what} is out of range for PDFium"))
}

#[derive(Clone, Copy)]
pub struct PdfiumRasterizer {
    pdfium: &'static Pdfium,
}

impl PdfiumRasterizer {
    /// Binds the system PDFium library, or reports why it is unavailable.
    pub fn system() -> Result<Self> {
        let bound = PDFIUM.get_or_init(|| {
            Pdfium::bind_to_system_library()
                .map(Pdfium::new)
                .map_err(|error| error.to_string())
        });
        match bound {
            Ok(pdfium) => Ok(Self { pdfium }),
            Err(message) => Err(Error::Pdf(format!("PDF renderer unavailable: {message}"))),
        }
    }
}

impl std::fmt::Debug for PdfiumRasterizer {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("PdfiumRasterizer").finish_non_exhaustive()
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn rasterize(&self, pdf_bytes: &[u8], layouts: &[PageLayout]) -> Result<Vec<RgbaImage>> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(pdfium_error)?;
        let pages = document.pages();

        layouts
            .iter()
            .map(|layout| {
                let index = layout.index.try_into().map_err(|_| out_of_range("Page index"))?;
                let page = pages.get(index).map_err(pdfium_error)?;
                let config = PdfRenderConfig::new()
                    .set_target_width(
                        layout
                            .canvas_width
                            .try_into()
                            .map_err(|_| out_of_range("Canvas width"))?,
                    )
                    .set_maximum_height(
                        layout
                            .canvas_height
                            .try_into()
                            .map_err(|_| out_of_range("Canvas height"))?,
                    );
                let bitmap = page.render_with_config(&config).map_err(pdfium_error)?;
                let width = u32::try_from(bitmap.width()).map_err(|_| out_of_range("Bitmap width"))?;
                let height =
                    u32::try_from(bitmap.height()).map_err(|_| out_of_range("Bitmap height"))?;
                RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes()).ok_or_else(|| {
                    Error::Pdf(format!("PDFium returned a short bitmap for page {}", layout.index + 1))
                })
            })
            .collect()
    }
}
