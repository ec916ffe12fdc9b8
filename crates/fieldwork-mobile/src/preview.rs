//! Rendered PDF pages for the detail preview and the annotator.
#![cfg_attr(not(target_os = "android"), allow(dead_code))]

use std::io::Cursor;

use base64::prelude::{Engine as _, BASE64_STANDARD};
use fieldwork_core::annotate::{
    render_pages, AnnotationSession, LayoutBounds, PageLayout, PageRasterizer, RenderedPage,
};
use fieldwork_core::Result;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

/// Pages are opaque, so JPEG keeps the data URIs small.
pub const PAGE_JPEG_QUALITY: u8 = 85;

/// One page ready for an `img` element.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePreview {
    pub layout: PageLayout,
    pub image_uri: String,
}

#[cfg(target_os = "android")]
pub fn system_rasterizer() -> Result<fieldwork_core::annotate::PdfiumRasterizer> {
    fieldwork_core::annotate::PdfiumRasterizer::system()
}

/// Read-only preview of a whole document at viewer width.
pub fn viewer_previews<R>(rasterizer: &R, pdf_bytes: &[u8]) -> Result<Vec<PagePreview>>
where
    R: PageRasterizer + ?Sized,
{
    encode_pages(render_pages(rasterizer, pdf_bytes, LayoutBounds::VIEWER)?)
}

/// Backgrounds for an annotation session, one per ink layer.
pub fn annotation_backgrounds<R>(rasterizer: &R, session: &AnnotationSession) -> Result<Vec<PagePreview>>
where
    R: PageRasterizer + ?Sized,
{
    encode_pages(session.render_pages(rasterizer)?)
}

fn encode_pages(pages: Vec<RenderedPage>) -> Result<Vec<PagePreview>> {
    pages
        .into_iter()
        .map(|page| {
            let mut cursor = Cursor::new(Vec::new());
            JpegEncoder::new_with_quality(&mut cursor, PAGE_JPEG_QUALITY)
                .encode_image(&DynamicImage::ImageRgba8(page.image).to_rgb8())?;
            Ok(PagePreview {
                layout: page.layout,
                image_uri: format!(
                    "data:image/jpeg;base64,{}",
                    BASE64_STANDARD.encode(cursor.into_inner())
                ),
            })
        })
        .collect()
}
