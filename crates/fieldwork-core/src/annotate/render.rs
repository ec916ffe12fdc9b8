//! Page rasterization for on-screen previews.
//!
//! Rendering engines sit behind [`PageRasterizer`]; this module sizes their
//! output to the page canvases from [`layout_pages`] so ink drawn on a
//! canvas lines up with the page underneath.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use super::layout::{layout_pages, LayoutBounds, PageLayout};
use crate::error::{Error, Result};

/// Draws PDF pages into pixels.
///
/// Returns one image per layout, in order, at roughly the layout's canvas
/// size.
pub trait PageRasterizer {
    fn rasterize(&self, pdf_bytes: &[u8], layouts: &[PageLayout]) -> Result<Vec<RgbaImage>>;
}

/// One page as it appears on screen: opaque and exactly canvas-sized.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub layout: PageLayout,
    pub image: RgbaImage,
}

/// Lays out and renders every page of `pdf_bytes`.
pub fn render_pages<R>(rasterizer: &R, pdf_bytes: &[u8], bounds: LayoutBounds) -> Result<Vec<RenderedPage>>
where
    R: PageRasterizer + ?Sized,
{
    let layouts = layout_pages(pdf_bytes, bounds)?;
    render_layouts(rasterizer, pdf_bytes, &layouts)
}

/// Renders pages for layouts that were already computed.
pub fn render_layouts<R>(
    rasterizer: &R,
    pdf_bytes: &[u8],
    layouts: &[PageLayout],
) -> Result<Vec<RenderedPage>>
where
    R: PageRasterizer + ?Sized,
{
    let images = rasterizer.rasterize(pdf_bytes, layouts)?;
    if images.len() != layouts.len() {
        return Err(Error::Pdf(format!(
            "renderer returned {} pages for a {}-page document",
            images.len(),
            layouts.len()
        )));
    }
    Ok(layouts
        .iter()
        .zip(images)
        .map(|(layout, image)| RenderedPage {
            layout: *layout,
            image: fit_to_canvas(image, layout),
        })
        .collect())
}

fn fit_to_canvas(image: RgbaImage, layout: &PageLayout) -> RgbaImage {
    let target = (layout.canvas_width, layout.canvas_height);
    let sized = if image.dimensions() == target {
        image
    } else {
        imageops::resize(&image, target.0, target.1, FilterType::Triangle)
    };
    onto_paper(sized)
}

/// Blends transparent areas onto white.
fn onto_paper(mut image: RgbaImage) -> RgbaImage {
    for pixel in image.pixels_mut() {
        let [red, green, blue, alpha] = pixel.0;
        if alpha == 255 {
            continue;
        }
        let blend = |channel: u8| {
            let alpha = u16::from(alpha);
            ((u16::from(channel) * alpha + 255 * (255 - alpha) + 127) / 255) as u8
        };
        *pixel = Rgba([blend(red), blend(green), blend(blue), 255]);
    }
    image
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::super::pdf::fixtures::sample_pdf;
    use super::fakes::GreyRasterizer;
    use super::*;

    #[test]
    fn pages_are_sized_to_their_canvas_and_made_opaque() {
        let bytes = sample_pdf(&[(612, 792, 0), (1224, 792, 0)]);
        let rasterizer = GreyRasterizer::default();

        let pages = render_pages(&rasterizer, &bytes, LayoutBounds::VIEWER).unwrap();

        assert_eq!(rasterizer.calls.get(), 1);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].image.dimensions(), (612, 792));
        assert_eq!(pages[1].image.dimensions(), (1100, 711));
        // Black at half alpha over white paper.
        assert_eq!(*pages[0].image.get_pixel(300, 400), Rgba([127, 127, 127, 255]));
    }

    #[test]
    fn missing_pages_are_an_error() {
        let bytes = sample_pdf(&[(612, 792, 0), (612, 792, 0)]);
        let rasterizer = GreyRasterizer {
            drop_last_page: true,
            ..GreyRasterizer::default()
        };

        let error = render_pages(&rasterizer, &bytes, LayoutBounds::ANNOTATOR).unwrap_err();
        assert!(matches!(error, Error::Pdf(_)));
    }

    #[test]
    fn opaque_pixels_are_kept() {
        let image = onto_paper(RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 255])));
        assert_eq!(*image.get_pixel(0, 0), Rgba([10, 20, 30, 255]));

        let cleared = onto_paper(RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 0])));
        assert_eq!(*cleared.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
    }
}
