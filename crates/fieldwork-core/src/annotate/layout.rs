//! Canvas sizing for rendered PDF pages.

use super::pdf;
use crate::error::Result;

/// Tallest canvas a page is rendered to. Pages that would exceed it are
/// scaled down as a whole, below the minimum width if need be.
pub const MAX_CANVAS_HEIGHT: u32 = 4000;

/// Width limits for a rendered page canvas, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutBounds {
    pub min_width: f64,
    pub max_width: f64,
}

impl LayoutBounds {
    /// Bounds used while annotating.
    pub const ANNOTATOR: Self = Self {
        min_width: 600.0,
        max_width: 900.0,
    };

    /// Bounds used by the read-only preview.
    pub const VIEWER: Self = Self {
        min_width: 600.0,
        max_width: 1100.0,
    };

    #[must_use]
    pub fn target_width(&self, page_width: f64) -> f64 {
        page_width.clamp(self.min_width, self.max_width)
    }
}

/// Rendered size of one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    /// Zero-based page index.
    pub index: usize,
    /// Displayed page size in points, after rotation.
    pub width_pt: f64,
    pub height_pt: f64,
    pub rotation: u16,
    /// Pixels per point.
    pub scale: f64,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

/// Computes a canvas size for every page of `pdf_bytes`.
pub fn layout_pages(pdf_bytes: &[u8], bounds: LayoutBounds) -> Result<Vec<PageLayout>> {
    let document = pdf::load(pdf_bytes)?;
    let pages = pdf::page_geometries(&document)?;
    Ok(pages
        .iter()
        .enumerate()
        .map(|(index, page)| {
            let (width_pt, height_pt) = page.display_size();
            let scale = bounded_scale(bounds.target_width(width_pt) / width_pt, height_pt);
            PageLayout {
                index,
                width_pt,
                height_pt,
                rotation: page.rotation,
                scale,
                canvas_width: canvas_dimension(width_pt * scale),
                canvas_height: canvas_dimension(height_pt * scale),
            }
        })
        .collect())
}

fn bounded_scale(scale: f64, height_pt: f64) -> f64 {
    let max_height = f64::from(MAX_CANVAS_HEIGHT);
    if height_pt * scale > max_height {
        max_height / height_pt
    } else {
        scale
    }
}

fn canvas_dimension(value: f64) -> u32 {
    value.floor().clamp(1.0, f64::from(u32::MAX)) as u32
}
