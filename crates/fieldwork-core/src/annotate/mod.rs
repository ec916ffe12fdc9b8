//! PDF annotation: page layout and rendering, per-page ink layers with
//! undo, and flattening the ink back into the document.

mod compose;
mod history;
mod ink;
mod layout;
mod pdf;
#[cfg(feature = "pdfium")]
mod pdfium;
mod render;
mod session;
mod sketch;

pub use compose::{composite_ink, InkOverlay};
pub use history::{UndoHistory, MAX_UNDO_SNAPSHOTS};
pub use ink::{InkLayer, Point, Tool, INK_COLOR, PEN_WIDTH};
pub use layout::{layout_pages, LayoutBounds, PageLayout, MAX_CANVAS_HEIGHT};
#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRasterizer;
pub use render::{render_layouts, render_pages, PageRasterizer, RenderedPage};
pub use session::AnnotationSession;
pub use sketch::{
    SketchExport, SketchPad, SKETCH_ERASER_WIDTH, SKETCH_JPEG_QUALITY, SKETCH_MAX_DIMENSION,
    SKETCH_PEN_WIDTH,
};
