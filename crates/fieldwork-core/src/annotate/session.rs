//! Interactive annotation state for one PDF.

use tracing::{debug, info};

use super::compose::{composite_ink, InkOverlay};
use super::history::UndoHistory;
use super::ink::{InkLayer, Point, Tool};
use super::layout::{layout_pages, LayoutBounds, PageLayout};
use super::render::{render_layouts, PageRasterizer, RenderedPage};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
struct AnnotatedPage {
    layout: PageLayout,
    ink: InkLayer,
    history: UndoHistory,
}

#[derive(Debug, Clone, Copy)]
struct ActiveStroke {
    page: usize,
    last: Point,
}

/// A loaded PDF plus one ink layer and undo history per page.
///
/// Dropping the session discards unsaved ink.
#[derive(Debug, Clone)]
pub struct AnnotationSession {
    source: Vec<u8>,
    pages: Vec<AnnotatedPage>,
    draw_mode: bool,
    tool: Tool,
    stroke: Option<ActiveStroke>,
}

impl AnnotationSession {
    /// Lays out every page at annotator size with an empty ink layer.
    pub fn open(pdf_bytes: Vec<u8>) -> Result<Self> {
        let pages = layout_pages(&pdf_bytes, LayoutBounds::ANNOTATOR)?
            .into_iter()
            .map(|layout| AnnotatedPage {
                ink: InkLayer::new(layout.canvas_width, layout.canvas_height),
                history: UndoHistory::new(),
                layout,
            })
            .collect::<Vec<_>>();
        info!(pages = pages.len(), "Opened PDF for annotation");
        Ok(Self {
            source: pdf_bytes,
            pages,
            draw_mode: false,
            tool: Tool::Pen,
            stroke: None,
        })
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn layouts(&self) -> Vec<PageLayout> {
        self.pages.iter().map(|page| page.layout).collect()
    }

    #[must_use]
    pub const fn draw_mode(&self) -> bool {
        self.draw_mode
    }

    /// Turning draw mode off ends any stroke in progress.
    pub fn set_draw_mode(&mut self, enabled: bool) {
        self.draw_mode = enabled;
        if !enabled {
            self.stroke = None;
        }
    }

    #[must_use]
    pub const fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    /// Starts a stroke and records an undo snapshot. Returns false when draw
    /// mode is off or the page does not exist.
    pub fn begin_stroke(&mut self, page: usize, at: Point) -> bool {
        if !self.draw_mode {
            return false;
        }
        let tool = self.tool;
        let Some(target) = self.pages.get_mut(page) else {
            return false;
        };
        target.history.push(target.ink.snapshot());
        target.ink.stroke(at, at, tool);
        self.stroke = Some(ActiveStroke { page, last: at });
        true
    }

    /// Extends the current stroke. Returns false when no stroke is active.
    pub fn stroke_to(&mut self, at: Point) -> bool {
        let tool = self.tool;
        let Some(stroke) = self.stroke.as_mut() else {
            return false;
        };
        let Some(target) = self.pages.get_mut(stroke.page) else {
            return false;
        };
        target.ink.stroke(stroke.last, at, tool);
        stroke.last = at;
        true
    }

    pub fn end_stroke(&mut self) {
        self.stroke = None;
    }

    /// Restores the page's previous snapshot. No-op on an empty history.
    pub fn undo(&mut self, page: usize) -> bool {
        let Some(target) = self.pages.get_mut(page) else {
            return false;
        };
        match target.history.pop() {
            Some(snapshot) => {
                target.ink.restore(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn clear_page(&mut self, page: usize) -> bool {
        let Some(target) = self.pages.get_mut(page) else {
            return false;
        };
        target.history.push(target.ink.snapshot());
        target.ink.clear();
        true
    }

    #[must_use]
    pub fn ink_layer(&self, page: usize) -> Option<&InkLayer> {
        self.pages.get(page).map(|page| &page.ink)
    }

    #[must_use]
    pub fn undo_depth(&self, page: usize) -> usize {
        self.pages.get(page).map_or(0, |page| page.history.len())
    }

    /// Zero-based indexes of pages carrying ink.
    #[must_use]
    pub fn inked_pages(&self) -> Vec<usize> {
        self.pages
            .iter()
            .enumerate()
            .filter(|(_, page)| page.ink.has_ink())
            .map(|(index, _)| index)
            .collect()
    }

    /// Produces the flattened document. Returns the original bytes when no
    /// page has ink.
    pub fn flatten(&self) -> Result<Vec<u8>> {
        let overlays: Vec<InkOverlay<'_>> = self
            .inked_pages()
            .into_iter()
            .map(|index| InkOverlay {
                page_index: index,
                image: self.pages[index].ink.image(),
            })
            .collect();
        if overlays.is_empty() {
            debug!("No ink to flatten");
            return Ok(self.source.clone());
        }
        info!(pages = overlays.len(), "Flattening ink into PDF");
        composite_ink(&self.source, &overlays)
    }

    /// Page backgrounds at the same size as the ink layers.
    pub fn render_pages<R>(&self, rasterizer: &R) -> Result<Vec<RenderedPage>>
    where
        R: PageRasterizer + ?Sized,
    {
        render_layouts(rasterizer, &self.source, &self.layouts())
    }

    /// Replays a list of strokes onto a page, as a scripted alternative to
    /// pointer events.
    pub fn apply_strokes(&mut self, page: usize, tool: Tool, strokes: &[Vec<Point>]) -> Result<()> {
        if page >= self.pages.len() {
            return Err(Error::InvalidInput(format!(
                "Page {} is out of range (document has {} pages)",
                page + 1,
                self.pages.len()
            )));
        }
        let previous = (self.draw_mode, self.tool);
        self.set_draw_mode(true);
        self.set_tool(tool);
        for stroke in strokes {
            let Some((first, rest)) = stroke.split_first() else {
                continue;
            };
            self.begin_stroke(page, *first);
            for point in rest {
                self.stroke_to(*point);
            }
            self.end_stroke();
        }
        self.set_draw_mode(previous.0);
        self.set_tool(previous.1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use lopdf::Document;
    use pretty_assertions::assert_eq;

    use super::super::pdf::fixtures::sample_pdf;
    use super::*;

    fn two_page_session() -> AnnotationSession {
        AnnotationSession::open(sample_pdf(&[(612, 792, 0), (612, 792, 0)])).unwrap()
    }

    #[test]
    fn strokes_are_ignored_until_draw_mode_is_on() {
        let mut session = two_page_session();
        assert!(!session.begin_stroke(0, Point::new(10.0, 10.0)));
        assert!(!session.stroke_to(Point::new(50.0, 50.0)));
        assert!(session.inked_pages().is_empty());

        session.set_draw_mode(true);
        assert!(session.begin_stroke(0, Point::new(10.0, 10.0)));
        assert!(session.stroke_to(Point::new(50.0, 50.0)));
        session.end_stroke();
        assert_eq!(session.inked_pages(), vec![0]);
    }

    #[test]
    fn disabling_draw_mode_ends_the_stroke() {
        let mut session = two_page_session();
        session.set_draw_mode(true);
        session.begin_stroke(1, Point::new(10.0, 10.0));
        session.set_draw_mode(false);
        assert!(!session.stroke_to(Point::new(80.0, 80.0)));
    }

    #[test]
    fn undo_restores_the_previous_stroke_state() {
        let mut session = two_page_session();
        session.set_draw_mode(true);
        session.begin_stroke(0, Point::new(10.0, 10.0));
        session.stroke_to(Point::new(60.0, 10.0));
        session.end_stroke();
        let after_first = session.ink_layer(0).unwrap().clone();

        session.begin_stroke(0, Point::new(10.0, 40.0));
        session.stroke_to(Point::new(60.0, 40.0));
        session.end_stroke();
        assert_eq!(session.undo_depth(0), 2);

        assert!(session.undo(0));
        assert_eq!(session.ink_layer(0).unwrap(), &after_first);
        assert!(session.undo(0));
        assert!(session.inked_pages().is_empty());
        assert!(!session.undo(0));
    }

    #[test]
    fn clear_page_is_undoable() {
        let mut session = two_page_session();
        session
            .apply_strokes(0, Tool::Pen, &[vec![Point::new(5.0, 5.0), Point::new(90.0, 90.0)]])
            .unwrap();
        assert!(session.clear_page(0));
        assert!(session.inked_pages().is_empty());
        assert!(session.undo(0));
        assert_eq!(session.inked_pages(), vec![0]);
    }

    #[test]
    fn eraser_removes_pen_ink() {
        let mut session = two_page_session();
        let line = vec![Point::new(10.0, 20.0), Point::new(10.0, 20.0)];
        session.apply_strokes(1, Tool::Pen, &[line.clone()]).unwrap();
        assert_eq!(session.inked_pages(), vec![1]);
        session.apply_strokes(1, Tool::Eraser, &[line]).unwrap();
        assert!(session.inked_pages().is_empty());
        assert_eq!(session.tool(), Tool::Pen);
        assert!(!session.draw_mode());
    }

    #[test]
    fn flatten_without_ink_is_verbatim() {
        let bytes = sample_pdf(&[(612, 792, 0)]);
        let session = AnnotationSession::open(bytes.clone()).unwrap();
        assert_eq!(session.flatten().unwrap(), bytes);
    }

    #[test]
    fn flatten_stamps_only_inked_pages() {
        let mut session = two_page_session();
        session
            .apply_strokes(1, Tool::Pen, &[vec![Point::new(100.0, 100.0), Point::new(300.0, 120.0)]])
            .unwrap();
        let output = session.flatten().unwrap();

        let document = Document::load_mem(&output).unwrap();
        let ids: Vec<_> = document.get_pages().into_values().collect();
        let first = document.get_dictionary(ids[0]).unwrap();
        let second = document.get_dictionary(ids[1]).unwrap();
        assert!(first.get(b"Contents").unwrap().as_reference().is_ok());
        assert_eq!(second.get(b"Contents").unwrap().as_array().unwrap().len(), 3);
    }

    #[test]
    fn out_of_range_strokes_fail() {
        let mut session = two_page_session();
        let result = session.apply_strokes(5, Tool::Pen, &[vec![Point::new(1.0, 1.0)]]);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(!session.clear_page(5));
        assert!(!session.undo(5));
    }

    #[test]
    fn page_backgrounds_match_ink_layers() {
        let session = AnnotationSession::open(sample_pdf(&[(300, 400, 0), (1224, 792, 90)])).unwrap();
        let rendered = session
            .render_pages(&super::super::render::fakes::GreyRasterizer::default())
            .unwrap();

        assert_eq!(rendered.len(), 2);
        for (page, background) in rendered.iter().enumerate() {
            let ink = session.ink_layer(page).unwrap().image();
            assert_eq!(background.image.dimensions(), ink.dimensions());
            assert_eq!(background.layout, session.layouts()[page]);
        }
    }
}
