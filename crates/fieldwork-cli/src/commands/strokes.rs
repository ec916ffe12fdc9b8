//! JSON stroke scripts, the CLI stand-in for touch input.
//!
//! ```json
//! { "width": 800, "height": 600,
//!   "strokes": [ { "page": 1, "tool": "pen", "points": [[10, 20], [40, 60]] } ] }
//! ```
//!
//! A bare array of strokes is accepted too. `page` is 1-based and only used
//! for PDF annotation; `width`/`height` only size sketches.

use std::path::Path;

use fieldwork_core::annotate::{AnnotationSession, Point, SketchPad, Tool, SKETCH_MAX_DIMENSION};
use serde::Deserialize;

use crate::error::CliError;

pub const DEFAULT_SKETCH_WIDTH: u32 = 1000;
pub const DEFAULT_SKETCH_HEIGHT: u32 = 700;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolName {
    #[default]
    Pen,
    Eraser,
}

impl From<ToolName> for Tool {
    fn from(value: ToolName) -> Self {
        match value {
            ToolName::Pen => Self::Pen,
            ToolName::Eraser => Self::Eraser,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StrokeSpec {
    #[serde(default = "first_page")]
    pub page: usize,
    #[serde(default)]
    pub tool: ToolName,
    pub points: Vec<[f32; 2]>,
}

const fn first_page() -> usize {
    1
}

impl StrokeSpec {
    fn points(&self) -> Vec<Point> {
        self.points.iter().map(|[x, y]| Point::new(*x, *y)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrokeScript {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub strokes: Vec<StrokeSpec>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScript {
    Bare(Vec<StrokeSpec>),
    Wrapped {
        #[serde(default)]
        width: Option<u32>,
        #[serde(default)]
        height: Option<u32>,
        strokes: Vec<StrokeSpec>,
    },
}

impl StrokeScript {
    pub fn parse(raw: &str) -> Result<Self, CliError> {
        let script = match serde_json::from_str::<RawScript>(raw)
            .map_err(|error| CliError::InvalidArgument(format!("Invalid stroke script: {error}")))?
        {
            RawScript::Bare(strokes) => Self {
                strokes,
                ..Self::default()
            },
            RawScript::Wrapped {
                width,
                height,
                strokes,
            } => Self {
                width,
                height,
                strokes,
            },
        };
        if [script.width, script.height]
            .into_iter()
            .flatten()
            .any(|side| side > SKETCH_MAX_DIMENSION)
        {
            return Err(CliError::InvalidArgument(format!(
                "Sketch width and height must be at most {SKETCH_MAX_DIMENSION} pixels"
            )));
        }
        if script.strokes.iter().any(|stroke| stroke.page == 0) {
            return Err(CliError::InvalidArgument(
                "Stroke pages are numbered from 1".to_string(),
            ));
        }
        Ok(script)
    }

    pub fn load(path: &Path) -> Result<Self, CliError> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    /// Replays every stroke onto its page.
    pub fn apply_to_session(&self, session: &mut AnnotationSession) -> Result<(), CliError> {
        for stroke in &self.strokes {
            session.apply_strokes(stroke.page - 1, stroke.tool.into(), &[stroke.points()])?;
        }
        Ok(())
    }

    /// Draws every stroke on a fresh sketch pad; pages are ignored.
    pub fn render_sketch(&self) -> SketchPad {
        let mut pad = SketchPad::new(
            self.width.filter(|width| *width > 0).unwrap_or(DEFAULT_SKETCH_WIDTH),
            self.height.filter(|height| *height > 0).unwrap_or(DEFAULT_SKETCH_HEIGHT),
        );
        for stroke in &self.strokes {
            pad.draw_path(&stroke.points(), stroke.tool.into());
        }
        pad
    }
}
