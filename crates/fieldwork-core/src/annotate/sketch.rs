//! Freehand "draw note" canvas uploaded as a photo.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tracing::warn;

use super::ink::{paint_segment, Point, Tool};
use crate::error::{Error, Result};
use crate::files::{encode_jpeg, UploadField, UploadFile, JPEG_MIME, PNG_MIME};

pub const SKETCH_PEN_WIDTH: f32 = 4.0;
pub const SKETCH_ERASER_WIDTH: f32 = 14.0;
pub const SKETCH_JPEG_QUALITY: u8 = 80;
/// Largest sketch side in pixels; `SketchPad::new` clamps to it.
pub const SKETCH_MAX_DIMENSION: u32 = 4096;

const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);
const PEN: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Encoded drawing ready to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SketchExport {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Opaque white canvas; the eraser paints white.
#[derive(Debug, Clone)]
pub struct SketchPad {
    canvas: RgbaImage,
    dirty: bool,
}

impl SketchPad {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.clamp(1, SKETCH_MAX_DIMENSION);
        let height = height.clamp(1, SKETCH_MAX_DIMENSION);
        Self {
            canvas: RgbaImage::from_pixel(width, height, PAPER),
            dirty: false,
        }
    }

    #[must_use]
    pub const fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    #[must_use]
    pub const fn is_blank(&self) -> bool {
        !self.dirty
    }

    pub fn stroke(&mut self, from: Point, to: Point, tool: Tool) {
        let (width, color) = match tool {
            Tool::Pen => (SKETCH_PEN_WIDTH, PEN),
            Tool::Eraser => (SKETCH_ERASER_WIDTH, PAPER),
        };
        paint_segment(&mut self.canvas, from, to, width, |pixel| *pixel = color);
        self.dirty = true;
    }

    /// Draws a polyline; a single point leaves a dot.
    pub fn draw_path(&mut self, points: &[Point], tool: Tool) {
        match points {
            [] => {}
            [only] => self.stroke(*only, *only, tool),
            _ => {
                for pair in points.windows(2) {
                    self.stroke(pair[0], pair[1], tool);
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.canvas.pixels_mut().for_each(|pixel| *pixel = PAPER);
        self.dirty = false;
    }

    /// JPEG at quality 80, or PNG if JPEG encoding fails.
    pub fn export(&self) -> Result<SketchExport> {
        let image = DynamicImage::ImageRgba8(self.canvas.clone());
        match encode_jpeg(&image, SKETCH_JPEG_QUALITY) {
            Ok(bytes) => Ok(SketchExport {
                file_name: "drawing.jpg",
                mime_type: JPEG_MIME,
                bytes,
            }),
            Err(error) => {
                warn!("JPEG export failed, falling back to PNG: {}", error);
                let mut cursor = Cursor::new(Vec::new());
                image.write_to(&mut cursor, ImageFormat::Png)?;
                Ok(SketchExport {
                    file_name: "drawing.png",
                    mime_type: PNG_MIME,
                    bytes: cursor.into_inner(),
                })
            }
        }
    }

    /// Exports the drawing as a `photoFile` part. A blank pad is rejected.
    pub fn export_upload(&self) -> Result<UploadFile> {
        if self.is_blank() {
            return Err(Error::Validation("Draw something before saving.".to_string()));
        }
        let export = self.export()?;
        UploadFile::new(UploadField::Photo, export.file_name, export.mime_type, export.bytes)
    }
}
