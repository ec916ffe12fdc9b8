//! Transparent ink layers and round-brush stroking.

use image::{Rgba, RgbaImage};

/// Pen and eraser width on the annotation overlay, in canvas pixels.
pub const PEN_WIDTH: f32 = 3.0;
pub const INK_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// A position on a page canvas, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Pen,
    Eraser,
}

/// RGBA overlay drawn on top of one rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InkLayer {
    image: RgbaImage,
}

impl InkLayer {
    /// A fully transparent layer.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[must_use]
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Any pixel with non-zero alpha counts as ink.
    #[must_use]
    pub fn has_ink(&self) -> bool {
        self.image.pixels().any(|pixel| pixel[3] > 0)
    }

    /// Strokes a segment with `tool`; the eraser clears alpha under the brush.
    pub fn stroke(&mut self, from: Point, to: Point, tool: Tool) {
        match tool {
            Tool::Pen => paint_segment(&mut self.image, from, to, PEN_WIDTH, |pixel| {
                *pixel = INK_COLOR;
            }),
            Tool::Eraser => paint_segment(&mut self.image, from, to, PEN_WIDTH, |pixel| {
                *pixel = Rgba([0, 0, 0, 0]);
            }),
        }
    }

    pub fn clear(&mut self) {
        self.image.pixels_mut().for_each(|pixel| *pixel = Rgba([0, 0, 0, 0]));
    }

    #[must_use]
    pub fn snapshot(&self) -> RgbaImage {
        self.image.clone()
    }

    /// Restores a snapshot taken from this layer. Mismatched sizes are ignored.
    pub fn restore(&mut self, snapshot: RgbaImage) {
        if snapshot.dimensions() == self.image.dimensions() {
            self.image = snapshot;
        }
    }
}

/// Applies `paint` to every pixel whose center lies within `width / 2` of the
/// segment, which gives round caps and joins across consecutive segments.
pub(crate) fn paint_segment<F>(image: &mut RgbaImage, from: Point, to: Point, width: f32, mut paint: F)
where
    F: FnMut(&mut Rgba<u8>),
{
    let (image_width, image_height) = image.dimensions();
    if image_width == 0 || image_height == 0 {
        return;
    }
    let radius = width / 2.0;
    let Some((min_x, max_x)) = pixel_span(from.x.min(to.x) - radius, from.x.max(to.x) + radius, image_width) else {
        return;
    };
    let Some((min_y, max_y)) = pixel_span(from.y.min(to.y) - radius, from.y.max(to.y) + radius, image_height) else {
        return;
    };

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            if distance_to_segment(center, from, to) <= radius {
                paint(image.get_pixel_mut(x, y));
            }
        }
    }
}

fn pixel_span(low: f32, high: f32, limit: u32) -> Option<(u32, u32)> {
    if high < 0.0 || low >= limit as f32 {
        return None;
    }
    let first = low.floor().max(0.0) as u32;
    let last = (high.ceil().max(0.0) as u32).min(limit - 1);
    (first <= last).then_some((first, last))
}

fn distance_to_segment(point: Point, from: Point, to: Point) -> f32 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let length_squared = dx.mul_add(dx, dy * dy);
    let t = if length_squared <= f32::EPSILON {
        0.0
    } else {
        ((point.x - from.x).mul_add(dx, (point.y - from.y) * dy) / length_squared).clamp(0.0, 1.0)
    };
    let nearest_x = t.mul_add(dx, from.x);
    let nearest_y = t.mul_add(dy, from.y);
    (point.x - nearest_x).hypot(point.y - nearest_y)
}
