//! Raster seam: the only place pixels are produced.
//!
//! [`DrawSurface`](crate::surface::DrawSurface) talks to the display through
//! the [`Raster`] trait and never mutates pixels any other way. Hosts supply
//! the real implementation (a 2D canvas context, a GPU texture, an image
//! buffer). [`DisplayList`] is the headless implementation: it records the
//! lines that would currently be visible, which is what tests and server-side
//! previews need.

#[cfg(test)]
#[path = "raster_test.rs"]
mod raster_test;

use crate::geometry::Point;

/// How the ends of an open line are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    Butt,
    #[default]
    Round,
    Square,
}

/// How two connected lines meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    Miter,
    #[default]
    Round,
    Bevel,
}

/// Paint parameters for one line.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    /// CSS hex color.
    pub color: String,
    /// Line width in CSS pixels.
    pub width: f64,
    pub cap: LineCap,
    pub join: LineJoin,
}

impl StrokeStyle {
    /// Round caps and joins, so consecutive segments read as one smooth stroke.
    #[must_use]
    pub fn round(color: impl Into<String>, width: f64) -> Self {
        Self { color: color.into(), width, cap: LineCap::Round, join: LineJoin::Round }
    }
}

/// A drawing target measured in device pixels and addressed in CSS pixels.
pub trait Raster: Send {
    /// Reallocate the backing store at `width` × `height` device pixels and
    /// scale logical coordinates by `scale`, so one logical unit is one CSS
    /// pixel. Reallocation discards all content.
    fn resize_backing(&mut self, width: u32, height: u32, scale: f64);

    /// Erase every pixel, keeping size and scale.
    fn clear(&mut self);

    /// Draw a straight line between two points in CSS pixels.
    fn stroke_line(&mut self, from: Point, to: Point, style: &StrokeStyle);
}

/// One recorded line.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub from: Point,
    pub to: Point,
    pub style: StrokeStyle,
}

/// Headless raster that keeps the visible lines in paint order.
#[derive(Debug, Clone)]
pub struct DisplayList {
    width: u32,
    height: u32,
    scale: f64,
    lines: Vec<Line>,
}

impl Default for DisplayList {
    fn default() -> Self {
        Self { width: 0, height: 0, scale: 1.0, lines: Vec::new() }
    }
}

impl DisplayList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backing-store size in device pixels.
    #[must_use]
    pub fn backing_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Current logical-to-device scale.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Visible lines, oldest first.
    #[must_use]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Raster for DisplayList {
    fn resize_backing(&mut self, width: u32, height: u32, scale: f64) {
        self.width = width;
        self.height = height;
        self.scale = scale;
        self.lines.clear();
    }

    fn clear(&mut self) {
        self.lines.clear();
    }

    fn stroke_line(&mut self, from: Point, to: Point, style: &StrokeStyle) {
        self.lines.push(Line { from, to, style: style.clone() });
    }
}
