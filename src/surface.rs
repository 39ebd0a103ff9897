//! DrawSurface — raster ownership, stroke sessions, and immediate rendering.
//!
//! DESIGN
//! ======
//! All drawing is synchronous. A pointer move with an open session paints
//! its line before returning, then hands back the normalized [`Segment`] so
//! the caller can queue it for replication. Replayed and remote segments come
//! in through [`DrawSurface::render_segment`] and are denormalized against the
//! CSS box as it is *now*, which keeps drawings stable across resizes.
//!
//! Logical drawing space is CSS pixels. The backing store is CSS size × DPR,
//! and the raster is scaled by DPR so one logical unit stays one CSS pixel.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use tracing::debug;

use crate::brush::{Brush, BrushError};
use crate::geometry::{Point, Viewport};
use crate::input::{PointerAction, PointerInput};
use crate::raster::{Raster, StrokeStyle};
use crate::segment::Segment;

/// Client-local state between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy)]
struct StrokeSession {
    /// Surface-local position of the previous event.
    last: Point,
}

pub struct DrawSurface<R: Raster> {
    raster: R,
    viewport: Viewport,
    brush: Brush,
    session: Option<StrokeSession>,
}

impl<R: Raster> DrawSurface<R> {
    #[must_use]
    pub fn new(raster: R, brush: Brush) -> Self {
        Self { raster, viewport: Viewport::default(), brush, session: None }
    }

    // --- Layout ---

    /// Reallocate the backing store for a new CSS box / DPR. Clears the
    /// raster; the owner replays persisted segments afterwards.
    pub fn resize(&mut self, viewport: Viewport) {
        let (width, height) = viewport.backing_size();
        self.raster.resize_backing(width, height, viewport.scale());
        self.viewport = viewport;
        debug!(css_width = viewport.width, css_height = viewport.height, width, height, "surface resized");
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    // --- Stroke session ---

    /// Open a stroke at a surface-local point. No-op while one is open.
    pub fn begin_stroke(&mut self, point: Point) {
        if self.session.is_none() {
            self.session = Some(StrokeSession { last: point });
        }
    }

    /// Extend the open stroke to `point`: paint the line, advance the
    /// session, and return the line as a normalized segment.
    pub fn continue_stroke(&mut self, point: Point) -> Option<Segment> {
        let session = self.session.as_mut()?;
        let from = session.last;
        session.last = point;

        self.raster.stroke_line(from, point, &self.brush.style());
        Some(Segment::new(
            self.viewport.normalize(from),
            self.viewport.normalize(point),
            self.brush.color(),
            self.brush.width(),
        ))
    }

    /// Close the open stroke, if any.
    pub fn end_stroke(&mut self) {
        self.session = None;
    }

    #[must_use]
    pub fn is_stroking(&self) -> bool {
        self.session.is_some()
    }

    /// Route one host input event. Client coordinates are made surface-local
    /// against the current CSS origin.
    pub fn handle_pointer(&mut self, input: &PointerInput) -> Option<Segment> {
        match input.action()? {
            PointerAction::Begin(client) => {
                self.begin_stroke(self.viewport.client_to_local(client));
                None
            }
            PointerAction::Continue(client) => self.continue_stroke(self.viewport.client_to_local(client)),
            PointerAction::End => {
                self.end_stroke();
                None
            }
        }
    }

    // --- Rendering ---

    /// Paint a stored or remote segment at its place in the current CSS box.
    pub fn render_segment(&mut self, segment: &Segment) {
        let from = self.viewport.denormalize(segment.start);
        let to = self.viewport.denormalize(segment.end);
        let style = StrokeStyle::round(segment.color.clone(), segment.stroke_width);
        self.raster.stroke_line(from, to, &style);
    }

    /// Erase the local raster. Persisted segments are untouched.
    pub fn clear(&mut self) {
        self.raster.clear();
    }

    // --- Brush ---

    #[must_use]
    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    /// # Errors
    ///
    /// Returns an error if `color` is not a hex color.
    pub fn set_color(&mut self, color: &str) -> Result<(), BrushError> {
        self.brush.set_color(color)
    }

    /// Returns the width actually applied after clamping.
    ///
    /// # Errors
    ///
    /// Returns an error for zero, negative, or non-finite widths.
    pub fn set_stroke_width(&mut self, width: f64) -> Result<f64, BrushError> {
        self.brush.set_width(width)
    }

    // --- Raster access ---

    #[must_use]
    pub fn raster(&self) -> &R {
        &self.raster
    }
}
