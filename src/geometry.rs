#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

/// A point in client, surface-local, or normalized space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are finite numbers.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// The surface's displayed box and the device pixel ratio it is shown at.
///
/// `left` / `top` / `width` / `height` are in CSS pixels relative to the
/// client area, the same numbers a bounding-client-rect reports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub dpr: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { left: 0.0, top: 0.0, width: 0.0, height: 0.0, dpr: 1.0 }
    }
}

impl Viewport {
    /// A viewport anchored at the client origin.
    #[must_use]
    pub fn new(width: f64, height: f64, dpr: f64) -> Self {
        Self { left: 0.0, top: 0.0, width, height, dpr }
    }

    #[must_use]
    pub fn with_origin(mut self, left: f64, top: f64) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    /// Device pixel ratio, falling back to 1 when unset or nonsensical.
    #[must_use]
    pub fn scale(&self) -> f64 {
        if self.dpr.is_finite() && self.dpr > 0.0 { self.dpr } else { 1.0 }
    }

    /// Whether the box has no drawable area.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Backing-store resolution in device pixels: CSS size × DPR.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn backing_size(&self) -> (u32, u32) {
        let to_px = |css: f64| {
            let px = (css * self.scale()).round();
            if px.is_finite() && px > 0.0 { px.min(f64::from(u32::MAX)) as u32 } else { 0 }
        };
        (to_px(self.width), to_px(self.height))
    }

    /// Convert a client-space point to surface-local CSS pixels.
    #[must_use]
    pub fn client_to_local(&self, client: Point) -> Point {
        Point { x: client.x - self.left, y: client.y - self.top }
    }

    /// Convert a surface-local point to fractions of the CSS box.
    ///
    /// An empty box maps everything to the origin.
    #[must_use]
    pub fn normalize(&self, local: Point) -> Point {
        if self.is_empty() {
            return Point::new(0.0, 0.0);
        }
        Point { x: local.x / self.width, y: local.y / self.height }
    }

    /// Convert fractions of the CSS box back to surface-local CSS pixels.
    #[must_use]
    pub fn denormalize(&self, normalized: Point) -> Point {
        Point { x: normalized.x * self.width, y: normalized.y * self.height }
    }
}
