//! Brush: the color and width new segments are drawn with.

#[cfg(test)]
#[path = "brush_test.rs"]
mod brush_test;

use crate::consts::{DEFAULT_COLOR, DEFAULT_STROKE_WIDTH, MAX_STROKE_WIDTH, MIN_STROKE_WIDTH};
use crate::raster::StrokeStyle;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BrushError {
    #[error("invalid color: {0:?} (expected #rgb or #rrggbb)")]
    InvalidColor(String),
    #[error("invalid stroke width: {0}")]
    InvalidWidth(f64),
}

/// Current drawing color and width, owned by one surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Brush {
    color: String,
    width: f64,
}

impl Default for Brush {
    fn default() -> Self {
        Self { color: DEFAULT_COLOR.to_owned(), width: DEFAULT_STROKE_WIDTH }
    }
}

impl Brush {
    /// Build a brush, validating the color and clamping the width.
    ///
    /// # Errors
    ///
    /// Returns an error if the color is not hex or the width is not a
    /// positive finite number.
    pub fn new(color: &str, width: f64) -> Result<Self, BrushError> {
        let mut brush = Self::default();
        brush.set_color(color)?;
        brush.set_width(width)?;
        Ok(brush)
    }

    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Replace the color. The previous color is kept on error.
    ///
    /// # Errors
    ///
    /// Returns [`BrushError::InvalidColor`] unless `color` is `#rgb` or `#rrggbb`.
    pub fn set_color(&mut self, color: &str) -> Result<(), BrushError> {
        let color = color.trim();
        if !is_hex_color(color) {
            return Err(BrushError::InvalidColor(color.to_owned()));
        }
        self.color = color.to_ascii_lowercase();
        Ok(())
    }

    /// Replace the width, clamped into the supported range. Returns the width
    /// actually applied.
    ///
    /// # Errors
    ///
    /// Returns [`BrushError::InvalidWidth`] for zero, negative, or non-finite widths.
    pub fn set_width(&mut self, width: f64) -> Result<f64, BrushError> {
        if !(width.is_finite() && width > 0.0) {
            return Err(BrushError::InvalidWidth(width));
        }
        self.width = width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH);
        Ok(self.width)
    }

    /// Paint parameters for a line drawn with this brush.
    #[must_use]
    pub fn style(&self) -> StrokeStyle {
        StrokeStyle::round(self.color.clone(), self.width)
    }
}

/// Whether `value` is a `#rgb` or `#rrggbb` hex color.
#[must_use]
pub fn is_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}
