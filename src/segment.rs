//! Segment — the one persisted drawing primitive.
//!
//! DESIGN
//! ======
//! A segment is a straight line between two points stored as fractions of
//! the surface's CSS box, so a drawing replays at the same relative place on
//! any screen size or pixel density. Segments are immutable: editing the
//! board means inserting or deleting rows, never updating one.
//!
//! WIRE FORMAT
//! ===========
//! Stores, REST bodies, and change-feed payloads all carry the flat row
//! `{id, x0, y0, x1, y1, color, width, created_at}`. `id` and `created_at`
//! are assigned by the store and absent on segments that were never written.

#[cfg(test)]
#[path = "segment_test.rs"]
mod segment_test;

use serde::{Deserialize, Serialize};

use crate::brush::is_hex_color;
use crate::geometry::Point;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SegmentError {
    #[error("segment endpoint is not finite")]
    NonFiniteEndpoint,
    #[error("segment width must be positive: {0}")]
    InvalidWidth(f64),
    #[error("segment color is not hex: {0:?}")]
    InvalidColor(String),
}

/// A straight line with normalized endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SegmentRow", into = "SegmentRow")]
pub struct Segment {
    /// Store-assigned row id.
    pub id: Option<i64>,
    pub start: Point,
    pub end: Point,
    pub color: String,
    /// Width in CSS pixels at render time.
    pub stroke_width: f64,
    /// Store-assigned ordering timestamp, milliseconds since Unix epoch.
    pub created_at: Option<i64>,
}

impl Segment {
    /// A segment that has not been written anywhere yet.
    pub fn new(start: Point, end: Point, color: impl Into<String>, stroke_width: f64) -> Self {
        Self { id: None, start, end, color: color.into(), stroke_width, created_at: None }
    }

    /// Whether the store has assigned this segment an identity.
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Check that the segment can be rendered and stored.
    ///
    /// Endpoints are allowed outside `[0, 1]`: a touch drag keeps reporting
    /// positions after it leaves the surface.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), SegmentError> {
        if !(self.start.is_finite() && self.end.is_finite()) {
            return Err(SegmentError::NonFiniteEndpoint);
        }
        if !(self.stroke_width.is_finite() && self.stroke_width > 0.0) {
            return Err(SegmentError::InvalidWidth(self.stroke_width));
        }
        if !is_hex_color(&self.color) {
            return Err(SegmentError::InvalidColor(self.color.clone()));
        }
        Ok(())
    }
}

/// Flat row shape shared by every store and the HTTP surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SegmentRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    color: String,
    width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<i64>,
}

impl From<SegmentRow> for Segment {
    fn from(row: SegmentRow) -> Self {
        Self {
            id: row.id,
            start: Point::new(row.x0, row.y0),
            end: Point::new(row.x1, row.y1),
            color: row.color,
            stroke_width: row.width,
            created_at: row.created_at,
        }
    }
}

impl From<Segment> for SegmentRow {
    fn from(segment: Segment) -> Self {
        Self {
            id: segment.id,
            x0: segment.start.x,
            y0: segment.start.y,
            x1: segment.end.x,
            y1: segment.end.y,
            color: segment.color,
            width: segment.stroke_width,
            created_at: segment.created_at,
        }
    }
}
