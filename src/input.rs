//! Pointer and touch input as delivered by the host page.
//!
//! Positions are in client coordinates (CSS pixels from the top-left of the
//! page's client area). [`PointerInput::action`] folds the mouse and touch
//! vocabularies into the three things a stroke session understands.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::geometry::Point;

/// Raw input event forwarded by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerInput {
    /// Mouse button pressed over the surface.
    Down(Point),
    /// Pointer moved over the surface.
    Move(Point),
    /// Mouse button released.
    Up,
    /// Pointer left the surface.
    Leave,
    /// Touch began. Carries every active touch; only the first is used.
    TouchStart(Vec<Point>),
    /// Touch moved. Carries every active touch; only the first is used.
    TouchMove(Vec<Point>),
    /// Touch ended or was cancelled.
    TouchEnd,
}

/// What an input event means for the stroke session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    Begin(Point),
    Continue(Point),
    End,
}

impl PointerInput {
    /// Translate into a session action. Touch events without a touch point
    /// translate to nothing.
    #[must_use]
    pub fn action(&self) -> Option<PointerAction> {
        match self {
            Self::Down(p) => Some(PointerAction::Begin(*p)),
            Self::Move(p) => Some(PointerAction::Continue(*p)),
            Self::TouchStart(touches) => touches.first().map(|p| PointerAction::Begin(*p)),
            Self::TouchMove(touches) => touches.first().map(|p| PointerAction::Continue(*p)),
            Self::Up | Self::Leave | Self::TouchEnd => Some(PointerAction::End),
        }
    }
}
