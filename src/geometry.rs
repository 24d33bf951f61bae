//! Geometry primitives and origin conversions.
//!
//! Two vertical conventions meet in this crate:
//!
//! * **top-left space**: `y` grows downward from the top edge of the primary
//!   display.  Grid rows, pointer positions on the selection surface and the
//!   frames handed to a [`WindowManager`](crate::traits::WindowManager) all
//!   use it.
//! * **bottom-left space**: `y` grows upward from the bottom edge of the
//!   primary display.  A display's visible frame in
//!   [`ScreenGeometry`](crate::transform::ScreenGeometry) is described this
//!   way.
//!
//! Flipping a rectangle between the two only needs the height of the primary
//! display, and the flip is its own inverse.

use std::fmt;

/// A point in either coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// `true` unless both extents are finite and strictly positive.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }
}

/// An axis-aligned rectangle: origin corner plus size.
///
/// Which corner `(x, y)` denotes depends on the space the rectangle lives
/// in; `min_y`/`max_y` are plain numeric bounds either way.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_parts(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn min_x(&self) -> f64 {
        self.x
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn min_y(&self) -> f64 {
        self.y
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn is_degenerate(&self) -> bool {
        self.size().is_degenerate() || !(self.x.is_finite() && self.y.is_finite())
    }

    /// Half-open containment: the left/top edges are inside, the right/bottom
    /// edges are not.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x() && p.x < self.max_x() && p.y >= self.min_y() && p.y < self.max_y()
    }

    /// Shrink by `dx`/`dy` on every side.  Never produces a negative size.
    pub fn inset(&self, dx: f64, dy: f64) -> Self {
        Self::new(
            self.x + dx,
            self.y + dy,
            (self.width - 2.0 * dx).max(0.0),
            (self.height - 2.0 * dy).max(0.0),
        )
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{x: {}, y: {}, w: {}, h: {}}}",
            self.x, self.y, self.width, self.height
        )
    }
}

//  Origin conversions

/// Flip the vertical origin of a span `[y, y + height)`.
///
/// Given the span's lower coordinate in one space, returns its lower
/// coordinate in the other.
pub fn flip_y(y: f64, height: f64, primary_height: f64) -> f64 {
    primary_height - (y + height)
}

/// Convert a bottom-left-space rectangle into top-left space.
pub fn to_top_left(rect: Rect, primary_height: f64) -> Rect {
    Rect::new(
        rect.x,
        flip_y(rect.y, rect.height, primary_height),
        rect.width,
        rect.height,
    )
}

/// Convert a top-left-space rectangle into bottom-left space.
pub fn to_bottom_left(rect: Rect, primary_height: f64) -> Rect {
    // The flip is an involution; the two names exist for readability at the
    // call sites.
    to_top_left(rect, primary_height)
}

//  Tests
