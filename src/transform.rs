//! Grid rectangle → absolute window frame.
//!
//! The grid's row axis grows downward from the top of a display's visible
//! area, while [`ScreenGeometry::visible_frame`] is anchored at the bottom of
//! the primary display (bottom-left space, see [`geometry`](crate::geometry)).
//! Window positions are set in top-left space, so the vertical coordinate of
//! a target frame is
//!
//! ```text
//! y = primary_height − visible.max_y + row × cell_height
//! ```
//!
//! where `visible.max_y` is the visible area's top edge expressed in
//! bottom-left space.

use crate::geometry::{self, Point, Rect, Size};
use crate::selection::{GridDimensions, GridRect};
use std::fmt;

/// Geometry of the display a window was captured on.
///
/// Captured once per operation and never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenGeometry {
    /// Usable area (no menu bar, dock or panels) in bottom-left space.
    pub visible_frame: Rect,
    /// Height of the primary display, the reference for the origin flip.
    pub primary_height: f64,
}

impl ScreenGeometry {
    pub fn new(visible_frame: Rect, primary_height: f64) -> Self {
        Self {
            visible_frame,
            primary_height,
        }
    }

    /// The visible frame in top-left space.
    pub fn visible_top_left(&self) -> Rect {
        geometry::to_top_left(self.visible_frame, self.primary_height)
    }
}

/// Absolute position and size for a window, in top-left space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetFrame {
    pub origin: Point,
    pub size: Size,
}

impl TargetFrame {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn as_rect(&self) -> Rect {
        Rect::from_parts(self.origin, self.size)
    }
}

impl From<Rect> for TargetFrame {
    fn from(r: Rect) -> Self {
        Self::new(r.x, r.y, r.width, r.height)
    }
}

impl fmt::Display for TargetFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_rect().fmt(f)
    }
}

/// Clamp `rect` into the grid.
///
/// Order matters: the column/row are clamped into `[0, dim − 1]` first, then
/// width/height are clamped into `[1, dim − clamped origin]`.  A rectangle
/// whose origin had to move therefore also shrinks, rather than being
/// shifted back inside.
pub fn clamp_grid_rect(rect: GridRect, dims: GridDimensions) -> GridRect {
    let column = rect.column.min(dims.columns() - 1);
    let row = rect.row.min(dims.rows() - 1);
    GridRect {
        row,
        column,
        width: rect.width.clamp(1, dims.columns() - column),
        height: rect.height.clamp(1, dims.rows() - row),
    }
}

/// Compute the absolute frame covering `rect` on `screen`.
///
/// `rect` is clamped with [`clamp_grid_rect`] before use.  A degenerate
/// visible frame yields the whole visible frame instead of dividing by zero.
pub fn to_target_frame(
    rect: GridRect,
    screen: &ScreenGeometry,
    dims: GridDimensions,
) -> TargetFrame {
    let visible = screen.visible_frame;
    if visible.is_degenerate() {
        return screen.visible_top_left().into();
    }

    let rect = clamp_grid_rect(rect, dims);
    let cell_w = visible.width / dims.columns() as f64;
    let cell_h = visible.height / dims.rows() as f64;

    let x = visible.min_x() + rect.column as f64 * cell_w;
    let y = screen.primary_height - visible.max_y() + rect.row as f64 * cell_h;

    TargetFrame::new(x, y, rect.width as f64 * cell_w, rect.height as f64 * cell_h)
}

//  Tests
