//! Grid selection model.
//!
//! The selection grid divides a display's visible area into `rows × columns`
//! cells.  Row `0` is the top row, column `0` the leftmost column.
//!
//! [`SelectionModel`] accumulates a pointer drag (anchor cell plus current
//! cell) and yields a normalized [`GridRect`] on release.  It knows nothing
//! about rendering: a drawing layer converts pointer positions to cells with
//! [`hit_test`] and reads [`SelectionModel::current_rect`] for live redraws.

use crate::geometry::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors from constructing grid values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// Fewer than [`GridDimensions::MIN`] rows or columns.
    #[error("grid must be at least {min}×{min}, got {rows}×{columns}")]
    TooSmall {
        rows: usize,
        columns: usize,
        min: usize,
    },
}

/// Number of rows and columns in the selection grid.
///
/// Always at least [`MIN`](Self::MIN) in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GridDimensions {
    rows: usize,
    columns: usize,
}

impl GridDimensions {
    /// Smallest accepted row/column count.
    pub const MIN: usize = 2;
    /// Largest row/column count the configuration accepts.
    pub const MAX: usize = 20;

    /// Validate a `rows × columns` pair.
    pub fn new(rows: usize, columns: usize) -> Result<Self, GridError> {
        if rows < Self::MIN || columns < Self::MIN {
            return Err(GridError::TooSmall {
                rows,
                columns,
                min: Self::MIN,
            });
        }
        Ok(Self { rows, columns })
    }

    /// Build dimensions with both counts clamped into `[MIN, MAX]`.
    pub fn clamped(rows: usize, columns: usize) -> Self {
        Self {
            rows: rows.clamp(Self::MIN, Self::MAX),
            columns: columns.clamp(Self::MIN, Self::MAX),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Whether `cell` lies inside the grid.
    pub fn contains(&self, cell: GridCell) -> bool {
        cell.row < self.rows && cell.column < self.columns
    }

    /// Pull an arbitrary cell onto the nearest edge cell.
    pub fn clamp_cell(&self, cell: GridCell) -> GridCell {
        GridCell {
            row: cell.row.min(self.rows - 1),
            column: cell.column.min(self.columns - 1),
        }
    }
}

impl Default for GridDimensions {
    fn default() -> Self {
        Self {
            rows: 6,
            columns: 6,
        }
    }
}

impl fmt::Display for GridDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.rows, self.columns)
    }
}

/// One grid cell, 0-indexed.
///
/// The wire format accepts `{"row": r, "column": c}` or the string `"r c"`
/// (see [`command`](crate::command)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct GridCell {
    pub row: usize,
    pub column: usize,
}

impl GridCell {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// A rectangular span of cells: top-left cell plus extent in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridRect {
    pub row: usize,
    pub column: usize,
    pub width: usize,
    pub height: usize,
}

impl GridRect {
    pub fn new(row: usize, column: usize, width: usize, height: usize) -> Self {
        Self {
            row,
            column,
            width,
            height,
        }
    }

    /// Inclusive bounding rectangle of two cells, in any order.
    pub fn spanning(a: GridCell, b: GridCell) -> Self {
        let min_row = a.row.min(b.row);
        let max_row = a.row.max(b.row);
        let min_col = a.column.min(b.column);
        let max_col = a.column.max(b.column);
        Self {
            row: min_row,
            column: min_col,
            width: max_col - min_col + 1,
            height: max_row - min_row + 1,
        }
    }

    /// Last row covered (inclusive).
    pub fn max_row(&self) -> usize {
        self.row + self.height.saturating_sub(1)
    }

    /// Last column covered (inclusive).
    pub fn max_column(&self) -> usize {
        self.column + self.width.saturating_sub(1)
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        self.width > 0
            && self.height > 0
            && (self.row..=self.max_row()).contains(&cell.row)
            && (self.column..=self.max_column()).contains(&cell.column)
    }

    /// Whether the rectangle is non-empty and lies entirely inside `dims`.
    pub fn fits(&self, dims: GridDimensions) -> bool {
        self.width >= 1
            && self.height >= 1
            && self.column + self.width <= dims.columns()
            && self.row + self.height <= dims.rows()
    }
}

impl fmt::Display for GridRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {} col {} ({}×{} cells)",
            self.row, self.column, self.width, self.height
        )
    }
}

//  Drag tracking

/// Anchor/current pair of an in-progress drag.
///
/// Both are unset until [`begin`](Self::begin); [`release`](Self::release)
/// consumes them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionModel {
    anchor: Option<GridCell>,
    current: Option<GridCell>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a drag at `cell`.
    pub fn begin(&mut self, cell: GridCell) {
        self.anchor = Some(cell);
        self.current = Some(cell);
    }

    /// Move the drag's free end.  No-op before [`begin`](Self::begin).
    pub fn update(&mut self, cell: GridCell) {
        if self.anchor.is_some() {
            self.current = Some(cell);
        }
    }

    /// Finish the drag at `cell` and return the normalized rectangle.
    ///
    /// Clears the model.  Returns `None` when no drag was started.
    pub fn release(&mut self, cell: GridCell) -> Option<GridRect> {
        let anchor = self.anchor.take()?;
        self.current = None;
        Some(GridRect::spanning(anchor, cell))
    }

    /// Normalized rectangle of the drag so far, for live redraw.
    pub fn current_rect(&self) -> Option<GridRect> {
        match (self.anchor, self.current) {
            (Some(a), Some(c)) => Some(GridRect::spanning(a, c)),
            _ => None,
        }
    }

    pub fn anchor(&self) -> Option<GridCell> {
        self.anchor
    }

    pub fn is_dragging(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn clear(&mut self) {
        self.anchor = None;
        self.current = None;
    }
}

//  Hit-testing

/// Map a pointer position to a cell.
///
/// `point` is relative to the grid's top-left corner and `bounds` is the
/// drawn grid's size.  Positions outside the bounds resolve to the nearest
/// edge cell, so a drag that overshoots the drawn area still lands on the
/// grid.
pub fn hit_test(point: Point, bounds: Size, dims: GridDimensions) -> GridCell {
    GridCell {
        row: axis_index(point.y, bounds.height, dims.rows()),
        column: axis_index(point.x, bounds.width, dims.columns()),
    }
}

fn axis_index(pos: f64, extent: f64, count: usize) -> usize {
    if !pos.is_finite() || !extent.is_finite() || extent <= 0.0 {
        return 0;
    }
    let cell = extent / count as f64;
    let index = (pos / cell).floor();
    index.clamp(0.0, (count - 1) as f64) as usize
}

/// Area covered by `cell` when the grid is drawn into `bounds`.
pub fn cell_bounds(cell: GridCell, bounds: Size, dims: GridDimensions) -> Rect {
    let cell_w = bounds.width / dims.columns() as f64;
    let cell_h = bounds.height / dims.rows() as f64;
    Rect::new(
        cell.column as f64 * cell_w,
        cell.row as f64 * cell_h,
        cell_w,
        cell_h,
    )
}

/// Area covered by `rect` when the grid is drawn into `bounds`.
pub fn rect_bounds(rect: GridRect, bounds: Size, dims: GridDimensions) -> Rect {
    let cell_w = bounds.width / dims.columns() as f64;
    let cell_h = bounds.height / dims.rows() as f64;
    Rect::new(
        rect.column as f64 * cell_w,
        rect.row as f64 * cell_h,
        rect.width as f64 * cell_w,
        rect.height as f64 * cell_h,
    )
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;

    fn six() -> GridDimensions {
        GridDimensions::new(6, 6).unwrap()
    }

    #[test]
    fn dimensions_reject_less_than_two() {
        assert!(GridDimensions::new(1, 6).is_err());
        assert!(GridDimensions::new(6, 0).is_err());
        assert!(GridDimensions::new(2, 2).is_ok());
    }

    #[test]
    fn clamped_dimensions_respect_floor_and_ceiling() {
        let d = GridDimensions::clamped(0, 99);
        assert_eq!((d.rows(), d.columns()), (2, 20));
    }

    #[test]
    fn release_is_order_independent() {
        let dims = GridDimensions::new(5, 7).unwrap();
        for ar in 0..dims.rows() {
            for ac in 0..dims.columns() {
                for cr in 0..dims.rows() {
                    for cc in 0..dims.columns() {
                        let mut m = SelectionModel::new();
                        m.begin(GridCell::new(ar, ac));
                        let r = m.release(GridCell::new(cr, cc)).unwrap();
                        assert!(r.row <= r.max_row());
                        assert!(r.column <= r.max_column());
                        assert_eq!(r.row, ar.min(cr));
                        assert_eq!(r.max_row(), ar.max(cr));
                        assert_eq!(r.column, ac.min(cc));
                        assert_eq!(r.max_column(), ac.max(cc));
                        assert!(r.fits(dims));
                    }
                }
            }
        }
    }

    #[test]
    fn drag_in_all_four_directions_yields_same_rect() {
        let expected = GridRect::new(1, 1, 4, 3);
        let corners = [
            (GridCell::new(1, 1), GridCell::new(3, 4)),
            (GridCell::new(3, 4), GridCell::new(1, 1)),
            (GridCell::new(1, 4), GridCell::new(3, 1)),
            (GridCell::new(3, 1), GridCell::new(1, 4)),
        ];
        for (a, b) in corners {
            let mut m = SelectionModel::new();
            m.begin(a);
            assert_eq!(m.release(b), Some(expected), "{a} -> {b}");
        }
    }

    #[test]
    fn update_without_begin_does_not_mutate() {
        let mut m = SelectionModel::new();
        m.update(GridCell::new(2, 2));
        assert_eq!(m, SelectionModel::new());
        assert_eq!(m.current_rect(), None);
    }

    #[test]
    fn release_without_begin_yields_nothing() {
        let mut m = SelectionModel::new();
        assert_eq!(m.release(GridCell::new(2, 2)), None);
    }

    #[test]
    fn release_clears_state() {
        let mut m = SelectionModel::new();
        m.begin(GridCell::new(0, 0));
        m.update(GridCell::new(1, 1));
        assert!(m.release(GridCell::new(1, 2)).is_some());
        assert!(!m.is_dragging());
        assert_eq!(m.current_rect(), None);
    }

    #[test]
    fn current_rect_tracks_live_drag() {
        let mut m = SelectionModel::new();
        m.begin(GridCell::new(4, 4));
        assert_eq!(m.current_rect(), Some(GridRect::new(4, 4, 1, 1)));
        m.update(GridCell::new(2, 5));
        assert_eq!(m.current_rect(), Some(GridRect::new(2, 4, 2, 3)));
    }

    #[test]
    fn hit_test_cell_centers_round_trip() {
        // 733 is prime, so columns never get a whole-pixel width.
        for bounds in [Size::new(300.0, 300.0), Size::new(733.0, 411.0)] {
            for rows in GridDimensions::MIN..=GridDimensions::MAX {
                for columns in GridDimensions::MIN..=GridDimensions::MAX {
                    let dims = GridDimensions::new(rows, columns).unwrap();
                    for row in 0..rows {
                        for column in 0..columns {
                            let cell = GridCell::new(row, column);
                            let b = cell_bounds(cell, bounds, dims);
                            let center = Point::new(b.x + b.width / 2.0, b.y + b.height / 2.0);
                            assert_eq!(
                                hit_test(center, bounds, dims),
                                cell,
                                "{} in {:?}",
                                dims,
                                bounds
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn hit_test_clamps_positions_outside_the_grid() {
        let bounds = Size::new(300.0, 300.0);
        let dims = six();
        assert_eq!(
            hit_test(Point::new(-40.0, -1.0), bounds, dims),
            GridCell::new(0, 0)
        );
        assert_eq!(
            hit_test(Point::new(900.0, 301.0), bounds, dims),
            GridCell::new(5, 5)
        );
        assert_eq!(
            hit_test(Point::new(150.0, 10_000.0), bounds, dims),
            GridCell::new(5, 3)
        );
        // The far edge itself belongs to the last cell.
        assert_eq!(
            hit_test(Point::new(300.0, 300.0), bounds, dims),
            GridCell::new(5, 5)
        );
    }

    #[test]
    fn hit_test_on_degenerate_bounds_picks_origin_cell() {
        let dims = six();
        assert_eq!(
            hit_test(Point::new(10.0, 10.0), Size::new(0.0, 0.0), dims),
            GridCell::new(0, 0)
        );
        assert_eq!(
            hit_test(Point::new(f64::NAN, 10.0), Size::new(300.0, 300.0), dims),
            GridCell::new(0, 0)
        );
    }

    #[test]
    fn clamp_cell_pulls_onto_edge() {
        let dims = six();
        assert_eq!(dims.clamp_cell(GridCell::new(9, 2)), GridCell::new(5, 2));
        assert_eq!(dims.clamp_cell(GridCell::new(3, 3)), GridCell::new(3, 3));
    }

    #[test]
    fn rect_contains_and_bounds() {
        let r = GridRect::new(1, 1, 4, 3);
        assert!(r.contains(GridCell::new(1, 1)));
        assert!(r.contains(GridCell::new(3, 4)));
        assert!(!r.contains(GridCell::new(4, 4)));
        assert!(!r.contains(GridCell::new(1, 5)));
        let px = rect_bounds(r, Size::new(300.0, 300.0), six());
        assert_eq!(px, Rect::new(50.0, 50.0, 200.0, 150.0));
    }
}
