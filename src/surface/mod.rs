//! [`OverlaySurface`] implementations.
//!
//! [`LogSurface`] draws nothing and is what the daemon uses without a
//! display toolkit; drag events then arrive over the control socket.  With
//! the `surface-gtk` feature, [`gtk`] provides the real full-screen grid and
//! takes over the main thread.

#[cfg(feature = "surface-gtk")]
pub mod gtk;

use crate::geometry::Size;
use crate::selection::{GridDimensions, GridRect};
use crate::traits::{OverlaySurface, SelectionView, SurfaceRequest};
use log::{debug, info};

/// Preferred edge of one grid cell in the drawn overlay.
pub const CELL_EXTENT: f64 = 50.0;

/// Drawn grid area for `dims`, square cells of [`CELL_EXTENT`] shrunk
/// uniformly until the area fits within `limit`.
pub fn grid_extent(dims: GridDimensions, limit: Size) -> Size {
    let rows = dims.rows() as f64;
    let columns = dims.columns() as f64;
    let cell = CELL_EXTENT
        .min(limit.width / columns)
        .min(limit.height / rows)
        .max(1.0);
    Size::new(cell * columns, cell * rows)
}

/// Headless surface that logs what it would show.
#[derive(Debug, Default)]
pub struct LogSurface {
    visible: bool,
    highlight: Option<GridRect>,
}

impl LogSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn highlight(&self) -> Option<GridRect> {
        self.highlight
    }
}

impl OverlaySurface for LogSurface {
    fn show(&mut self, request: &SurfaceRequest) {
        self.visible = true;
        self.highlight = None;
        info!(
            "overlay: {} grid for {} on {}",
            request.dimensions,
            request.app_label,
            request.display.as_deref().unwrap_or("primary display")
        );
    }

    fn render(&mut self, view: &SelectionView) {
        if view.highlight != self.highlight {
            match view.highlight {
                Some(rect) => debug!("overlay: highlight {}", rect),
                None => debug!("overlay: no highlight"),
            }
        }
        self.highlight = view.highlight;
    }

    fn hide(&mut self) {
        if self.visible {
            debug!("overlay hidden");
        }
        self.visible = false;
        self.highlight = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::GridDimensions;

    #[test]
    fn tracks_visibility_and_highlight() {
        let dims = GridDimensions::default();
        let mut s = LogSurface::new();
        s.show(&SurfaceRequest {
            dimensions: dims,
            app_label: "Files".into(),
            app_icon: None,
            display: None,
        });
        assert!(s.is_visible());

        let rect = GridRect::new(0, 0, 2, 2);
        s.render(&SelectionView {
            dimensions: dims,
            highlight: Some(rect),
        });
        assert_eq!(s.highlight(), Some(rect));

        s.hide();
        s.hide();
        assert!(!s.is_visible());
        assert_eq!(s.highlight(), None);
    }

    #[test]
    fn grid_extent_keeps_cells_square() {
        let limit = Size::new(1000.0, 700.0);

        let default = grid_extent(GridDimensions::default(), limit);
        assert_eq!(default, Size::new(300.0, 300.0));

        let wide = grid_extent(GridDimensions::new(2, 20).unwrap(), limit);
        assert_eq!(wide, Size::new(1000.0, 100.0));

        let tall = grid_extent(GridDimensions::new(20, 3).unwrap(), limit);
        assert_eq!(tall, Size::new(105.0, 700.0));
    }
}
