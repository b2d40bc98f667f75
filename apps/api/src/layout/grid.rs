//! Grid configuration shared by slot search, layout validation and widget creation.
//!
//! The dashboard grid is a fixed `cols × max_rows` region of integer cells. The
//! constants below are the reference configuration; the service may override
//! the shape at startup (see `Config`), but the default widget size always
//! comes from here so the finder and widget creation stay in sync.

use serde::{Deserialize, Serialize};

pub const GRID_COLS: i32 = 32;
pub const GRID_ROWS: i32 = 18;
/// Pixel gap between cells. Exposed to clients, unused by placement.
pub const GRID_GAP: i32 = 8;
/// Pixel padding around the grid. Exposed to clients, unused by placement.
pub const GRID_PADDING: i32 = 8;
pub const DEFAULT_WIDGET_W: i32 = 2;
pub const DEFAULT_WIDGET_H: i32 = 2;

/// The bounded region `[0, cols) × [0, max_rows)` that widgets live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    pub cols: i32,
    pub max_rows: i32,
}

impl Default for GridShape {
    fn default() -> Self {
        Self {
            cols: GRID_COLS,
            max_rows: GRID_ROWS,
        }
    }
}

impl GridShape {
    pub fn new(cols: i32, max_rows: i32) -> Self {
        Self { cols, max_rows }
    }

    /// A grid with no cells can never host a widget.
    pub fn is_degenerate(&self) -> bool {
        self.cols < 1 || self.max_rows < 1
    }

    /// Whether a `w × h` widget could fit on an empty grid of this shape.
    pub fn admits(&self, w: i32, h: i32) -> bool {
        !self.is_degenerate() && w >= 1 && h >= 1 && w <= self.cols && h <= self.max_rows
    }
}

/// Requested widget footprint. Defaults to the reference widget size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSize {
    pub w: i32,
    pub h: i32,
}

impl Default for WidgetSize {
    fn default() -> Self {
        Self {
            w: DEFAULT_WIDGET_W,
            h: DEFAULT_WIDGET_H,
        }
    }
}

/// Grid description returned by `GET /api/v1/grid`.
#[derive(Debug, Clone, Serialize)]
pub struct GridInfo {
    pub cols: i32,
    pub rows: i32,
    pub gap: i32,
    pub padding: i32,
    pub default_widget: WidgetSize,
}

impl From<GridShape> for GridInfo {
    fn from(shape: GridShape) -> Self {
        Self {
            cols: shape.cols,
            rows: shape.max_rows,
            gap: GRID_GAP,
            padding: GRID_PADDING,
            default_widget: WidgetSize::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_grid_dimensions() {
        let grid = GridShape::default();
        assert_eq!(grid.cols, 32);
        assert_eq!(grid.max_rows, 18);
        assert_eq!(GRID_GAP, 8);
        assert_eq!(GRID_PADDING, 8);
    }

    #[test]
    fn test_default_widget_fits_default_grid() {
        let size = WidgetSize::default();
        assert_eq!((size.w, size.h), (2, 2));
        assert!(GridShape::default().admits(size.w, size.h));
    }

    #[test]
    fn test_admits_rejects_oversized_and_non_positive() {
        let grid = GridShape::new(4, 4);
        assert!(grid.admits(4, 4));
        assert!(!grid.admits(5, 1));
        assert!(!grid.admits(1, 5));
        assert!(!grid.admits(0, 1));
        assert!(!grid.admits(1, -1));
        assert!(!GridShape::new(0, 4).admits(1, 1));
    }

    #[test]
    fn test_grid_info_carries_shape_and_spacing() {
        let info = GridInfo::from(GridShape::new(12, 6));
        assert_eq!(info.cols, 12);
        assert_eq!(info.rows, 6);
        assert_eq!(info.gap, GRID_GAP);
        assert_eq!(info.default_widget, WidgetSize::default());
    }
}
