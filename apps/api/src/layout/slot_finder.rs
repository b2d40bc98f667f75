//! Slot Finder: first free position for a new widget on a bounded grid.
//!
//! Candidates are scanned row-major (top-to-bottom, then left-to-right) and the
//! first one whose `w × h` footprint stays inside the grid and overlaps no
//! existing rectangle wins. The scan order is the only tie-break, so callers can
//! rely on exact coordinates.
//!
//! # Input policy
//! - Non-positive `w`, `h`, `cols` or `max_rows` never fit: the result is `None`.
//! - `w > cols` or `h > max_rows` returns `None` without looking at the layout.
//! - The existing layout may itself contain overlapping rectangles.
//!
//! Cost is `O(cols · max_rows · n)`. Grids are tens of cells per side, so a
//! plain scan is used instead of a free-rectangle structure.

use serde::{Deserialize, Serialize};

use crate::layout::grid::{GridShape, WidgetSize};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Axis-aligned footprint in grid cells. `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Strict overlap: rectangles that only share an edge or a corner do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        // Widened so extreme coordinates in stored layouts cannot overflow.
        let (ax, ay, aw, ah) = (
            i64::from(self.x),
            i64::from(self.y),
            i64::from(self.w),
            i64::from(self.h),
        );
        let (bx, by, bw, bh) = (
            i64::from(other.x),
            i64::from(other.y),
            i64::from(other.w),
            i64::from(other.h),
        );
        ax < bx + bw && ax + aw > bx && ay < by + bh && ay + ah > by
    }
}

/// Top-left corner of a free slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// Anything that occupies cells on the grid. Only geometry matters to the search.
pub trait Footprint {
    fn footprint(&self) -> Rect;
}

impl Footprint for Rect {
    fn footprint(&self) -> Rect {
        *self
    }
}

impl<T: Footprint + ?Sized> Footprint for &T {
    fn footprint(&self) -> Rect {
        (**self).footprint()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Search
// ────────────────────────────────────────────────────────────────────────────

/// Returns the first position (row-major) where a `w × h` rectangle fits inside
/// `grid` without overlapping anything in `layout`, or `None` if there is none.
pub fn find_first_available_slot<T: Footprint>(
    layout: &[T],
    w: i32,
    h: i32,
    grid: GridShape,
) -> Option<Position> {
    if !grid.admits(w, h) {
        return None;
    }

    let occupied: Vec<Rect> = layout.iter().map(|item| item.footprint()).collect();

    for y in 0..=grid.max_rows - h {
        for x in 0..=grid.cols - w {
            let candidate = Rect::new(x, y, w, h);
            if !occupied.iter().any(|r| candidate.overlaps(r)) {
                return Some(Position { x, y });
            }
        }
    }
    None
}

/// Slot for a default-sized widget (2 × 2) on the default grid (32 × 18).
#[allow(dead_code)]
pub fn find_default_slot<T: Footprint>(layout: &[T]) -> Option<Position> {
    let size = WidgetSize::default();
    find_first_available_slot(layout, size.w, size.h, GridShape::default())
}
