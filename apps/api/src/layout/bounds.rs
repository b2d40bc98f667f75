//! Layout validation: rejects client-supplied layouts that cannot live on the grid.
//!
//! Mutual overlap between items is accepted here. Collision handling belongs to
//! the client's drag logic and the slot finder already tolerates it.

use std::collections::HashSet;

use thiserror::Error;

use crate::layout::grid::GridShape;
use crate::models::widget::LayoutItem;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutViolation {
    #[error("widget {id} has non-positive size {w}x{h}")]
    EmptySize { id: String, w: i32, h: i32 },

    #[error("widget {id} at ({x}, {y}) size {w}x{h} leaves the {cols}x{rows} grid")]
    OutOfBounds {
        id: String,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        cols: i32,
        rows: i32,
    },

    #[error("widget id {0} appears more than once")]
    DuplicateId(String),
}

/// Checks every item against `grid`. Stops at the first violation.
pub fn validate_layout(items: &[LayoutItem], grid: GridShape) -> Result<(), LayoutViolation> {
    let mut seen = HashSet::with_capacity(items.len());

    for item in items {
        if !seen.insert(item.id.as_str()) {
            return Err(LayoutViolation::DuplicateId(item.id.clone()));
        }
        if item.w < 1 || item.h < 1 {
            return Err(LayoutViolation::EmptySize {
                id: item.id.clone(),
                w: item.w,
                h: item.h,
            });
        }
        let right = i64::from(item.x) + i64::from(item.w);
        let bottom = i64::from(item.y) + i64::from(item.h);
        if item.x < 0
            || item.y < 0
            || right > i64::from(grid.cols)
            || bottom > i64::from(grid.max_rows)
        {
            return Err(LayoutViolation::OutOfBounds {
                id: item.id.clone(),
                x: item.x,
                y: item.y,
                w: item.w,
                h: item.h,
                cols: grid.cols,
                rows: grid.max_rows,
            });
        }
    }
    Ok(())
}
