// Dashboard grid layout: grid geometry, first-fit slot search, and layout validation.
// Everything here is pure and synchronous; callers own persistence and locking.

pub mod bounds;
pub mod grid;
pub mod slot_finder;

// Re-export the public API consumed by placement and handlers.
pub use bounds::validate_layout;
pub use grid::{GridInfo, GridShape, WidgetSize};
pub use slot_finder::{find_first_available_slot, Position};
