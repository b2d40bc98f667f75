// Widgets: the closed kind table, storage, and placement on the dashboard grid.

pub mod handlers;
pub mod placement;
pub mod registry;
pub mod repo;
