use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::layout::GridShape;
use crate::persist::{LayoutWriter, SqliteLayoutSink};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Grid every dashboard is laid out on. Used for slot search and layout validation.
    pub grid: GridShape,
    pub layout_writer: Arc<LayoutWriter>,
    /// Serializes read-layout → find-slot → commit so concurrent creations
    /// cannot claim the same cells.
    pub placement_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: &Config) -> Self {
        let sink = Arc::new(SqliteLayoutSink::new(db.clone()));
        let layout_writer = Arc::new(LayoutWriter::new(sink, config.layout_persist_debounce));
        Self {
            db,
            grid: config.grid,
            layout_writer,
            placement_lock: Arc::new(Mutex::new(())),
        }
    }
}

#[cfg(test)]
pub async fn test_state(grid: GridShape) -> AppState {
    let mut config = Config::from_lookup(|_| None).expect("default config");
    config.grid = grid;
    // Long enough that no debounced write fires on its own during a test.
    config.layout_persist_debounce = std::time::Duration::from_secs(60);
    AppState::new(crate::db::test_pool().await, &config)
}
