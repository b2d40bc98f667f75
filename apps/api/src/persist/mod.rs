// Debounced layout persistence.
// Layout edits are coalesced per dashboard and written after a quiet period;
// widget creation and removal bypass the delay and write immediately.

pub mod debouncer;

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::models::widget::DashboardLayout;
use crate::widgets::repo::upsert_widgets;

pub use debouncer::{Debouncer, Sink};

/// Debounced writer keyed by dashboard id.
pub type LayoutWriter = Debouncer<String, DashboardLayout>;

/// Writes dashboard layouts to SQLite.
pub struct SqliteLayoutSink {
    pool: SqlitePool,
}

impl SqliteLayoutSink {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Sink<String, DashboardLayout> for SqliteLayoutSink {
    async fn write(&self, dashboard_id: &String, layout: &DashboardLayout) -> anyhow::Result<()> {
        upsert_widgets(&self.pool, dashboard_id, layout).await
    }
}
