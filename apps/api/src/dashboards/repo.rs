use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::models::dashboard::Dashboard;

/// Partial update for a dashboard. `None` fields are left untouched.
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct DashboardUpdate {
    pub name: Option<String>,
    pub sort_order: Option<i64>,
}

/// Returns all dashboards ordered for display.
pub async fn get_dashboards(pool: &SqlitePool) -> Result<Vec<Dashboard>> {
    Ok(sqlx::query_as::<_, Dashboard>(
        "SELECT id, name, sort_order, created_at, updated_at FROM dashboards ORDER BY sort_order ASC, created_at ASC",
    )
    .fetch_all(pool)
    .await?)
}

pub async fn get_dashboard(pool: &SqlitePool, id: &str) -> Result<Option<Dashboard>> {
    Ok(sqlx::query_as::<_, Dashboard>(
        "SELECT id, name, sort_order, created_at, updated_at FROM dashboards WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?)
}

/// Inserts a dashboard at the end of the current ordering.
pub async fn create_dashboard(pool: &SqlitePool, name: &str) -> Result<Dashboard> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();
    let sort_order: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM dashboards")
        .fetch_one(pool)
        .await?;

    sqlx::query(
        "INSERT INTO dashboards (id, name, sort_order, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(&id)
    .bind(name)
    .bind(sort_order)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    info!("Created dashboard {id} ('{name}') at position {sort_order}");

    Ok(Dashboard {
        id,
        name: name.to_string(),
        sort_order,
        created_at: now,
        updated_at: now,
    })
}

/// Applies `update` and returns the stored row, or `None` if `id` does not exist.
pub async fn update_dashboard(
    pool: &SqlitePool,
    id: &str,
    update: &DashboardUpdate,
) -> Result<Option<Dashboard>> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let exists: Option<String> = sqlx::query_scalar("SELECT id FROM dashboards WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Ok(None);
    }

    if let Some(name) = &update.name {
        sqlx::query("UPDATE dashboards SET name = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(name)
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }
    if let Some(sort_order) = update.sort_order {
        sqlx::query("UPDATE dashboards SET sort_order = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(sort_order)
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    get_dashboard(pool, id).await
}

/// Sets `sort_order` to each id's index in `ordered_ids`. Returns the number of
/// dashboards that were updated; unknown ids are ignored.
pub async fn reorder_dashboards(pool: &SqlitePool, ordered_ids: &[String]) -> Result<u64> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;
    let mut updated = 0;

    for (index, id) in ordered_ids.iter().enumerate() {
        let result =
            sqlx::query("UPDATE dashboards SET sort_order = ?1, updated_at = ?2 WHERE id = ?3")
                .bind(index as i64)
                .bind(now)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        updated += result.rows_affected();
    }
    tx.commit().await?;

    info!("Reordered {updated} dashboards");
    Ok(updated)
}

/// Deletes a dashboard and all of its widgets. Returns `false` if it did not exist.
pub async fn delete_dashboard(pool: &SqlitePool, id: &str) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let widgets = sqlx::query("DELETE FROM widgets WHERE dashboard_id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let dashboards = sqlx::query("DELETE FROM dashboards WHERE id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    let deleted = dashboards.rows_affected() > 0;
    if deleted {
        info!(
            "Deleted dashboard {id} and {} widgets",
            widgets.rows_affected()
        );
    }
    Ok(deleted)
}
