use std::collections::BTreeMap;

use anyhow::Result;
use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::models::widget::{DashboardLayout, LayoutItem, WidgetMetadata, WidgetRow};
use crate::widgets::registry::resolve_metadata;

/// Loads the layout and widget metadata of one dashboard.
///
/// Rows without a stored type have no metadata. Rows with an unknown type are
/// kept as opaque placeholders.
pub async fn get_widgets(pool: &SqlitePool, dashboard_id: &str) -> Result<DashboardLayout> {
    let rows = sqlx::query_as::<_, WidgetRow>(
        r#"
        SELECT id, dashboard_id, x, y, w, h, widget_type, title, data, created_at
        FROM widgets
        WHERE dashboard_id = ?1
        ORDER BY rowid ASC
        "#,
    )
    .bind(dashboard_id)
    .fetch_all(pool)
    .await?;

    let mut layout = Vec::with_capacity(rows.len());
    let mut metadata = BTreeMap::new();

    for row in rows {
        if let Some(widget_type) = row.widget_type {
            let data = match row.data.as_deref().map(|raw| serde_json::from_str::<Value>(raw)) {
                Some(Ok(value)) => value,
                Some(Err(e)) => {
                    warn!("Widget {} has unreadable data, using defaults: {e}", row.id);
                    Value::Null
                }
                None => Value::Null,
            };
            let stored = WidgetMetadata {
                widget_type,
                title: row.title,
                data,
            };
            metadata.insert(row.id.clone(), resolve_metadata(&row.id, stored).into_metadata());
        }
        layout.push(LayoutItem {
            id: row.id,
            x: row.x,
            y: row.y,
            w: row.w,
            h: row.h,
        });
    }

    Ok(DashboardLayout { layout, metadata })
}

/// Replaces every widget of `dashboard_id` with `snapshot`, in one transaction.
pub async fn upsert_widgets(
    pool: &SqlitePool,
    dashboard_id: &str,
    snapshot: &DashboardLayout,
) -> Result<()> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM widgets WHERE dashboard_id = ?1")
        .bind(dashboard_id)
        .execute(&mut *tx)
        .await?;

    for item in &snapshot.layout {
        let meta = snapshot.metadata.get(&item.id);
        let data = meta.map(|m| serde_json::to_string(&m.data)).transpose()?;

        sqlx::query(
            r#"
            INSERT INTO widgets (id, dashboard_id, x, y, w, h, widget_type, title, data, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&item.id)
        .bind(dashboard_id)
        .bind(item.x)
        .bind(item.y)
        .bind(item.w)
        .bind(item.h)
        .bind(meta.map(|m| m.widget_type.as_str()))
        .bind(meta.and_then(|m| m.title.as_deref()))
        .bind(data)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    info!(
        "Persisted {} widgets for dashboard {dashboard_id}",
        snapshot.layout.len()
    );
    Ok(())
}

/// Deletes a single widget of `dashboard_id`. Returns `false` if no such widget existed.
pub async fn delete_widget(pool: &SqlitePool, dashboard_id: &str, widget_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM widgets WHERE id = ?1 AND dashboard_id = ?2")
        .bind(widget_id)
        .bind(dashboard_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::repo::create_dashboard;
    use crate::db::test_pool;
    use crate::widgets::registry::WidgetKind;
    use serde_json::json;

    fn item(id: &str, x: i32, y: i32) -> LayoutItem {
        LayoutItem {
            id: id.to_string(),
            x,
            y,
            w: 2,
            h: 2,
        }
    }

    #[tokio::test]
    async fn test_empty_dashboard_has_empty_layout() {
        let pool = test_pool().await;
        let d = create_dashboard(&pool, "Empty").await.unwrap();
        assert_eq!(get_widgets(&pool, &d.id).await.unwrap(), DashboardLayout::default());
    }

    #[tokio::test]
    async fn test_upsert_then_get_returns_layout_and_metadata() {
        let pool = test_pool().await;
        let d = create_dashboard(&pool, "Home").await.unwrap();
        let snapshot = DashboardLayout {
            layout: vec![item("a", 0, 0), item("b", 2, 0)],
            metadata: BTreeMap::from([("a".to_string(), WidgetKind::Link.default_metadata())]),
        };
        upsert_widgets(&pool, &d.id, &snapshot).await.unwrap();

        let loaded = get_widgets(&pool, &d.id).await.unwrap();
        let mut ids: Vec<&str> = loaded.layout.iter().map(|i| i.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(loaded.metadata.len(), 1);
        assert_eq!(loaded.metadata["a"], WidgetKind::Link.default_metadata());
    }

    #[tokio::test]
    async fn test_upsert_replaces_previous_rows() {
        let pool = test_pool().await;
        let d = create_dashboard(&pool, "Home").await.unwrap();
        let first = DashboardLayout {
            layout: vec![item("a", 0, 0), item("b", 2, 0)],
            ..Default::default()
        };
        upsert_widgets(&pool, &d.id, &first).await.unwrap();

        let second = DashboardLayout {
            layout: vec![item("c", 4, 4)],
            ..Default::default()
        };
        upsert_widgets(&pool, &d.id, &second).await.unwrap();

        let loaded = get_widgets(&pool, &d.id).await.unwrap();
        assert_eq!(loaded.layout, vec![item("c", 4, 4)]);
    }

    #[tokio::test]
    async fn test_upsert_empty_layout_only_deletes() {
        let pool = test_pool().await;
        let d = create_dashboard(&pool, "Home").await.unwrap();
        let snapshot = DashboardLayout {
            layout: vec![item("a", 0, 0)],
            ..Default::default()
        };
        upsert_widgets(&pool, &d.id, &snapshot).await.unwrap();
        upsert_widgets(&pool, &d.id, &DashboardLayout::default())
            .await
            .unwrap();
        assert!(get_widgets(&pool, &d.id).await.unwrap().layout.is_empty());
    }

    #[tokio::test]
    async fn test_layouts_are_scoped_per_dashboard() {
        let pool = test_pool().await;
        let home = create_dashboard(&pool, "Home").await.unwrap();
        let work = create_dashboard(&pool, "Work").await.unwrap();
        let snapshot = DashboardLayout {
            layout: vec![item("a", 0, 0)],
            ..Default::default()
        };
        upsert_widgets(&pool, &home.id, &snapshot).await.unwrap();
        upsert_widgets(&pool, &work.id, &DashboardLayout::default())
            .await
            .unwrap();

        assert_eq!(get_widgets(&pool, &home.id).await.unwrap().layout.len(), 1);
        assert!(get_widgets(&pool, &work.id).await.unwrap().layout.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_widget_type_survives_reload_and_save() {
        let pool = test_pool().await;
        let d = create_dashboard(&pool, "Home").await.unwrap();
        let weather = WidgetMetadata {
            widget_type: "weather".to_string(),
            title: Some("Forecast".to_string()),
            data: json!({ "city": "Oslo" }),
        };
        let snapshot = DashboardLayout {
            layout: vec![item("w", 0, 0)],
            metadata: BTreeMap::from([("w".to_string(), weather.clone())]),
        };
        upsert_widgets(&pool, &d.id, &snapshot).await.unwrap();

        let loaded = get_widgets(&pool, &d.id).await.unwrap();
        assert_eq!(loaded.metadata["w"], weather);

        upsert_widgets(&pool, &d.id, &loaded).await.unwrap();
        let reloaded = get_widgets(&pool, &d.id).await.unwrap();
        assert_eq!(reloaded.metadata["w"], weather);
    }

    #[tokio::test]
    async fn test_known_widget_data_is_normalized_on_load() {
        let pool = test_pool().await;
        let d = create_dashboard(&pool, "Home").await.unwrap();
        sqlx::query(
            "INSERT INTO widgets (id, dashboard_id, x, y, w, h, widget_type, title, data, created_at) VALUES ('n', ?1, 0, 0, 2, 2, 'notes', NULL, 'not json', ?2)",
        )
        .bind(&d.id)
        .bind(Utc::now())
        .execute(&pool)
        .await
        .unwrap();

        let loaded = get_widgets(&pool, &d.id).await.unwrap();
        assert_eq!(loaded.metadata["n"].data, json!({ "content": "" }));
        assert_eq!(loaded.metadata["n"].title, None);
    }

    #[tokio::test]
    async fn test_legacy_rows_without_type_have_no_metadata() {
        let pool = test_pool().await;
        let d = create_dashboard(&pool, "Home").await.unwrap();
        sqlx::query(
            "INSERT INTO widgets (id, dashboard_id, x, y, w, h, created_at) VALUES ('old', ?1, 1, 1, 2, 2, ?2)",
        )
        .bind(&d.id)
        .bind(Utc::now())
        .execute(&pool)
        .await
        .unwrap();

        let loaded = get_widgets(&pool, &d.id).await.unwrap();
        assert_eq!(loaded.layout.len(), 1);
        assert!(loaded.metadata.is_empty());
    }

    #[tokio::test]
    async fn test_delete_widget() {
        let pool = test_pool().await;
        let d = create_dashboard(&pool, "Home").await.unwrap();
        let snapshot = DashboardLayout {
            layout: vec![item("a", 0, 0), item("b", 2, 0)],
            ..Default::default()
        };
        upsert_widgets(&pool, &d.id, &snapshot).await.unwrap();

        let other = create_dashboard(&pool, "Other").await.unwrap();
        assert!(!delete_widget(&pool, &other.id, "a").await.unwrap());

        assert!(delete_widget(&pool, &d.id, "a").await.unwrap());
        assert!(!delete_widget(&pool, &d.id, "a").await.unwrap());
        assert_eq!(get_widgets(&pool, &d.id).await.unwrap().layout, vec![item("b", 2, 0)]);
    }
}
