//! Widget placement: creating, removing and editing widgets on a dashboard.
//!
//! The current layout of a dashboard is the pending debounced snapshot if one
//! exists, otherwise what is stored. Creation and removal run under the
//! placement lock and write through immediately, cancelling any pending
//! debounced write. Layout replacement and metadata edits go through the
//! debounced writer.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::dashboards::repo::get_dashboard;
use crate::errors::AppError;
use crate::layout::{find_first_available_slot, validate_layout, Position, WidgetSize};
use crate::models::widget::{DashboardLayout, LayoutItem, WidgetMetadata};
use crate::state::AppState;
use crate::widgets::registry::WidgetKind;
use crate::widgets::repo::{delete_widget, get_widgets};

#[derive(Debug, Clone, Serialize)]
pub struct PlacedWidget {
    pub item: LayoutItem,
    pub metadata: WidgetMetadata,
}

/// Partial metadata edit. `data` is coerced through the widget kind's parser.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WidgetUpdate {
    pub title: Option<String>,
    pub data: Option<Value>,
}

async fn ensure_dashboard(state: &AppState, dashboard_id: &str) -> Result<(), AppError> {
    match get_dashboard(&state.db, dashboard_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(format!("Dashboard {dashboard_id} not found"))),
    }
}

/// Latest known layout of a dashboard, including unflushed edits.
pub async fn current_layout(state: &AppState, dashboard_id: &str) -> Result<DashboardLayout, AppError> {
    if let Some(pending) = state.layout_writer.pending(&dashboard_id.to_string()) {
        return Ok(pending);
    }
    ensure_dashboard(state, dashboard_id).await?;
    Ok(get_widgets(&state.db, dashboard_id).await?)
}

/// Where a widget of `size` would land right now, without placing it.
pub async fn find_slot(
    state: &AppState,
    dashboard_id: &str,
    size: WidgetSize,
) -> Result<Option<Position>, AppError> {
    let current = current_layout(state, dashboard_id).await?;
    Ok(find_first_available_slot(&current.layout, size.w, size.h, state.grid))
}

/// Places a new widget of `kind` at the first free slot and persists immediately.
pub async fn add_widget(
    state: &AppState,
    dashboard_id: &str,
    kind: WidgetKind,
    size: WidgetSize,
) -> Result<PlacedWidget, AppError> {
    let _guard = state.placement_lock.lock().await;

    let mut layout = current_layout(state, dashboard_id).await?;
    let slot = find_first_available_slot(&layout.layout, size.w, size.h, state.grid)
        .ok_or(AppError::NoSpace)?;

    let item = LayoutItem {
        id: Uuid::new_v4().to_string(),
        x: slot.x,
        y: slot.y,
        w: size.w,
        h: size.h,
    };
    let metadata = kind.default_metadata();
    layout.layout.push(item.clone());
    layout.metadata.insert(item.id.clone(), metadata.clone());

    commit_now(state, dashboard_id, &layout).await?;
    info!(
        "Placed {} widget {} at ({}, {}) on dashboard {dashboard_id}",
        kind.as_str(),
        item.id,
        slot.x,
        slot.y
    );

    Ok(PlacedWidget { item, metadata })
}

/// Removes a widget and its metadata and persists immediately. Without a
/// pending snapshot only the widget's row is deleted; otherwise the whole
/// pending layout is written through.
pub async fn remove_widget(
    state: &AppState,
    dashboard_id: &str,
    widget_id: &str,
) -> Result<(), AppError> {
    let _guard = state.placement_lock.lock().await;

    let mut layout = current_layout(state, dashboard_id).await?;
    if !layout.remove(widget_id) {
        return Err(AppError::NotFound(format!("Widget {widget_id} not found")));
    }
    if state.layout_writer.has_pending(&dashboard_id.to_string()) {
        commit_now(state, dashboard_id, &layout).await?;
    } else {
        delete_widget(&state.db, dashboard_id, widget_id).await?;
    }
    info!("Removed widget {widget_id} from dashboard {dashboard_id}");
    Ok(())
}

/// Edits a widget's title or data. The write is debounced.
pub async fn update_widget(
    state: &AppState,
    dashboard_id: &str,
    widget_id: &str,
    update: WidgetUpdate,
) -> Result<WidgetMetadata, AppError> {
    let _guard = state.placement_lock.lock().await;

    let mut layout = current_layout(state, dashboard_id).await?;
    if !layout.contains(widget_id) {
        return Err(AppError::NotFound(format!("Widget {widget_id} not found")));
    }
    let Some(metadata) = layout.metadata.get_mut(widget_id) else {
        return Err(AppError::Validation(format!(
            "Widget {widget_id} has no type and cannot be edited"
        )));
    };

    if let Some(title) = update.title {
        metadata.title = Some(title);
    }
    if let Some(data) = update.data {
        metadata.data = match WidgetKind::from_tag(&metadata.widget_type) {
            Some(kind) => kind.parse_data(&data).into_value(),
            None => data,
        };
    }
    let updated = metadata.clone();

    state.layout_writer.schedule(dashboard_id.to_string(), layout);
    Ok(updated)
}

/// Replaces the geometry of a dashboard. Metadata of widgets that are no
/// longer present is dropped. The write is debounced.
pub async fn replace_layout(
    state: &AppState,
    dashboard_id: &str,
    items: Vec<LayoutItem>,
) -> Result<DashboardLayout, AppError> {
    validate_layout(&items, state.grid)?;

    let _guard = state.placement_lock.lock().await;

    let mut layout = current_layout(state, dashboard_id).await?;
    layout.layout = items;
    layout.prune_metadata();

    state
        .layout_writer
        .schedule(dashboard_id.to_string(), layout.clone());
    Ok(layout)
}

async fn commit_now(
    state: &AppState,
    dashboard_id: &str,
    layout: &DashboardLayout,
) -> Result<(), AppError> {
    state
        .layout_writer
        .write_now(dashboard_id.to_string(), layout.clone())
        .await?;
    Ok(())
}
