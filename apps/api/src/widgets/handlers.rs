use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::layout::{GridInfo, Position, WidgetSize};
use crate::models::widget::{DashboardLayout, LayoutItem, WidgetMetadata};
use crate::state::AppState;
use crate::widgets::placement::{
    add_widget, current_layout, find_slot, remove_widget, replace_layout, update_widget,
    PlacedWidget, WidgetUpdate,
};
use crate::widgets::registry::{WidgetDescriptor, WidgetKind};

#[derive(Debug, Deserialize)]
pub struct SizeQuery {
    pub w: Option<i32>,
    pub h: Option<i32>,
}

impl SizeQuery {
    fn size(&self) -> WidgetSize {
        let default = WidgetSize::default();
        WidgetSize {
            w: self.w.unwrap_or(default.w),
            h: self.h.unwrap_or(default.h),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SlotResponse {
    pub slot: Option<Position>,
}

#[derive(Debug, Deserialize)]
pub struct AddWidgetRequest {
    #[serde(rename = "type")]
    pub widget_type: String,
    pub w: Option<i32>,
    pub h: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceLayoutRequest {
    pub layout: Vec<LayoutItem>,
}

/// GET /api/v1/grid
pub async fn handle_grid(State(state): State<AppState>) -> Json<GridInfo> {
    Json(GridInfo::from(state.grid))
}

/// GET /api/v1/widget-types
pub async fn handle_widget_types() -> Json<Vec<WidgetDescriptor>> {
    Json(WidgetKind::ALL.iter().map(WidgetKind::descriptor).collect())
}

/// GET /api/v1/dashboards/:id/layout
pub async fn handle_get_layout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DashboardLayout>, AppError> {
    Ok(Json(current_layout(&state, &id).await?))
}

/// PUT /api/v1/dashboards/:id/layout
/// Accepted immediately; the write happens after the debounce delay.
pub async fn handle_replace_layout(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReplaceLayoutRequest>,
) -> Result<(StatusCode, Json<DashboardLayout>), AppError> {
    let layout = replace_layout(&state, &id, req.layout).await?;
    Ok((StatusCode::ACCEPTED, Json(layout)))
}

/// GET /api/v1/dashboards/:id/slot?w=&h=
pub async fn handle_find_slot(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<SizeQuery>,
) -> Result<Json<SlotResponse>, AppError> {
    let slot = find_slot(&state, &id, query.size()).await?;
    Ok(Json(SlotResponse { slot }))
}

/// POST /api/v1/dashboards/:id/widgets
pub async fn handle_add_widget(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AddWidgetRequest>,
) -> Result<(StatusCode, Json<PlacedWidget>), AppError> {
    let kind = WidgetKind::from_tag(&req.widget_type)
        .ok_or_else(|| AppError::Validation(format!("Unknown widget type '{}'", req.widget_type)))?;
    let size = SizeQuery { w: req.w, h: req.h }.size();
    if size.w < 1 || size.h < 1 {
        return Err(AppError::Validation(format!(
            "Widget size must be positive, got {}x{}",
            size.w, size.h
        )));
    }
    let placed = add_widget(&state, &id, kind, size).await?;
    Ok((StatusCode::CREATED, Json(placed)))
}

/// PATCH /api/v1/dashboards/:id/widgets/:widget_id
pub async fn handle_update_widget(
    State(state): State<AppState>,
    Path((id, widget_id)): Path<(String, String)>,
    Json(update): Json<WidgetUpdate>,
) -> Result<Json<WidgetMetadata>, AppError> {
    Ok(Json(update_widget(&state, &id, &widget_id, update).await?))
}

/// DELETE /api/v1/dashboards/:id/widgets/:widget_id
pub async fn handle_remove_widget(
    State(state): State<AppState>,
    Path((id, widget_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    remove_widget(&state, &id, &widget_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
