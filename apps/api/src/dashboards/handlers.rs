use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::dashboards::repo::{
    create_dashboard, delete_dashboard, get_dashboards, reorder_dashboards, update_dashboard,
    DashboardUpdate,
};
use crate::errors::AppError;
use crate::models::dashboard::Dashboard;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateDashboardRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub ordered_ids: Vec<String>,
}

/// GET /api/v1/dashboards
pub async fn handle_list_dashboards(
    State(state): State<AppState>,
) -> Result<Json<Vec<Dashboard>>, AppError> {
    Ok(Json(get_dashboards(&state.db).await?))
}

/// POST /api/v1/dashboards
/// A missing or blank name becomes "Dashboard N".
pub async fn handle_create_dashboard(
    State(state): State<AppState>,
    Json(req): Json<CreateDashboardRequest>,
) -> Result<(StatusCode, Json<Dashboard>), AppError> {
    let name = match req.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            let count = get_dashboards(&state.db).await?.len();
            format!("Dashboard {}", count + 1)
        }
    };
    let dashboard = create_dashboard(&state.db, &name).await?;
    Ok((StatusCode::CREATED, Json(dashboard)))
}

/// PATCH /api/v1/dashboards/:id
pub async fn handle_update_dashboard(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<DashboardUpdate>,
) -> Result<Json<Dashboard>, AppError> {
    if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::Validation("Dashboard name must not be empty".into()));
    }
    update_dashboard(&state.db, &id, &update)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Dashboard {id} not found")))
}

/// PUT /api/v1/dashboards/order
pub async fn handle_reorder_dashboards(
    State(state): State<AppState>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<Vec<Dashboard>>, AppError> {
    reorder_dashboards(&state.db, &req.ordered_ids).await?;
    Ok(Json(get_dashboards(&state.db).await?))
}

/// DELETE /api/v1/dashboards/:id
pub async fn handle_delete_dashboard(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    // Hold the placement lock so no widget write for this dashboard races the delete.
    let _guard = state.placement_lock.lock().await;
    state.layout_writer.cancel(&id);

    if delete_dashboard(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Dashboard {id} not found")))
    }
}
