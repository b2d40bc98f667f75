pub mod health;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::dashboards::handlers as dashboards;
use crate::state::AppState;
use crate::widgets::handlers as widgets;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Grid and widget catalogue
        .route("/api/v1/grid", get(widgets::handle_grid))
        .route("/api/v1/widget-types", get(widgets::handle_widget_types))
        // Dashboards
        .route(
            "/api/v1/dashboards",
            get(dashboards::handle_list_dashboards).post(dashboards::handle_create_dashboard),
        )
        .route(
            "/api/v1/dashboards/order",
            put(dashboards::handle_reorder_dashboards),
        )
        .route(
            "/api/v1/dashboards/:id",
            patch(dashboards::handle_update_dashboard).delete(dashboards::handle_delete_dashboard),
        )
        // Layout and placement
        .route(
            "/api/v1/dashboards/:id/layout",
            get(widgets::handle_get_layout).put(widgets::handle_replace_layout),
        )
        .route("/api/v1/dashboards/:id/slot", get(widgets::handle_find_slot))
        .route(
            "/api/v1/dashboards/:id/widgets",
            post(widgets::handle_add_widget),
        )
        .route(
            "/api/v1/dashboards/:id/widgets/:widget_id",
            patch(widgets::handle_update_widget).delete(widgets::handle_remove_widget),
        )
        .with_state(state)
}
