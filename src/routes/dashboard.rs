use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::dashboard::DashboardSummary,
    error::AppResult,
    response::ApiResponse,
    services::dashboard_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(summary))
}

#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Inventory and sales summary", body = ApiResponse<DashboardSummary>),
        (status = 403, description = "Admin only")
    ),
    tag = "Dashboard"
)]
pub async fn summary(State(state): State<AppState>) -> AppResult<Json<ApiResponse<DashboardSummary>>> {
    Ok(Json(dashboard_service::get_summary(&state).await?))
}
