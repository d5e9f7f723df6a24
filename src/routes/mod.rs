use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{StatusCode, Uri},
    middleware::from_fn_with_state,
    routing::get,
};

use crate::{middleware::policy::authorize, response::ApiResponse, state::AppState};

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod doc;
pub mod form;
pub mod health;
pub mod orders;
pub mod products;
pub mod suppliers;
pub mod users;

/// Largest accepted request body: a 5 MiB image plus form fields.
pub const BODY_LIMIT: usize = 6 * 1024 * 1024;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/category", categories::router())
        .nest("/supplier", suppliers::router())
        .nest("/products", products::router())
        .nest("/users", users::router())
        .nest("/order", orders::router())
        .nest("/dashboard", dashboard::router())
}

/// The full application minus transport layers (tracing, CORS, limits),
/// which `main` adds on top.
pub fn app(state: AppState) -> Router {
    let api = create_api_router().route_layer(from_fn_with_state(state.jwt.clone(), authorize));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api)
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    let body = ApiResponse::failure(
        "Not Found",
        serde_json::json!({ "path": uri.path() }),
    );
    (StatusCode::NOT_FOUND, Json(body))
}
