use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::auth::{LoginRequest, LoginResponse, VerifyResponse},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::form::ApiJson,
    services::auth_service::{login_user, verify_user},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/verify", get(verify))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login user", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Wrong password"),
        (status = 404, description = "Unknown email")
    ),
    security(()),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let resp = login_user(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/auth/verify",
    responses(
        (status = 200, description = "Token is valid", body = ApiResponse<VerifyResponse>),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "Auth"
)]
pub async fn verify(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<VerifyResponse>>> {
    let resp = verify_user(&state, &user).await?;
    Ok(Json(resp))
}
