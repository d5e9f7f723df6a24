use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::suppliers::{CreateSupplierRequest, SupplierList, SupplierResponse, UpdateSupplierRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::form::{ApiJson, ApiPath},
    services::supplier_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_suppliers).post(create_supplier))
        .route("/add", post(create_supplier))
        .route("/{id}", put(update_supplier).delete(delete_supplier))
}

#[utoipa::path(
    get,
    path = "/api/supplier",
    responses(
        (status = 200, description = "All suppliers", body = ApiResponse<SupplierList>)
    ),
    tag = "Suppliers"
)]
pub async fn list_suppliers(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<SupplierList>>> {
    Ok(Json(supplier_service::list_suppliers(&state).await?))
}

#[utoipa::path(
    post,
    path = "/api/supplier/add",
    request_body = CreateSupplierRequest,
    responses(
        (status = 201, description = "Supplier created", body = ApiResponse<SupplierResponse>),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Supplier already exists")
    ),
    tag = "Suppliers"
)]
pub async fn create_supplier(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateSupplierRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SupplierResponse>>)> {
    let resp = supplier_service::create_supplier(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/supplier/{id}",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    request_body = UpdateSupplierRequest,
    responses(
        (status = 200, description = "Supplier updated", body = ApiResponse<SupplierResponse>),
        (status = 404, description = "Supplier not found")
    ),
    tag = "Suppliers"
)]
pub async fn update_supplier(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateSupplierRequest>,
) -> AppResult<Json<ApiResponse<SupplierResponse>>> {
    let resp = supplier_service::update_supplier(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/supplier/{id}",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    responses(
        (status = 200, description = "Supplier deleted", body = ApiResponse<SupplierResponse>),
        (status = 404, description = "Supplier not found"),
        (status = 409, description = "Supplier still has products")
    ),
    tag = "Suppliers"
)]
pub async fn delete_supplier(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<SupplierResponse>>> {
    Ok(Json(supplier_service::delete_supplier(&state, &user, id).await?))
}
