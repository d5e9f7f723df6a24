use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::products::{CreateProductRequest, ProductCatalog, ProductResponse, UpdateProductRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::form::{ApiPath, Payload},
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/add", post(create_product))
        .route("/{id}", put(update_product).delete(delete_product))
}

#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "Live products with categories and suppliers", body = ApiResponse<ProductCatalog>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ProductCatalog>>> {
    Ok(Json(product_service::list_products(&state).await?))
}

#[utoipa::path(
    post,
    path = "/api/products/add",
    request_body(content = CreateProductRequest, description = "JSON or multipart form; image in `imageFile`"),
    responses(
        (status = 201, description = "Product created", body = ApiResponse<ProductResponse>),
        (status = 400, description = "Invalid input or unknown category/supplier")
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Payload { data, image }: Payload<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ProductResponse>>)> {
    let resp = product_service::create_product(&state, &user, data, image).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body(content = UpdateProductRequest, description = "JSON or multipart form; image in `imageFile`"),
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<ProductResponse>),
        (status = 404, description = "Product not found")
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    Payload { data, image }: Payload<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<ProductResponse>>> {
    let resp = product_service::update_product(&state, &user, id, data, image).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product soft-deleted", body = ApiResponse<ProductResponse>),
        (status = 400, description = "Product already deleted"),
        (status = 404, description = "Product not found")
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<ProductResponse>>> {
    Ok(Json(product_service::delete_product(&state, &user, id).await?))
}
