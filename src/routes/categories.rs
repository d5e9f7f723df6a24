use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::categories::{CategoryList, CategoryResponse, CreateCategoryRequest, UpdateCategoryRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::form::{ApiPath, Payload},
    services::category_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/add", post(create_category))
        .route("/{id}", put(update_category).delete(delete_category))
}

#[utoipa::path(
    get,
    path = "/api/category",
    responses(
        (status = 200, description = "All categories", body = ApiResponse<CategoryList>)
    ),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    Ok(Json(category_service::list_categories(&state).await?))
}

#[utoipa::path(
    post,
    path = "/api/category/add",
    request_body(content = CreateCategoryRequest, description = "JSON or multipart form; image in `imageFile`"),
    responses(
        (status = 201, description = "Category created", body = ApiResponse<CategoryResponse>),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Category already exists")
    ),
    tag = "Categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Payload { data, image }: Payload<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CategoryResponse>>)> {
    let resp = category_service::create_category(&state, &user, data, image).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/category/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body(content = UpdateCategoryRequest, description = "JSON or multipart form; image in `imageFile`"),
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<CategoryResponse>),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Name already taken")
    ),
    tag = "Categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    Payload { data, image }: Payload<UpdateCategoryRequest>,
) -> AppResult<Json<ApiResponse<CategoryResponse>>> {
    let resp = category_service::update_category(&state, &user, id, data, image).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/category/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = ApiResponse<CategoryResponse>),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category still has products")
    ),
    tag = "Categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<CategoryResponse>>> {
    Ok(Json(category_service::delete_category(&state, &user, id).await?))
}
