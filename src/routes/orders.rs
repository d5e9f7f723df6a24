use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{CartOrderRequest, OrderList, OrderResponse, PlaceOrderRequest, ReceiptResponse},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::form::{ApiJson, ApiPath},
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add", post(place_order))
        .route("/place-order", post(place_cart_order))
        .route("/{id}", get(list_orders))
}

#[utoipa::path(
    post,
    path = "/api/order/add",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Invalid quantity or not enough stock"),
        (status = 404, description = "Product not found")
    ),
    tag = "Orders"
)]
pub async fn place_order(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<PlaceOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderResponse>>)> {
    let resp = order_service::place_order(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/order/place-order",
    request_body = CartOrderRequest,
    responses(
        (status = 201, description = "Checkout placed", body = ApiResponse<ReceiptResponse>),
        (status = 400, description = "Empty cart, invalid quantity or not enough stock"),
        (status = 404, description = "Product not found")
    ),
    tag = "Orders"
)]
pub async fn place_cart_order(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CartOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ReceiptResponse>>)> {
    let resp = order_service::place_cart_order(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/order/{id}",
    params(("id" = Uuid, Path, description = "User whose orders to list; admins get every order")),
    responses(
        (status = 200, description = "Order history, newest first", body = ApiResponse<OrderList>),
        (status = 403, description = "Another user's orders")
    ),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    Ok(Json(order_service::list_orders(&state, &user, id).await?))
}
