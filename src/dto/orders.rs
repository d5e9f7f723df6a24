use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Order;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub product_id: Uuid,
    #[serde(default, deserialize_with = "super::lenient")]
    pub quantity: Option<i32>,
    /// Client-computed total; recomputed server-side.
    #[serde(default, deserialize_with = "super::lenient")]
    pub total: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(alias = "_id")]
    pub product_id: Uuid,
    #[serde(default, deserialize_with = "super::lenient")]
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartOrderRequest {
    pub items: Vec<CartLine>,
    /// Client-computed amount including delivery; recomputed server-side.
    #[serde(default, deserialize_with = "super::lenient")]
    pub amount: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub order: Order,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub total_price: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub checkout_id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<ReceiptLine>,
    pub subtotal: i64,
    pub delivery_charge: i64,
    pub amount: i64,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReceiptResponse {
    pub order: Receipt,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderedProduct {
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Purchaser {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
}

/// An order joined with the product and purchaser it refers to.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: Uuid,
    pub quantity: i32,
    pub total_price: i64,
    pub checkout_id: Option<Uuid>,
    pub order_date: DateTime<Utc>,
    pub product: OrderedProduct,
    pub user: Option<Purchaser>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub orders: Vec<OrderView>,
}
