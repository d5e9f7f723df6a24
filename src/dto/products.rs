use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Category, Product, ProductDetail, Supplier};

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "super::lenient")]
    pub price: Option<i64>,
    #[serde(default, deserialize_with = "super::lenient")]
    pub stock: Option<i32>,
    #[serde(default, alias = "categoryId", deserialize_with = "super::lenient")]
    pub category: Option<Uuid>,
    #[serde(default, alias = "supplierId", deserialize_with = "super::lenient")]
    pub supplier: Option<Uuid>,
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "super::lenient")]
    pub price: Option<i64>,
    #[serde(default, deserialize_with = "super::lenient")]
    pub stock: Option<i32>,
    #[serde(default, alias = "categoryId", deserialize_with = "super::lenient")]
    pub category: Option<Uuid>,
    #[serde(default, alias = "supplierId", deserialize_with = "super::lenient")]
    pub supplier: Option<Uuid>,
    pub image_url: Option<String>,
}

/// Everything the product page renders: live products plus the full
/// category and supplier lists.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductCatalog {
    pub products: Vec<ProductDetail>,
    pub categories: Vec<Category>,
    pub suppliers: Vec<Supplier>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub product: Product,
}
