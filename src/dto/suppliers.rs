use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Supplier;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateSupplierRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateSupplierRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SupplierList {
    pub suppliers: Vec<Supplier>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SupplierResponse {
    pub supplier: Supplier,
}
