use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StockAlert {
    pub id: Uuid,
    pub name: String,
    pub stock: i32,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopSeller {
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub total_quantity: i64,
}

/// Best-selling product, or a marker when nothing has been sold yet.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum HighestSale {
    Product(TopSeller),
    NoSales { message: String },
}

impl HighestSale {
    pub fn no_sales() -> Self {
        HighestSale::NoSales {
            message: "No sales data available".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_products: i64,
    pub total_stock: i64,
    pub orders_today: i64,
    /// All-time revenue.
    pub revenue: i64,
    pub revenue_today: i64,
    pub out_of_stock: Vec<StockAlert>,
    pub highest_sale_product: HighestSale,
    pub low_stock: Vec<StockAlert>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_sales_marker_serializes_as_message() {
        let json = serde_json::to_value(HighestSale::no_sales()).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "No sales data available" }));
    }

    #[test]
    fn top_seller_serializes_flat() {
        let json = serde_json::to_value(HighestSale::Product(TopSeller {
            id: Uuid::nil(),
            name: "Cola".into(),
            category: Some("Beverages".into()),
            total_quantity: 42,
        }))
        .unwrap();
        assert_eq!(json["name"], "Cola");
        assert_eq!(json["category"], "Beverages");
        assert_eq!(json["totalQuantity"], 42);
    }
}
