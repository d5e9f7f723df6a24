use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use sea_orm::sea_query::{Expr, SimpleExpr};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{
        CartLine, CartOrderRequest, OrderList, OrderResponse, OrderView, OrderedProduct,
        PlaceOrderRequest, Purchaser, Receipt, ReceiptLine, ReceiptResponse,
    },
    entity::{
        orders::ActiveModel as OrderActive,
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Role,
    response::ApiResponse,
    services::validation,
    state::AppState,
};

/// Place a single-line order: check stock, decrement it atomically and
/// record the order, all in one transaction.
pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    payload: PlaceOrderRequest,
) -> AppResult<ApiResponse<OrderResponse>> {
    let quantity = validation::quantity(payload.quantity)?;

    let txn = state.orm.begin().await?;
    let product = reconcile_stock(&txn, payload.product_id, quantity).await?;
    let total_price = line_total(product.price, quantity)?;
    if !client_total_matches(payload.total, total_price) {
        tracing::warn!(
            user_id = %user.user_id,
            product_id = %product.id,
            client_total = ?payload.total,
            total_price,
            "client total differs from computed total; using computed total"
        );
    }

    let order = insert_order(&txn, user.user_id, product.id, quantity, total_price, None).await?;
    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        product_id = %product.id,
        quantity,
        remaining = product.stock - quantity,
        "order placed"
    );
    audit::record(
        &state.pool,
        user.user_id,
        "order_create",
        "orders",
        serde_json::json!({ "order_id": order.id, "product_id": product.id, "quantity": quantity }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order created successfully",
        OrderResponse {
            order: order.into(),
        },
    ))
}

/// Cart checkout: every line is reconciled in one transaction; any failing
/// line aborts the whole checkout.
pub async fn place_cart_order(
    state: &AppState,
    user: &AuthUser,
    payload: CartOrderRequest,
) -> AppResult<ApiResponse<ReceiptResponse>> {
    let lines = merge_cart_lines(&payload.items)?;
    let checkout_id = Uuid::new_v4();
    let delivery_charge = state.settings.delivery_charge;

    let txn = state.orm.begin().await?;
    let mut items = Vec::with_capacity(lines.len());
    let mut subtotal: i64 = 0;

    // Product ids are visited in sorted order so concurrent checkouts lock rows consistently.
    for (product_id, quantity) in lines {
        let product = reconcile_stock(&txn, product_id, quantity).await?;
        let total_price = line_total(product.price, quantity)?;
        let order = insert_order(
            &txn,
            user.user_id,
            product.id,
            quantity,
            total_price,
            Some(checkout_id),
        )
        .await?;

        subtotal = subtotal
            .checked_add(total_price)
            .ok_or_else(|| AppError::Validation("Order amount is too large".into()))?;
        items.push(ReceiptLine {
            order_id: order.id,
            product_id: product.id,
            name: product.name,
            quantity,
            unit_price: product.price,
            total_price,
        });
    }

    let amount = subtotal
        .checked_add(delivery_charge)
        .ok_or_else(|| AppError::Validation("Order amount is too large".into()))?;
    if !client_total_matches(payload.amount, amount) {
        tracing::warn!(
            user_id = %user.user_id,
            %checkout_id,
            client_amount = ?payload.amount,
            amount,
            "client amount differs from computed amount; using computed amount"
        );
    }
    txn.commit().await?;

    tracing::info!(%checkout_id, lines = items.len(), amount, "cart checkout placed");
    audit::record(
        &state.pool,
        user.user_id,
        "checkout_create",
        "orders",
        serde_json::json!({ "checkout_id": checkout_id, "amount": amount }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order placed successfully",
        ReceiptResponse {
            order: Receipt {
                checkout_id,
                user_id: user.user_id,
                items,
                subtotal,
                delivery_charge,
                amount,
                date: Utc::now(),
            },
        },
    ))
}

/// Order history, newest first. Users only see their own orders; any other
/// role sees everything.
pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    owner_id: Uuid,
) -> AppResult<ApiResponse<OrderList>> {
    let owner_filter = match user.role {
        Role::User if owner_id != user.user_id => return Err(AppError::Forbidden),
        Role::User => Some(user.user_id),
        Role::Admin => None,
    };

    let rows = sqlx::query_as::<_, OrderRow>(
        r#"
        SELECT o.id, o.quantity, o.total_price, o.checkout_id, o.order_date,
               p.id AS product_id, p.name AS product_name, c.name AS category_name,
               u.id AS purchaser_id, u.name AS purchaser_name, u.address AS purchaser_address
        FROM orders o
        JOIN products p ON p.id = o.product_id
        LEFT JOIN categories c ON c.id = p.category_id
        LEFT JOIN users u ON u.id = o.user_id
        WHERE ($1::uuid IS NULL OR o.user_id = $1)
        ORDER BY o.order_date DESC, o.id
        "#,
    )
    .bind(owner_filter)
    .fetch_all(&state.pool)
    .await?;

    let orders = rows.into_iter().map(OrderView::from).collect();
    Ok(ApiResponse::success("Orders", OrderList { orders }))
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    quantity: i32,
    total_price: i64,
    checkout_id: Option<Uuid>,
    order_date: DateTime<Utc>,
    product_id: Uuid,
    product_name: String,
    category_name: Option<String>,
    purchaser_id: Option<Uuid>,
    purchaser_name: Option<String>,
    purchaser_address: Option<String>,
}

impl From<OrderRow> for OrderView {
    fn from(row: OrderRow) -> Self {
        let user = row.purchaser_id.map(|id| Purchaser {
            id,
            name: row.purchaser_name.unwrap_or_default(),
            address: row.purchaser_address,
        });
        OrderView {
            id: row.id,
            quantity: row.quantity,
            total_price: row.total_price,
            checkout_id: row.checkout_id,
            order_date: row.order_date,
            product: OrderedProduct {
                id: row.product_id,
                name: row.product_name,
                category: row.category_name,
            },
            user,
        }
    }
}

/// Validate availability and decrement stock with a conditional update, so two
/// concurrent orders can never both take the last units. Returns the product
/// as it was before the decrement.
async fn reconcile_stock(
    txn: &DatabaseTransaction,
    product_id: Uuid,
    quantity: i32,
) -> AppResult<ProductModel> {
    let product = Products::find_by_id(product_id)
        .filter(ProdCol::IsDeleted.eq(false))
        .one(txn)
        .await?
        .ok_or(AppError::NotFound("Product"))?;

    if quantity > product.stock {
        return Err(AppError::InsufficientStock {
            available: product.stock,
            requested: quantity,
        });
    }

    let result = Products::update_many()
        .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(quantity))
        .col_expr(ProdCol::LastUpdated, SimpleExpr::from(Expr::current_timestamp()))
        .filter(ProdCol::Id.eq(product_id))
        .filter(ProdCol::IsDeleted.eq(false))
        .filter(ProdCol::Stock.gte(quantity))
        .exec(txn)
        .await?;

    if result.rows_affected == 0 {
        let available = Products::find_by_id(product_id)
            .one(txn)
            .await?
            .map(|p| p.stock)
            .unwrap_or(0);
        return Err(AppError::InsufficientStock {
            available,
            requested: quantity,
        });
    }

    Ok(product)
}

async fn insert_order(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    total_price: i64,
    checkout_id: Option<Uuid>,
) -> AppResult<crate::entity::orders::Model> {
    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(Some(user_id)),
        product_id: Set(product_id),
        quantity: Set(quantity),
        total_price: Set(total_price),
        checkout_id: Set(checkout_id),
        order_date: Set(Utc::now().into()),
    }
    .insert(txn)
    .await?;
    Ok(order)
}

fn line_total(price: i64, quantity: i32) -> AppResult<i64> {
    price
        .checked_mul(i64::from(quantity))
        .ok_or_else(|| AppError::Validation("Order amount is too large".into()))
}

fn client_total_matches(client: Option<i64>, computed: i64) -> bool {
    client.is_none_or(|total| total == computed)
}

/// Validate cart lines and merge repeated products, keyed by product id.
fn merge_cart_lines(items: &[CartLine]) -> AppResult<BTreeMap<Uuid, i32>> {
    if items.is_empty() {
        return Err(AppError::Validation("Cart is empty".into()));
    }
    let mut lines = BTreeMap::new();
    for item in items {
        let quantity = validation::quantity(item.quantity)?;
        let entry = lines.entry(item.product_id).or_insert(0i32);
        *entry = entry
            .checked_add(quantity)
            .ok_or_else(|| AppError::Validation("Quantity is too large".into()))?;
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: Uuid, quantity: i32) -> CartLine {
        CartLine {
            product_id,
            quantity: Some(quantity),
        }
    }

    #[test]
    fn line_total_is_price_times_quantity() {
        assert_eq!(line_total(5, 3).unwrap(), 15);
        assert!(line_total(i64::MAX, 2).is_err());
    }

    #[test]
    fn missing_client_total_is_accepted() {
        assert!(client_total_matches(None, 15));
        assert!(client_total_matches(Some(15), 15));
        assert!(!client_total_matches(Some(1), 15));
    }

    #[test]
    fn repeated_cart_products_are_merged() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let merged = merge_cart_lines(&[line(a, 2), line(b, 1), line(a, 3)]).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[&a], 5);
        assert_eq!(merged[&b], 1);
    }

    #[test]
    fn empty_cart_is_rejected() {
        assert!(matches!(merge_cart_lines(&[]), Err(AppError::Validation(_))));
    }

    #[test]
    fn non_positive_cart_quantity_is_rejected() {
        let err = merge_cart_lines(&[line(Uuid::new_v4(), 0)]).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn order_row_without_purchaser_maps_to_no_user() {
        let row = OrderRow {
            id: Uuid::new_v4(),
            quantity: 2,
            total_price: 10,
            checkout_id: None,
            order_date: Utc::now(),
            product_id: Uuid::new_v4(),
            product_name: "Cola".into(),
            category_name: Some("Beverages".into()),
            purchaser_id: None,
            purchaser_name: None,
            purchaser_address: None,
        };
        let view = OrderView::from(row);
        assert!(view.user.is_none());
        assert_eq!(view.product.category.as_deref(), Some("Beverages"));
    }
}
