mod common;

use chrono::Local;
use inventory_api::{
    dto::{
        dashboard::HighestSale,
        orders::{CartLine, CartOrderRequest, PlaceOrderRequest},
    },
    entity::products::Entity as Products,
    error::AppError,
    models::Role,
    services::{dashboard_service, order_service},
    state::AppState,
};
use sea_orm::EntityTrait;
use uuid::Uuid;

use common::{DELIVERY_CHARGE, create_account, create_category, create_product, create_supplier, setup_state};

async fn stock_of(state: &AppState, id: Uuid) -> anyhow::Result<i32> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("product {id} vanished"))?;
    Ok(product.stock)
}

fn line(product_id: Uuid, quantity: i32) -> CartLine {
    CartLine {
        product_id,
        quantity: Some(quantity),
    }
}

// Orders decrement stock exactly once, never oversell, and feed the dashboard.
#[tokio::test]
async fn orders_reconcile_stock_and_feed_dashboard() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let admin = create_account(&state, "admin@example.com", "admin123", Role::Admin).await?;
    let cashier = create_account(&state, "cashier@example.com", "user123", Role::User).await?;
    let other = create_account(&state, "other@example.com", "user123", Role::User).await?;

    let drinks = create_category(&state, &admin, "Beverages").await?;
    let metro = create_supplier(&state, &admin, "Metro Wholesale").await?;
    let cola = create_product(&state, &admin, "Cola", 5, 10, drinks, metro).await?;
    let juice = create_product(&state, &admin, "Juice", 100, 4, drinks, metro).await?;

    let summary = dashboard_service::compute_summary(&state.pool, Local::now()).await?;
    assert_eq!(summary.highest_sale_product, HighestSale::no_sales());
    assert_eq!(summary.revenue, 0);

    let err = order_service::place_order(
        &state,
        &cashier,
        PlaceOrderRequest {
            product_id: Uuid::new_v4(),
            quantity: Some(1),
            total: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound("Product")));

    // Single order: 3 of 10 at 5 each.
    let placed = order_service::place_order(
        &state,
        &cashier,
        PlaceOrderRequest {
            product_id: cola,
            quantity: Some(3),
            total: Some(15),
        },
    )
    .await?;
    assert_eq!(placed.data.order.total_price, 15);
    assert_eq!(placed.data.order.user_id, Some(cashier.user_id));
    assert_eq!(stock_of(&state, cola).await?, 7);

    // Asking for more than is left fails and leaves stock untouched.
    let err = order_service::place_order(
        &state,
        &cashier,
        PlaceOrderRequest {
            product_id: cola,
            quantity: Some(8),
            total: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        AppError::InsufficientStock {
            available: 7,
            requested: 8
        }
    ));
    assert_eq!(stock_of(&state, cola).await?, 7);

    let err = order_service::place_order(
        &state,
        &cashier,
        PlaceOrderRequest {
            product_id: cola,
            quantity: Some(0),
            total: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Cart checkout merges repeated lines and adds the delivery charge.
    let receipt = order_service::place_cart_order(
        &state,
        &cashier,
        CartOrderRequest {
            items: vec![line(cola, 2), line(juice, 1), line(cola, 1)],
            amount: Some(1),
        },
    )
    .await?
    .data
    .order;
    assert_eq!(receipt.items.len(), 2);
    assert_eq!(receipt.subtotal, 3 * 5 + 100);
    assert_eq!(receipt.delivery_charge, DELIVERY_CHARGE);
    assert_eq!(receipt.amount, 115 + DELIVERY_CHARGE);
    assert_eq!(stock_of(&state, cola).await?, 4);
    assert_eq!(stock_of(&state, juice).await?, 3);

    // One bad line aborts the whole checkout.
    let err = order_service::place_cart_order(
        &state,
        &cashier,
        CartOrderRequest {
            items: vec![line(cola, 1), line(juice, 10)],
            amount: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock { .. }));
    assert_eq!(stock_of(&state, cola).await?, 4);
    assert_eq!(stock_of(&state, juice).await?, 3);

    // History is scoped to the caller unless the caller is an admin.
    let mine = order_service::list_orders(&state, &cashier, cashier.user_id)
        .await?
        .data
        .orders;
    assert_eq!(mine.len(), 3);
    assert!(mine.windows(2).all(|w| w[0].order_date >= w[1].order_date));
    assert!(mine.iter().all(|o| o.user.as_ref().map(|u| u.id) == Some(cashier.user_id)));

    let err = order_service::list_orders(&state, &other, cashier.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let all = order_service::list_orders(&state, &admin, admin.user_id)
        .await?
        .data
        .orders;
    assert_eq!(all.len(), 3);

    let summary = dashboard_service::compute_summary(&state.pool, Local::now()).await?;
    assert_eq!(summary.total_products, 2);
    assert_eq!(summary.total_stock, 7);
    assert_eq!(summary.orders_today, 3);
    assert_eq!(summary.revenue, 15 + 115);
    assert_eq!(summary.revenue_today, 15 + 115);
    assert!(summary.out_of_stock.is_empty());
    assert_eq!(summary.low_stock.len(), 2);
    match summary.highest_sale_product {
        HighestSale::Product(top) => {
            assert_eq!(top.id, cola);
            assert_eq!(top.total_quantity, 6);
            assert_eq!(top.category.as_deref(), Some("Beverages"));
        }
        HighestSale::NoSales { .. } => panic!("expected a top seller"),
    }

    Ok(())
}
