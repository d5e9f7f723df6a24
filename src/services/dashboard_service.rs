use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone, Utc};

use crate::{
    db::DbPool,
    dto::dashboard::{DashboardSummary, HighestSale, StockAlert, TopSeller},
    error::AppResult,
    response::ApiResponse,
    state::AppState,
};

/// Products with fewer units than this (but more than zero) are low on stock.
pub const LOW_STOCK_THRESHOLD: i32 = 5;

pub async fn get_summary(state: &AppState) -> AppResult<ApiResponse<DashboardSummary>> {
    let summary = compute_summary(&state.pool, Local::now()).await?;
    Ok(ApiResponse::success("Dashboard summary", summary))
}

/// Computes every dashboard figure from the current tables. `now` decides
/// which day counts as "today".
pub async fn compute_summary<Tz: TimeZone>(
    pool: &DbPool,
    now: DateTime<Tz>,
) -> AppResult<DashboardSummary> {
    let (day_start, day_end) = day_bounds(&now);

    let (inventory, sales, out_of_stock, low_stock, top_seller) = tokio::try_join!(
        inventory_totals(pool),
        sales_totals(pool, day_start, day_end),
        out_of_stock(pool),
        low_stock(pool),
        top_seller(pool),
    )?;

    Ok(DashboardSummary {
        total_products: inventory.0,
        total_stock: inventory.1,
        orders_today: sales.0,
        revenue: sales.1,
        revenue_today: sales.2,
        out_of_stock,
        highest_sale_product: top_seller.map_or_else(HighestSale::no_sales, HighestSale::Product),
        low_stock,
    })
}

/// Start (inclusive) and end (exclusive) of the local calendar day containing `now`.
pub fn day_bounds<Tz: TimeZone>(now: &DateTime<Tz>) -> (DateTime<Utc>, DateTime<Utc>) {
    let tz = now.timezone();
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    let start = tz
        .from_local_datetime(&midnight)
        .earliest()
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|| now.with_timezone(&Utc));
    let end = tz
        .from_local_datetime(&(midnight + Duration::days(1)))
        .earliest()
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|| start + Duration::days(1));
    (start, end)
}

async fn inventory_totals(pool: &DbPool) -> AppResult<(i64, i64)> {
    let totals: (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(stock), 0)::BIGINT FROM products",
    )
    .fetch_one(pool)
    .await?;
    Ok(totals)
}

async fn sales_totals(
    pool: &DbPool,
    day_start: DateTime<Utc>,
    day_end: DateTime<Utc>,
) -> AppResult<(i64, i64, i64)> {
    let totals: (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*) FILTER (WHERE order_date >= $1 AND order_date < $2),
            COALESCE(SUM(total_price), 0)::BIGINT,
            COALESCE(SUM(total_price) FILTER (WHERE order_date >= $1 AND order_date < $2), 0)::BIGINT
        FROM orders
        "#,
    )
    .bind(day_start)
    .bind(day_end)
    .fetch_one(pool)
    .await?;
    Ok(totals)
}

async fn out_of_stock(pool: &DbPool) -> AppResult<Vec<StockAlert>> {
    let rows = sqlx::query_as::<_, StockAlert>(
        r#"
        SELECT p.id, p.name, p.stock, c.name AS category
        FROM products p
        LEFT JOIN categories c ON c.id = p.category_id
        WHERE p.stock = 0
        ORDER BY p.name, p.id
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

async fn low_stock(pool: &DbPool) -> AppResult<Vec<StockAlert>> {
    let rows = sqlx::query_as::<_, StockAlert>(
        r#"
        SELECT p.id, p.name, p.stock, c.name AS category
        FROM products p
        LEFT JOIN categories c ON c.id = p.category_id
        WHERE p.stock > 0 AND p.stock < $1
        ORDER BY p.stock, p.name, p.id
        "#,
    )
    .bind(LOW_STOCK_THRESHOLD)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

async fn top_seller(pool: &DbPool) -> AppResult<Option<TopSeller>> {
    let row = sqlx::query_as::<_, TopSeller>(
        r#"
        SELECT p.id, p.name, c.name AS category, sold.total_quantity
        FROM (
            SELECT product_id, SUM(quantity)::BIGINT AS total_quantity
            FROM orders
            GROUP BY product_id
        ) sold
        JOIN products p ON p.id = sold.product_id
        LEFT JOIN categories c ON c.id = p.category_id
        ORDER BY sold.total_quantity DESC, p.name ASC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn day_bounds_cover_the_local_day() {
        let tz = FixedOffset::east_opt(7 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2025, 3, 14, 1, 30, 0).unwrap();
        let (start, end) = day_bounds(&now);

        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 13, 17, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 3, 14, 17, 0, 0).unwrap());
        assert!(start <= now.with_timezone(&Utc) && now.with_timezone(&Utc) < end);
    }

    #[test]
    fn day_bounds_at_midnight_start_that_day() {
        let now = Utc.with_ymd_and_hms(2025, 12, 31, 0, 0, 0).unwrap();
        let (start, end) = day_bounds(&now);
        assert_eq!(start, now);
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    }
}
