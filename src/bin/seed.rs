use inventory_api::{
    config::AppConfig,
    db::{DbPool, create_pool, run_migrations},
    models::Role,
    services::auth_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let admin_id = ensure_user(&pool, "Store Admin", "admin@example.com", "admin123", Role::Admin).await?;
    let user_id = ensure_user(&pool, "Cashier", "user@example.com", "user123", Role::User).await?;
    seed_catalog(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &DbPool,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role.as_str())
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={})", role.as_str());
    Ok(user_id)
}

async fn ensure_category(pool: &DbPool, name: &str, description: &str) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO categories (id, name, description)
        VALUES ($1, $2, $3)
        ON CONFLICT (name) DO UPDATE SET description = EXCLUDED.description
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn ensure_supplier(pool: &DbPool, name: &str, email: &str, phone: &str) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO suppliers (id, name, email, phone)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(phone)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn seed_catalog(pool: &DbPool) -> anyhow::Result<()> {
    let beverages = ensure_category(pool, "Beverages", "Soft drinks, juice and water").await?;
    let snacks = ensure_category(pool, "Snacks", "Chips, biscuits and sweets").await?;
    let wholesale = ensure_supplier(pool, "Metro Wholesale", "orders@metro.example.com", "+1-555-0100").await?;
    let farm = ensure_supplier(pool, "Green Farm Co", "sales@greenfarm.example.com", "+1-555-0142").await?;

    let products = vec![
        ("Sparkling Water 500ml", "Carbonated mineral water", 150, 120, beverages, wholesale),
        ("Orange Juice 1L", "Freshly pressed", 450, 40, beverages, farm),
        ("Sea Salt Chips", "Kettle cooked", 300, 4, snacks, wholesale),
        ("Oat Cookies", "Pack of twelve", 275, 0, snacks, farm),
    ];

    for (name, description, price, stock, category_id, supplier_id) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price, stock, category_id, supplier_id)
            SELECT $1, $2, $3, $4, $5, $6, $7
            WHERE NOT EXISTS (SELECT 1 FROM products WHERE name = $2 AND NOT is_deleted)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .bind(price as i64)
        .bind(stock as i32)
        .bind(category_id)
        .bind(supplier_id)
        .execute(pool)
        .await?;
    }

    println!("Seeded catalog");
    Ok(())
}
