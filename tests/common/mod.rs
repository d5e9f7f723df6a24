#![allow(dead_code)]

use inventory_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        categories::CreateCategoryRequest, products::CreateProductRequest,
        suppliers::CreateSupplierRequest,
    },
    entity::users::ActiveModel as UserActive,
    middleware::auth::AuthUser,
    models::Role,
    services::{auth_service::hash_password, category_service, product_service, supplier_service},
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

pub const DELIVERY_CHARGE: i64 = 20;

/// Connects to the test database and wipes every table. Returns `None` when
/// no database is configured so the calling test can skip itself.
pub async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let Ok(database_url) =
        std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL"))
    else {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests.");
        return Ok(None);
    };

    let pool = create_pool(&database_url).await?;
    run_migrations(&pool).await?;
    sqlx::query(
        "TRUNCATE TABLE audit_logs, orders, products, categories, suppliers, users RESTART IDENTITY CASCADE",
    )
    .execute(&pool)
    .await?;

    let config = AppConfig {
        database_url,
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "integration-secret".into(),
        jwt_ttl_days: 5,
        cors_origins: Vec::new(),
        image_upload_url: None,
        image_upload_preset: None,
        delivery_charge: DELIVERY_CHARGE,
        max_concurrency: 10,
    };
    let orm = create_orm_conn(&pool);
    Ok(Some(AppState::new(pool, orm, &config)))
}

pub async fn create_account(
    state: &AppState,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(email.split('@').next().unwrap_or(email).to_string()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(password)?),
        address: Set(Some("12 Market Street".into())),
        role: Set(role),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role,
    })
}

pub async fn create_category(state: &AppState, admin: &AuthUser, name: &str) -> anyhow::Result<Uuid> {
    let resp = category_service::create_category(
        state,
        admin,
        CreateCategoryRequest {
            name: Some(name.into()),
            ..Default::default()
        },
        None,
    )
    .await?;
    Ok(resp.data.category.id)
}

pub async fn create_supplier(state: &AppState, admin: &AuthUser, name: &str) -> anyhow::Result<Uuid> {
    let resp = supplier_service::create_supplier(
        state,
        admin,
        CreateSupplierRequest {
            name: Some(name.into()),
            ..Default::default()
        },
    )
    .await?;
    Ok(resp.data.supplier.id)
}

pub async fn create_product(
    state: &AppState,
    admin: &AuthUser,
    name: &str,
    price: i64,
    stock: i32,
    category: Uuid,
    supplier: Uuid,
) -> anyhow::Result<Uuid> {
    let resp = product_service::create_product(
        state,
        admin,
        CreateProductRequest {
            name: Some(name.into()),
            price: Some(price),
            stock: Some(stock),
            category: Some(category),
            supplier: Some(supplier),
            ..Default::default()
        },
        None,
    )
    .await?;
    Ok(resp.data.product.id)
}
