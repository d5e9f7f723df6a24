mod common;

use inventory_api::{
    dto::{
        auth::LoginRequest,
        categories::CreateCategoryRequest,
        products::{CreateProductRequest, UpdateProductRequest},
        users::{CreateUserRequest, UpdateUserRequest},
    },
    entity::products::Entity as Products,
    error::AppError,
    images::ImageUpload,
    models::Role,
    services::{auth_service, category_service, product_service, supplier_service, user_service},
    state::AppState,
};
use sea_orm::EntityTrait;
use uuid::Uuid;

use common::{create_account, create_category, create_product, create_supplier, setup_state};

async fn login(state: &AppState, email: &str, password: &str) -> Result<String, AppError> {
    auth_service::login_user(
        state,
        LoginRequest {
            email: email.into(),
            password: password.into(),
        },
    )
    .await
    .map(|resp| resp.data.token)
}

fn png() -> Option<ImageUpload> {
    Some(ImageUpload {
        file_name: "shelf.png".into(),
        content_type: "image/png".into(),
        bytes: vec![0x89, b'P', b'N', b'G'],
    })
}

// Catalog guards, soft delete and account rules against a real database.
#[tokio::test]
async fn catalog_and_account_rules() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let admin = create_account(&state, "admin@example.com", "admin123", Role::Admin).await?;
    let cashier = create_account(&state, "cashier@example.com", "user123", Role::User).await?;

    // Login: the token carries the stored identity.
    let token = login(&state, "  Cashier@Example.com ", "user123").await?;
    let verified = state.jwt.verify(&token)?;
    assert_eq!(verified.user_id, cashier.user_id);
    assert_eq!(verified.role, Role::User);
    assert!(matches!(
        login(&state, "cashier@example.com", "wrong").await,
        Err(AppError::InvalidCredentials)
    ));
    assert!(matches!(
        login(&state, "nobody@example.com", "user123").await,
        Err(AppError::NotFound("User"))
    ));
    let echoed = auth_service::verify_user(&state, &verified).await?;
    assert_eq!(echoed.data.user.email, "cashier@example.com");

    // Category names are unique.
    let snacks = create_category(&state, &admin, "Snacks").await?;
    let err = category_service::create_category(
        &state,
        &admin,
        CreateCategoryRequest {
            name: Some(" Snacks ".into()),
            ..Default::default()
        },
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::DuplicateName(_)));

    let metro = create_supplier(&state, &admin, "Metro Wholesale").await?;
    let chips = create_product(&state, &admin, "Chips", 300, 12, snacks, metro).await?;

    // A product must point at existing rows.
    let err = product_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            name: Some("Ghost".into()),
            price: Some(1),
            stock: Some(1),
            category: Some(Uuid::new_v4()),
            supplier: Some(metro),
            ..Default::default()
        },
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Missing references are reported before any image is sent anywhere.
    let err = product_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            name: Some("Ghost".into()),
            price: Some(1),
            stock: Some(1),
            category: Some(Uuid::new_v4()),
            supplier: Some(metro),
            ..Default::default()
        },
        png(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(msg) if msg == "Category does not exist"));

    let updated = product_service::update_product(
        &state,
        &admin,
        chips,
        UpdateProductRequest {
            price: Some(350),
            ..Default::default()
        },
        None,
    )
    .await?;
    assert_eq!(updated.data.product.price, 350);
    assert_eq!(updated.data.product.stock, 12);

    // Live products block category and supplier deletes.
    let err = category_service::delete_category(&state, &admin, snacks)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    let err = supplier_service::delete_supplier(&state, &admin, metro)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Soft delete hides the product but keeps the row.
    product_service::delete_product(&state, &admin, chips).await?;
    let catalog = product_service::list_products(&state).await?.data;
    assert!(catalog.products.iter().all(|p| p.product.id != chips));
    assert_eq!(catalog.categories.len(), 1);
    assert_eq!(catalog.suppliers.len(), 1);
    assert!(matches!(
        product_service::delete_product(&state, &admin, chips).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        product_service::update_product(&state, &admin, chips, UpdateProductRequest::default(), None)
            .await,
        Err(AppError::NotFound("Product"))
    ));
    assert!(matches!(
        product_service::update_product(&state, &admin, chips, UpdateProductRequest::default(), png())
            .await,
        Err(AppError::NotFound("Product"))
    ));
    assert!(matches!(
        product_service::update_product(
            &state,
            &admin,
            Uuid::new_v4(),
            UpdateProductRequest::default(),
            png()
        )
        .await,
        Err(AppError::NotFound("Product"))
    ));

    // With only deleted products left, the deletes go through.
    category_service::delete_category(&state, &admin, snacks).await?;
    supplier_service::delete_supplier(&state, &admin, metro).await?;
    let row = Products::find_by_id(chips)
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("soft-deleted product row is gone"))?;
    assert!(row.is_deleted);
    assert_eq!(row.category_id, None);
    assert_eq!(row.supplier_id, None);
    assert!(matches!(
        category_service::delete_category(&state, &admin, snacks).await,
        Err(AppError::NotFound("Category"))
    ));

    // Accounts: admins create users, emails stay unique.
    let created = user_service::create_user(
        &state,
        &admin,
        CreateUserRequest {
            name: Some("Night Shift".into()),
            email: Some("night@example.com".into()),
            password: Some("night123".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .user;
    assert_eq!(created.role, Role::User);
    let err = user_service::create_user(
        &state,
        &admin,
        CreateUserRequest {
            name: Some("Copy".into()),
            email: Some("NIGHT@example.com".into()),
            password: Some("x".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::DuplicateName(_)));

    // Profiles belong to their owner.
    assert!(matches!(
        user_service::get_self(&state, &cashier, created.id).await,
        Err(AppError::Forbidden)
    ));
    assert!(matches!(
        user_service::update_self(&state, &cashier, created.id, UpdateUserRequest::default()).await,
        Err(AppError::Forbidden)
    ));

    // A blank password leaves the old one in place.
    user_service::update_self(
        &state,
        &cashier,
        cashier.user_id,
        UpdateUserRequest {
            name: Some("Day Cashier".into()),
            password: Some("   ".into()),
            ..Default::default()
        },
    )
    .await?;
    login(&state, "cashier@example.com", "user123").await?;

    // A new password replaces it.
    user_service::update_self(
        &state,
        &cashier,
        cashier.user_id,
        UpdateUserRequest {
            password: Some("fresh-pass".into()),
            ..Default::default()
        },
    )
    .await?;
    assert!(login(&state, "cashier@example.com", "user123").await.is_err());
    login(&state, "cashier@example.com", "fresh-pass").await?;
    let me = user_service::get_self(&state, &cashier, cashier.user_id)
        .await?
        .data
        .user;
    assert_eq!(me.name, "Day Cashier");

    user_service::delete_user(&state, &admin, created.id).await?;
    let users = user_service::list_users(&state).await?.data.users;
    assert_eq!(users.len(), 2);

    Ok(())
}
