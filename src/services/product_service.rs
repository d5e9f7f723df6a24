use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit,
    dto::products::{CreateProductRequest, ProductCatalog, ProductResponse, UpdateProductRequest},
    entity::{
        categories::{Column as CatCol, Entity as Categories},
        products::{ActiveModel, Column, Entity as Products},
        suppliers::{Column as SupCol, Entity as Suppliers},
    },
    error::{AppError, AppResult},
    images::ImageUpload,
    middleware::auth::AuthUser,
    models::{Category, ProductDetail, Supplier},
    response::ApiResponse,
    services::validation,
    state::AppState,
};

/// Live products, each with its category and supplier, plus both full lists.
pub async fn list_products(state: &AppState) -> AppResult<ApiResponse<ProductCatalog>> {
    let products = Products::find()
        .filter(Column::IsDeleted.eq(false))
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?;

    let categories: Vec<Category> = Categories::find()
        .order_by_asc(CatCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let suppliers: Vec<Supplier> = Suppliers::find()
        .order_by_asc(SupCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let category_by_id: HashMap<Uuid, &Category> =
        categories.iter().map(|c| (c.id, c)).collect();
    let supplier_by_id: HashMap<Uuid, &Supplier> =
        suppliers.iter().map(|s| (s.id, s)).collect();

    let products = products
        .into_iter()
        .map(|model| {
            let category = model
                .category_id
                .and_then(|id| category_by_id.get(&id))
                .map(|c| (*c).clone());
            let supplier = model
                .supplier_id
                .and_then(|id| supplier_by_id.get(&id))
                .map(|s| (*s).clone());
            ProductDetail {
                product: model.into(),
                category,
                supplier,
            }
        })
        .collect();

    Ok(ApiResponse::success(
        "Products",
        ProductCatalog {
            products,
            categories,
            suppliers,
        },
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
    image: Option<ImageUpload>,
) -> AppResult<ApiResponse<ProductResponse>> {
    let name = validation::required_name("Product", payload.name)?;
    let price = validation::price(
        payload
            .price
            .ok_or_else(|| AppError::Validation("Price is required".into()))?,
    )?;
    let stock = validation::stock(
        payload
            .stock
            .ok_or_else(|| AppError::Validation("Stock quantity is required".into()))?,
    )?;
    let category_id = payload
        .category
        .ok_or_else(|| AppError::Validation("Category is required".into()))?;
    let supplier_id = payload
        .supplier
        .ok_or_else(|| AppError::Validation("Supplier is required".into()))?;
    let mut image_url = validation::image_url(payload.image_url)?;

    ensure_references(&state.orm, Some(category_id), Some(supplier_id)).await?;
    if let Some(image) = image {
        image_url = Some(state.images.upload(image).await?);
    }

    // Re-checked under lock; a reference may have gone away during the upload.
    let txn = state.orm.begin().await?;
    ensure_references(&txn, Some(category_id), Some(supplier_id)).await?;

    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        description: Set(validation::clean(payload.description)),
        price: Set(price),
        stock: Set(stock),
        category_id: Set(Some(category_id)),
        supplier_id: Set(Some(supplier_id)),
        image_url: Set(image_url),
        is_deleted: Set(false),
        created_at: NotSet,
        last_updated: NotSet,
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    tracing::info!(product_id = %product.id, name = %product.name, "product created");
    audit::record(
        &state.pool,
        user.user_id,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created successfully",
        ProductResponse {
            product: product.into(),
        },
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
    image: Option<ImageUpload>,
) -> AppResult<ApiResponse<ProductResponse>> {
    let name = payload
        .name
        .map(|name| validation::name_of("Product", name))
        .transpose()?;
    let price = payload.price.map(validation::price).transpose()?;
    let stock = payload.stock.map(validation::stock).transpose()?;
    let mut image_url = validation::image_url(payload.image_url)?;

    if let Some(image) = image {
        Products::find_by_id(id)
            .filter(Column::IsDeleted.eq(false))
            .one(&state.orm)
            .await?
            .ok_or(AppError::NotFound("Product"))?;
        ensure_references(&state.orm, payload.category, payload.supplier).await?;
        image_url = Some(state.images.upload(image).await?);
    }

    let txn = state.orm.begin().await?;
    let existing = Products::find_by_id(id)
        .filter(Column::IsDeleted.eq(false))
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound("Product"))?;

    ensure_references(&txn, payload.category, payload.supplier).await?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = name {
        active.name = Set(name);
    }
    if payload.description.is_some() {
        active.description = Set(validation::clean(payload.description));
    }
    if let Some(price) = price {
        active.price = Set(price);
    }
    if let Some(stock) = stock {
        active.stock = Set(stock);
    }
    if let Some(category_id) = payload.category {
        active.category_id = Set(Some(category_id));
    }
    if let Some(supplier_id) = payload.supplier {
        active.supplier_id = Set(Some(supplier_id));
    }
    if let Some(url) = image_url {
        active.image_url = Set(Some(url));
    }
    active.last_updated = Set(Utc::now().into());

    let product = active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product updated",
        ProductResponse {
            product: product.into(),
        },
    ))
}

/// Soft delete: the row stays so order history keeps resolving it.
pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<ProductResponse>> {
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Product"))?;

    if existing.is_deleted {
        return Err(AppError::Validation("Product is already deleted".into()));
    }

    let mut active: ActiveModel = existing.into();
    active.is_deleted = Set(true);
    active.last_updated = Set(Utc::now().into());
    let product = active.update(&state.orm).await?;

    tracing::info!(product_id = %id, "product soft-deleted");
    audit::record(
        &state.pool,
        user.user_id,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product deleted",
        ProductResponse {
            product: product.into(),
        },
    ))
}

/// Number of live products whose `column` points at `id`.
pub(crate) async fn live_products_referencing<C>(conn: &C, column: Column, id: Uuid) -> AppResult<u64>
where
    C: ConnectionTrait,
{
    let count = Products::find()
        .filter(column.eq(id))
        .filter(Column::IsDeleted.eq(false))
        .count(conn)
        .await?;
    Ok(count)
}

/// Share-locks the referenced category/supplier rows so a concurrent delete
/// cannot remove them before the product row is written.
async fn ensure_references<C>(
    conn: &C,
    category_id: Option<Uuid>,
    supplier_id: Option<Uuid>,
) -> AppResult<()>
where
    C: ConnectionTrait,
{
    if let Some(id) = category_id {
        Categories::find_by_id(id)
            .lock_shared()
            .one(conn)
            .await?
            .ok_or_else(|| AppError::Validation("Category does not exist".into()))?;
    }
    if let Some(id) = supplier_id {
        Suppliers::find_by_id(id)
            .lock_shared()
            .one(conn)
            .await?
            .ok_or_else(|| AppError::Validation("Supplier does not exist".into()))?;
    }
    Ok(())
}
