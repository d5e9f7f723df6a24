use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit,
    dto::suppliers::{CreateSupplierRequest, SupplierList, SupplierResponse, UpdateSupplierRequest},
    entity::products::Column as ProdCol,
    entity::suppliers::{ActiveModel, Column, Entity as Suppliers},
    error::{AppError, AppResult, map_unique},
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::{product_service::live_products_referencing, validation},
    state::AppState,
};

const DUPLICATE: &str = "Supplier already exists";

pub async fn list_suppliers(state: &AppState) -> AppResult<ApiResponse<SupplierList>> {
    let suppliers = Suppliers::find()
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(ApiResponse::success("Suppliers", SupplierList { suppliers }))
}

pub async fn create_supplier(
    state: &AppState,
    user: &AuthUser,
    payload: CreateSupplierRequest,
) -> AppResult<ApiResponse<SupplierResponse>> {
    let name = validation::required_name("Supplier", payload.name)?;
    let email = supplier_email(payload.email)?;

    if let Some(email) = &email {
        if email_taken(state, email, None).await? {
            return Err(AppError::DuplicateName(DUPLICATE.into()));
        }
    }

    let supplier = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email),
        phone: Set(validation::clean(payload.phone)),
        address: Set(validation::clean(payload.address)),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|e| map_unique(e, DUPLICATE))?;

    tracing::info!(supplier_id = %supplier.id, "supplier created");
    audit::record(
        &state.pool,
        user.user_id,
        "supplier_create",
        "suppliers",
        serde_json::json!({ "supplier_id": supplier.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Supplier created successfully",
        SupplierResponse {
            supplier: supplier.into(),
        },
    ))
}

pub async fn update_supplier(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateSupplierRequest,
) -> AppResult<ApiResponse<SupplierResponse>> {
    let existing = Suppliers::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Supplier"))?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(validation::name_of("Supplier", name)?);
    }
    if payload.email.is_some() {
        let email = supplier_email(payload.email)?;
        if let Some(email) = &email {
            if email_taken(state, email, Some(id)).await? {
                return Err(AppError::DuplicateName(DUPLICATE.into()));
            }
        }
        active.email = Set(email);
    }
    if payload.phone.is_some() {
        active.phone = Set(validation::clean(payload.phone));
    }
    if payload.address.is_some() {
        active.address = Set(validation::clean(payload.address));
    }

    let supplier = active
        .update(&state.orm)
        .await
        .map_err(|e| map_unique(e, DUPLICATE))?;

    audit::record(
        &state.pool,
        user.user_id,
        "supplier_update",
        "suppliers",
        serde_json::json!({ "supplier_id": supplier.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Supplier updated",
        SupplierResponse {
            supplier: supplier.into(),
        },
    ))
}

/// Hard delete, refused while live products reference the supplier.
pub async fn delete_supplier(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<SupplierResponse>> {
    let txn = state.orm.begin().await?;

    let supplier = Suppliers::find_by_id(id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound("Supplier"))?;

    let referenced = live_products_referencing(&txn, ProdCol::SupplierId, id).await?;
    if referenced > 0 {
        return Err(AppError::Conflict(format!(
            "Cannot delete: referenced by {referenced} products"
        )));
    }

    Suppliers::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(supplier_id = %id, "supplier deleted");
    audit::record(
        &state.pool,
        user.user_id,
        "supplier_delete",
        "suppliers",
        serde_json::json!({ "supplier_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Supplier deleted",
        SupplierResponse {
            supplier: supplier.into(),
        },
    ))
}

fn supplier_email(value: Option<String>) -> AppResult<Option<String>> {
    validation::clean(value)
        .map(|email| validation::email(&email))
        .transpose()
}

async fn email_taken(state: &AppState, email: &str, except: Option<Uuid>) -> AppResult<bool> {
    let mut finder = Suppliers::find().filter(Column::Email.eq(email));
    if let Some(id) = except {
        finder = finder.filter(Column::Id.ne(id));
    }
    Ok(finder.one(&state.orm).await?.is_some())
}
