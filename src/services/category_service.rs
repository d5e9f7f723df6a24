use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit,
    dto::categories::{CategoryList, CategoryResponse, CreateCategoryRequest, UpdateCategoryRequest},
    entity::categories::{ActiveModel, Column, Entity as Categories},
    entity::products::Column as ProdCol,
    error::{AppError, AppResult, map_unique},
    images::ImageUpload,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::{product_service::live_products_referencing, validation},
    state::AppState,
};

const DUPLICATE: &str = "Category already exists";

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let categories = Categories::find()
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(ApiResponse::success("Categories", CategoryList { categories }))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
    image: Option<ImageUpload>,
) -> AppResult<ApiResponse<CategoryResponse>> {
    let name = validation::required_name("Category", payload.name)?;
    let description = validation::clean(payload.description);
    let mut image_url = validation::image_url(payload.image_url)?;

    if name_taken(state, &name, None).await? {
        return Err(AppError::DuplicateName(DUPLICATE.into()));
    }

    if let Some(image) = image {
        image_url = Some(state.images.upload(image).await?);
    }

    let category = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        description: Set(description),
        image_url: Set(image_url),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|e| map_unique(e, DUPLICATE))?;

    tracing::info!(category_id = %category.id, name = %category.name, "category created");
    audit::record(
        &state.pool,
        user.user_id,
        "category_create",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category created successfully",
        CategoryResponse {
            category: category.into(),
        },
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCategoryRequest,
    image: Option<ImageUpload>,
) -> AppResult<ApiResponse<CategoryResponse>> {
    let existing = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Category"))?;

    let mut active: ActiveModel = existing.clone().into();
    if let Some(name) = payload.name {
        let name = validation::name_of("Category", name)?;
        if name != existing.name && name_taken(state, &name, Some(id)).await? {
            return Err(AppError::DuplicateName(DUPLICATE.into()));
        }
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(validation::clean(Some(description)));
    }
    if let Some(url) = validation::image_url(payload.image_url)? {
        active.image_url = Set(Some(url));
    }
    let mut uploaded = None;
    if let Some(image) = image {
        let url = state.images.upload(image).await?;
        active.image_url = Set(Some(url.clone()));
        uploaded = Some(url);
    }

    let category = active.update(&state.orm).await.map_err(|e| {
        if let Some(url) = &uploaded {
            tracing::warn!(category_id = %id, %url, "category update failed after image upload");
        }
        map_unique(e, DUPLICATE)
    })?;

    audit::record(
        &state.pool,
        user.user_id,
        "category_update",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category updated",
        CategoryResponse {
            category: category.into(),
        },
    ))
}

/// Hard delete, refused while live products reference the category.
pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<CategoryResponse>> {
    let txn = state.orm.begin().await?;

    let category = Categories::find_by_id(id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound("Category"))?;

    let referenced = live_products_referencing(&txn, ProdCol::CategoryId, id).await?;
    if referenced > 0 {
        return Err(AppError::Conflict(format!(
            "Cannot delete: referenced by {referenced} products"
        )));
    }

    Categories::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(category_id = %id, "category deleted");
    audit::record(
        &state.pool,
        user.user_id,
        "category_delete",
        "categories",
        serde_json::json!({ "category_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category deleted",
        CategoryResponse {
            category: category.into(),
        },
    ))
}

async fn name_taken(state: &AppState, name: &str, except: Option<Uuid>) -> AppResult<bool> {
    let mut finder = Categories::find().filter(Column::Name.eq(name));
    if let Some(id) = except {
        finder = finder.filter(Column::Id.ne(id));
    }
    Ok(finder.one(&state.orm).await?.is_some())
}
