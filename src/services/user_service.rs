use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit,
    dto::users::{CreateUserRequest, UpdateUserRequest, UserList, UserResponse},
    entity::users::{ActiveModel, Column, Entity as Users},
    error::{AppError, AppResult, map_unique},
    middleware::auth::AuthUser,
    models::Role,
    response::ApiResponse,
    services::{
        auth_service::{hash_password, password_matches},
        validation,
    },
    state::AppState,
};

const DUPLICATE: &str = "User already exists";

pub async fn list_users(state: &AppState) -> AppResult<ApiResponse<UserList>> {
    let users = Users::find()
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(ApiResponse::success("Users", UserList { users }))
}

pub async fn create_user(
    state: &AppState,
    admin: &AuthUser,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<UserResponse>> {
    let name = validation::clean(payload.name)
        .ok_or_else(|| AppError::Validation("Name is required".into()))?;
    let email = validation::email(
        payload
            .email
            .as_deref()
            .ok_or_else(|| AppError::Validation("Email is required".into()))?,
    )?;
    let password = payload
        .password
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Password is required".into()))?;

    if email_taken(state, &email, None).await? {
        return Err(AppError::DuplicateName(DUPLICATE.into()));
    }

    let user = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email),
        password_hash: Set(hash_password(&password)?),
        address: Set(validation::clean(payload.address)),
        role: Set(payload.role.unwrap_or(Role::User)),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|e| map_unique(e, DUPLICATE))?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "user created");
    audit::record(
        &state.pool,
        admin.user_id,
        "user_create",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "User created successfully",
        UserResponse { user: user.into() },
    ))
}

/// A user may only fetch their own profile.
pub async fn get_self(
    state: &AppState,
    requester: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<UserResponse>> {
    if requester.user_id != id {
        return Err(AppError::Forbidden);
    }
    let user = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(ApiResponse::success("User", UserResponse { user: user.into() }))
}

/// Profile update by the user themselves or an admin. The password is only
/// re-hashed when a new, different, non-blank value is supplied.
pub async fn update_self(
    state: &AppState,
    requester: &AuthUser,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<UserResponse>> {
    if requester.user_id != id && !requester.is_admin() {
        return Err(AppError::Forbidden);
    }

    let existing = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    let password_changed = password_change_requested(payload.password.as_deref(), &existing.password_hash)?;
    let current_email = existing.email.clone();
    let mut active: ActiveModel = existing.into();

    if let Some(name) = validation::clean(payload.name) {
        active.name = Set(name);
    }
    if let Some(email) = payload.email.as_deref() {
        let email = validation::email(email)?;
        if email != current_email && email_taken(state, &email, Some(id)).await? {
            return Err(AppError::DuplicateName("Email is already taken".into()));
        }
        active.email = Set(email);
    }
    if payload.address.is_some() {
        active.address = Set(validation::clean(payload.address));
    }
    if let (true, Some(password)) = (password_changed, payload.password.as_deref()) {
        active.password_hash = Set(hash_password(password)?);
    }

    let user = active
        .update(&state.orm)
        .await
        .map_err(|e| map_unique(e, "Email is already taken"))?;

    audit::record(
        &state.pool,
        requester.user_id,
        "user_update",
        "users",
        serde_json::json!({ "user_id": user.id, "password_changed": password_changed }),
    )
    .await;

    Ok(ApiResponse::success(
        "User updated",
        UserResponse { user: user.into() },
    ))
}

pub async fn delete_user(
    state: &AppState,
    admin: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    Users::delete_by_id(id).exec(&state.orm).await?;

    tracing::info!(user_id = %id, "user deleted");
    audit::record(
        &state.pool,
        admin.user_id,
        "user_delete",
        "users",
        serde_json::json!({ "user_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "User deleted",
        UserResponse { user: user.into() },
    ))
}

/// True when `candidate` is a non-blank password that differs from the one
/// behind `current_hash`.
pub fn password_change_requested(candidate: Option<&str>, current_hash: &str) -> AppResult<bool> {
    match candidate {
        Some(password) if !password.trim().is_empty() => {
            Ok(!password_matches(password, current_hash)?)
        }
        _ => Ok(false),
    }
}

async fn email_taken(state: &AppState, email: &str, except: Option<Uuid>) -> AppResult<bool> {
    let mut finder = Users::find().filter(Column::Email.eq(email));
    if let Some(id) = except {
        finder = finder.filter(Column::Id.ne(id));
    }
    Ok(finder.one(&state.orm).await?.is_some())
}
