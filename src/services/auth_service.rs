use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::{
    audit,
    dto::auth::{LoginRequest, LoginResponse, LoginUser, VerifyResponse},
    entity::users::{Column as UserCol, Entity as Users},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::ApiResponse,
    state::AppState,
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(password_hash)
}

pub fn password_matches(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let email = email.trim().to_lowercase();

    let user = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    if !password_matches(&password, &user.password_hash)? {
        tracing::info!(user_id = %user.id, "login rejected: wrong password");
        return Err(AppError::InvalidCredentials);
    }

    let token = state.jwt.issue(user.id, user.role)?;

    audit::record(
        &state.pool,
        user.id,
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    let resp = LoginResponse {
        token,
        user: LoginUser {
            user_id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        },
    };
    Ok(ApiResponse::success("Login successful", resp))
}

/// Echo the authenticated identity. A token whose user no longer exists is rejected.
pub async fn verify_user(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<VerifyResponse>> {
    let found = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(ApiResponse::success(
        "User Verified",
        VerifyResponse { user: found.into() },
    ))
}
