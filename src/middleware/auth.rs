use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::{
    dto::auth::Claims,
    error::{AppError, AppResult},
    models::Role,
};

/// Identity attached to a request once its bearer token has been verified.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// HS256 signing and verification keys for session tokens.
#[derive(Clone)]
pub struct JwtKeys {
    inner: Arc<KeysInner>,
}

struct KeysInner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    pub fn new(secret: &[u8], ttl_days: i64) -> Self {
        Self {
            inner: Arc::new(KeysInner {
                encoding: EncodingKey::from_secret(secret),
                decoding: DecodingKey::from_secret(secret),
                ttl: Duration::days(ttl_days),
            }),
        }
    }

    pub fn issue(&self, user_id: Uuid, role: Role) -> AppResult<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.inner.ttl)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

        let claims = Claims {
            user_id,
            role,
            iat: now.timestamp() as usize,
            exp: expiration.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.inner.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
    }

    pub fn verify(&self, token: &str) -> AppResult<AuthUser> {
        let decoded = decode::<Claims>(token, &self.inner.decoding, &Validation::default())
            .map_err(|err| {
                tracing::debug!(error = %err, "rejected session token");
                AppError::Unauthorized
            })?;

        Ok(AuthUser {
            user_id: decoded.claims.user_id,
            role: decoded.claims.role,
        })
    }

    /// Verify the `Authorization: Bearer <token>` header.
    pub fn authenticate(&self, headers: &HeaderMap) -> AppResult<AuthUser> {
        let token = bearer_token(headers)?;
        self.verify(token)
    }
}

fn bearer_token(headers: &HeaderMap) -> AppResult<&str> {
    let auth_str = headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::Unauthorized)?
        .to_str()
        .map_err(|_| AppError::Unauthorized)?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized)?;
    Ok(token)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let keys = JwtKeys::from_ref(state);
        let user = keys.authenticate(&parts.headers)?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn issued_token_round_trips_identity() {
        let keys = JwtKeys::new(b"test-secret", 5);
        let user_id = Uuid::new_v4();
        let token = keys.issue(user_id, Role::Admin).unwrap();

        let user = keys.verify(&token).unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.role, Role::Admin);
        assert!(user.is_admin());
    }

    #[test]
    fn token_expires_after_five_days() {
        let keys = JwtKeys::new(b"test-secret", 5);
        let token = keys.issue(Uuid::new_v4(), Role::User).unwrap();
        let claims = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::default(),
        )
        .unwrap()
        .claims;
        assert_eq!(claims.exp - claims.iat, 5 * 24 * 60 * 60);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = JwtKeys::new(b"one", 5)
            .issue(Uuid::new_v4(), Role::User)
            .unwrap();
        let err = JwtKeys::new(b"two", 5).verify(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = JwtKeys::new(b"test-secret", 5);
        let claims = Claims {
            user_id: Uuid::new_v4(),
            role: Role::User,
            iat: 1_000,
            exp: 2_000,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(matches!(keys.verify(&token), Err(AppError::Unauthorized)));
    }

    #[test]
    fn header_must_use_bearer_scheme() {
        let keys = JwtKeys::new(b"test-secret", 5);
        let token = keys.issue(Uuid::new_v4(), Role::User).unwrap();

        assert!(keys.authenticate(&headers_with(&format!("Bearer {token}"))).is_ok());
        assert!(matches!(
            keys.authenticate(&headers_with(&format!("Token {token}"))),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            keys.authenticate(&headers_with("Bearer ")),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            keys.authenticate(&HeaderMap::new()),
            Err(AppError::Unauthorized)
        ));
    }
}
