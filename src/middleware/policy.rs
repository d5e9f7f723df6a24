//! Route access policy.
//!
//! Every request under `/api` goes through [`authorize`], which looks up the
//! request in [`POLICY`] and enforces the listed access level. Routes that are
//! not listed require an authenticated caller.

use axum::{
    extract::{OriginalUri, Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{error::AppError, middleware::auth::JwtKeys};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Admin,
}

#[derive(Debug)]
pub struct Rule {
    pub method: Method,
    /// Path template; `{param}` segments match any single segment.
    pub path: &'static str,
    pub access: Access,
}

const fn rule(method: Method, path: &'static str, access: Access) -> Rule {
    Rule {
        method,
        path,
        access,
    }
}

pub static POLICY: &[Rule] = &[
    rule(Method::POST, "/api/auth/login", Access::Public),
    rule(Method::GET, "/api/auth/verify", Access::Authenticated),
    rule(Method::GET, "/api/category", Access::Authenticated),
    rule(Method::POST, "/api/category", Access::Admin),
    rule(Method::POST, "/api/category/add", Access::Admin),
    rule(Method::PUT, "/api/category/{id}", Access::Admin),
    rule(Method::DELETE, "/api/category/{id}", Access::Admin),
    rule(Method::GET, "/api/supplier", Access::Authenticated),
    rule(Method::POST, "/api/supplier", Access::Admin),
    rule(Method::POST, "/api/supplier/add", Access::Admin),
    rule(Method::PUT, "/api/supplier/{id}", Access::Admin),
    rule(Method::DELETE, "/api/supplier/{id}", Access::Admin),
    rule(Method::GET, "/api/products", Access::Authenticated),
    rule(Method::POST, "/api/products", Access::Admin),
    rule(Method::POST, "/api/products/add", Access::Admin),
    rule(Method::PUT, "/api/products/{id}", Access::Admin),
    rule(Method::DELETE, "/api/products/{id}", Access::Admin),
    rule(Method::GET, "/api/users", Access::Admin),
    rule(Method::POST, "/api/users", Access::Admin),
    rule(Method::POST, "/api/users/add", Access::Admin),
    rule(Method::GET, "/api/users/{id}", Access::Authenticated),
    rule(Method::PUT, "/api/users/{id}", Access::Authenticated),
    rule(Method::DELETE, "/api/users/{id}", Access::Admin),
    rule(Method::POST, "/api/order/add", Access::Authenticated),
    rule(Method::POST, "/api/order/place-order", Access::Authenticated),
    rule(Method::GET, "/api/order/{id}", Access::Authenticated),
    rule(Method::GET, "/api/dashboard", Access::Admin),
];

/// Access level for a request; unlisted routes require authentication.
pub fn access_for(method: &Method, path: &str) -> Access {
    POLICY
        .iter()
        .find(|rule| rule.method == *method && matches_template(rule.path, path))
        .map(|rule| rule.access)
        .unwrap_or(Access::Authenticated)
}

fn matches_template(template: &str, path: &str) -> bool {
    let path = path.trim_end_matches('/');
    let mut expected = template.split('/');
    let mut actual = path.split('/');
    loop {
        match (expected.next(), actual.next()) {
            (None, None) => return true,
            (Some(t), Some(p)) => {
                let is_param = t.starts_with('{') && t.ends_with('}');
                if is_param {
                    if p.is_empty() {
                        return false;
                    }
                } else if t != p {
                    return false;
                }
            }
            _ => return false,
        }
    }
}

/// Authorization step for the `/api` router.
pub async fn authorize(State(keys): State<JwtKeys>, mut request: Request, next: Next) -> Response {
    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let access = access_for(request.method(), &path);
    if access == Access::Public {
        return next.run(request).await;
    }

    let user = match keys.authenticate(request.headers()) {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };

    if access == Access::Admin && !user.is_admin() {
        tracing::info!(user_id = %user.user_id, %path, "admin route denied");
        return AppError::Forbidden.into_response();
    }

    request.extensions_mut().insert(user);
    next.run(request).await
}
