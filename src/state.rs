use axum::extract::FromRef;

use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn},
    images::ImageStore,
    middleware::auth::JwtKeys,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub jwt: JwtKeys,
    pub images: ImageStore,
    pub settings: Settings,
}

/// Business settings that services read at request time.
#[derive(Debug, Clone, Copy, Default)]
pub struct Settings {
    pub delivery_charge: i64,
}

impl AppState {
    pub fn new(pool: DbPool, orm: OrmConn, config: &AppConfig) -> Self {
        Self {
            pool,
            orm,
            jwt: JwtKeys::new(config.jwt_secret.as_bytes(), config.jwt_ttl_days),
            images: ImageStore::from_config(config),
            settings: Settings {
                delivery_charge: config.delivery_charge,
            },
        }
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}
