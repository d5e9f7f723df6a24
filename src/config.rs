use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_days: i64,
    pub cors_origins: Vec<String>,
    pub image_upload_url: Option<String>,
    pub image_upload_preset: Option<String>,
    pub delivery_charge: i64,
    pub max_concurrency: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_ttl_days = env::var("JWT_TTL_DAYS")
            .ok()
            .and_then(|d| d.parse::<i64>().ok())
            .filter(|d| *d > 0)
            .unwrap_or(5);
        let cors_origins = env::var("CORS_ORIGINS")
            .map(|raw| parse_list(&raw))
            .unwrap_or_default();
        let image_upload_url = non_empty_var("IMAGE_UPLOAD_URL");
        let image_upload_preset = non_empty_var("IMAGE_UPLOAD_PRESET");
        let delivery_charge = env::var("DELIVERY_CHARGE")
            .ok()
            .and_then(|c| c.parse::<i64>().ok())
            .filter(|c| *c >= 0)
            .unwrap_or(0);
        let max_concurrency = env::var("MAX_CONCURRENCY")
            .ok()
            .and_then(|c| c.parse::<usize>().ok())
            .filter(|c| *c > 0)
            .unwrap_or(100);

        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            jwt_ttl_days,
            cors_origins,
            image_upload_url,
            image_upload_preset,
            delivery_charge,
            max_concurrency,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::parse_list;

    #[test]
    fn parses_comma_separated_origins() {
        let origins = parse_list(" http://localhost:5173, ,https://shop.example.com ");
        assert_eq!(
            origins,
            vec!["http://localhost:5173", "https://shop.example.com"]
        );
    }

    #[test]
    fn empty_list_yields_no_origins() {
        assert!(parse_list("").is_empty());
    }
}
