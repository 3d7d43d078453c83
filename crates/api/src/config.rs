//! Process configuration.
//!
//! The environment is read exactly once, here; everything below the
//! boundary receives explicit config values.

use portal_auth::TokenConfig;

const DEFAULT_ALGORITHM: &str = "HS256";
const DEFAULT_TTL_MINUTES: i64 = 30;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub token: TokenConfig,
    /// Absent selects the in-memory directory (local dev / tests).
    pub database_url: Option<String>,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let secret = std::env::var("AUTH_SECRET").unwrap_or_else(|_| {
            tracing::warn!("AUTH_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let algorithm =
            std::env::var("AUTH_ALGORITHM").unwrap_or_else(|_| DEFAULT_ALGORITHM.to_string());

        let ttl_minutes = std::env::var("AUTH_TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TTL_MINUTES);

        Self {
            token: TokenConfig {
                secret,
                algorithm,
                ttl_minutes,
            },
            database_url: std::env::var("DATABASE_URL").ok(),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
        }
    }
}
