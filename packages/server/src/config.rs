use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// When unset the server runs against the in-memory store
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_ttl_hours: i64,
    /// Emails registered as `system_admin`
    pub admin_emails: Vec<String>,
    /// CORS origins; empty or `*` allows any
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.trim().is_empty()),
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "dkn".to_string()),
            jwt_ttl_hours: env::var("JWT_TTL_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .context("JWT_TTL_HOURS must be a valid number")?,
            admin_emails: split_list(&env::var("ADMIN_EMAILS").unwrap_or_default()),
            allowed_origins: split_list(&env::var("ALLOWED_ORIGINS").unwrap_or_default()),
        })
    }
}

/// Comma-separated list, blanks dropped
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
