//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Default token lifetime in hours
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Default bcrypt cost factor
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Which persistence backend the stores use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow::anyhow!(
                "Unknown STORE_BACKEND: {}. Supported backends: postgres, memory",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Persistence backend
    pub store_backend: StoreBackend,

    /// Database connection URL, required for the postgres backend
    pub database_url: Option<String>,

    /// Token signing secret; a per-process random secret is used when absent
    pub jwt_secret: Option<String>,
    /// Previous signing secret, accepted for validation during rotation
    pub jwt_previous_secret: Option<String>,
    pub jwt_issuer: String,
    pub token_ttl_hours: i64,

    /// bcrypt cost factor for password hashing
    pub bcrypt_cost: u32,

    /// Runtime configuration
    pub port: u16,
    pub cors_allowed_origins: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let store_backend: StoreBackend = env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .parse()?;

        let database_url = non_empty_var("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(anyhow::anyhow!(
                "DATABASE_URL is required when STORE_BACKEND=postgres"
            ));
        }

        let token_ttl_hours = match non_empty_var("TOKEN_TTL_HOURS") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|hours| *hours > 0)
                .ok_or_else(|| anyhow::anyhow!("TOKEN_TTL_HOURS must be a positive integer"))?,
            None => DEFAULT_TOKEN_TTL_HOURS,
        };

        let bcrypt_cost = match non_empty_var("BCRYPT_COST") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|cost| (4..=31).contains(cost))
                .ok_or_else(|| anyhow::anyhow!("BCRYPT_COST must be between 4 and 31"))?,
            None => DEFAULT_BCRYPT_COST,
        };

        let config = Self {
            store_backend,
            database_url,
            jwt_secret: non_empty_var("JWT_SECRET"),
            jwt_previous_secret: non_empty_var("JWT_PREVIOUS_SECRET"),
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "carepoint".to_string()),
            token_ttl_hours,
            bcrypt_cost,
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
        };

        Ok(config)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
