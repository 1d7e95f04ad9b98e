//! Authentication configuration

use carepoint_common::Config;

/// Configuration for token issuance, validation, and password hashing
#[derive(Clone)]
pub struct AuthConfig {
    /// Current signing secret; a random per-process secret is generated when absent
    pub jwt_secret: Option<String>,
    /// Retired signing secret still accepted during validation
    pub previous_secret: Option<String>,
    pub issuer: String,
    pub token_ttl: chrono::Duration,
    pub bcrypt_cost: u32,
}

impl From<&Config> for AuthConfig {
    fn from(config: &Config) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            previous_secret: config.jwt_previous_secret.clone(),
            issuer: config.jwt_issuer.clone(),
            token_ttl: chrono::Duration::hours(config.token_ttl_hours),
            bcrypt_cost: config.bcrypt_cost,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    #[mutants::skip] // Debug output only
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field(
                "previous_secret",
                &self.previous_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("issuer", &self.issuer)
            .field("token_ttl", &self.token_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}
