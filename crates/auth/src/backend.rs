//! Concrete authentication backend
//!
//! Bundles token handling and password hashing so domain states can hand
//! a single value to the extractors.

use uuid::Uuid;

use crate::claims::IdentityClaims;
use crate::config::AuthConfig;
use crate::context::AuthContext;
use crate::error::AuthError;
use crate::jwt::TokenService;
use crate::password::PasswordHasher;
use crate::types::Role;

/// Concrete authentication backend.
///
/// Domain states expose this via `FromRef`:
/// ```ignore
/// impl FromRef<MyDomainState> for AuthBackend {
///     fn from_ref(state: &MyDomainState) -> Self {
///         state.auth.clone()
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthBackend {
    tokens: TokenService,
    passwords: PasswordHasher,
}

impl AuthBackend {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        Ok(Self {
            tokens: TokenService::new(config)?,
            passwords: PasswordHasher::new(config.bcrypt_cost),
        })
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn passwords(&self) -> &PasswordHasher {
        &self.passwords
    }

    pub fn issue_token(&self, user_id: Uuid, contact: &str, role: Role) -> Result<String, AuthError> {
        self.tokens.issue(user_id, contact, role)
    }

    pub fn validate_token(&self, token: &str) -> Result<IdentityClaims, AuthError> {
        self.tokens.validate(token)
    }

    /// Validate a token and build the caller context from its claims
    pub fn authenticate(&self, token: &str) -> Result<AuthContext, AuthError> {
        let claims = self.tokens.validate(token)?;
        AuthContext::from_claims(claims)
    }
}
