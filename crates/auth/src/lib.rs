//! Authentication gateway for CarePoint API
//!
//! Provides token issuance and validation, bcrypt password hashing, the
//! role model, and axum extractors that work with any domain state
//! implementing `FromRef<S>` for `AuthBackend`.

mod backend;
mod claims;
mod config;
mod context;
mod error;
mod extractors;
mod jwt;
mod password;
mod types;

pub use backend::AuthBackend;
pub use claims::IdentityClaims;
pub use config::AuthConfig;
pub use context::AuthContext;
pub use error::AuthError;
pub use extractors::{AdminUser, AuthUser, ClinicianUser, PresentedToken};
pub use jwt::TokenService;
pub use password::{PasswordHasher, MAX_PASSWORD_BYTES};
pub use types::Role;
