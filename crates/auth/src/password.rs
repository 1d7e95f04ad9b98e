//! Password hashing with bcrypt
//!
//! bcrypt is CPU-bound, so hashing and verification run on the blocking pool.

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::error::AuthError;

/// bcrypt limits input to 72 bytes
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Input for the stand-in hash verified when no credential matches
const DECOY_PASSWORD: &str = "carepoint-decoy-credential";

#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    decoy_hash: Arc<OnceCell<String>>,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    pub async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_string();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Password hashing task failed");
                AuthError::PasswordHashFailed
            })?
            .map_err(|e| {
                tracing::error!(error = %e, "Password hashing failed");
                AuthError::PasswordHashFailed
            })
    }

    /// Returns `Ok(false)` for a mismatch and for an unreadable stored hash
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let password = password.to_string();
        let hash = hash.to_string();

        let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Password verification task failed");
                AuthError::PasswordHashFailed
            })?;

        match outcome {
            Ok(matches) => Ok(matches),
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash could not be parsed");
                Ok(false)
            }
        }
    }

    /// Run a full verification against a stand-in hash at the configured
    /// cost. Used when no credential matches the login email.
    pub async fn verify_decoy(&self, password: &str) -> Result<(), AuthError> {
        let decoy = self
            .decoy_hash
            .get_or_try_init(|| self.hash(DECOY_PASSWORD))
            .await?;
        self.verify(password, decoy).await?;
        Ok(())
    }

    /// Whether a decoy verification has run on this hasher or a clone of it
    pub fn decoy_used(&self) -> bool {
        self.decoy_hash.initialized()
    }
}
