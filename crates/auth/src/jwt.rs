//! Token issuance, validation, and extraction helpers

use axum::http::{request::Parts, HeaderValue};
use axum::{extract::Query, http::header::AUTHORIZATION};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Deserialize;
use uuid::Uuid;

use crate::claims::IdentityClaims;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::types::Role;

/// Signs and verifies identity tokens (HS256).
///
/// Tokens are issued with the current secret only. Validation tries the
/// current secret first, then the previous one if configured.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_keys: Vec<DecodingKey>,
    validation: Validation,
    issuer: String,
    ttl: chrono::Duration,
}

impl std::fmt::Debug for TokenService {
    #[mutants::skip] // Debug output only
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .field("decoding_keys", &self.decoding_keys.len())
            .finish()
    }
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let current = match &config.jwt_secret {
            Some(secret) => secret.as_bytes().to_vec(),
            None => {
                tracing::warn!(
                    "JWT_SECRET not set; using a random per-process signing secret. \
                     Tokens will not survive a restart."
                );
                random_secret()?
            }
        };

        let mut decoding_keys = vec![DecodingKey::from_secret(&current)];
        if let Some(previous) = &config.previous_secret {
            decoding_keys.push(DecodingKey::from_secret(previous.as_bytes()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(&current),
            decoding_keys,
            validation,
            issuer: config.issuer.clone(),
            ttl: config.token_ttl,
        })
    }

    /// Issue a signed token for the given identity
    pub fn issue(&self, subject: Uuid, contact: &str, role: Role) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = IdentityClaims {
            sub: subject.to_string(),
            contact: contact.to_string(),
            role,
            iss: self.issuer.clone(),
            iat: now.timestamp() as u64,
            exp: (now + self.ttl).timestamp() as u64,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "Failed to sign token");
            AuthError::TokenIssueFailed
        })
    }

    /// Validate a token and return its claims.
    ///
    /// Every failure collapses to `InvalidToken`; the reason is only logged.
    pub fn validate(&self, token: &str) -> Result<IdentityClaims, AuthError> {
        for key in &self.decoding_keys {
            match decode::<IdentityClaims>(token, key, &self.validation) {
                Ok(data) => return Ok(data.claims),
                Err(e) => {
                    tracing::debug!(error = %e, "JWT validation failed");
                }
            }
        }
        Err(AuthError::InvalidToken)
    }
}

fn random_secret() -> Result<Vec<u8>, AuthError> {
    let mut secret = vec![0u8; 32];
    getrandom::getrandom(&mut secret).map_err(|e| {
        tracing::error!(error = %e, "Failed to generate signing secret");
        AuthError::KeyInitFailed
    })?;
    Ok(secret)
}

/// Extract bearer token from Authorization header
pub(crate) fn extract_bearer_token(header: &HeaderValue) -> Result<String, AuthError> {
    let header_str = header
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorizationFormat)?;

    match header_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(AuthError::InvalidAuthorizationFormat),
    }
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Locate the presented token: the Authorization header wins, the
/// `token` query parameter is the fallback.
pub(crate) fn extract_request_token(parts: &Parts) -> Result<String, AuthError> {
    if let Some(header) = parts.headers.get(AUTHORIZATION) {
        return extract_bearer_token(header);
    }

    let Query(query) =
        Query::<TokenQuery>::try_from_uri(&parts.uri).map_err(|_| AuthError::MissingToken)?;

    query
        .token
        .filter(|token| !token.trim().is_empty())
        .ok_or(AuthError::MissingToken)
}
