//! Axum extractors for authentication
//!
//! Generic over any state `S` where `AuthBackend: FromRef<S>`.
//! The role extractors reject before the handler runs, so a request body
//! is never read for a caller who is not allowed to send it.

use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::backend::AuthBackend;
use crate::context::AuthContext;
use crate::error::AuthError;
use crate::jwt::extract_request_token;

/// Authenticated user extractor (any role)
#[derive(Debug)]
pub struct AuthUser(pub AuthContext);

impl<S> FromRequestParts<S> for AuthUser
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let backend = AuthBackend::from_ref(state);

        let token = extract_request_token(parts)?;
        let auth_context = backend.authenticate(&token)?;

        Ok(AuthUser(auth_context))
    }
}

/// Clinician extractor for file management.
///
/// Like `AuthUser` but rejects roles that may not upload or modify
/// patient files with 403 FORBIDDEN.
#[derive(Debug)]
pub struct ClinicianUser(pub AuthContext);

impl<S> FromRequestParts<S> for ClinicianUser
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let AuthUser(auth_context) = AuthUser::from_request_parts(parts, state).await?;

        if !auth_context.role.can_upload_files() {
            return Err(AuthError::ForbiddenRole(
                "Only Admin or Doctor users are allowed to manage files",
            ));
        }

        Ok(ClinicianUser(auth_context))
    }
}

/// Administrator extractor, rejects every other role with 403 FORBIDDEN
#[derive(Debug)]
pub struct AdminUser(pub AuthContext);

impl<S> FromRequestParts<S> for AdminUser
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let AuthUser(auth_context) = AuthUser::from_request_parts(parts, state).await?;

        if !auth_context.role.can_manage_users() {
            return Err(AuthError::ForbiddenRole(
                "Only Admin users can perform this operation",
            ));
        }

        Ok(AdminUser(auth_context))
    }
}

/// Raw token as presented by the caller, if any. Never rejects.
#[derive(Debug)]
pub struct PresentedToken(pub Option<String>);

impl<S> FromRequestParts<S> for PresentedToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        Ok(PresentedToken(extract_request_token(parts).ok()))
    }
}
