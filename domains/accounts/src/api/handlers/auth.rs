//! Authentication API handlers
//!
//! - POST /v1/auth/login - Exchange email and password for a token
//! - POST /v1/auth/register - Create an account
//! - GET /v1/auth/validate - Report whether the presented token is valid
//! - POST /v1/auth/password - Change the caller's password

use axum::{extract::State, http::StatusCode, Json};
use carepoint_auth::{AuthUser, PresentedToken};
use carepoint_common::{Result, ValidatedJson};
use serde::Serialize;

use crate::api::middleware::AccountsState;
use crate::domain::auth::{
    self as flows, ChangePasswordRequest, LoginRequest, LoginResponse, RegisterRequest,
    RegisterResponse, TokenValidationResponse,
};

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Login always answers 200; `validated` carries the outcome
pub async fn login(
    State(state): State<AccountsState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let response = flows::login(&state.repos, &state.auth, &request.email, &request.password).await?;
    Ok(Json(response))
}

/// 201 on success, 409 with `registered: false` when the email is taken.
///
/// A token, if presented, identifies an admin registering staff accounts.
pub async fn register(
    State(state): State<AccountsState>,
    PresentedToken(token): PresentedToken,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let requested_by = token.and_then(|token| state.auth.authenticate(&token).ok());

    let response = flows::register(&state.repos, &state.auth, request, requested_by.as_ref()).await?;
    let status = if response.registered {
        StatusCode::CREATED
    } else {
        StatusCode::CONFLICT
    };

    Ok((status, Json(response)))
}

pub async fn validate_token(
    State(state): State<AccountsState>,
    PresentedToken(token): PresentedToken,
) -> Json<TokenValidationResponse> {
    Json(flows::validate_token(&state.auth, token.as_deref()))
}

pub async fn change_password(
    AuthUser(auth_context): AuthUser,
    State(state): State<AccountsState>,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>> {
    let message = flows::change_password(
        &state.repos,
        &state.auth,
        &auth_context,
        &request.old_password,
        &request.new_password,
    )
    .await?;

    Ok(Json(MessageResponse { message }))
}
