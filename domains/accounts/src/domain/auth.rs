//! Login, registration, and password change flows
//!
//! Outcomes the caller is expected to handle (bad credentials, inactive
//! account, taken email) come back as response values with a message.
//! Only infrastructure failures and policy violations are `Err`.

use carepoint_auth::{AuthBackend, AuthContext, Role};
use carepoint_common::{Error, RepositoryError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::entities::{Credential, Gender, NewUser, User};
use super::validation::{check_mobile_number, check_password_policy};
use crate::repository::AccountsRepositories;

/// Shared by unknown email and wrong password so neither reveals which it was
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";
pub const INACTIVE_USER_MESSAGE: &str = "User is inactive. Please contact support.";
pub const LOGIN_SUCCESS_MESSAGE: &str = "Login successful";
pub const EMAIL_EXISTS_MESSAGE: &str = "Email already exists";
pub const REGISTER_SUCCESS_MESSAGE: &str = "User registered successfully";
pub const PASSWORD_CHANGED_MESSAGE: &str = "Password changed successfully";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 255))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    pub validated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    pub message: String,
}

impl LoginResponse {
    fn rejected(message: &str) -> Self {
        Self {
            validated: false,
            message: message.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub mobile_number: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    pub password: String,
    /// Defaults to PATIENT; other roles can only be assigned by an admin
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub registered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenValidationResponse {
    pub valid: bool,
    pub message: String,
}

/// Verify credentials and issue a token for an active user
pub async fn login(
    repos: &AccountsRepositories,
    auth: &AuthBackend,
    email: &str,
    password: &str,
) -> Result<LoginResponse> {
    let Some(credential) = repos.credentials.find_by_email(email).await? else {
        tracing::debug!("Login attempt for unknown email");
        auth.passwords().verify_decoy(password).await?;
        return Ok(LoginResponse::rejected(INVALID_CREDENTIALS_MESSAGE));
    };

    if !auth
        .passwords()
        .verify(password, &credential.password_hash)
        .await?
    {
        tracing::debug!(user_id = %credential.user_id, "Login attempt with wrong password");
        return Ok(LoginResponse::rejected(INVALID_CREDENTIALS_MESSAGE));
    }

    let user = match repos.users.find_by_id(credential.user_id).await? {
        Some(user) if user.active => user,
        _ => {
            tracing::info!(user_id = %credential.user_id, "Login refused for inactive user");
            return Ok(LoginResponse::rejected(INACTIVE_USER_MESSAGE));
        }
    };

    let token = auth.issue_token(user.id, &user.mobile_number, user.role)?;
    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok(LoginResponse {
        validated: true,
        token: Some(token),
        user_id: Some(user.id),
        first_name: Some(user.first_name),
        last_name: Some(user.last_name),
        role: Some(user.role),
        mobile_number: Some(user.mobile_number),
        message: LOGIN_SUCCESS_MESSAGE.to_string(),
    })
}

/// Role a registration request ends up with, given who is asking
fn resolve_registration_role(
    requested: Option<Role>,
    requested_by: Option<&AuthContext>,
) -> Result<Role> {
    let role = requested.unwrap_or(Role::Patient);
    match role {
        Role::Patient => Ok(role),
        Role::Admin | Role::Doctor | Role::Staff => {
            if requested_by.is_some_and(|ctx| ctx.role.can_manage_users()) {
                Ok(role)
            } else {
                Err(Error::Authorization(
                    "Only Admin users can register non-patient accounts".to_string(),
                ))
            }
        }
    }
}

/// Create a user and its credential in one unit and issue a token
pub async fn register(
    repos: &AccountsRepositories,
    auth: &AuthBackend,
    request: RegisterRequest,
    requested_by: Option<&AuthContext>,
) -> Result<RegisterResponse> {
    check_mobile_number(&request.mobile_number)?;
    check_password_policy(&request.password)?;
    let role = resolve_registration_role(request.role, requested_by)?;

    let rejected = || RegisterResponse {
        registered: false,
        message: EMAIL_EXISTS_MESSAGE.to_string(),
        ..RegisterResponse::default()
    };

    if repos.users.find_by_email(&request.email).await?.is_some() {
        tracing::info!("Registration rejected: email already exists");
        return Ok(rejected());
    }

    let password_hash = auth.passwords().hash(&request.password).await?;

    let user = User::new(NewUser {
        first_name: request.first_name,
        last_name: request.last_name,
        address: request.address,
        gender: request.gender,
        date_of_birth: request.date_of_birth,
        mobile_number: request.mobile_number,
        email: request.email,
        role,
    });
    let credential = Credential::new(user.id, user.email.clone(), password_hash);

    let user = match repos.credentials.create_account(&user, &credential).await {
        Ok(user) => user,
        // Lost a race with a concurrent registration for the same email
        Err(RepositoryError::AlreadyExists) => return Ok(rejected()),
        Err(e) => return Err(e.into()),
    };

    let token = auth.issue_token(user.id, &user.mobile_number, user.role)?;
    tracing::info!(user_id = %user.id, role = %user.role, "User registered");

    Ok(RegisterResponse {
        registered: true,
        id: Some(user.id),
        token: Some(token),
        message: REGISTER_SUCCESS_MESSAGE.to_string(),
    })
}

/// Replace the caller's password after verifying the current one
pub async fn change_password(
    repos: &AccountsRepositories,
    auth: &AuthBackend,
    caller: &AuthContext,
    old_password: &str,
    new_password: &str,
) -> Result<String> {
    check_password_policy(new_password)?;

    let credential = repos
        .credentials
        .find_by_user_id(caller.user_id)
        .await?
        .ok_or_else(|| Error::NotFound("User credentials not found".to_string()))?;

    if !auth
        .passwords()
        .verify(old_password, &credential.password_hash)
        .await?
    {
        return Err(Error::Validation("Incorrect old password".to_string()));
    }

    let password_hash = auth.passwords().hash(new_password).await?;
    repos
        .credentials
        .update_password(caller.user_id, &password_hash)
        .await?;

    tracing::info!(user_id = %caller.user_id, "Password changed");
    Ok(PASSWORD_CHANGED_MESSAGE.to_string())
}

/// Token introspection; never fails
pub fn validate_token(auth: &AuthBackend, token: Option<&str>) -> TokenValidationResponse {
    let valid = token.is_some_and(|token| auth.validate_token(token).is_ok());
    TokenValidationResponse {
        valid,
        message: if valid { "Valid Token" } else { "Invalid Token" }.to_string(),
    }
}
