//! User data API handlers
//!
//! - GET /v1/account - Current user's profile
//! - GET /v1/users - All users (admin)
//! - PATCH /v1/users/{id} - Update a profile
//! - DELETE /v1/users/{id} - Delete a user (admin)
//! - GET /v1/patients - All patients (clinical staff)
//! - GET /v1/doctors - Doctor directory

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use carepoint_auth::{AdminUser, AuthUser, Role};
use carepoint_common::{Error, RepositoryError, Result, ValidatedJson};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::AccountsState;
use crate::domain::entities::{Gender, User};
use crate::domain::validation::check_mobile_number;

/// Response for user profile operations
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub address: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub mobile_number: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            address: user.address,
            gender: user.gender,
            date_of_birth: user.date_of_birth,
            mobile_number: user.mobile_number,
            email: user.email,
            role: user.role,
            active: user.active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Doctor directory entry; contact details stay private
#[derive(Debug, Serialize, Deserialize)]
pub struct DoctorSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for DoctorSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// Request for updating a user. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub mobile_number: Option<String>,
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    /// Admin only
    pub role: Option<Role>,
    /// Admin only
    pub active: Option<bool>,
}

impl UpdateUserRequest {
    fn changes_privileges(&self) -> bool {
        self.role.is_some() || self.active.is_some()
    }

    fn apply(self, user: &mut User) {
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
        if let Some(address) = self.address {
            user.address = Some(address);
        }
        if let Some(gender) = self.gender {
            user.gender = Some(gender);
        }
        if let Some(date_of_birth) = self.date_of_birth {
            user.date_of_birth = Some(date_of_birth);
        }
        if let Some(mobile_number) = self.mobile_number {
            user.mobile_number = mobile_number;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(active) = self.active {
            user.active = active;
        }
    }
}

fn user_not_found() -> Error {
    Error::NotFound("User not found".to_string())
}

/// Get the caller's profile
pub async fn get_current_user(
    AuthUser(auth_context): AuthUser,
    State(state): State<AccountsState>,
) -> Result<Json<UserResponse>> {
    let user = state
        .repos
        .users
        .find_by_id(auth_context.user_id)
        .await?
        .ok_or_else(user_not_found)?;

    Ok(Json(user.into()))
}

/// List all users
pub async fn list_users(
    AdminUser(_): AdminUser,
    State(state): State<AccountsState>,
) -> Result<Json<Vec<UserResponse>>> {
    let users = state.repos.users.list_all().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// List all patients
pub async fn list_patients(
    AuthUser(auth_context): AuthUser,
    State(state): State<AccountsState>,
) -> Result<Json<Vec<UserResponse>>> {
    if !auth_context.role.is_clinical_staff() {
        return Err(Error::Authorization(
            "Only clinic staff can list patients".to_string(),
        ));
    }

    let patients = state.repos.users.list_by_role(Role::Patient).await?;
    Ok(Json(patients.into_iter().map(UserResponse::from).collect()))
}

/// List doctors with their names only
pub async fn list_doctors(
    AuthUser(_): AuthUser,
    State(state): State<AccountsState>,
) -> Result<Json<Vec<DoctorSummary>>> {
    let doctors = state.repos.users.list_by_role(Role::Doctor).await?;
    if doctors.is_empty() {
        return Err(Error::NotFound("No doctors found".to_string()));
    }

    Ok(Json(doctors.into_iter().map(DoctorSummary::from).collect()))
}

/// Update a profile. Users edit themselves; admins edit anyone and are the
/// only ones who may change role or active status.
pub async fn update_user(
    AuthUser(auth_context): AuthUser,
    State(state): State<AccountsState>,
    Path(user_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>> {
    if !auth_context.can_act_on_user(user_id) {
        return Err(Error::Authorization(
            "You can only edit your own profile".to_string(),
        ));
    }
    if request.changes_privileges() && !auth_context.is_admin() {
        return Err(Error::Authorization(
            "Only Admin users can change role or active status".to_string(),
        ));
    }
    if let Some(mobile_number) = &request.mobile_number {
        check_mobile_number(mobile_number)?;
    }

    let mut user = state
        .repos
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(user_not_found)?;
    request.apply(&mut user);

    let updated = state.repos.users.update(&user).await.map_err(|e| match e {
        RepositoryError::NotFound => user_not_found(),
        RepositoryError::AlreadyExists => Error::Conflict("Email already exists".to_string()),
        other => other.into(),
    })?;

    tracing::info!(user_id = %updated.id, actor = %auth_context.user_id, "User updated");
    Ok(Json(updated.into()))
}

/// Delete a user and their credential
pub async fn delete_user(
    AdminUser(auth_context): AdminUser,
    State(state): State<AccountsState>,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode> {
    state.repos.users.delete(user_id).await.map_err(|e| match e {
        RepositoryError::NotFound => user_not_found(),
        other => other.into(),
    })?;

    tracing::info!(user_id = %user_id, actor = %auth_context.user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
