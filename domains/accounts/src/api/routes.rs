//! Route definitions for Accounts domain API

use axum::{
    routing::{get, patch, post},
    Router,
};

use super::handlers::{auth, users};
use super::middleware::AccountsState;

/// Create login, registration, and session routes
fn auth_routes() -> Router<AccountsState> {
    Router::new()
        .route("/v1/auth/login", post(auth::login))
        .route("/v1/auth/register", post(auth::register))
        .route("/v1/auth/validate", get(auth::validate_token))
        .route("/v1/auth/password", post(auth::change_password))
}

/// Create user data routes
fn user_routes() -> Router<AccountsState> {
    Router::new()
        .route("/v1/account", get(users::get_current_user))
        .route("/v1/users", get(users::list_users))
        .route(
            "/v1/users/{id}",
            patch(users::update_user).delete(users::delete_user),
        )
        .route("/v1/patients", get(users::list_patients))
        .route("/v1/doctors", get(users::list_doctors))
}

/// Create all Accounts domain routes
pub fn routes() -> Router<AccountsState> {
    Router::new().merge(auth_routes()).merge(user_routes())
}
