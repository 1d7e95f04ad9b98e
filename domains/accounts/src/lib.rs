//! Accounts domain: users, credentials, login, registration, password changes

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::*;

// Re-export repository types
pub use repository::{
    AccountsRepositories, CredentialStore, InMemoryAccountStore, PgCredentialStore, PgUserStore,
    RepositoryResult, UserStore,
};

// Re-export API types
pub use api::routes;
pub use api::AccountsState;
