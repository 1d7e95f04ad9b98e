//! Repository implementations for the Accounts domain
//!
//! Each store is a trait with a PostgreSQL implementation and an in-memory
//! implementation used by tests and by `STORE_BACKEND=memory` runs.

pub mod credentials;
pub mod memory;
pub mod transactions;
pub mod users;

use std::sync::Arc;

use carepoint_auth::Role;
use carepoint_common::RepositoryError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{Credential, User};

pub use credentials::PgCredentialStore;
pub use memory::InMemoryAccountStore;
pub use transactions::{create_credential_tx, create_user_tx, update_credential_email_tx};
pub use users::PgUserStore;

pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// User profile persistence
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>>;

    /// Exact, case-sensitive email match
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    async fn list_all(&self) -> RepositoryResult<Vec<User>>;

    async fn list_by_role(&self, role: Role) -> RepositoryResult<Vec<User>>;

    /// Persist profile changes. The credential email follows the user email.
    ///
    /// `NotFound` if the user does not exist, `AlreadyExists` if the new
    /// email belongs to another user.
    async fn update(&self, user: &User) -> RepositoryResult<User>;

    /// Delete a user together with their credential
    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;
}

/// Credential persistence
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Credential>>;

    async fn find_by_user_id(&self, user_id: Uuid) -> RepositoryResult<Option<Credential>>;

    /// Create the user and its credential as one unit. Either both rows
    /// exist afterwards or neither does; a taken email yields `AlreadyExists`.
    async fn create_account(&self, user: &User, credential: &Credential)
        -> RepositoryResult<User>;

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> RepositoryResult<()>;
}

/// Combined store access for the Accounts domain
#[derive(Clone)]
pub struct AccountsRepositories {
    pub users: Arc<dyn UserStore>,
    pub credentials: Arc<dyn CredentialStore>,
}

impl AccountsRepositories {
    pub fn new(users: Arc<dyn UserStore>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self { users, credentials }
    }

    /// Stores backed by PostgreSQL
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserStore::new(pool.clone())),
            credentials: Arc::new(PgCredentialStore::new(pool)),
        }
    }

    /// Stores backed by a fresh in-memory account table
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryAccountStore::new());
        Self {
            users: store.clone(),
            credentials: store,
        }
    }
}
