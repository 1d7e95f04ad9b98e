//! In-memory account store
//!
//! Implements both `UserStore` and `CredentialStore` over one table set so
//! that account creation, email changes, and deletes stay consistent
//! across users and credentials, the way the database keeps them.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use carepoint_auth::Role;
use carepoint_common::RepositoryError;
use chrono::Utc;
use uuid::Uuid;

use super::{CredentialStore, RepositoryResult, UserStore};
use crate::domain::entities::{Credential, User};

#[derive(Default)]
struct AccountTables {
    users: HashMap<Uuid, User>,
    /// Keyed by owning user id
    credentials: HashMap<Uuid, Credential>,
}

impl AccountTables {
    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|user| user.email == email && Some(user.id) != except)
    }

    fn sorted(mut users: Vec<User>) -> Vec<User> {
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        users
    }
}

#[derive(Default)]
pub struct InMemoryAccountStore {
    tables: Mutex<AccountTables>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, AccountTables>> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("account store lock poisoned".to_string()))
    }

    pub fn user_count(&self) -> usize {
        self.lock().map(|tables| tables.users.len()).unwrap_or(0)
    }

    pub fn credential_count(&self) -> usize {
        self.lock()
            .map(|tables| tables.credentials.len())
            .unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryAccountStore {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn list_all(&self) -> RepositoryResult<Vec<User>> {
        let users = self.lock()?.users.values().cloned().collect();
        Ok(AccountTables::sorted(users))
    }

    async fn list_by_role(&self, role: Role) -> RepositoryResult<Vec<User>> {
        let users = self
            .lock()?
            .users
            .values()
            .filter(|user| user.role == role)
            .cloned()
            .collect();
        Ok(AccountTables::sorted(users))
    }

    async fn update(&self, user: &User) -> RepositoryResult<User> {
        let mut tables = self.lock()?;

        if !tables.users.contains_key(&user.id) {
            return Err(RepositoryError::NotFound);
        }
        if tables.email_taken(&user.email, Some(user.id)) {
            return Err(RepositoryError::AlreadyExists);
        }

        let mut updated = user.clone();
        updated.updated_at = Utc::now();
        tables.users.insert(updated.id, updated.clone());
        if let Some(credential) = tables.credentials.get_mut(&updated.id) {
            credential.email = updated.email.clone();
        }

        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let mut tables = self.lock()?;
        if tables.users.remove(&id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        tables.credentials.remove(&id);
        Ok(())
    }
}

#[async_trait::async_trait]
impl CredentialStore for InMemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Credential>> {
        Ok(self
            .lock()?
            .credentials
            .values()
            .find(|credential| credential.email == email)
            .cloned())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> RepositoryResult<Option<Credential>> {
        Ok(self.lock()?.credentials.get(&user_id).cloned())
    }

    async fn create_account(
        &self,
        user: &User,
        credential: &Credential,
    ) -> RepositoryResult<User> {
        let mut tables = self.lock()?;

        let credential_email_taken = tables
            .credentials
            .values()
            .any(|existing| existing.email == credential.email);
        if tables.email_taken(&user.email, None)
            || credential_email_taken
            || tables.users.contains_key(&user.id)
        {
            return Err(RepositoryError::AlreadyExists);
        }

        tables.users.insert(user.id, user.clone());
        tables.credentials.insert(credential.user_id, credential.clone());
        Ok(user.clone())
    }

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> RepositoryResult<()> {
        let mut tables = self.lock()?;
        let credential = tables
            .credentials
            .get_mut(&user_id)
            .ok_or(RepositoryError::NotFound)?;
        credential.password_hash = password_hash.to_string();
        Ok(())
    }
}
