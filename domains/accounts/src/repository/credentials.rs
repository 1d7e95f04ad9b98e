//! PostgreSQL credential store

use carepoint_common::RepositoryError;
use sqlx::PgPool;
use uuid::Uuid;

use super::transactions::{create_credential_tx, create_user_tx};
use super::{CredentialStore, RepositoryResult};
use crate::domain::entities::{Credential, User};

const CREDENTIAL_COLUMNS: &str = "id, email, password_hash, user_id";

#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Credential>> {
        let query = format!("SELECT {CREDENTIAL_COLUMNS} FROM credentials WHERE email = $1");
        let credential = sqlx::query_as::<_, Credential>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(credential)
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> RepositoryResult<Option<Credential>> {
        let query = format!("SELECT {CREDENTIAL_COLUMNS} FROM credentials WHERE user_id = $1");
        let credential = sqlx::query_as::<_, Credential>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(credential)
    }

    async fn create_account(
        &self,
        user: &User,
        credential: &Credential,
    ) -> RepositoryResult<User> {
        let mut tx = self.pool.begin().await?;

        let created = create_user_tx(&mut tx, user).await?;
        create_credential_tx(&mut tx, credential).await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> RepositoryResult<()> {
        let result = sqlx::query("UPDATE credentials SET password_hash = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
