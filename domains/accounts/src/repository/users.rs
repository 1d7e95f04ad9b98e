//! PostgreSQL user store

use carepoint_auth::Role;
use carepoint_common::RepositoryError;
use sqlx::PgPool;
use uuid::Uuid;

use super::transactions::update_credential_email_tx;
use super::{RepositoryResult, UserStore};
use crate::domain::entities::User;

/// All columns in the users table, used for SELECT and RETURNING clauses.
pub(crate) const USER_COLUMNS: &str = "\
    id, first_name, last_name, address, gender, date_of_birth, \
    mobile_number, email, role, active, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn list_all(&self) -> RepositoryResult<Vec<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id");
        let users = sqlx::query_as::<_, User>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    async fn list_by_role(&self, role: Role) -> RepositoryResult<Vec<User>> {
        let query =
            format!("SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY created_at, id");
        let users = sqlx::query_as::<_, User>(&query)
            .bind(role)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    async fn update(&self, user: &User) -> RepositoryResult<User> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            "UPDATE users SET \
                first_name = $2, last_name = $3, address = $4, gender = $5, \
                date_of_birth = $6, mobile_number = $7, email = $8, role = $9, \
                active = $10, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, User>(&query)
            .bind(user.id)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.address)
            .bind(user.gender)
            .bind(user.date_of_birth)
            .bind(&user.mobile_number)
            .bind(&user.email)
            .bind(user.role)
            .bind(user.active)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        update_credential_email_tx(&mut tx, updated.id, &updated.email).await?;
        tx.commit().await?;

        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        // credentials rows go with the user via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
