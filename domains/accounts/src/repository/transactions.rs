//! Transactional free functions for the Accounts domain

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use super::users::USER_COLUMNS;
use crate::domain::entities::{Credential, User};

/// Insert a user within an existing transaction.
pub async fn create_user_tx(
    transaction: &mut Transaction<'_, Postgres>,
    user: &User,
) -> std::result::Result<User, sqlx::Error> {
    let query = format!(
        "INSERT INTO users \
            (id, first_name, last_name, address, gender, date_of_birth, \
             mobile_number, email, role, active, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
         RETURNING {USER_COLUMNS}"
    );
    let created = sqlx::query_as::<_, User>(&query)
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
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&mut **transaction)
        .await?;
    Ok(created)
}

/// Insert a credential within an existing transaction.
pub async fn create_credential_tx(
    transaction: &mut Transaction<'_, Postgres>,
    credential: &Credential,
) -> std::result::Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO credentials (id, email, password_hash, user_id) VALUES ($1, $2, $3, $4)",
    )
    .bind(credential.id)
    .bind(&credential.email)
    .bind(&credential.password_hash)
    .bind(credential.user_id)
    .execute(&mut **transaction)
    .await?;
    Ok(())
}

/// Keep the login email in step with the profile email.
pub async fn update_credential_email_tx(
    transaction: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    email: &str,
) -> std::result::Result<(), sqlx::Error> {
    sqlx::query("UPDATE credentials SET email = $2 WHERE user_id = $1")
        .bind(user_id)
        .bind(email)
        .execute(&mut **transaction)
        .await?;
    Ok(())
}
