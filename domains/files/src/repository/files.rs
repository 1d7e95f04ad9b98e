//! PostgreSQL file metadata store

use carepoint_common::RepositoryError;
use sqlx::PgPool;
use uuid::Uuid;

use super::{FileStore, RepositoryResult};
use crate::domain::entities::FileRecord;

/// All columns in the files table, used for SELECT and RETURNING clauses.
const FILE_COLUMNS: &str = "\
    id, owner_user_id, category, file_name, blob_key, content_type, \
    size_bytes, uploaded_by_user_id, created_at, updated_at";

#[derive(Clone)]
pub struct PgFileStore {
    pool: PgPool,
}

impl PgFileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FileStore for PgFileStore {
    async fn create(&self, file: &FileRecord) -> RepositoryResult<FileRecord> {
        let query = format!(
            "INSERT INTO files \
                (id, owner_user_id, category, file_name, blob_key, content_type, \
                 size_bytes, uploaded_by_user_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {FILE_COLUMNS}"
        );
        let created = sqlx::query_as::<_, FileRecord>(&query)
            .bind(file.id)
            .bind(file.owner_user_id)
            .bind(&file.category)
            .bind(&file.file_name)
            .bind(&file.blob_key)
            .bind(&file.content_type)
            .bind(file.size_bytes)
            .bind(file.uploaded_by_user_id)
            .bind(file.created_at)
            .bind(file.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<FileRecord>> {
        let query = format!("SELECT {FILE_COLUMNS} FROM files WHERE id = $1");
        let file = sqlx::query_as::<_, FileRecord>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(file)
    }

    async fn list_for_owner(&self, owner_user_id: Uuid) -> RepositoryResult<Vec<FileRecord>> {
        let query = format!(
            "SELECT {FILE_COLUMNS} FROM files \
             WHERE owner_user_id = $1 \
             ORDER BY created_at DESC, id"
        );
        let files = sqlx::query_as::<_, FileRecord>(&query)
            .bind(owner_user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(files)
    }

    async fn update_details(
        &self,
        id: Uuid,
        file_name: Option<&str>,
        category: Option<&str>,
        uploaded_by_user_id: Uuid,
    ) -> RepositoryResult<FileRecord> {
        let query = format!(
            "UPDATE files SET \
                file_name = COALESCE($2, file_name), \
                category = COALESCE($3, category), \
                uploaded_by_user_id = $4, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {FILE_COLUMNS}"
        );
        sqlx::query_as::<_, FileRecord>(&query)
            .bind(id)
            .bind(file_name)
            .bind(category)
            .bind(uploaded_by_user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
