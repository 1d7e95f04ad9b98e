//! Repository implementations for the Files domain

pub mod files;
pub mod memory;

use carepoint_common::RepositoryError;
use uuid::Uuid;

use crate::domain::entities::FileRecord;

pub use files::PgFileStore;
pub use memory::InMemoryFileStore;

pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// File metadata persistence
#[async_trait::async_trait]
pub trait FileStore: Send + Sync {
    async fn create(&self, file: &FileRecord) -> RepositoryResult<FileRecord>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<FileRecord>>;

    /// Files owned by one patient, newest first
    async fn list_for_owner(&self, owner_user_id: Uuid) -> RepositoryResult<Vec<FileRecord>>;

    /// Rename or recategorise a file. `NotFound` if it does not exist.
    async fn update_details(
        &self,
        id: Uuid,
        file_name: Option<&str>,
        category: Option<&str>,
        uploaded_by_user_id: Uuid,
    ) -> RepositoryResult<FileRecord>;

    /// `NotFound` if the file does not exist
    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;
}
