//! In-memory file metadata store

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use carepoint_common::RepositoryError;
use chrono::Utc;
use uuid::Uuid;

use super::{FileStore, RepositoryResult};
use crate::domain::entities::FileRecord;

#[derive(Default)]
pub struct InMemoryFileStore {
    files: Mutex<HashMap<Uuid, FileRecord>>,
    fail_creates: AtomicBool,
}

impl InMemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `create` calls fail, to exercise upload rollback
    pub fn set_fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().map(|files| files.len()).unwrap_or_default()
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, HashMap<Uuid, FileRecord>>> {
        self.files
            .lock()
            .map_err(|_| RepositoryError::Unavailable("file store lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl FileStore for InMemoryFileStore {
    async fn create(&self, file: &FileRecord) -> RepositoryResult<FileRecord> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "file store rejected the write".to_string(),
            ));
        }

        let mut files = self.lock()?;
        if files.contains_key(&file.id) {
            return Err(RepositoryError::AlreadyExists);
        }
        files.insert(file.id, file.clone());
        Ok(file.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<FileRecord>> {
        Ok(self.lock()?.get(&id).cloned())
    }

    async fn list_for_owner(&self, owner_user_id: Uuid) -> RepositoryResult<Vec<FileRecord>> {
        let mut owned: Vec<FileRecord> = self
            .lock()?
            .values()
            .filter(|file| file.owner_user_id == owner_user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(owned)
    }

    async fn update_details(
        &self,
        id: Uuid,
        file_name: Option<&str>,
        category: Option<&str>,
        uploaded_by_user_id: Uuid,
    ) -> RepositoryResult<FileRecord> {
        let mut files = self.lock()?;
        let stored = files.get_mut(&id).ok_or(RepositoryError::NotFound)?;

        if let Some(file_name) = file_name {
            stored.file_name = file_name.to_string();
        }
        if let Some(category) = category {
            stored.category = category.to_string();
        }
        stored.uploaded_by_user_id = uploaded_by_user_id;
        stored.updated_at = Utc::now();

        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        self.lock()?
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}
