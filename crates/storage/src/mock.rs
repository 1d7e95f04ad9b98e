//! Mock Object Storage Implementation
//!
//! Keeps objects in memory for tests and local development. Clones share
//! the same underlying map, so a test can hold a handle and inspect what
//! the application wrote. Failures can be injected per operation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::{ObjectStorage, StorageError, StoredObject};

#[derive(Debug, Clone, Default)]
pub struct MockObjectStorage {
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
    fail_puts: Arc<AtomicBool>,
    fail_deletes: Arc<AtomicBool>,
    put_count: Arc<AtomicUsize>,
    delete_count: Arc<AtomicUsize>,
}

impl MockObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `put` fail
    pub fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `delete` fail
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects
            .lock()
            .map(|objects| objects.contains_key(key))
            .unwrap_or(false)
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().map(|objects| objects.len()).unwrap_or(0)
    }

    /// Number of `put` calls attempted, failed ones included
    pub fn put_count(&self) -> usize {
        self.put_count.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.delete_count.load(Ordering::SeqCst)
    }

    fn poisoned() -> StorageError {
        StorageError::Backend("mock storage lock poisoned".to_string())
    }
}

#[async_trait::async_trait]
impl ObjectStorage for MockObjectStorage {
    async fn put(
        &self,
        key: &str,
        content: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        self.put_count.fetch_add(1, Ordering::SeqCst);

        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StorageError::Backend(format!(
                "Simulated failure storing {}",
                key
            )));
        }

        tracing::debug!(key = %key, size = content.len(), "Mock object stored");
        self.objects.lock().map_err(|_| Self::poisoned())?.insert(
            key.to_string(),
            StoredObject {
                content,
                content_type: content_type.map(str::to_string),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<StoredObject, StorageError> {
        self.objects
            .lock()
            .map_err(|_| Self::poisoned())?
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.delete_count.fetch_add(1, Ordering::SeqCst);

        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend(format!(
                "Simulated failure deleting {}",
                key
            )));
        }

        self.objects
            .lock()
            .map_err(|_| Self::poisoned())?
            .remove(key);
        Ok(())
    }

    fn service_name(&self) -> &'static str {
        "mock"
    }
}
