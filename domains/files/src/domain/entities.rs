//! Domain entities for the Files domain

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata for one stored patient file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FileRecord {
    pub id: Uuid,
    /// Patient the file belongs to
    pub owner_user_id: Uuid,
    pub category: String,
    pub file_name: String,
    /// Object storage key; never derived from the file name
    pub blob_key: String,
    pub content_type: String,
    pub size_bytes: i64,
    /// Last clinician to upload or edit the file
    pub uploaded_by_user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FileRecord {
    pub fn new(
        owner_user_id: Uuid,
        category: String,
        file_name: String,
        content_type: String,
        size_bytes: i64,
        uploaded_by_user_id: Uuid,
    ) -> Self {
        let id = Uuid::new_v4();
        let now = Utc::now();
        Self {
            id,
            owner_user_id,
            category,
            file_name,
            blob_key: blob_key_for(owner_user_id, id),
            content_type,
            size_bytes,
            uploaded_by_user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Blob key layout: `patients/{patient_id}/{file_id}`
pub fn blob_key_for(patient_id: Uuid, file_id: Uuid) -> String {
    format!("patients/{}/{}", patient_id, file_id)
}

/// File metadata as returned to clients; the blob key stays internal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResponse {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub category: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub uploaded_by_user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FileRecord> for FileResponse {
    fn from(file: FileRecord) -> Self {
        Self {
            id: file.id,
            owner_user_id: file.owner_user_id,
            category: file.category,
            file_name: file.file_name,
            content_type: file.content_type,
            size_bytes: file.size_bytes,
            uploaded_by_user_id: file.uploaded_by_user_id,
            created_at: file.created_at,
            updated_at: file.updated_at,
        }
    }
}
