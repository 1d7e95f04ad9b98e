//! CarePoint Object Storage
//!
//! Stores the bytes of uploaded patient files, with support for:
//! - AWS S3 for production storage
//! - In-memory mock storage for testing and development
//! - LocalStack integration for local E2E testing

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod mock;
pub mod s3;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage configuration error: {0}")]
    Configuration(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Object storage error: {0}")]
    Backend(String),
}

/// Object fetched back from storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub content: Vec<u8>,
    pub content_type: Option<String>,
}

/// Object storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider (s3, mock)
    pub provider: String,
    /// Bucket holding patient files
    pub bucket: Option<String>,
    /// AWS region for S3
    pub aws_region: Option<String>,
    /// AWS endpoint URL (for LocalStack)
    pub aws_endpoint_url: Option<String>,
}

impl StorageConfig {
    /// Create storage config from environment variables
    pub fn from_env() -> Result<Self, StorageError> {
        dotenvy::dotenv().ok();

        let provider = std::env::var("STORAGE_PROVIDER").unwrap_or_else(|_| "mock".to_string());
        let bucket = std::env::var("S3_BUCKET")
            .ok()
            .filter(|bucket| !bucket.trim().is_empty());

        if matches!(provider.as_str(), "s3" | "aws-s3") && bucket.is_none() {
            return Err(StorageError::Configuration(
                "S3_BUCKET is required when STORAGE_PROVIDER=s3".to_string(),
            ));
        }

        Ok(Self {
            provider,
            bucket,
            aws_region: std::env::var("AWS_REGION").ok(),
            aws_endpoint_url: std::env::var("AWS_ENDPOINT_URL").ok(),
        })
    }

    pub fn mock() -> Self {
        Self {
            provider: "mock".to_string(),
            bucket: None,
            aws_region: None,
            aws_endpoint_url: None,
        }
    }
}

/// Object storage trait for different implementations
#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `content` under `key`, replacing any existing object
    async fn put(
        &self,
        key: &str,
        content: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), StorageError>;

    /// Fetch the object stored under `key`
    async fn get(&self, key: &str) -> Result<StoredObject, StorageError>;

    /// Remove the object stored under `key`; removing a missing key succeeds
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Get service name for logging/debugging
    fn service_name(&self) -> &'static str;
}

/// Object storage factory
pub struct ObjectStorageFactory;

impl ObjectStorageFactory {
    /// Create object storage based on configuration
    pub async fn create(config: StorageConfig) -> Result<Box<dyn ObjectStorage>, StorageError> {
        match config.provider.as_str() {
            "s3" | "aws-s3" => {
                tracing::info!("Creating AWS S3 object storage");
                let s3_storage = s3::S3ObjectStorage::new(config).await?;
                Ok(Box::new(s3_storage))
            }
            "mock" => {
                tracing::warn!("Creating mock object storage; files are kept in memory only");
                Ok(Box::new(mock::MockObjectStorage::new()))
            }
            provider => Err(StorageError::Configuration(format!(
                "Unknown storage provider: {}. Supported providers: s3, mock",
                provider
            ))),
        }
    }
}
