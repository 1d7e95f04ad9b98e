//! AWS S3 Object Storage Implementation
//!
//! Stores patient file bytes in a single bucket, with support for the
//! LocalStack testing environment.

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::config::SharedCredentialsProvider;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;

use crate::{ObjectStorage, StorageConfig, StorageError, StoredObject};

/// AWS S3 object storage implementation
pub struct S3ObjectStorage {
    client: S3Client,
    bucket: String,
}

impl S3ObjectStorage {
    /// Create a new S3 object storage client
    pub async fn new(config: StorageConfig) -> Result<Self, StorageError> {
        let bucket = config.bucket.clone().ok_or_else(|| {
            StorageError::Configuration("S3 bucket name is not configured".to_string())
        })?;

        let region = config
            .aws_region
            .clone()
            .unwrap_or_else(|| "us-east-1".to_string());

        let (aws_config, force_path_style) = match config.aws_endpoint_url.as_ref() {
            Some(endpoint_url) => {
                tracing::info!("Using custom AWS endpoint: {}", endpoint_url);

                // For LocalStack, use dummy credentials
                let credentials = Credentials::new(
                    "test-access-key",
                    "test-secret-key",
                    None,
                    None,
                    "localstack-storage-provider",
                );

                let aws_config = aws_config::defaults(BehaviorVersion::latest())
                    .region(Region::new(region))
                    .endpoint_url(endpoint_url)
                    .credentials_provider(SharedCredentialsProvider::new(credentials))
                    .load()
                    .await;
                (aws_config, true)
            }
            None => {
                let aws_config = aws_config::defaults(BehaviorVersion::latest())
                    .region(Region::new(region))
                    .load()
                    .await;
                (aws_config, false)
            }
        };

        let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
            .force_path_style(force_path_style)
            .build();
        let client = S3Client::from_conf(s3_config);

        // Test connection
        if let Err(e) = client.head_bucket().bucket(&bucket).send().await {
            tracing::warn!(
                bucket = %bucket,
                "Failed to reach S3 bucket (may be expected before LocalStack is ready): {}",
                e
            );
        } else {
            tracing::info!(bucket = %bucket, "Successfully connected to AWS S3");
        }

        Ok(Self { client, bucket })
    }
}

#[async_trait::async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn put(
        &self,
        key: &str,
        content: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let size = content.len();
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(content));

        if let Some(content_type) = content_type {
            request = request.content_type(content_type);
        }

        request.send().await.map_err(|e| {
            tracing::error!(key = %key, error = %e, "S3 put_object failed");
            StorageError::Backend(format!(
                "Failed to store object s3://{}/{}",
                self.bucket, key
            ))
        })?;

        tracing::debug!(key = %key, size, "Stored object in S3");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<StoredObject, StorageError> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    return StorageError::NotFound(key.to_string());
                }
                tracing::error!(key = %key, error = %e, "S3 get_object failed");
                StorageError::Backend(format!(
                    "Failed to read object s3://{}/{}",
                    self.bucket, key
                ))
            })?;

        let content_type = response.content_type().map(str::to_string);
        let content = response
            .body
            .collect()
            .await
            .map_err(|e| {
                tracing::error!(key = %key, error = %e, "Failed to read S3 object body");
                StorageError::Backend("Failed to read S3 object body".to_string())
            })?
            .into_bytes()
            .to_vec();

        Ok(StoredObject {
            content,
            content_type,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(key = %key, error = %e, "S3 delete_object failed");
                StorageError::Backend(format!(
                    "Failed to delete object s3://{}/{}",
                    self.bucket, key
                ))
            })?;

        Ok(())
    }

    fn service_name(&self) -> &'static str {
        "aws-s3"
    }
}
