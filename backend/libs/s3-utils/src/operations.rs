/// Object operations used by the media relay
use crate::config::S3Config;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum S3Error {
    #[error("failed to store object {key}: {message}")]
    Put { key: String, message: String },

    #[error("failed to remove object {key}: {message}")]
    Delete { key: String, message: String },

    #[error("bucket {bucket} is not reachable: {message}")]
    Bucket { bucket: String, message: String },
}

impl S3Error {
    /// Object key the failed request targeted, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            S3Error::Put { key, .. } | S3Error::Delete { key, .. } => Some(key),
            S3Error::Bucket { .. } => None,
        }
    }
}

#[derive(Clone)]
pub struct S3Operations {
    client: Arc<Client>,
    config: S3Config,
}

impl S3Operations {
    pub fn new(client: Arc<Client>, config: S3Config) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &S3Config {
        &self.config
    }

    /// Store `body` under `key` and return its public URL
    pub async fn upload_file(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<String, S3Error> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| S3Error::Put {
                key: key.to_string(),
                message: DisplayErrorContext(e).to_string(),
            })?;

        tracing::debug!(key = %key, size, content_type, "stored object");
        Ok(self.config.cdn_url(key))
    }

    /// Remove the object at `key`. Removing a missing key succeeds.
    pub async fn delete_file(&self, key: &str) -> Result<(), S3Error> {
        self.client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| S3Error::Delete {
                key: key.to_string(),
                message: DisplayErrorContext(e).to_string(),
            })?;

        tracing::debug!(key = %key, "removed object");
        Ok(())
    }
}
