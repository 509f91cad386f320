//! Object storage for blog media
//!
//! Wraps the AWS S3 client with the bucket configuration and the two
//! operations the media relay needs: storing an image and removing it.
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;
use std::sync::Arc;

pub mod config;
pub mod operations;

pub use config::S3Config;
pub use operations::{S3Error, S3Operations};

#[derive(Clone)]
pub struct S3Client {
    client: Arc<Client>,
    config: S3Config,
}

impl S3Client {
    /// Build a client for `config`; credentials come from the default AWS provider chain
    pub async fn with_config(config: S3Config) -> Self {
        let shared = aws_config::from_env()
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(config.path_style)
            .build();

        Self {
            client: Arc::new(Client::from_conf(s3_config)),
            config,
        }
    }

    pub fn config(&self) -> &S3Config {
        &self.config
    }

    /// Operations bound to this client's bucket
    pub fn operations(&self) -> S3Operations {
        S3Operations::new(self.client.clone(), self.config.clone())
    }

    /// HEAD the configured bucket
    pub async fn health_check(&self) -> Result<(), S3Error> {
        self.client
            .head_bucket()
            .bucket(&self.config.bucket)
            .send()
            .await
            .map_err(|e| S3Error::Bucket {
                bucket: self.config.bucket.clone(),
                message: DisplayErrorContext(e).to_string(),
            })?;

        Ok(())
    }
}
