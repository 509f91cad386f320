/// S3 configuration for blog media
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// S3 bucket name
    pub bucket: String,
    /// AWS region
    pub region: String,
    /// Base URL for public access (CDN domain)
    pub base_url: String,
    /// Whether to use path-style URLs (needed for MinIO and similar)
    pub path_style: bool,
    /// Key prefix under which uploaded images are stored
    pub key_prefix: String,
}

impl S3Config {
    /// Load S3 configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load S3 configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            bucket: lookup("S3_BUCKET").unwrap_or_else(|| "blog-media".to_string()),
            region: lookup("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            base_url: lookup("S3_BASE_URL")
                .unwrap_or_else(|| "https://s3.amazonaws.com".to_string()),
            path_style: lookup("S3_PATH_STYLE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            key_prefix: lookup("S3_KEY_PREFIX").unwrap_or_else(|| "blog-images".to_string()),
        }
    }

    /// Build the object key for a new upload
    pub fn object_key(&self, id: &str, extension: &str) -> String {
        let prefix = self.key_prefix.trim_matches('/');
        if prefix.is_empty() {
            format!("{}.{}", id, extension)
        } else {
            format!("{}/{}.{}", prefix, id, extension)
        }
    }

    /// Get public URL for object
    pub fn cdn_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}
