/// Media relay: forwards image bytes to object storage
use crate::error::{AppError, Result};
use async_trait::async_trait;
use s3_utils::S3Operations;
use serde::Serialize;
use uuid::Uuid;

/// An image received from a client, not yet stored
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub data: Vec<u8>,
    pub content_type: Option<mime::Mime>,
}

/// A stored image: public URL plus the id used to delete it later
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UploadedImage {
    pub url: String,
    #[serde(rename = "imageId")]
    pub remote_id: String,
}

impl ImageUpload {
    /// Content type of the upload; only raster images are accepted
    pub fn image_type(&self) -> Result<mime::Mime> {
        if self.data.is_empty() {
            return Err(AppError::Validation("Image file is empty".to_string()));
        }

        let content_type = self
            .content_type
            .clone()
            .unwrap_or(mime::APPLICATION_OCTET_STREAM);

        if content_type.type_() != mime::IMAGE
            || !ALLOWED_SUBTYPES.contains(&content_type.subtype().as_str())
        {
            return Err(AppError::Validation(format!(
                "Unsupported file type: {}",
                content_type.essence_str()
            )));
        }

        Ok(content_type)
    }
}

/// Image subtypes served back from the public bucket. Vector formats are
/// excluded since they can carry script.
const ALLOWED_SUBTYPES: &[&str] = &["png", "jpeg", "gif", "webp"];

/// File extension for an accepted image content type
pub fn extension_for(content_type: &mime::Mime) -> &str {
    match content_type.subtype().as_str() {
        "jpeg" => "jpg",
        other => other,
    }
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store an image and return its public reference
    async fn upload(&self, image: ImageUpload) -> Result<UploadedImage>;

    /// Remove a previously stored image
    async fn delete(&self, remote_id: &str) -> Result<()>;
}

/// [`MediaStore`] backed by S3
pub struct S3MediaStore {
    ops: S3Operations,
}

impl S3MediaStore {
    pub fn new(ops: S3Operations) -> Self {
        Self { ops }
    }
}

#[async_trait]
impl MediaStore for S3MediaStore {
    async fn upload(&self, image: ImageUpload) -> Result<UploadedImage> {
        let content_type = image.image_type()?;
        let key = self
            .ops
            .config()
            .object_key(&Uuid::new_v4().to_string(), extension_for(&content_type));

        let url = self
            .ops
            .upload_file(&key, image.data, content_type.essence_str())
            .await
            .map_err(|e| {
                tracing::error!(key = %key, error = %e, "image upload failed");
                AppError::Upload(e.to_string())
            })?;

        Ok(UploadedImage {
            url,
            remote_id: key,
        })
    }

    async fn delete(&self, remote_id: &str) -> Result<()> {
        self.ops.delete_file(remote_id).await.map_err(|e| {
            tracing::error!(key = %remote_id, error = %e, "image deletion failed");
            AppError::Delete(e.to_string())
        })
    }
}

/// Delete remote images, logging failures instead of returning them
pub async fn delete_best_effort(store: &dyn MediaStore, remote_ids: &[String]) {
    for remote_id in remote_ids {
        if let Err(e) = store.delete(remote_id).await {
            tracing::warn!(remote_id = %remote_id, error = %e, "best-effort image cleanup failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: Option<&str>, data: &[u8]) -> ImageUpload {
        ImageUpload {
            data: data.to_vec(),
            content_type: content_type.map(|ct| ct.parse().unwrap()),
        }
    }

    #[test]
    fn test_image_types_accepted() {
        let ct = upload(Some("image/png"), b"png").image_type().unwrap();
        assert_eq!(extension_for(&ct), "png");

        let ct = upload(Some("image/jpeg"), b"jpg").image_type().unwrap();
        assert_eq!(extension_for(&ct), "jpg");
    }

    #[test]
    fn test_non_images_rejected() {
        assert!(upload(Some("text/plain"), b"hello").image_type().is_err());
        assert!(upload(None, b"bytes").image_type().is_err());
        assert!(upload(Some("image/png"), b"").image_type().is_err());
    }

    #[test]
    fn test_only_raster_images_accepted() {
        for ct in ["image/gif", "image/webp"] {
            assert!(upload(Some(ct), b"data").image_type().is_ok(), "{}", ct);
        }
        for ct in ["image/svg+xml", "image/x-icon", "image/tiff"] {
            assert!(upload(Some(ct), b"<svg/>").image_type().is_err(), "{}", ct);
        }
    }

    #[test]
    fn test_uploaded_image_serialization() {
        let json = serde_json::to_value(UploadedImage {
            url: "https://cdn/x.png".into(),
            remote_id: "blog-images/x.png".into(),
        })
        .unwrap();
        assert_eq!(json["imageId"], "blog-images/x.png");
        assert_eq!(json["url"], "https://cdn/x.png");
    }
}
