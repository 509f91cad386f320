/// HTTP handlers for blog-service endpoints
///
/// - Users: signup, verification, login, profiles, follows
/// - Posts: multipart create/update, listing, likes, saves, editor uploads
/// - Comments: top-level comments, replies, edits, likes, tree reads
pub mod comments;
pub mod posts;
pub mod users;

use crate::error::{AppError, Result};
use crate::services::media::ImageUpload;
use actix_multipart::form::bytes::Bytes;
use actix_web::HttpResponse;
use serde::Serialize;

pub use comments::*;
pub use posts::*;
pub use users::*;

/// Success envelope: `{success: true, message, ...payload}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub payload: T,
}

/// Payload for responses that carry only the message
#[derive(Debug, Serialize)]
pub struct Empty {}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(message: impl Into<String>, payload: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            payload,
        }
    }
}

impl ApiResponse<Empty> {
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(message, Empty {})
    }
}

/// Multipart file part converted to an upload, enforcing the per-file size limit
pub(crate) fn image_from_part(part: Bytes, max_bytes: usize) -> Result<ImageUpload> {
    if part.data.len() > max_bytes {
        let name = part.file_name.as_deref().unwrap_or("image");
        return Err(AppError::Validation(format!(
            "{} exceeds the {} byte upload limit",
            name, max_bytes
        )));
    }

    Ok(ImageUpload {
        data: part.data.to_vec(),
        content_type: part.content_type,
    })
}

pub(crate) fn ok<T: Serialize>(message: &str, payload: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::new(message, payload))
}

pub(crate) fn created<T: Serialize>(message: &str, payload: T) -> HttpResponse {
    HttpResponse::Created().json(ApiResponse::new(message, payload))
}
