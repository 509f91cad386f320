/// Post handlers - HTTP endpoints for blog operations
use crate::error::{AppError, Result};
use crate::handlers::{created, image_from_part, ok, ApiResponse};
use crate::middleware::UserId;
use crate::models::{Page, PostContent, PostDetail, PostView};
use crate::services::media::UploadedImage;
use crate::services::posts::{CreatePost, UpdatePost};
use crate::AppState;
use actix_multipart::form::{bytes::Bytes, text::Text, MultipartForm};
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

/// Multipart body shared by create and update
#[derive(MultipartForm)]
pub struct PostForm {
    pub title: Option<Text<String>>,
    pub description: Option<Text<String>>,
    /// Block editor JSON
    pub content: Option<Text<String>>,
    /// JSON array of strings, or a comma separated list
    pub tags: Option<Text<String>>,
    pub draft: Option<Text<String>>,
    /// Thumbnail
    pub image: Option<Bytes>,
    /// Files for image blocks that have no uploaded file yet
    pub images: Vec<Bytes>,
}

#[derive(MultipartForm)]
pub struct ImageForm {
    pub image: Option<Bytes>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub draft: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct BlogPayload<T: Serialize> {
    pub blog: T,
}

#[derive(Debug, Serialize)]
pub struct BlogsPayload {
    pub blogs: Vec<PostView>,
}

#[derive(Debug, Serialize)]
pub struct LikePayload {
    pub liked: bool,
    pub likes_count: i64,
}

#[derive(Debug, Serialize)]
pub struct SavePayload {
    pub saved: bool,
    pub saves_count: i64,
}

#[derive(Debug, Serialize)]
pub struct FilePayload {
    pub file: UploadedImage,
}

/// Create a post from a multipart form
pub async fn create_post(
    state: web::Data<AppState>,
    user_id: UserId,
    form: MultipartForm<PostForm>,
) -> Result<HttpResponse> {
    let form = form.into_inner();
    let max_bytes = state.max_upload_bytes;

    let content = match text(form.content) {
        Some(raw) => PostContent::parse(&raw)?,
        None => {
            return Err(AppError::Validation(
                "Invalid or missing blog content".to_string(),
            ))
        }
    };
    let thumbnail = match form.image {
        Some(part) => image_from_part(part, max_bytes)?,
        None => {
            return Err(AppError::Validation(
                "Thumbnail image is required".to_string(),
            ))
        }
    };
    let tags = match text(form.tags) {
        Some(raw) => parse_tags(&raw)?,
        None => Vec::new(),
    };
    let inline_images = form
        .images
        .into_iter()
        .map(|part| image_from_part(part, max_bytes))
        .collect::<Result<Vec<_>>>()?;

    let input = CreatePost {
        title: text(form.title).unwrap_or_default(),
        description: text(form.description).unwrap_or_default(),
        content,
        tags,
        draft: text(form.draft).map_or(true, |raw| parse_draft(&raw)),
        thumbnail,
        inline_images,
    };

    let blog = state.posts.create(user_id.0, input).await?;
    let message = if blog.draft {
        "Blog Saved as Draft"
    } else {
        "Blog created successfully"
    };
    Ok(created(message, BlogPayload { blog }))
}

/// Published posts, newest first
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    let page = Page::new(query.page, query.limit);
    let result = state.posts.list(page).await?;
    Ok(ok("Blogs fetched successfully", result))
}

pub async fn list_own_posts(
    state: web::Data<AppState>,
    user_id: UserId,
    query: web::Query<OwnerQuery>,
) -> Result<HttpResponse> {
    let blogs = state.posts.list_for_owner(user_id.0, query.draft).await?;
    Ok(ok("Blogs fetched successfully", BlogsPayload { blogs }))
}

pub async fn get_post(
    state: web::Data<AppState>,
    slug: web::Path<String>,
) -> Result<HttpResponse> {
    let blog: PostDetail = state.posts.get_by_slug(&slug).await?;
    Ok(ok("Blog fetched successfully", BlogPayload { blog }))
}

/// Update the supplied fields of a post the caller owns
pub async fn update_post(
    state: web::Data<AppState>,
    user_id: UserId,
    slug: web::Path<String>,
    form: MultipartForm<PostForm>,
) -> Result<HttpResponse> {
    let form = form.into_inner();
    let max_bytes = state.max_upload_bytes;

    let content = match text(form.content) {
        Some(raw) => Some(PostContent::parse(&raw)?),
        None => None,
    };
    let tags = match text(form.tags) {
        Some(raw) => Some(parse_tags(&raw)?),
        None => None,
    };
    let thumbnail = match form.image {
        Some(part) => Some(image_from_part(part, max_bytes)?),
        None => None,
    };
    let inline_images = form
        .images
        .into_iter()
        .map(|part| image_from_part(part, max_bytes))
        .collect::<Result<Vec<_>>>()?;

    let changes = UpdatePost {
        title: text(form.title),
        description: text(form.description),
        content,
        tags,
        draft: text(form.draft).map(|raw| parse_draft(&raw)),
        thumbnail,
        inline_images,
    };

    let blog = state.posts.update(user_id.0, &slug, changes).await?;
    Ok(ok("Blog updated successfully", BlogPayload { blog }))
}

pub async fn delete_post(
    state: web::Data<AppState>,
    user_id: UserId,
    slug: web::Path<String>,
) -> Result<HttpResponse> {
    state.posts.delete(user_id.0, &slug).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Blog Deleted Successfully")))
}

pub async fn like_post(
    state: web::Data<AppState>,
    user_id: UserId,
    slug: web::Path<String>,
) -> Result<HttpResponse> {
    let outcome = state.posts.toggle_like(user_id.0, &slug).await?;
    let message = if outcome.active {
        "Blog Liked Successfully"
    } else {
        "Blog Disliked successfully"
    };
    Ok(ok(
        message,
        LikePayload {
            liked: outcome.active,
            likes_count: outcome.count,
        },
    ))
}

pub async fn save_post(
    state: web::Data<AppState>,
    user_id: UserId,
    slug: web::Path<String>,
) -> Result<HttpResponse> {
    let outcome = state.posts.toggle_save(user_id.0, &slug).await?;
    let message = if outcome.active {
        "Blog saved successfully"
    } else {
        "Blog unsaved"
    };
    Ok(ok(
        message,
        SavePayload {
            saved: outcome.active,
            saves_count: outcome.count,
        },
    ))
}

/// Standalone editor image upload
pub async fn upload_image(
    state: web::Data<AppState>,
    _user_id: UserId,
    form: MultipartForm<ImageForm>,
) -> Result<HttpResponse> {
    let part = form
        .into_inner()
        .image
        .ok_or_else(|| AppError::Validation("No image file uploaded".to_string()))?;

    let file = state
        .posts
        .upload_image(image_from_part(part, state.max_upload_bytes)?)
        .await?;
    Ok(ok("Image uploaded successfully", FilePayload { file }))
}

fn text(field: Option<Text<String>>) -> Option<String> {
    field.map(|t| t.0)
}

/// Anything but an explicit "false" keeps the post a draft
fn parse_draft(raw: &str) -> bool {
    !raw.trim().eq_ignore_ascii_case("false")
}

fn parse_tags(raw: &str) -> Result<Vec<String>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    if raw.starts_with('[') {
        return serde_json::from_str(raw)
            .map_err(|e| AppError::Validation(format!("Invalid tags format: {}", e)));
    }
    Ok(raw.split(',').map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_draft() {
        assert!(parse_draft("true"));
        assert!(parse_draft(""));
        assert!(!parse_draft("false"));
        assert!(!parse_draft(" FALSE "));
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags(r#"["rust","web"]"#).unwrap(), vec!["rust", "web"]);
        assert_eq!(parse_tags("rust, web").unwrap(), vec!["rust", " web"]);
        assert!(parse_tags("").unwrap().is_empty());
        assert!(parse_tags("[1, 2").is_err());
    }
}
