use crate::error::{AppError, Result};
use crate::models::comment::CommentNode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

pub const IMAGE_BLOCK: &str = "image";

/// One unit of a post body (heading, paragraph, image, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

impl ContentBlock {
    pub fn is_image(&self) -> bool {
        self.kind == IMAGE_BLOCK
    }

    /// Remote id of the uploaded image file, if this block has one
    pub fn image_id(&self) -> Option<&str> {
        if !self.is_image() {
            return None;
        }
        self.data
            .get("file")
            .and_then(|file| file.get("imageId"))
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }

    fn set_file(&mut self, url: &str, image_id: &str) {
        if !self.data.is_object() {
            self.data = Value::Object(Default::default());
        }
        if let Value::Object(map) = &mut self.data {
            map.insert(
                "file".to_string(),
                serde_json::json!({ "url": url, "imageId": image_id }),
            );
        }
    }
}

/// Structured post body as produced by the block editor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    pub blocks: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl PostContent {
    /// Parse the submitted JSON; the block list must be present and non-empty
    pub fn parse(raw: &str) -> Result<Self> {
        let content: PostContent = serde_json::from_str(raw)
            .map_err(|e| AppError::Validation(format!("Invalid content format: {}", e)))?;

        if content.blocks.is_empty() {
            return Err(AppError::Validation(
                "Content must contain at least one block".to_string(),
            ));
        }

        Ok(content)
    }

    /// Remote ids of every uploaded inline image, in block order
    pub fn image_ids(&self) -> Vec<String> {
        self.blocks
            .iter()
            .filter_map(ContentBlock::image_id)
            .map(str::to_string)
            .collect()
    }

    /// Indices of image blocks still waiting for an uploaded file
    pub fn pending_image_blocks(&self) -> Vec<usize> {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, block)| block.is_image() && block.image_id().is_none())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Attach an uploaded file to the block at `idx`
    pub fn attach_image(&mut self, idx: usize, url: &str, image_id: &str) {
        if let Some(block) = self.blocks.get_mut(idx) {
            block.set_file(url, image_id);
        }
    }
}

/// Stored post row
#[derive(Debug, Clone, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub slug: String,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub content: Json<PostContent>,
    pub tags: Vec<String>,
    pub draft: bool,
    pub thumbnail_url: String,
    pub thumbnail_id: String,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Every remote image referenced by this post, thumbnail first
    pub fn remote_images(&self) -> Vec<String> {
        std::iter::once(self.thumbnail_id.clone())
            .chain(self.images.iter().cloned())
            .filter(|id| !id.is_empty())
            .collect()
    }
}

/// Owner fields exposed alongside posts and comments
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OwnerSummary {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageRef {
    pub url: String,
    #[serde(rename = "imageId")]
    pub image_id: String,
}

/// Post as returned by list and detail endpoints
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub content: PostContent,
    pub tags: Vec<String>,
    pub draft: bool,
    pub thumbnail: ImageRef,
    pub images: Vec<String>,
    pub owner: OwnerSummary,
    pub likes_count: i64,
    pub saves_count: i64,
    pub comments_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flat row shape of [`PostView`] as selected from Postgres
#[derive(Debug, FromRow)]
pub struct PostViewRow {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub content: Json<PostContent>,
    pub tags: Vec<String>,
    pub draft: bool,
    pub thumbnail_url: String,
    pub thumbnail_id: String,
    pub images: Vec<String>,
    pub owner_id: Uuid,
    pub owner_name: String,
    pub owner_username: String,
    pub owner_email: String,
    pub likes_count: i64,
    pub saves_count: i64,
    pub comments_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostViewRow> for PostView {
    fn from(row: PostViewRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            title: row.title,
            description: row.description,
            content: row.content.0,
            tags: row.tags,
            draft: row.draft,
            thumbnail: ImageRef {
                url: row.thumbnail_url,
                image_id: row.thumbnail_id,
            },
            images: row.images,
            owner: OwnerSummary {
                id: row.owner_id,
                name: row.owner_name,
                username: row.owner_username,
                email: row.owner_email,
            },
            likes_count: row.likes_count,
            saves_count: row.saves_count,
            comments_count: row.comments_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Single post with its liker/saver sets and populated comment tree
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: PostView,
    pub likes: Vec<Uuid>,
    pub saves: Vec<Uuid>,
    pub comments: Vec<CommentNode>,
}

/// Data required to insert a new post
#[derive(Debug, Clone)]
pub struct NewPost {
    pub slug: String,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub content: PostContent,
    pub tags: Vec<String>,
    pub draft: bool,
    pub thumbnail: ImageRef,
    pub images: Vec<String>,
}

/// Fully resolved replacement values for an update
#[derive(Debug, Clone)]
pub struct PostUpdate {
    pub title: String,
    pub description: String,
    pub content: PostContent,
    pub tags: Vec<String>,
    pub draft: bool,
    pub thumbnail: ImageRef,
    pub images: Vec<String>,
}

/// Result of a membership flip (like, save, follow)
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub active: bool,
    pub count: i64,
}

/// Pagination window for public listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 50;

    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
        }
    }

    /// Rows skipped before this window; saturates for absurd page numbers
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Whether rows exist past this window
    pub fn has_more(&self, total: i64) -> bool {
        self.offset().saturating_add(self.limit) < total
    }
}

/// Derive the immutable slug: normalised title plus a random suffix
pub fn slugify(title: &str, suffix: Uuid) -> String {
    let mut base = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_dash && !base.is_empty() {
                base.push('-');
            }
            pending_dash = false;
            base.push(ch);
        } else {
            pending_dash = true;
        }
    }

    if base.is_empty() {
        base.push_str("post");
    }

    format!("{}-{}", base, suffix)
}
