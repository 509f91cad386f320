use crate::models::post::OwnerSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Stored comment row; `parent_id` is `None` for top-level comments
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment joined with its author and liker set, as read for tree building
#[derive(Debug, Clone)]
pub struct CommentRecord {
    pub comment: Comment,
    pub author: OwnerSummary,
    pub likes: Vec<Uuid>,
}

#[derive(Debug, FromRow)]
pub struct CommentRecordRow {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_name: String,
    pub author_username: String,
    pub author_email: String,
    pub likes: Vec<Uuid>,
}

impl From<CommentRecordRow> for CommentRecord {
    fn from(row: CommentRecordRow) -> Self {
        Self {
            author: OwnerSummary {
                id: row.author_id,
                name: row.author_name,
                username: row.author_username,
                email: row.author_email,
            },
            comment: Comment {
                id: row.id,
                post_id: row.post_id,
                author_id: row.author_id,
                parent_id: row.parent_id,
                body: row.body,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            likes: row.likes,
        }
    }
}

/// Populated comment with its replies
#[derive(Debug, Clone, Serialize)]
pub struct CommentNode {
    pub id: Uuid,
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub body: String,
    pub author: OwnerSummary,
    pub likes: Vec<Uuid>,
    pub likes_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    /// Number of comments in this sub-tree, including this one
    pub fn size(&self) -> usize {
        1 + self.replies.iter().map(CommentNode::size).sum::<usize>()
    }
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentRequest {
    pub comment: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplyRequest {
    pub reply: String,
}
