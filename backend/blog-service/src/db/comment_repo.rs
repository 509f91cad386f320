use crate::db::{toggle_membership, COMMENT_LIKES};
use crate::error::{AppError, Result};
use crate::models::{Comment, CommentRecord, CommentRecordRow, NewComment, ToggleOutcome};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Storage seam for comments, replies and comment likes.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: NewComment) -> Result<Comment>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>>;

    async fn update_body(&self, id: Uuid, body: &str) -> Result<Comment>;

    /// Delete a comment and every reply beneath it. Returns how many rows went.
    async fn delete_subtree(&self, id: Uuid) -> Result<u64>;

    async fn delete_for_post(&self, post_id: Uuid) -> Result<u64>;

    /// Every comment of a post with author fields and likers, unordered
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentRecord>>;

    async fn toggle_like(&self, comment_id: Uuid, user_id: Uuid) -> Result<ToggleOutcome>;
}

#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn create(&self, comment: NewComment) -> Result<Comment> {
        let created = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, post_id, author_id, parent_id, body)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, post_id, author_id, parent_id, body, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(comment.parent_id)
        .bind(&comment.body)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, author_id, parent_id, body, created_at, updated_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn update_body(&self, id: Uuid, body: &str) -> Result<Comment> {
        sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET body = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, post_id, author_id, parent_id, body, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(body)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))
    }

    async fn delete_subtree(&self, id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            WITH RECURSIVE subtree AS (
                SELECT id FROM comments WHERE id = $1
                UNION ALL
                SELECT c.id FROM comments c JOIN subtree s ON c.parent_id = s.id
            )
            DELETE FROM comments WHERE id IN (SELECT id FROM subtree)
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_for_post(&self, post_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM comments WHERE post_id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentRecord>> {
        let rows = sqlx::query_as::<_, CommentRecordRow>(
            r#"
            SELECT c.id, c.post_id, c.author_id, c.parent_id, c.body, c.created_at, c.updated_at,
                   u.name AS author_name, u.username AS author_username, u.email AS author_email,
                   COALESCE(
                       ARRAY_AGG(cl.user_id ORDER BY cl.created_at)
                           FILTER (WHERE cl.user_id IS NOT NULL),
                       '{}'
                   ) AS likes
            FROM comments c
            JOIN users u ON u.id = c.author_id
            LEFT JOIN comment_likes cl ON cl.comment_id = c.id
            WHERE c.post_id = $1
            GROUP BY c.id, u.id
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CommentRecord::from).collect())
    }

    async fn toggle_like(&self, comment_id: Uuid, user_id: Uuid) -> Result<ToggleOutcome> {
        Ok(toggle_membership(&self.pool, COMMENT_LIKES, comment_id, user_id).await?)
    }
}
