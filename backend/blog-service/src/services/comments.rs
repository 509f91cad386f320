/// Comment service - business logic for comments and replies
use crate::db::{CommentRepository, PostRepository};
use crate::error::{AppError, Result};
use crate::models::{Comment, CommentNode, NewComment, ToggleOutcome};
use crate::services::comment_tree;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { comments, posts }
    }

    /// Add a top-level comment to a post
    pub async fn add(&self, author: Uuid, post_id: Uuid, body: &str) -> Result<Comment> {
        let body = comment_body(body)?;
        self.ensure_post(post_id).await?;

        let comment = self
            .comments
            .create(NewComment {
                post_id,
                author_id: author,
                parent_id: None,
                body,
            })
            .await?;

        tracing::debug!(comment_id = %comment.id, post_id = %post_id, "comment added");
        Ok(comment)
    }

    /// Reply to an existing comment; the reply lives under the parent's post
    pub async fn reply(
        &self,
        author: Uuid,
        parent_id: Uuid,
        post_id: Uuid,
        body: &str,
    ) -> Result<Comment> {
        let body = comment_body(body)?;

        let parent = self.find(parent_id, "Parent comment not found").await?;
        if parent.post_id != post_id {
            return Err(AppError::Validation(
                "Parent comment does not belong to this blog".to_string(),
            ));
        }
        if self.depth_of(&parent).await? >= comment_tree::MAX_DEPTH {
            return Err(AppError::Validation(format!(
                "Replies cannot be nested more than {} levels deep",
                comment_tree::MAX_DEPTH
            )));
        }

        let reply = self
            .comments
            .create(NewComment {
                post_id: parent.post_id,
                author_id: author,
                parent_id: Some(parent.id),
                body,
            })
            .await?;

        tracing::debug!(comment_id = %reply.id, parent_id = %parent.id, "reply added");
        Ok(reply)
    }

    /// Replace the body of a comment the caller wrote
    pub async fn edit(&self, caller: Uuid, comment_id: Uuid, body: &str) -> Result<Comment> {
        let comment = self.find(comment_id, "Comment not found").await?;

        if comment.author_id != caller {
            return Err(AppError::Forbidden(
                "You can only edit your own comments".to_string(),
            ));
        }
        let body = comment_body(body)?;

        self.comments.update_body(comment_id, &body).await
    }

    pub async fn toggle_like(&self, caller: Uuid, comment_id: Uuid) -> Result<ToggleOutcome> {
        self.find(comment_id, "Comment not found").await?;
        self.comments.toggle_like(comment_id, caller).await
    }

    /// Delete a comment the caller wrote together with every reply beneath it
    pub async fn delete(&self, caller: Uuid, comment_id: Uuid) -> Result<u64> {
        let comment = self.find(comment_id, "Comment not found").await?;

        if comment.author_id != caller {
            return Err(AppError::Forbidden(
                "You can only delete your own comments".to_string(),
            ));
        }

        let removed = self.comments.delete_subtree(comment_id).await?;
        tracing::info!(comment_id = %comment_id, removed, "comment deleted");
        Ok(removed)
    }

    /// Populated comment tree of a post
    pub async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentNode>> {
        self.ensure_post(post_id).await?;
        let records = self.comments.list_for_post(post_id).await?;
        Ok(comment_tree::build(records))
    }

    async fn ensure_post(&self, post_id: Uuid) -> Result<()> {
        match self.posts.find_by_id(post_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound("Blog not found".to_string())),
        }
    }

    /// Nesting level of `comment`, counting a top-level comment as 1.
    /// The walk stops at [`comment_tree::MAX_DEPTH`].
    async fn depth_of(&self, comment: &Comment) -> Result<usize> {
        let mut depth = 1;
        let mut parent = comment.parent_id;

        while let Some(id) = parent {
            depth += 1;
            if depth >= comment_tree::MAX_DEPTH {
                break;
            }
            parent = self
                .comments
                .find_by_id(id)
                .await?
                .and_then(|ancestor| ancestor.parent_id);
        }

        Ok(depth)
    }

    async fn find(&self, id: Uuid, missing: &str) -> Result<Comment> {
        self.comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(missing.to_string()))
    }
}

fn comment_body(body: &str) -> Result<String> {
    let body = body.trim();
    if body.is_empty() {
        return Err(AppError::Validation("Comment cannot be empty".to_string()));
    }
    if body.chars().count() > 5000 {
        return Err(AppError::Validation(
            "Comment must be at most 5000 characters".to_string(),
        ));
    }
    Ok(body.to_string())
}
