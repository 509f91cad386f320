/// Comment handlers - comments, replies and comment likes
use crate::error::Result;
use crate::handlers::{created, ok, ApiResponse};
use crate::middleware::UserId;
use crate::models::{Comment, CommentNode, CommentRequest, ReplyRequest};
use crate::AppState;
use actix_web::{web, HttpResponse};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct CommentPayload {
    pub comment: Comment,
}

#[derive(Debug, Serialize)]
pub struct ReplyPayload {
    pub reply: Comment,
}

#[derive(Debug, Serialize)]
pub struct CommentsPayload {
    pub comments: Vec<CommentNode>,
}

#[derive(Debug, Serialize)]
pub struct CommentLikePayload {
    pub liked: bool,
    pub likes_count: i64,
}

/// Add a top-level comment to a post
pub async fn add_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
    req: web::Json<CommentRequest>,
) -> Result<HttpResponse> {
    let comment = state
        .comments
        .add(user_id.0, post_id.into_inner(), &req.comment)
        .await?;
    Ok(created("Comment added successfully", CommentPayload { comment }))
}

pub async fn list_comments(
    state: web::Data<AppState>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let comments = state.comments.list_for_post(post_id.into_inner()).await?;
    Ok(ok("Comments fetched successfully", CommentsPayload { comments }))
}

/// Delete a comment and every reply beneath it
pub async fn delete_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    comment_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state
        .comments
        .delete(user_id.0, comment_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Comment deleted successfully")))
}

pub async fn edit_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    comment_id: web::Path<Uuid>,
    req: web::Json<CommentRequest>,
) -> Result<HttpResponse> {
    let comment = state
        .comments
        .edit(user_id.0, comment_id.into_inner(), &req.comment)
        .await?;
    Ok(ok("Comment updated successfully", CommentPayload { comment }))
}

pub async fn like_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    comment_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let outcome = state
        .comments
        .toggle_like(user_id.0, comment_id.into_inner())
        .await?;

    let message = if outcome.active {
        "Comment liked"
    } else {
        "Comment unliked"
    };
    Ok(ok(
        message,
        CommentLikePayload {
            liked: outcome.active,
            likes_count: outcome.count,
        },
    ))
}

pub async fn add_reply(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<(Uuid, Uuid)>,
    req: web::Json<ReplyRequest>,
) -> Result<HttpResponse> {
    let (parent_id, post_id) = path.into_inner();
    let reply = state
        .comments
        .reply(user_id.0, parent_id, post_id, &req.reply)
        .await?;
    Ok(created("Reply added successfully", ReplyPayload { reply }))
}
