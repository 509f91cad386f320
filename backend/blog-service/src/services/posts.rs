/// Post authoring, listing, engagement and image orchestration
use crate::db::{AccountRepository, CommentRepository, PostRepository};
use crate::error::{AppError, Result};
use crate::models::{
    slugify, ImageRef, NewPost, Page, Post, PostContent, PostDetail, PostUpdate, PostView,
    ToggleOutcome,
};
use crate::services::comment_tree;
use crate::services::media::{delete_best_effort, ImageUpload, MediaStore, UploadedImage};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Validated input for a new post
#[derive(Debug, Clone)]
pub struct CreatePost {
    pub title: String,
    pub description: String,
    pub content: PostContent,
    pub tags: Vec<String>,
    pub draft: bool,
    pub thumbnail: ImageUpload,
    pub inline_images: Vec<ImageUpload>,
}

/// Supplied fields of an update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<PostContent>,
    pub tags: Option<Vec<String>>,
    pub draft: Option<bool>,
    pub thumbnail: Option<ImageUpload>,
    pub inline_images: Vec<ImageUpload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostPage {
    pub blogs: Vec<PostView>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub has_more: bool,
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    accounts: Arc<dyn AccountRepository>,
    comments: Arc<dyn CommentRepository>,
    media: Arc<dyn MediaStore>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        accounts: Arc<dyn AccountRepository>,
        comments: Arc<dyn CommentRepository>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            posts,
            accounts,
            comments,
            media,
        }
    }

    /// Create a post. Images are uploaded only after every check passed.
    pub async fn create(&self, owner: Uuid, input: CreatePost) -> Result<PostView> {
        let title = post_title(&input.title)?;
        let description = required(&input.description, "Description")?;
        input.thumbnail.image_type()?;

        if self.accounts.find_by_id(owner).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        if self.posts.title_taken(owner, &title, None).await? {
            return Err(AppError::Conflict(
                "You already have a blog with this title".to_string(),
            ));
        }

        let pending = pending_slots(&input.content, &input.inline_images)?;

        let mut uploaded: Vec<String> = Vec::new();
        let post = match self
            .store_new(owner, title, description, input, pending, &mut uploaded)
            .await
        {
            Ok(post) => post,
            Err(e) => {
                delete_best_effort(self.media.as_ref(), &uploaded).await;
                return Err(e);
            }
        };

        tracing::info!(post_id = %post.id, slug = %post.slug, draft = post.draft, "blog created");
        self.view_of(post.id).await
    }

    /// Published posts, newest first
    pub async fn list(&self, page: Page) -> Result<PostPage> {
        let total = self.posts.count_published().await?;
        let blogs = self.posts.list_published(page.offset(), page.limit).await?;

        Ok(PostPage {
            blogs,
            total,
            page: page.page,
            limit: page.limit,
            has_more: page.has_more(total),
        })
    }

    /// The caller's own posts, drafts included unless filtered
    pub async fn list_for_owner(&self, owner: Uuid, draft: Option<bool>) -> Result<Vec<PostView>> {
        if self.accounts.find_by_id(owner).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        self.posts.list_by_owner(owner, draft).await
    }

    /// A single post with likers, savers and the full comment tree
    pub async fn get_by_slug(&self, slug: &str) -> Result<PostDetail> {
        let post = self.find(slug).await?;
        let view = self.view_of(post.id).await?;
        let likes = self.posts.likers(post.id).await?;
        let saves = self.posts.savers(post.id).await?;
        let comments = comment_tree::build(self.comments.list_for_post(post.id).await?);

        Ok(PostDetail {
            post: view,
            likes,
            saves,
            comments,
        })
    }

    /// Replace the supplied fields of a post the caller owns.
    ///
    /// Inline files fill image blocks that have no uploaded file yet, in block
    /// order. A new thumbnail is stored only after the old one was deleted
    /// remotely. Images dropped from the content are cleaned up best-effort.
    pub async fn update(
        &self,
        caller: Uuid,
        slug: &str,
        mut changes: UpdatePost,
    ) -> Result<PostView> {
        let post = self.find(slug).await?;
        ensure_owner(&post, caller, "You can only edit your own blogs")?;

        let title = match &changes.title {
            Some(title) => post_title(title)?,
            None => post.title.clone(),
        };
        let description = match &changes.description {
            Some(description) => required(description, "Description")?,
            None => post.description.clone(),
        };
        if let Some(thumbnail) = &changes.thumbnail {
            thumbnail.image_type()?;
        }

        if title != post.title
            && self
                .posts
                .title_taken(post.owner_id, &title, Some(post.id))
                .await?
        {
            return Err(AppError::Conflict(
                "You already have a blog with this title".to_string(),
            ));
        }

        let content = changes
            .content
            .take()
            .unwrap_or_else(|| post.content.0.clone());
        let pending = pending_slots(&content, &changes.inline_images)?;

        let mut uploaded: Vec<String> = Vec::new();
        let updated = match self
            .store_update(&post, title, description, content, changes, pending, &mut uploaded)
            .await
        {
            Ok(updated) => updated,
            Err(e) => {
                delete_best_effort(self.media.as_ref(), &uploaded).await;
                return Err(e);
            }
        };

        let kept: HashSet<&String> = updated.images.iter().collect();
        let dropped: Vec<String> = post
            .images
            .iter()
            .filter(|id| !kept.contains(id))
            .cloned()
            .collect();
        delete_best_effort(self.media.as_ref(), &dropped).await;

        tracing::info!(post_id = %updated.id, dropped_images = dropped.len(), "blog updated");
        self.view_of(updated.id).await
    }

    /// Delete a post the caller owns with its comments and remote images
    pub async fn delete(&self, caller: Uuid, slug: &str) -> Result<()> {
        let post = self.find(slug).await?;
        ensure_owner(&post, caller, "You can only delete your own blogs")?;

        delete_best_effort(self.media.as_ref(), &post.remote_images()).await;

        let removed_comments = self.comments.delete_for_post(post.id).await?;
        if !self.posts.delete(post.id).await? {
            return Err(AppError::NotFound("Blog not found".to_string()));
        }

        tracing::info!(post_id = %post.id, removed_comments, "blog deleted");
        Ok(())
    }

    pub async fn toggle_like(&self, caller: Uuid, slug: &str) -> Result<ToggleOutcome> {
        let post = self.find(slug).await?;
        self.posts.toggle_like(post.id, caller).await
    }

    pub async fn toggle_save(&self, caller: Uuid, slug: &str) -> Result<ToggleOutcome> {
        let post = self.find(slug).await?;
        self.posts.toggle_save(post.id, caller).await
    }

    /// Standalone inline image upload used by the editor
    pub async fn upload_image(&self, image: ImageUpload) -> Result<UploadedImage> {
        self.media.upload(image).await
    }

    async fn find(&self, slug: &str) -> Result<Post> {
        self.posts
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound("Blog not found".to_string()))
    }

    async fn view_of(&self, id: Uuid) -> Result<PostView> {
        self.posts
            .view(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Blog not found".to_string()))
    }

    async fn store_new(
        &self,
        owner: Uuid,
        title: String,
        description: String,
        input: CreatePost,
        pending: Vec<usize>,
        uploaded: &mut Vec<String>,
    ) -> Result<Post> {
        let mut content = input.content;
        let thumbnail = self.upload_tracked(input.thumbnail, uploaded).await?;
        for (idx, image) in pending.into_iter().zip(input.inline_images) {
            let stored = self.upload_tracked(image, uploaded).await?;
            content.attach_image(idx, &stored.url, &stored.remote_id);
        }

        let images = content.image_ids();
        self.posts
            .create(NewPost {
                slug: slugify(&title, Uuid::new_v4()),
                owner_id: owner,
                title,
                description,
                content,
                tags: normalize_tags(input.tags),
                draft: input.draft,
                thumbnail: ImageRef {
                    url: thumbnail.url,
                    image_id: thumbnail.remote_id,
                },
                images,
            })
            .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn store_update(
        &self,
        post: &Post,
        title: String,
        description: String,
        mut content: PostContent,
        changes: UpdatePost,
        pending: Vec<usize>,
        uploaded: &mut Vec<String>,
    ) -> Result<Post> {
        for (idx, image) in pending.into_iter().zip(changes.inline_images) {
            let stored = self.upload_tracked(image, uploaded).await?;
            content.attach_image(idx, &stored.url, &stored.remote_id);
        }

        let thumbnail = match changes.thumbnail {
            Some(image) => {
                let stored = self.upload_tracked(image, uploaded).await?;
                if !post.thumbnail_id.is_empty() {
                    self.media.delete(&post.thumbnail_id).await?;
                }
                ImageRef {
                    url: stored.url,
                    image_id: stored.remote_id,
                }
            }
            None => ImageRef {
                url: post.thumbnail_url.clone(),
                image_id: post.thumbnail_id.clone(),
            },
        };

        let images = content.image_ids();
        self.posts
            .update(
                post.id,
                PostUpdate {
                    title,
                    description,
                    content,
                    tags: changes
                        .tags
                        .map(normalize_tags)
                        .unwrap_or_else(|| post.tags.clone()),
                    draft: changes.draft.unwrap_or(post.draft),
                    thumbnail,
                    images,
                },
            )
            .await
    }

    async fn upload_tracked(
        &self,
        image: ImageUpload,
        uploaded: &mut Vec<String>,
    ) -> Result<UploadedImage> {
        let stored = self.media.upload(image).await?;
        uploaded.push(stored.remote_id.clone());
        Ok(stored)
    }
}

fn ensure_owner(post: &Post, caller: Uuid, message: &str) -> Result<()> {
    if post.owner_id != caller {
        return Err(AppError::Forbidden(message.to_string()));
    }
    Ok(())
}

/// Matches the `posts.title` column width
pub const MAX_TITLE_CHARS: usize = 300;

fn post_title(value: &str) -> Result<String> {
    let title = required(value, "Title")?;
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(AppError::Validation(format!(
            "Title must be at most {} characters",
            MAX_TITLE_CHARS
        )));
    }
    Ok(title)
}

fn required(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Image blocks the given files will fill; more files than open blocks is an error
fn pending_slots(content: &PostContent, files: &[ImageUpload]) -> Result<Vec<usize>> {
    let pending = content.pending_image_blocks();
    if files.len() > pending.len() {
        return Err(AppError::Validation(format!(
            "Received {} images but only {} image blocks are waiting for a file",
            files.len(),
            pending.len()
        )));
    }
    for file in files {
        file.image_type()?;
    }
    Ok(pending)
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_lowercase()))
        .collect()
}
