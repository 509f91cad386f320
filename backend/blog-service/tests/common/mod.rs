//! Shared fixtures for blog-service integration tests
//!
//! `MemoryStore` implements every repository trait over one mutex-guarded
//! state, reproducing the cascades and unique constraints of the Postgres
//! schema. `MemoryMediaStore` records uploads and deletions instead of talking
//! to object storage.
#![allow(dead_code)]

use actix_web::web;
use async_trait::async_trait;
use blog_service::db::{AccountRepository, CommentRepository, PostRepository};
use blog_service::error::{AppError, Result};
use blog_service::models::{
    Account, AccountRelations, Comment, CommentRecord, NewAccount, NewComment, NewPost,
    OwnerSummary, Post, PostUpdate, PostView, ProfileChanges, ToggleOutcome,
};
use blog_service::models::PostContent;
use blog_service::services::media::{ImageUpload, MediaStore, UploadedImage};
use blog_service::services::posts::CreatePost;
use blog_service::services::EmailService;
use blog_service::AppState;
use chrono::{DateTime, Duration, Utc};
use crypto_core::jwt::{JwtManager, TokenKind};
use crypto_core::password::hash_password;
use sqlx::types::Json;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret-with-32-plus-bytes";
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024;

// =====================================================================
// In-memory repositories
// =====================================================================

#[derive(Default)]
struct State {
    clock: i64,
    accounts: Vec<Account>,
    /// (follower, following)
    follows: Vec<(Uuid, Uuid)>,
    posts: Vec<Post>,
    /// (post, user)
    post_likes: Vec<(Uuid, Uuid)>,
    post_saves: Vec<(Uuid, Uuid)>,
    comments: Vec<Comment>,
    /// (comment, user)
    comment_likes: Vec<(Uuid, Uuid)>,
}

impl State {
    /// Strictly increasing timestamps so ordering never depends on clock resolution
    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        Utc::now() + Duration::milliseconds(self.clock)
    }

    fn account(&self, id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    fn owner_summary(&self, id: Uuid) -> Option<OwnerSummary> {
        self.account(id).map(|a| OwnerSummary {
            id: a.id,
            name: a.name.clone(),
            username: a.username.clone(),
            email: a.email.clone(),
        })
    }

    fn view(&self, post: &Post) -> Option<PostView> {
        let owner = self.owner_summary(post.owner_id)?;
        Some(PostView {
            id: post.id,
            slug: post.slug.clone(),
            title: post.title.clone(),
            description: post.description.clone(),
            content: post.content.0.clone(),
            tags: post.tags.clone(),
            draft: post.draft,
            thumbnail: blog_service::models::ImageRef {
                url: post.thumbnail_url.clone(),
                image_id: post.thumbnail_id.clone(),
            },
            images: post.images.clone(),
            owner,
            likes_count: count(&self.post_likes, post.id),
            saves_count: count(&self.post_saves, post.id),
            comments_count: self.comments.iter().filter(|c| c.post_id == post.id).count() as i64,
            created_at: post.created_at,
            updated_at: post.updated_at,
        })
    }

    /// `roots` plus every reply beneath them
    fn subtree(&self, roots: HashSet<Uuid>) -> HashSet<Uuid> {
        let mut ids = roots;
        loop {
            let before = ids.len();
            for comment in &self.comments {
                if comment.parent_id.is_some_and(|p| ids.contains(&p)) {
                    ids.insert(comment.id);
                }
            }
            if ids.len() == before {
                return ids;
            }
        }
    }

    fn remove_comments(&mut self, ids: &HashSet<Uuid>) -> u64 {
        let before = self.comments.len();
        self.comments.retain(|c| !ids.contains(&c.id));
        self.comment_likes.retain(|(comment, _)| !ids.contains(comment));
        (before - self.comments.len()) as u64
    }

    fn remove_posts(&mut self, ids: &HashSet<Uuid>) {
        let comment_ids: HashSet<Uuid> = self
            .comments
            .iter()
            .filter(|c| ids.contains(&c.post_id))
            .map(|c| c.id)
            .collect();
        self.remove_comments(&comment_ids);
        self.posts.retain(|p| !ids.contains(&p.id));
        self.post_likes.retain(|(post, _)| !ids.contains(post));
        self.post_saves.retain(|(post, _)| !ids.contains(post));
    }
}

fn count(set: &[(Uuid, Uuid)], subject: Uuid) -> i64 {
    set.iter().filter(|(s, _)| *s == subject).count() as i64
}

fn members(set: &[(Uuid, Uuid)], subject: Uuid) -> Vec<Uuid> {
    set.iter()
        .filter(|(s, _)| *s == subject)
        .map(|(_, m)| *m)
        .collect()
}

fn subjects_of(set: &[(Uuid, Uuid)], member: Uuid) -> Vec<Uuid> {
    set.iter()
        .filter(|(_, m)| *m == member)
        .map(|(s, _)| *s)
        .collect()
}

fn toggle(set: &mut Vec<(Uuid, Uuid)>, subject: Uuid, member: Uuid) -> ToggleOutcome {
    let active = match set.iter().position(|edge| *edge == (subject, member)) {
        Some(idx) => {
            set.remove(idx);
            false
        }
        None => {
            set.push((subject, member));
            true
        }
    };
    ToggleOutcome {
        active,
        count: count(set, subject),
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account_count(&self) -> usize {
        self.state.lock().unwrap().accounts.len()
    }

    pub fn comment_count(&self) -> usize {
        self.state.lock().unwrap().comments.len()
    }

    pub fn stored_password_hash(&self, email: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .accounts
            .iter()
            .find(|a| a.email == email)
            .map(|a| a.password_hash.clone())
    }
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn create(&self, account: NewAccount) -> Result<Account> {
        let mut state = self.state.lock().unwrap();
        if state
            .accounts
            .iter()
            .any(|a| a.email == account.email || a.username == account.username)
        {
            return Err(AppError::Conflict(
                "Email or username already registered".to_string(),
            ));
        }

        let now = state.tick();
        let account = Account {
            id: Uuid::new_v4(),
            name: account.name,
            username: account.username,
            email: account.email,
            password_hash: account.password_hash,
            is_verified: false,
            show_liked_blogs: true,
            show_saved_blogs: true,
            created_at: now,
            updated_at: now,
        };
        state.accounts.push(account.clone());
        Ok(account)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        Ok(self.state.lock().unwrap().account(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let state = self.state.lock().unwrap();
        Ok(state.accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        let state = self.state.lock().unwrap();
        Ok(state.accounts.iter().find(|a| a.username == username).cloned())
    }

    async fn list(&self) -> Result<Vec<Account>> {
        Ok(self.state.lock().unwrap().accounts.clone())
    }

    async fn mark_verified(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        match state.accounts.iter_mut().find(|a| a.id == id) {
            Some(account) if !account.is_verified => {
                account.is_verified = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_profile(&self, id: Uuid, changes: &ProfileChanges) -> Result<Account> {
        let mut state = self.state.lock().unwrap();
        let now = state.tick();
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if let Some(name) = &changes.name {
            account.name = name.clone();
        }
        if let Some(show) = changes.show_liked_blogs {
            account.show_liked_blogs = show;
        }
        if let Some(show) = changes.show_saved_blogs {
            account.show_saved_blogs = show;
        }
        account.updated_at = now;
        Ok(account.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        if state.account(id).is_none() {
            return Ok(false);
        }

        let owned_posts: HashSet<Uuid> = state
            .posts
            .iter()
            .filter(|p| p.owner_id == id)
            .map(|p| p.id)
            .collect();
        state.remove_posts(&owned_posts);

        let authored: HashSet<Uuid> = state
            .comments
            .iter()
            .filter(|c| c.author_id == id)
            .map(|c| c.id)
            .collect();
        let authored = state.subtree(authored);
        state.remove_comments(&authored);

        state.follows.retain(|(a, b)| *a != id && *b != id);
        state.post_likes.retain(|(_, user)| *user != id);
        state.post_saves.retain(|(_, user)| *user != id);
        state.comment_likes.retain(|(_, user)| *user != id);
        state.accounts.retain(|a| a.id != id);
        Ok(true)
    }

    async fn relations(&self, id: Uuid) -> Result<AccountRelations> {
        let state = self.state.lock().unwrap();

        Ok(AccountRelations {
            followers: state
                .follows
                .iter()
                .filter(|(_, following)| *following == id)
                .map(|(follower, _)| *follower)
                .collect(),
            following: state
                .follows
                .iter()
                .filter(|(follower, _)| *follower == id)
                .map(|(_, following)| *following)
                .collect(),
            blogs: state
                .posts
                .iter()
                .filter(|p| p.owner_id == id)
                .map(|p| p.id)
                .collect(),
            liked_blogs: subjects_of(&state.post_likes, id),
            saved_blogs: subjects_of(&state.post_saves, id),
        })
    }

    async fn toggle_follow(&self, follower: Uuid, following: Uuid) -> Result<ToggleOutcome> {
        let mut state = self.state.lock().unwrap();
        let active = match state
            .follows
            .iter()
            .position(|edge| *edge == (follower, following))
        {
            Some(idx) => {
                state.follows.remove(idx);
                false
            }
            None => {
                state.follows.push((follower, following));
                true
            }
        };
        let count = state.follows.iter().filter(|(_, f)| *f == following).count() as i64;
        Ok(ToggleOutcome { active, count })
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create(&self, post: NewPost) -> Result<Post> {
        let mut state = self.state.lock().unwrap();
        if state
            .posts
            .iter()
            .any(|p| p.slug == post.slug || (p.owner_id == post.owner_id && p.title == post.title))
        {
            return Err(AppError::Conflict(
                "You already have a blog with this title".to_string(),
            ));
        }

        let now = state.tick();
        let post = Post {
            id: Uuid::new_v4(),
            slug: post.slug,
            owner_id: post.owner_id,
            title: post.title,
            description: post.description,
            content: Json(post.content),
            tags: post.tags,
            draft: post.draft,
            thumbnail_url: post.thumbnail.url,
            thumbnail_id: post.thumbnail.image_id,
            images: post.images,
            created_at: now,
            updated_at: now,
        };
        state.posts.push(post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        let state = self.state.lock().unwrap();
        Ok(state.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let state = self.state.lock().unwrap();
        Ok(state.posts.iter().find(|p| p.slug == slug).cloned())
    }

    async fn title_taken(&self, owner: Uuid, title: &str, except: Option<Uuid>) -> Result<bool> {
        let state = self.state.lock().unwrap();
        Ok(state
            .posts
            .iter()
            .any(|p| p.owner_id == owner && p.title == title && Some(p.id) != except))
    }

    async fn view(&self, id: Uuid) -> Result<Option<PostView>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .posts
            .iter()
            .find(|p| p.id == id)
            .and_then(|p| state.view(p)))
    }

    async fn list_published(&self, offset: i64, limit: i64) -> Result<Vec<PostView>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .posts
            .iter()
            .rev()
            .filter(|p| !p.draft)
            .skip(offset as usize)
            .take(limit as usize)
            .filter_map(|p| state.view(p))
            .collect())
    }

    async fn count_published(&self) -> Result<i64> {
        let state = self.state.lock().unwrap();
        Ok(state.posts.iter().filter(|p| !p.draft).count() as i64)
    }

    async fn list_by_owner(&self, owner: Uuid, draft: Option<bool>) -> Result<Vec<PostView>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .posts
            .iter()
            .rev()
            .filter(|p| p.owner_id == owner && draft.map_or(true, |d| p.draft == d))
            .filter_map(|p| state.view(p))
            .collect())
    }

    async fn update(&self, id: Uuid, update: PostUpdate) -> Result<Post> {
        let mut state = self.state.lock().unwrap();
        let now = state.tick();

        let owner = state
            .posts
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.owner_id)
            .ok_or_else(|| AppError::NotFound("Blog not found".to_string()))?;
        if state
            .posts
            .iter()
            .any(|p| p.id != id && p.owner_id == owner && p.title == update.title)
        {
            return Err(AppError::Conflict(
                "You already have a blog with this title".to_string(),
            ));
        }

        let post = state
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound("Blog not found".to_string()))?;
        post.title = update.title;
        post.description = update.description;
        post.content = Json(update.content);
        post.tags = update.tags;
        post.draft = update.draft;
        post.thumbnail_url = update.thumbnail.url;
        post.thumbnail_id = update.thumbnail.image_id;
        post.images = update.images;
        post.updated_at = now;
        Ok(post.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        if !state.posts.iter().any(|p| p.id == id) {
            return Ok(false);
        }
        state.remove_posts(&HashSet::from([id]));
        Ok(true)
    }

    async fn remote_images_for_owner(&self, owner: Uuid) -> Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .posts
            .iter()
            .filter(|p| p.owner_id == owner)
            .flat_map(Post::remote_images)
            .collect())
    }

    async fn likers(&self, post_id: Uuid) -> Result<Vec<Uuid>> {
        Ok(members(&self.state.lock().unwrap().post_likes, post_id))
    }

    async fn savers(&self, post_id: Uuid) -> Result<Vec<Uuid>> {
        Ok(members(&self.state.lock().unwrap().post_saves, post_id))
    }

    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<ToggleOutcome> {
        let mut state = self.state.lock().unwrap();
        Ok(toggle(&mut state.post_likes, post_id, user_id))
    }

    async fn toggle_save(&self, post_id: Uuid, user_id: Uuid) -> Result<ToggleOutcome> {
        let mut state = self.state.lock().unwrap();
        Ok(toggle(&mut state.post_saves, post_id, user_id))
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(&self, comment: NewComment) -> Result<Comment> {
        let mut state = self.state.lock().unwrap();
        if let Some(parent_id) = comment.parent_id {
            let same_post = state
                .comments
                .iter()
                .any(|c| c.id == parent_id && c.post_id == comment.post_id);
            if !same_post {
                return Err(AppError::Internal("foreign key violation".to_string()));
            }
        }

        let now = state.tick();
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id: comment.post_id,
            author_id: comment.author_id,
            parent_id: comment.parent_id,
            body: comment.body,
            created_at: now,
            updated_at: now,
        };
        state.comments.push(comment.clone());
        Ok(comment)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        let state = self.state.lock().unwrap();
        Ok(state.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn update_body(&self, id: Uuid, body: &str) -> Result<Comment> {
        let mut state = self.state.lock().unwrap();
        let now = state.tick();
        let comment = state
            .comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;
        comment.body = body.to_string();
        comment.updated_at = now;
        Ok(comment.clone())
    }

    async fn delete_subtree(&self, id: Uuid) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        let ids = state.subtree(HashSet::from([id]));
        Ok(state.remove_comments(&ids))
    }

    async fn delete_for_post(&self, post_id: Uuid) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        let ids: HashSet<Uuid> = state
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| c.id)
            .collect();
        Ok(state.remove_comments(&ids))
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentRecord>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .filter_map(|c| {
                Some(CommentRecord {
                    comment: c.clone(),
                    author: state.owner_summary(c.author_id)?,
                    likes: members(&state.comment_likes, c.id),
                })
            })
            .collect())
    }

    async fn toggle_like(&self, comment_id: Uuid, user_id: Uuid) -> Result<ToggleOutcome> {
        let mut state = self.state.lock().unwrap();
        Ok(toggle(&mut state.comment_likes, comment_id, user_id))
    }
}

// =====================================================================
// Media
// =====================================================================

#[derive(Clone, Default)]
pub struct MemoryMediaStore {
    uploaded: Arc<Mutex<Vec<String>>>,
    deleted: Arc<Mutex<Vec<String>>>,
    fail_deletes: Arc<AtomicBool>,
}

impl MemoryMediaStore {
    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn upload(&self, image: ImageUpload) -> Result<UploadedImage> {
        image.image_type()?;
        let remote_id = format!("blog-images/{}.png", Uuid::new_v4());
        self.uploaded.lock().unwrap().push(remote_id.clone());
        Ok(UploadedImage {
            url: format!("https://cdn.test/{}", remote_id),
            remote_id,
        })
    }

    async fn delete(&self, remote_id: &str) -> Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::Delete("media backend unavailable".to_string()));
        }
        self.deleted.lock().unwrap().push(remote_id.to_string());
        Ok(())
    }
}

// =====================================================================
// App wiring
// =====================================================================

pub struct TestContext {
    pub store: MemoryStore,
    pub media: MemoryMediaStore,
    pub jwt: Arc<JwtManager>,
    pub state: web::Data<AppState>,
}

pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", self.token))
    }
}

pub fn jwt_manager() -> JwtManager {
    JwtManager::from_secret(TEST_SECRET, Duration::hours(1), Duration::hours(1)).unwrap()
}

impl TestContext {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let media = MemoryMediaStore::default();
        let jwt = Arc::new(jwt_manager());

        let state = web::Data::new(AppState::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(media.clone()),
            Arc::new(EmailService::disabled("http://localhost/api/v1/verify-email")),
            jwt.clone(),
            MAX_UPLOAD_BYTES,
        ));

        Self {
            store,
            media,
            jwt,
            state,
        }
    }

    /// Insert a verified account directly and issue it a session token
    pub async fn verified_user(&self, username: &str) -> TestUser {
        let email = format!("{}@x.com", username);
        let account = AccountRepository::create(
            &self.store,
            NewAccount {
                name: username.to_string(),
                username: username.to_string(),
                email: email.clone(),
                password_hash: hash_password("secret123").unwrap(),
            },
        )
        .await
        .unwrap();
        self.store.mark_verified(account.id).await.unwrap();

        TestUser {
            id: account.id,
            username: username.to_string(),
            email: email.clone(),
            token: self.session_token(account.id, &email),
        }
    }

    /// Create a post through the service layer, bypassing multipart
    pub async fn create_post(&self, owner: &TestUser, title: &str, draft: bool) -> PostView {
        self.state
            .posts
            .create(
                owner.id,
                CreatePost {
                    title: title.to_string(),
                    description: "A short description".to_string(),
                    content: PostContent::parse(&paragraph_content("Hello world")).unwrap(),
                    tags: vec!["rust".to_string()],
                    draft,
                    thumbnail: png_upload(),
                    inline_images: Vec::new(),
                },
            )
            .await
            .unwrap()
    }

    pub fn session_token(&self, user_id: Uuid, email: &str) -> String {
        self.jwt.issue(TokenKind::Session, user_id, email).unwrap()
    }

    pub fn verification_token(&self, user_id: Uuid, email: &str) -> String {
        self.jwt
            .issue(TokenKind::EmailVerification, user_id, email)
            .unwrap()
    }
}

// =====================================================================
// Multipart bodies
// =====================================================================

pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: format!("test-boundary-{}", Uuid::new_v4().simple()),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn png(self, name: &str) -> Self {
        self.file(name, "image.png", "image/png", b"\x89PNG\r\n\x1a\nfake-image-bytes")
    }

    /// `(content-type header value, body bytes)`
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}

pub fn png_upload() -> ImageUpload {
    ImageUpload {
        data: b"\x89PNG\r\n\x1a\nfake-image-bytes".to_vec(),
        content_type: Some(mime::IMAGE_PNG),
    }
}

/// Single paragraph body as produced by the block editor
pub fn paragraph_content(text: &str) -> String {
    serde_json::json!({
        "time": 1_700_000_000_000_i64,
        "blocks": [{ "id": "p1", "type": "paragraph", "data": { "text": text } }],
        "version": "2.28.0"
    })
    .to_string()
}

/// Multipart form for a post with a thumbnail
pub fn post_form(title: &str, draft: bool) -> (String, Vec<u8>) {
    MultipartBody::new()
        .text("title", title)
        .text("description", "A short description")
        .text("content", &paragraph_content("Hello world"))
        .text("tags", r#"["rust","web"]"#)
        .text("draft", if draft { "true" } else { "false" })
        .png("image")
        .finish()
}
