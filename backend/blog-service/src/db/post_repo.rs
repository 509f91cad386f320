use crate::db::{toggle_membership, POST_LIKES, POST_SAVES};
use crate::error::{map_unique_violation, AppError, Result};
use crate::models::{NewPost, Post, PostUpdate, PostView, PostViewRow, ToggleOutcome};
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

const DUPLICATE_TITLE: &str = "You already have a blog with this title";

const POST_COLUMNS: &str = "id, slug, owner_id, title, description, content, tags, draft, \
     thumbnail_url, thumbnail_id, images, created_at, updated_at";

const VIEW_SELECT: &str = r#"
    SELECT p.id, p.slug, p.title, p.description, p.content, p.tags, p.draft,
           p.thumbnail_url, p.thumbnail_id, p.images, p.created_at, p.updated_at,
           u.id AS owner_id, u.name AS owner_name,
           u.username AS owner_username, u.email AS owner_email,
           (SELECT COUNT(*) FROM post_likes l WHERE l.post_id = p.id) AS likes_count,
           (SELECT COUNT(*) FROM post_saves s WHERE s.post_id = p.id) AS saves_count,
           (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comments_count
    FROM posts p
    JOIN users u ON u.id = p.owner_id
"#;

/// Storage seam for posts and their like/save sets.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a post. A second post with the same title by the same owner is a conflict.
    async fn create(&self, post: NewPost) -> Result<Post>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>>;

    /// Whether `owner` already has a post titled `title`, ignoring `except`
    async fn title_taken(&self, owner: Uuid, title: &str, except: Option<Uuid>) -> Result<bool>;

    async fn view(&self, id: Uuid) -> Result<Option<PostView>>;

    /// Published posts, newest first
    async fn list_published(&self, offset: i64, limit: i64) -> Result<Vec<PostView>>;

    async fn count_published(&self) -> Result<i64>;

    /// An owner's posts, newest first, optionally filtered by draft flag
    async fn list_by_owner(&self, owner: Uuid, draft: Option<bool>) -> Result<Vec<PostView>>;

    async fn update(&self, id: Uuid, update: PostUpdate) -> Result<Post>;

    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Remote image ids (thumbnails and inline) of every post an owner has
    async fn remote_images_for_owner(&self, owner: Uuid) -> Result<Vec<String>>;

    async fn likers(&self, post_id: Uuid) -> Result<Vec<Uuid>>;

    async fn savers(&self, post_id: Uuid) -> Result<Vec<Uuid>>;

    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<ToggleOutcome>;

    async fn toggle_save(&self, post_id: Uuid, user_id: Uuid) -> Result<ToggleOutcome>;
}

#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn members(&self, table: &str, post_id: Uuid) -> Result<Vec<Uuid>> {
        let sql = format!("SELECT user_id FROM {table} WHERE post_id = $1 ORDER BY created_at");
        let ids = sqlx::query_scalar::<_, Uuid>(&sql)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post> {
        let sql = format!(
            "INSERT INTO posts (id, slug, owner_id, title, description, content, tags, draft, \
                                thumbnail_url, thumbnail_id, images) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {POST_COLUMNS}"
        );

        sqlx::query_as::<_, Post>(&sql)
            .bind(Uuid::new_v4())
            .bind(&post.slug)
            .bind(post.owner_id)
            .bind(&post.title)
            .bind(&post.description)
            .bind(Json(&post.content))
            .bind(&post.tags)
            .bind(post.draft)
            .bind(&post.thumbnail.url)
            .bind(&post.thumbnail.image_id)
            .bind(&post.images)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, DUPLICATE_TITLE))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE slug = $1");
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    async fn title_taken(&self, owner: Uuid, title: &str, except: Option<Uuid>) -> Result<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM posts
                WHERE owner_id = $1 AND title = $2 AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(owner)
        .bind(title)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    async fn view(&self, id: Uuid) -> Result<Option<PostView>> {
        let sql = format!("{VIEW_SELECT} WHERE p.id = $1");
        let row = sqlx::query_as::<_, PostViewRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(PostView::from))
    }

    async fn list_published(&self, offset: i64, limit: i64) -> Result<Vec<PostView>> {
        let sql = format!(
            "{VIEW_SELECT} WHERE p.draft = FALSE \
             ORDER BY p.created_at DESC, p.id DESC LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, PostViewRow>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(PostView::from).collect())
    }

    async fn count_published(&self) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE draft = FALSE")
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    async fn list_by_owner(&self, owner: Uuid, draft: Option<bool>) -> Result<Vec<PostView>> {
        let sql = format!(
            "{VIEW_SELECT} WHERE p.owner_id = $1 AND ($2::boolean IS NULL OR p.draft = $2) \
             ORDER BY p.created_at DESC, p.id DESC"
        );
        let rows = sqlx::query_as::<_, PostViewRow>(&sql)
            .bind(owner)
            .bind(draft)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(PostView::from).collect())
    }

    async fn update(&self, id: Uuid, update: PostUpdate) -> Result<Post> {
        let sql = format!(
            "UPDATE posts SET \
                 title = $2, description = $3, content = $4, tags = $5, draft = $6, \
                 thumbnail_url = $7, thumbnail_id = $8, images = $9, updated_at = NOW() \
             WHERE id = $1 RETURNING {POST_COLUMNS}"
        );

        sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .bind(&update.title)
            .bind(&update.description)
            .bind(Json(&update.content))
            .bind(&update.tags)
            .bind(update.draft)
            .bind(&update.thumbnail.url)
            .bind(&update.thumbnail.image_id)
            .bind(&update.images)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, DUPLICATE_TITLE))?
            .ok_or_else(|| AppError::NotFound("Blog not found".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remote_images_for_owner(&self, owner: Uuid) -> Result<Vec<String>> {
        let ids = sqlx::query_scalar::<_, String>(
            r#"
            SELECT image_id FROM (
                SELECT thumbnail_id AS image_id FROM posts WHERE owner_id = $1
                UNION ALL
                SELECT UNNEST(images) AS image_id FROM posts WHERE owner_id = $1
            ) refs
            WHERE image_id <> ''
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn likers(&self, post_id: Uuid) -> Result<Vec<Uuid>> {
        self.members("post_likes", post_id).await
    }

    async fn savers(&self, post_id: Uuid) -> Result<Vec<Uuid>> {
        self.members("post_saves", post_id).await
    }

    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<ToggleOutcome> {
        Ok(toggle_membership(&self.pool, POST_LIKES, post_id, user_id).await?)
    }

    async fn toggle_save(&self, post_id: Uuid, user_id: Uuid) -> Result<ToggleOutcome> {
        Ok(toggle_membership(&self.pool, POST_SAVES, post_id, user_id).await?)
    }
}
