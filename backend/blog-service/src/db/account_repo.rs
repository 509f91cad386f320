use crate::db::{toggle_membership, FOLLOWS};
use crate::error::{map_unique_violation, AppError, Result};
use crate::models::{Account, AccountRelations, NewAccount, ProfileChanges, ToggleOutcome};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

const ACCOUNT_COLUMNS: &str = "id, name, username, email, password_hash, is_verified, \
     show_liked_blogs, show_saved_blogs, created_at, updated_at";

/// Storage seam for accounts and follow edges.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new, unverified account. Duplicate email or username is a conflict.
    async fn create(&self, account: NewAccount) -> Result<Account>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>>;

    /// All accounts, oldest first
    async fn list(&self) -> Result<Vec<Account>>;

    /// Flip the verification flag false -> true. Returns `false` if it was already set.
    async fn mark_verified(&self, id: Uuid) -> Result<bool>;

    async fn update_profile(&self, id: Uuid, changes: &ProfileChanges) -> Result<Account>;

    /// Remove the account; owned rows go with it
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Followers, following, authored, liked and saved post ids
    async fn relations(&self, id: Uuid) -> Result<AccountRelations>;

    /// Flip the follow edge `follower -> following`; count is the target's followers
    async fn toggle_follow(&self, follower: Uuid, following: Uuid) -> Result<ToggleOutcome>;
}

#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by(&self, column: &str, value: &str) -> Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE {column} = $1");
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    async fn id_list(&self, sql: &str, id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn create(&self, account: NewAccount) -> Result<Account> {
        let sql = format!(
            "INSERT INTO users (id, name, username, email, password_hash) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {ACCOUNT_COLUMNS}"
        );

        sqlx::query_as::<_, Account>(&sql)
            .bind(Uuid::new_v4())
            .bind(&account.name)
            .bind(&account.username)
            .bind(&account.email)
            .bind(&account.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "Email or username already in use"))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = $1");
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        self.find_by("email", email).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        self.find_by("username", username).await
    }

    async fn list(&self) -> Result<Vec<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users ORDER BY created_at ASC");
        let accounts = sqlx::query_as::<_, Account>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(accounts)
    }

    async fn mark_verified(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_verified = TRUE, updated_at = NOW()
            WHERE id = $1 AND is_verified = FALSE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn update_profile(&self, id: Uuid, changes: &ProfileChanges) -> Result<Account> {
        let sql = format!(
            "UPDATE users SET \
                 name = COALESCE($2, name), \
                 show_liked_blogs = COALESCE($3, show_liked_blogs), \
                 show_saved_blogs = COALESCE($4, show_saved_blogs), \
                 updated_at = NOW() \
             WHERE id = $1 RETURNING {ACCOUNT_COLUMNS}"
        );

        sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .bind(changes.name.as_deref())
            .bind(changes.show_liked_blogs)
            .bind(changes.show_saved_blogs)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn relations(&self, id: Uuid) -> Result<AccountRelations> {
        Ok(AccountRelations {
            followers: self
                .id_list(
                    "SELECT follower_id FROM follows WHERE following_id = $1 ORDER BY created_at",
                    id,
                )
                .await?,
            following: self
                .id_list(
                    "SELECT following_id FROM follows WHERE follower_id = $1 ORDER BY created_at",
                    id,
                )
                .await?,
            blogs: self
                .id_list(
                    "SELECT id FROM posts WHERE owner_id = $1 ORDER BY created_at",
                    id,
                )
                .await?,
            liked_blogs: self
                .id_list(
                    "SELECT post_id FROM post_likes WHERE user_id = $1 ORDER BY created_at",
                    id,
                )
                .await?,
            saved_blogs: self
                .id_list(
                    "SELECT post_id FROM post_saves WHERE user_id = $1 ORDER BY created_at",
                    id,
                )
                .await?,
        })
    }

    async fn toggle_follow(&self, follower: Uuid, following: Uuid) -> Result<ToggleOutcome> {
        Ok(toggle_membership(&self.pool, FOLLOWS, following, follower).await?)
    }
}
