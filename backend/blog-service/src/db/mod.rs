pub mod account_repo;
pub mod comment_repo;
pub mod post_repo;

pub use account_repo::{AccountRepository, PgAccountRepository};
pub use comment_repo::{CommentRepository, PgCommentRepository};
pub use post_repo::{PgPostRepository, PostRepository};

use crate::models::ToggleOutcome;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use uuid::Uuid;

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Membership table flipped by a toggle: `(table, subject column, member column)`
#[derive(Debug, Clone, Copy)]
pub(crate) struct Membership {
    pub table: &'static str,
    pub subject: &'static str,
    pub member: &'static str,
}

pub(crate) const POST_LIKES: Membership = Membership {
    table: "post_likes",
    subject: "post_id",
    member: "user_id",
};

pub(crate) const POST_SAVES: Membership = Membership {
    table: "post_saves",
    subject: "post_id",
    member: "user_id",
};

pub(crate) const COMMENT_LIKES: Membership = Membership {
    table: "comment_likes",
    subject: "comment_id",
    member: "user_id",
};

pub(crate) const FOLLOWS: Membership = Membership {
    table: "follows",
    subject: "following_id",
    member: "follower_id",
};

/// Flip `member`'s membership of `subject` in one statement, then read the count.
///
/// The delete and the conditional insert run in a single CTE so two racing
/// toggles serialize on the row lock instead of both reading "absent".
pub(crate) async fn toggle_membership(
    pool: &PgPool,
    membership: Membership,
    subject: Uuid,
    member: Uuid,
) -> Result<ToggleOutcome, sqlx::Error> {
    let Membership {
        table,
        subject: subject_col,
        member: member_col,
    } = membership;

    let flip = format!(
        r#"
        WITH removed AS (
            DELETE FROM {table}
            WHERE {subject_col} = $1 AND {member_col} = $2
            RETURNING 1
        ),
        inserted AS (
            INSERT INTO {table} ({subject_col}, {member_col})
            SELECT $1, $2
            WHERE NOT EXISTS (SELECT 1 FROM removed)
            ON CONFLICT DO NOTHING
            RETURNING 1
        )
        SELECT EXISTS (SELECT 1 FROM inserted)
        "#
    );
    let count = format!("SELECT COUNT(*) FROM {table} WHERE {subject_col} = $1");

    let mut tx = pool.begin().await?;

    let active: bool = sqlx::query_scalar(&flip)
        .bind(subject)
        .bind(member)
        .fetch_one(&mut *tx)
        .await?;

    let count: i64 = sqlx::query_scalar(&count)
        .bind(subject)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::debug!(table, %subject, %member, active, count, "membership toggled");
    Ok(ToggleOutcome { active, count })
}
