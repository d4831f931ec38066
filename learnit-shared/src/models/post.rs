/// Post model and ownership-scoped database operations
///
/// A post is a learning resource a user is tracking: a title, an optional
/// description, a link and a free-form status. Every post belongs to exactly
/// one user and every query here is filtered by that owner.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE posts (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title TEXT NOT NULL CHECK (title <> ''),
///     description TEXT NOT NULL DEFAULT '',
///     url TEXT NOT NULL,
///     status TEXT NOT NULL DEFAULT 'TO LEARN',
///     user_id UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
/// );
/// ```
///
/// # Ownership
///
/// Update and delete match on `id AND user_id` inside a single statement, so
/// a row owned by someone else is indistinguishable from a missing row and
/// there is no window between the ownership check and the write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Status given to posts created or updated without one
pub const DEFAULT_STATUS: &str = "TO LEARN";

/// Scheme every stored url starts with
pub const URL_SCHEME: &str = "https://";

/// Prefixes `https://` unless the url already starts with it
///
/// Normalizing twice is the same as normalizing once.
///
/// # Example
///
/// ```
/// use learnit_shared::models::post::normalize_url;
///
/// assert_eq!(normalize_url("example.com"), "https://example.com");
/// assert_eq!(normalize_url("https://example.com"), "https://example.com");
/// ```
pub fn normalize_url(url: &str) -> String {
    if url.starts_with(URL_SCHEME) {
        url.to_string()
    } else {
        format!("{}{}", URL_SCHEME, url)
    }
}

/// Post model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique post ID
    pub id: Uuid,

    /// Title, never empty
    pub title: String,

    /// Free text, empty when not provided
    pub description: String,

    /// Link, always starting with `https://`
    pub url: String,

    /// Open-ended status, `TO LEARN` by default
    pub status: String,

    /// Owning user. Set at creation, never changed.
    pub user_id: Uuid,

    /// When the post was created
    pub created_at: DateTime<Utc>,

    /// When the post was last written
    pub updated_at: DateTime<Utc>,
}

/// Writable fields of a post, already defaulted and normalized
///
/// Both create and update replace all four fields; there is no partial
/// update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFields {
    pub title: String,
    pub description: String,
    pub url: String,
    pub status: String,
}

impl PostFields {
    /// Applies defaults and url normalization to validated request fields
    ///
    /// An absent description becomes `""`; an absent or empty status becomes
    /// [`DEFAULT_STATUS`].
    pub fn new(
        title: impl Into<String>,
        description: Option<String>,
        url: &str,
        status: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.unwrap_or_default(),
            url: normalize_url(url),
            status: status
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        }
    }
}

impl Post {
    /// Inserts a post owned by `user_id`
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        fields: &PostFields,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (title, description, url, status, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, url, status, user_id, created_at, updated_at
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.url)
        .bind(&fields.status)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Lists every post owned by `user_id`, oldest first
    pub async fn list_by_owner(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, description, url, status, user_id, created_at, updated_at
            FROM posts
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Replaces the fields of post `id` if and only if `user_id` owns it
    ///
    /// Returns `None` when no row matches both conditions.
    pub async fn update_owned(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        fields: &PostFields,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = $3, description = $4, url = $5, status = $6,
                updated_at = clock_timestamp()
            WHERE id = $1 AND user_id = $2
            RETURNING id, title, description, url, status, user_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.url)
        .bind(&fields.status)
        .fetch_optional(pool)
        .await
    }

    /// Deletes post `id` if and only if `user_id` owns it
    ///
    /// Returns the deleted row, or `None` when nothing matched.
    pub async fn delete_owned(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            DELETE FROM posts
            WHERE id = $1 AND user_id = $2
            RETURNING id, title, description, url, status, user_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Counts posts owned by `user_id`
    pub async fn count_by_owner(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
