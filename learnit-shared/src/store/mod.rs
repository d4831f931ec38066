//! Persistence ports
//!
//! Handlers and the authenticator talk to storage only through these traits,
//! never to a pool directly. Two adapters exist:
//!
//! - [`postgres::PgStore`]: production, backed by sqlx and the model SQL
//! - [`memory::MemoryStore`]: in-process, used by tests and local runs
//!
//! Both honor the same contract: `update_post`/`delete_post` match on post
//! id AND owner atomically and return `None` when either does not match, and
//! `create_user` rejects a duplicate email (case-insensitive) atomically.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    post::{Post, PostFields},
    user::{CreateUser, User},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors surfaced by store adapters
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("Duplicate value violates {0}")]
    Duplicate(String),

    /// The store could not be reached in time
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::Duplicate(
                    db_err.constraint().unwrap_or("unique constraint").to_string(),
                );
            }
        }

        match err {
            e @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)) => {
                StoreError::Unavailable(e.to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

/// Credential store: persisted user accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user; `StoreError::Duplicate` if the email is taken
    async fn create_user(&self, data: CreateUser) -> Result<User, StoreError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Case-insensitive lookup
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}

/// Resource store: posts, always addressed through their owner
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create_post(&self, user_id: Uuid, fields: PostFields) -> Result<Post, StoreError>;

    /// All posts of `user_id` in creation order
    async fn list_posts(&self, user_id: Uuid) -> Result<Vec<Post>, StoreError>;

    /// Conditional replace on `id AND user_id`
    async fn update_post(
        &self,
        id: Uuid,
        user_id: Uuid,
        fields: PostFields,
    ) -> Result<Option<Post>, StoreError>;

    /// Conditional delete on `id AND user_id`, returning the removed row
    async fn delete_post(&self, id: Uuid, user_id: Uuid) -> Result<Option<Post>, StoreError>;

    async fn count_posts(&self, user_id: Uuid) -> Result<i64, StoreError>;
}

/// Everything the API needs from persistence
#[async_trait]
pub trait Store: UserStore + PostStore {
    /// Cheap liveness probe
    async fn ping(&self) -> Result<(), StoreError>;
}
