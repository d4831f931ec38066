/// PostgreSQL store adapter
///
/// Thin delegation to the SQL on [`User`] and [`Post`]; all conversions of
/// `sqlx::Error` into [`StoreError`] happen here.
///
/// # Example
///
/// ```no_run
/// use learnit_shared::db::pool::{create_pool, DatabaseConfig};
/// use learnit_shared::store::{PgStore, PostStore};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
///
/// let store = PgStore::new(pool);
/// let posts = store.list_posts(Uuid::new_v4()).await?;
/// assert!(posts.is_empty());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{PostStore, Store, StoreError, UserStore};
use crate::{
    db::pool::health_check,
    models::{
        post::{Post, PostFields},
        user::{CreateUser, User},
    },
};

/// Store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool, for migrations and shutdown
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, data: CreateUser) -> Result<User, StoreError> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }
}

#[async_trait]
impl PostStore for PgStore {
    async fn create_post(&self, user_id: Uuid, fields: PostFields) -> Result<Post, StoreError> {
        Ok(Post::create(&self.pool, user_id, &fields).await?)
    }

    async fn list_posts(&self, user_id: Uuid) -> Result<Vec<Post>, StoreError> {
        Ok(Post::list_by_owner(&self.pool, user_id).await?)
    }

    async fn update_post(
        &self,
        id: Uuid,
        user_id: Uuid,
        fields: PostFields,
    ) -> Result<Option<Post>, StoreError> {
        Ok(Post::update_owned(&self.pool, id, user_id, &fields).await?)
    }

    async fn delete_post(&self, id: Uuid, user_id: Uuid) -> Result<Option<Post>, StoreError> {
        Ok(Post::delete_owned(&self.pool, id, user_id).await?)
    }

    async fn count_posts(&self, user_id: Uuid) -> Result<i64, StoreError> {
        Ok(Post::count_by_owner(&self.pool, user_id).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(health_check(&self.pool).await?)
    }
}
