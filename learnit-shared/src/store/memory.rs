/// In-memory store adapter
///
/// Keeps users and posts in insertion-ordered vectors behind a single
/// `RwLock`. Every conditional write (duplicate-email insert, owner-scoped
/// update/delete) runs inside one write-lock critical section, which gives
/// the same atomicity the PostgreSQL adapter gets from single statements.
///
/// The store can be switched offline to exercise the unavailable-store
/// paths of callers.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{PostStore, Store, StoreError, UserStore};
use crate::models::{
    post::{Post, PostFields},
    user::{CreateUser, User},
};

/// Name reported in `StoreError::Duplicate` for email collisions
pub const EMAIL_CONSTRAINT: &str = "users_email_lower_key";

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    posts: Vec<Post>,
}

/// Store held entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail with `StoreError::Unavailable`
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Total number of posts across all users
    pub async fn total_posts(&self) -> usize {
        self.tables.read().await.posts.len()
    }

    /// Total number of registered users
    pub async fn total_users(&self) -> usize {
        self.tables.read().await.users.len()
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, data: CreateUser) -> Result<User, StoreError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;

        let email_key = data.email.to_lowercase();
        if tables.users.iter().any(|u| u.email.to_lowercase() == email_key) {
            return Err(StoreError::Duplicate(EMAIL_CONSTRAINT.to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: data.name,
            email: data.email,
            password_hash: data.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());

        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;

        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;

        let email_key = email.to_lowercase();
        Ok(tables
            .users
            .iter()
            .find(|u| u.email.to_lowercase() == email_key)
            .cloned())
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn create_post(&self, user_id: Uuid, fields: PostFields) -> Result<Post, StoreError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;

        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            title: fields.title,
            description: fields.description,
            url: fields.url,
            status: fields.status,
            user_id,
            created_at: now,
            updated_at: now,
        };
        tables.posts.push(post.clone());

        Ok(post)
    }

    async fn list_posts(&self, user_id: Uuid) -> Result<Vec<Post>, StoreError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;

        Ok(tables
            .posts
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_post(
        &self,
        id: Uuid,
        user_id: Uuid,
        fields: PostFields,
    ) -> Result<Option<Post>, StoreError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;

        let Some(post) = tables
            .posts
            .iter_mut()
            .find(|p| p.id == id && p.user_id == user_id)
        else {
            return Ok(None);
        };

        post.title = fields.title;
        post.description = fields.description;
        post.url = fields.url;
        post.status = fields.status;
        post.updated_at = Utc::now();

        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: Uuid, user_id: Uuid) -> Result<Option<Post>, StoreError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;

        let position = tables
            .posts
            .iter()
            .position(|p| p.id == id && p.user_id == user_id);

        Ok(position.map(|index| tables.posts.remove(index)))
    }

    async fn count_posts(&self, user_id: Uuid) -> Result<i64, StoreError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;

        Ok(tables.posts.iter().filter(|p| p.user_id == user_id).count() as i64)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.ensure_online()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_user(email: &str) -> CreateUser {
        CreateUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$test".to_string(),
        }
    }

    fn fields(title: &str) -> PostFields {
        PostFields::new(title, None, "example.com", None)
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected_case_insensitively() {
        let store = MemoryStore::new();
        let first = store.create_user(new_user("ada@example.com")).await.unwrap();

        let result = store.create_user(new_user("ADA@example.com")).await;
        assert!(matches!(result, Err(StoreError::Duplicate(ref c)) if c == EMAIL_CONSTRAINT));

        assert_eq!(store.total_users().await, 1);
        let found = store.find_user_by_email("ada@EXAMPLE.com").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
        assert_eq!(found.password_hash, first.password_hash);
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_registration_admits_one() {
        let store = Arc::new(MemoryStore::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.create_user(new_user("race@example.com")).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(store.total_users().await, 1);
    }

    #[tokio::test]
    async fn test_list_is_owner_scoped_and_ordered() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let a1 = store.create_post(alice, fields("a1")).await.unwrap();
        store.create_post(bob, fields("b1")).await.unwrap();
        let a2 = store.create_post(alice, fields("a2")).await.unwrap();

        let listed = store.list_posts(alice).await.unwrap();
        assert_eq!(listed.iter().map(|p| p.id).collect::<Vec<_>>(), vec![a1.id, a2.id]);
        assert!(listed.iter().all(|p| p.user_id == alice));
        assert_eq!(store.count_posts(bob).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_requires_owner() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let mallory = Uuid::new_v4();
        let post = store.create_post(alice, fields("original")).await.unwrap();

        let hijack = store.update_post(post.id, mallory, fields("hijacked")).await.unwrap();
        assert!(hijack.is_none());

        let updated = store
            .update_post(post.id, alice, fields("renamed"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.user_id, alice);
        assert_eq!(updated.created_at, post.created_at);
    }

    #[tokio::test]
    async fn test_delete_requires_owner() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let post = store.create_post(alice, fields("keep me")).await.unwrap();

        assert!(store.delete_post(post.id, Uuid::new_v4()).await.unwrap().is_none());
        assert!(store.delete_post(Uuid::new_v4(), alice).await.unwrap().is_none());
        assert_eq!(store.total_posts().await, 1);

        let deleted = store.delete_post(post.id, alice).await.unwrap().unwrap();
        assert_eq!(deleted, post);
        assert_eq!(store.total_posts().await, 0);
    }

    #[tokio::test]
    async fn test_offline_store_fails_every_operation() {
        let store = MemoryStore::new();
        store.set_offline(true);

        assert!(matches!(store.ping().await, Err(StoreError::Unavailable(_))));
        assert!(matches!(
            store.list_posts(Uuid::new_v4()).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.create_user(new_user("x@example.com")).await.is_err());

        store.set_offline(false);
        assert!(store.ping().await.is_ok());
    }
}
