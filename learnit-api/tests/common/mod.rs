//! Common test utilities for integration tests
//!
//! Builds the full router over an in-memory store, so these tests need no
//! database. Password hashing uses the cheapest Argon2 parameters.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::Duration;
use learnit_api::app::{build_router, AppState};
use learnit_api::config::Config;
use learnit_shared::auth::authenticator::Authenticator;
use learnit_shared::store::MemoryStore;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower::Service as _;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: axum::Router,
    pub config: Config,
}

impl TestContext {
    /// Creates a new test context with an empty store
    pub fn new() -> Self {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "postgresql://unused/learnit"),
            ("JWT_SECRET", TEST_SECRET),
            ("JWT_EXPIRATION_SECONDS", "3600"),
            ("PASSWORD_HASH_MEMORY_KIB", "1024"),
            ("PASSWORD_HASH_ITERATIONS", "1"),
            ("PASSWORD_HASH_PARALLELISM", "1"),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
            .expect("Test configuration should load");

        let authenticator = Authenticator::new(
            config.jwt.secret.clone(),
            Duration::seconds(config.jwt.expiration_seconds),
            config.password,
        )
        .expect("Test password parameters should be valid");

        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), authenticator, config.clone());
        let app = build_router(state);

        TestContext { store, app, config }
    }

    /// Sends a request and returns the status and JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send_raw(request).await
    }

    /// Sends a prebuilt request
    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("Non-JSON body ({}): {}", status, String::from_utf8_lossy(&bytes))
            })
        };

        (status, body)
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "name": name, "email": email, "password": password })),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Registers `email` and returns a fresh access token for it
    pub async fn signed_in_user(&self, email: &str) -> String {
        let (status, body) = self.register("Test User", email, "password123").await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        let (status, body) = self.login(email, "password123").await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);

        body["accessToken"]
            .as_str()
            .expect("login response should carry accessToken")
            .to_string()
    }

    /// Creates a post and returns the stored post object
    pub async fn create_post(&self, token: &str, body: Value) -> Value {
        let (status, body) = self.send(Method::POST, "/api/posts", Some(token), Some(body)).await;
        assert_eq!(status, StatusCode::OK, "create failed: {}", body);
        body["post"].clone()
    }

    pub async fn list_posts(&self, token: &str) -> Vec<Value> {
        let (status, body) = self.send(Method::GET, "/api/posts", Some(token), None).await;
        assert_eq!(status, StatusCode::OK, "list failed: {}", body);
        body["posts"].as_array().cloned().unwrap_or_default()
    }
}
