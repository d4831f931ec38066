/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use learnit_api::{app::{build_router, AppState}, config::Config};
/// use learnit_shared::{auth::authenticator::Authenticator, store::MemoryStore};
/// use chrono::Duration;
/// use std::sync::Arc;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let authenticator = Authenticator::new(
///     config.jwt.secret.clone(),
///     Duration::seconds(config.jwt.expiration_seconds),
///     config.password,
/// )?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), authenticator, config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer, routes};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
    Router,
};
use learnit_shared::{
    auth::{authenticator::Authenticator, middleware::jwt_auth_middleware},
    store::Store,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Everything inside is behind an `Arc`, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Users and posts
    pub store: Arc<dyn Store>,

    /// Password hashing and token issuance
    pub authenticator: Arc<Authenticator>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(store: Arc<dyn Store>, authenticator: Authenticator, config: Config) -> Self {
        Self {
            store,
            authenticator: Arc::new(authenticator),
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health                # Health check (public)
/// └── /api/
///     ├── /auth/
///     │   ├── POST /register      # public
///     │   ├── POST /login         # public
///     │   └── GET  /              # current user (bearer)
///     └── /posts/                 # bearer
///         ├── GET    /
///         ├── POST   /
///         ├── PUT    /:id
///         └── DELETE /:id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Bearer token gate (per route group)
pub fn build_router(state: AppState) -> Router {
    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let public_auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    let protected_auth_routes = Router::new()
        .route("/", get(routes::auth::current_user))
        .layer(middleware::from_fn_with_state(state.clone(), jwt_auth_layer));

    let post_routes = Router::new()
        .route("/", get(routes::posts::list_posts).post(routes::posts::create_post))
        .route(
            "/:id",
            put(routes::posts::update_post).delete(routes::posts::delete_post),
        )
        .layer(middleware::from_fn_with_state(state.clone(), jwt_auth_layer));

    let api_routes = Router::new()
        .nest("/auth", public_auth_routes.merge(protected_auth_routes))
        .nest("/posts", post_routes);

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config.api.cors_origins))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(cors_origins: &[String]) -> CorsLayer {
    if cors_origins.iter().any(|origin| origin == "*") {
        // Development mode: permissive CORS
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Bearer token gate bound to the process signing secret
async fn jwt_auth_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    jwt_auth_middleware(state.authenticator.secret(), req, next)
        .await
        .map_err(ApiError::from)
}
