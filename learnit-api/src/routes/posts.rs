/// Learning post endpoints
///
/// Every handler here runs behind the bearer token gate and takes the
/// owner from [`AuthContext`]. Any `userId` in a request body is ignored.
///
/// # Endpoints
///
/// - `GET /api/posts` - List the caller's posts, oldest first
/// - `POST /api/posts` - Create a post
/// - `PUT /api/posts/:id` - Replace a post the caller owns
/// - `DELETE /api/posts/:id` - Delete a post the caller owns
///
/// Update and delete answer `401 not_found_or_unauthorized` with one fixed
/// body whether the id is unknown, malformed, or owned by someone else.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use learnit_shared::{
    auth::middleware::AuthContext,
    models::post::{Post, PostFields},
    store::PostStore,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Create/update request body
#[derive(Debug, Deserialize, Validate)]
pub struct PostRequest {
    #[validate(
        required(message = "Title is required"),
        length(min = 1, message = "Title is required")
    )]
    pub title: Option<String>,

    pub description: Option<String>,

    #[validate(
        required(message = "URL is required"),
        length(min = 1, message = "URL is required")
    )]
    pub url: Option<String>,

    /// Free-form; omitted or empty means "TO LEARN"
    pub status: Option<String>,
}

impl PostRequest {
    /// Validates and turns the body into stored field values
    fn into_fields(self) -> ApiResult<PostFields> {
        self.validate()?;

        let title = self.title.unwrap_or_default();
        let url = self.url.unwrap_or_default();

        Ok(PostFields::new(title, self.description, &url, self.status))
    }
}

/// List response
#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub success: bool,
    pub posts: Vec<Post>,
}

/// Single-post response for create, update and delete
#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub success: bool,
    pub message: String,
    pub post: Post,
}

impl PostResponse {
    fn new(message: &str, post: Post) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.to_string(),
            post,
        })
    }
}

/// Malformed ids can never match a row
fn parse_post_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFoundOrUnauthorized)
}

/// List the caller's posts in creation order
pub async fn list_posts(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<PostListResponse>> {
    let posts = state.store.list_posts(auth.user_id).await?;

    Ok(Json(PostListResponse {
        success: true,
        posts,
    }))
}

/// Create a post owned by the caller
///
/// # Endpoint
///
/// ```text
/// POST /api/posts
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// { "title": "Rust book", "url": "doc.rust-lang.org/book", "status": "LEARNING" }
/// ```
///
/// `url` gains an `https://` prefix unless it already has one.
///
/// # Errors
///
/// - `400 Bad Request`: missing title or url, or malformed JSON
/// - `401 Unauthorized`: missing or invalid token
/// - `500 Internal Server Error`: server error
pub async fn create_post(
    State(state): State<AppState>,
    auth: AuthContext,
    payload: Result<Json<PostRequest>, JsonRejection>,
) -> ApiResult<Json<PostResponse>> {
    let Json(req) = payload?;
    let fields = req.into_fields()?;

    let post = state.store.create_post(auth.user_id, fields).await?;
    info!(post_id = %post.id, user_id = %auth.user_id, "Created post");

    Ok(PostResponse::new("Happy learning!", post))
}

/// Replace every field of a post the caller owns
///
/// Omitted optional fields reset to their defaults.
pub async fn update_post(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
    payload: Result<Json<PostRequest>, JsonRejection>,
) -> ApiResult<Json<PostResponse>> {
    let Json(req) = payload?;
    let fields = req.into_fields()?;
    let id = parse_post_id(&id)?;

    let post = state
        .store
        .update_post(id, auth.user_id, fields)
        .await?
        .ok_or(ApiError::NotFoundOrUnauthorized)?;
    info!(post_id = %post.id, user_id = %auth.user_id, "Updated post");

    Ok(PostResponse::new("Post updated", post))
}

/// Delete a post the caller owns and return it
pub async fn delete_post(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<PostResponse>> {
    let id = parse_post_id(&id)?;

    let post = state
        .store
        .delete_post(id, auth.user_id)
        .await?
        .ok_or(ApiError::NotFoundOrUnauthorized)?;
    info!(post_id = %post.id, user_id = %auth.user_id, "Deleted post");

    Ok(PostResponse::new("Post deleted", post))
}
