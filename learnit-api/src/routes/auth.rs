/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Create an account
/// - `POST /api/auth/login` - Exchange credentials for an access token
/// - `GET /api/auth` - Return the account behind the bearer token
///
/// Register only checks that every field is present and non-empty. Email
/// uniqueness is case-insensitive and enforced by the store.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use learnit_shared::{
    auth::{authenticator::Registration, middleware::AuthContext},
    models::user::User,
    store::UserStore,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        required(message = "Name is required"),
        length(min = 1, message = "Name is required")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "Email is required"),
        length(min = 1, message = "Email is required")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "Password is required"),
        length(min = 1, message = "Password is required")
    )]
    pub password: Option<String>,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub user: User,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(
        required(message = "Email is required"),
        length(min = 1, message = "Email is required")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "Password is required"),
        length(min = 1, message = "Password is required")
    )]
    pub password: Option<String>,
}

/// Login response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,

    /// Bearer token for the `Authorization` header
    pub access_token: String,

    pub expires_at: Option<DateTime<Utc>>,
}

/// Current user response
#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    pub success: bool,
    pub user: User,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// { "name": "Ada", "email": "ada@example.com", "password": "analytical-engine" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: missing field or malformed JSON
/// - `409 Conflict`: email already registered
/// - `500 Internal Server Error`: server error
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let Json(req) = payload?;
    req.validate()?;

    let registration = Registration {
        name: req.name.unwrap_or_default(),
        email: req.email.unwrap_or_default(),
        password: req.password.unwrap_or_default(),
    };

    let user = state
        .authenticator
        .register(state.store.as_ref(), registration)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "User created successfully".to_string(),
            user,
        }),
    ))
}

/// Log in with email and password
///
/// # Errors
///
/// - `400 Bad Request`: missing field or malformed JSON
/// - `401 Unauthorized`: "Incorrect email or password", whichever part was wrong
/// - `500 Internal Server Error`: server error
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let email = req.email.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    let token = state
        .authenticator
        .login(state.store.as_ref(), &email, &password)
        .await?;

    Ok(Json(LoginResponse {
        success: true,
        message: "User logged in successfully".to_string(),
        expires_at: token.expires_at(),
        access_token: token.token,
    }))
}

/// Return the account the bearer token belongs to
///
/// A token whose user has since disappeared is treated like any other bad
/// token.
pub async fn current_user(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<CurrentUserResponse>> {
    let user = state
        .store
        .find_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    Ok(Json(CurrentUserResponse {
        success: true,
        user,
    }))
}
