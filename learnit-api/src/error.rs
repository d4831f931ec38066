/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>` and propagate domain errors with
/// `?`; the `From` impls below decide the status code.
///
/// Every error body has the same shape:
///
/// ```json
/// { "success": false, "error": "validation_error", "message": "Title is required",
///   "details": [{ "field": "title", "message": "Title is required" }] }
/// ```
///
/// # Example
///
/// ```
/// use learnit_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler() -> ApiResult<Json<serde_json::Value>> {
///     Err(ApiError::BadRequest("Nothing to see".to_string()))
/// }
/// ```

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use learnit_shared::{
    auth::{authenticator::AuthnError, jwt::JwtError, middleware::AuthError, password::PasswordError},
    store::StoreError,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Message shared by "post does not exist" and "post belongs to someone
/// else"; the two must stay indistinguishable
pub const POST_NOT_FOUND_OR_UNAUTHORIZED: &str = "Post not found or user not authorized";

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400), e.g. a body that is not JSON
    BadRequest(String),

    /// Unauthorized (401): missing or bad credentials
    Unauthorized(String),

    /// Unauthorized (401): the post is absent or owned by another user
    NotFoundOrUnauthorized,

    /// Conflict (409) - e.g., duplicate email
    Conflict(String),

    /// Unsupported media type (415): a JSON body sent without the JSON
    /// content type
    UnsupportedMediaType(String),

    /// Bad request (400) - field validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,

    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) | ApiError::NotFoundOrUnauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFoundOrUnauthorized => write!(f, "{}", POST_NOT_FOUND_OR_UNAUTHORIZED),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::UnsupportedMediaType(msg) => write!(f, "Unsupported media type: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (error_code, message, details) = match self {
            ApiError::BadRequest(msg) => ("bad_request", msg, None),
            ApiError::Unauthorized(msg) => ("unauthorized", msg, None),
            ApiError::NotFoundOrUnauthorized => (
                "not_found_or_unauthorized",
                POST_NOT_FOUND_OR_UNAUTHORIZED.to_string(),
                None,
            ),
            ApiError::Conflict(msg) => ("conflict", msg, None),
            ApiError::UnsupportedMediaType(msg) => ("unsupported_media_type", msg, None),
            ApiError::ValidationError(errors) => {
                // Lead with the first field message so simple clients can show it as is
                let message = errors
                    .first()
                    .map(|e| e.message.clone())
                    .unwrap_or_else(|| "Request validation failed".to_string());
                ("validation_error", message, Some(errors))
            }
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                ("internal_error", "An internal error occurred".to_string(), None)
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert store errors to API errors
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(_) => ApiError::Conflict("Email is already registered".to_string()),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

/// Convert register/login errors to API errors
impl From<AuthnError> for ApiError {
    fn from(err: AuthnError) -> Self {
        match err {
            AuthnError::EmailTaken => ApiError::Conflict("Email is already registered".to_string()),
            AuthnError::InvalidCredentials => {
                ApiError::Unauthorized("Incorrect email or password".to_string())
            }
            AuthnError::Store(store_err) => store_err.into(),
            AuthnError::Password(password_err) => password_err.into(),
            AuthnError::Token(jwt_err) => jwt_err.into(),
            AuthnError::Blocking(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Convert token gate errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => {
                ApiError::InternalError(format!("Token creation failed: {}", msg))
            }
            _ => ApiError::Unauthorized(AuthError::InvalidToken.to_string()),
        }
    }
}

/// Malformed or non-JSON request bodies
///
/// The extractor's own text names serde internals, so only the status
/// survives.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(rejection = %rejection.body_text(), "Rejected request body");
        match rejection {
            JsonRejection::MissingJsonContentType(_) => ApiError::UnsupportedMediaType(
                "Expected request with `Content-Type: application/json`".to_string(),
            ),
            _ => ApiError::BadRequest("Request body is not valid JSON".to_string()),
        }
    }
}

/// Flatten `validator` output into per-field details, ordered by field name
impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut errors: Vec<ValidationErrorDetail> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        errors.dedup();

        ApiError::ValidationError(errors)
    }
}
