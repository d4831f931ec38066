/// Bearer token gate for Axum
///
/// Reads `Authorization: Bearer <jwt>`, verifies it, and stores the verified
/// user id in request extensions as an [`AuthContext`]. Handlers take
/// `AuthContext` as an extractor; it is the only source of the caller's
/// identity, never the body or query string.
///
/// Verification is a pure function of the headers, the secret and the
/// clock ([`authenticate`]), with no I/O and no shared state, so the gate is
/// safe to run concurrently for any number of requests.
///
/// # Example
///
/// ```no_run
/// use axum::{extract::Request, middleware::{self, Next}, routing::get, Router};
/// use learnit_shared::auth::middleware::{jwt_auth_middleware, AuthContext};
///
/// async fn whoami(auth: AuthContext) -> String {
///     format!("Hello, user {}!", auth.user_id)
/// }
///
/// let app: Router = Router::new()
///     .route("/whoami", get(whoami))
///     .layer(middleware::from_fn(|req: Request, next: Next| {
///         jwt_auth_middleware("your-jwt-secret-at-least-32-bytes", req, next)
///     }));
/// ```

use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use super::jwt::validate_token_at;

/// Authorization scheme prefix
pub const BEARER_PREFIX: &str = "Bearer ";

/// Verified identity of the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    /// Authenticated user ID, taken from the token subject
    pub user_id: Uuid,
}

impl AuthContext {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Error type for the token gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No usable bearer token on the request
    #[error("Access token not found")]
    MissingToken,

    /// Bad signature, wrong issuer, malformed or expired token
    #[error("Invalid or expired token")]
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "error": "unauthorized",
            "message": self.to_string(),
        });

        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

/// Extracts the bearer token from the `Authorization` header
///
/// A missing header, another scheme, or an empty token all count as
/// missing.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

/// Verifies the request's bearer token as of `now`
///
/// # Errors
///
/// - `AuthError::MissingToken` if there is no bearer token
/// - `AuthError::InvalidToken` on any cryptographic or temporal failure;
///   the precise cause is only logged
pub fn authenticate(
    headers: &HeaderMap,
    secret: &str,
    now: DateTime<Utc>,
) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;

    let claims = validate_token_at(token, secret, now).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        AuthError::InvalidToken
    })?;

    Ok(AuthContext::new(claims.sub))
}

/// JWT authentication middleware
///
/// Rejects the request with 401 unless it carries a valid bearer token;
/// otherwise inserts the [`AuthContext`] and runs the rest of the stack.
pub async fn jwt_auth_middleware(
    secret: &str,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_context = authenticate(req.headers(), secret, Utc::now())?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Only present when the gate ran on this route
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or(AuthError::MissingToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, Claims};
    use axum::{body::Body, http::HeaderValue, routing::get, Router};
    use chrono::Duration;
    use tower::Service as _;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
        assert_eq!(bearer_token(&HeaderMap::new()), Err(AuthError::MissingToken));
        assert_eq!(bearer_token(&headers_with("Basic dXNlcjpwYXNz")), Err(AuthError::MissingToken));
        assert_eq!(bearer_token(&headers_with("Bearer ")), Err(AuthError::MissingToken));
        assert_eq!(bearer_token(&headers_with("abc.def.ghi")), Err(AuthError::MissingToken));
    }

    #[test]
    fn test_authenticate_yields_subject() {
        let user_id = Uuid::new_v4();
        let token = create_token(&Claims::new(user_id), SECRET).unwrap();

        let context = authenticate(&headers_with(&format!("Bearer {}", token)), SECRET, Utc::now())
            .expect("Token should authenticate");
        assert_eq!(context.user_id, user_id);
    }

    #[test]
    fn test_authenticate_rejects_expired_and_forged() {
        let issued = Utc::now();
        let claims = Claims::issued_at(Uuid::new_v4(), issued, Duration::minutes(10));
        let token = create_token(&claims, SECRET).unwrap();
        let headers = headers_with(&format!("Bearer {}", token));

        assert!(authenticate(&headers, SECRET, issued + Duration::minutes(9)).is_ok());
        assert_eq!(
            authenticate(&headers, SECRET, issued + Duration::minutes(10)),
            Err(AuthError::InvalidToken)
        );
        assert_eq!(
            authenticate(&headers, "another-secret-key-at-least-32-bytes", issued),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn test_auth_error_into_response() {
        assert_eq!(AuthError::MissingToken.into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InvalidToken.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_middleware_gates_route() {
        async fn whoami(auth: AuthContext) -> String {
            auth.user_id.to_string()
        }

        let mut app = Router::new()
            .route("/whoami", get(whoami))
            .layer(axum::middleware::from_fn(|req: Request, next: Next| {
                jwt_auth_middleware(SECRET, req, next)
            }));

        let response = app
            .call(Request::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let user_id = Uuid::new_v4();
        let token = create_token(&Claims::new(user_id), SECRET).unwrap();
        let response = app
            .call(
                Request::builder()
                    .uri("/whoami")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, user_id.to_string().as_bytes());
    }

    #[tokio::test]
    async fn test_extractor_without_gate_is_rejected() {
        async fn whoami(auth: AuthContext) -> String {
            auth.user_id.to_string()
        }

        let mut app = Router::new().route("/whoami", get(whoami));

        let response = app
            .call(Request::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
