/// JWT access token issuance and validation
///
/// Tokens are self-contained: the signature and the embedded expiry are all
/// the server needs to accept one, so no database round trip and no
/// server-side session exist. There is no revocation list.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Issuer**: always `learnit`
/// - **Expiration**: configurable, 24 hours by default
/// - **Secret**: at least 32 bytes, loaded once at startup
///
/// # Example
///
/// ```
/// use learnit_shared::auth::jwt::{create_token, validate_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let secret = "your-secret-key-at-least-32-bytes-long";
///
/// let token = create_token(&Claims::new(user_id), secret)?;
/// let claims = validate_token(&token, secret)?;
/// assert_eq!(claims.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim stamped into and required from every token
pub const ISSUER: &str = "learnit";

/// Default access token lifetime
pub const DEFAULT_EXPIRATION_SECONDS: i64 = 24 * 60 * 60;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, issuer or format check failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token is not valid yet (`nbf` in the future)
    #[error("Token is not valid yet")]
    NotYetValid,
}

/// JWT claims structure
///
/// - `sub`: Subject (user ID)
/// - `iss`: Issuer (always "learnit")
/// - `iat`: Issued at (Unix timestamp)
/// - `nbf`: Not before (Unix timestamp)
/// - `exp`: Expiration (Unix timestamp)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Issuer - Always "learnit"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for `user_id` with the default 24 hour lifetime
    pub fn new(user_id: Uuid) -> Self {
        Self::with_expiration(user_id, Duration::seconds(DEFAULT_EXPIRATION_SECONDS))
    }

    /// Creates claims expiring `expires_in` from now
    ///
    /// # Example
    ///
    /// ```
    /// use learnit_shared::auth::jwt::Claims;
    /// use chrono::Duration;
    /// use uuid::Uuid;
    ///
    /// let claims = Claims::with_expiration(Uuid::new_v4(), Duration::hours(1));
    /// assert_eq!(claims.exp - claims.iat, 3600);
    /// ```
    pub fn with_expiration(user_id: Uuid, expires_in: Duration) -> Self {
        Self::issued_at(user_id, Utc::now(), expires_in)
    }

    /// Creates claims as if issued at `now`
    ///
    /// Works on Unix seconds, so no lifetime can overflow; `exp` saturates.
    /// An `exp` outside the calendar range makes [`Claims::expires_at`]
    /// return `None`.
    pub fn issued_at(user_id: Uuid, now: DateTime<Utc>, expires_in: Duration) -> Self {
        let issued = now.timestamp();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: issued,
            nbf: issued,
            exp: issued.saturating_add(expires_in.num_seconds()),
        }
    }

    /// Checks expiry against an explicit clock
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Expiration as a timestamp, `None` if out of calendar range
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Signs claims into a compact JWT using HS256
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token against the current wall clock
///
/// See [`validate_token_at`].
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    validate_token_at(token, secret, Utc::now())
}

/// Validates a token as of `now`
///
/// Checks the HS256 signature and the issuer through `jsonwebtoken`, then
/// checks `nbf` and `exp` against the supplied clock with zero leeway. The
/// result depends only on `(token, secret, now)`.
///
/// # Errors
///
/// - `JwtError::Expired` if `now >= exp`
/// - `JwtError::NotYetValid` if `now < nbf`
/// - `JwtError::ValidationError` for bad signature, issuer or format
///
/// # Example
///
/// ```
/// use learnit_shared::auth::jwt::{create_token, validate_token_at, Claims, JwtError};
/// use chrono::{Duration, Utc};
/// use uuid::Uuid;
///
/// let secret = "your-secret-key-at-least-32-bytes-long";
/// let issued = Utc::now();
/// let claims = Claims::issued_at(Uuid::new_v4(), issued, Duration::minutes(5));
/// let token = create_token(&claims, secret).unwrap();
///
/// assert!(validate_token_at(&token, secret, issued + Duration::minutes(4)).is_ok());
/// assert!(matches!(
///     validate_token_at(&token, secret, issued + Duration::minutes(5)),
///     Err(JwtError::Expired)
/// ));
/// ```
pub fn validate_token_at(token: &str, secret: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "nbf", "iss", "sub"]);
    // Temporal checks run below against the caller's clock
    validation.validate_exp = false;
    validation.validate_nbf = false;

    let claims = decode::<Claims>(token, &key, &validation)
        .map_err(|e| JwtError::ValidationError(format!("Token validation failed: {}", e)))?
        .claims;

    if claims.is_expired_at(now) {
        return Err(JwtError::Expired);
    }

    if now.timestamp() < claims.nbf {
        return Err(JwtError::NotYetValid);
    }

    Ok(claims)
}
