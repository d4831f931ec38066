/// Credential verification and access token issuance
///
/// The [`Authenticator`] owns the process-wide signing secret, token
/// lifetime and password cost. It is built once at startup and shared
/// through application state.
///
/// # Timing
///
/// `login` runs an Argon2 verification whether or not the email exists
/// (against a dummy hash for unknown emails), so response time does not
/// reveal which emails are registered. Both failures return the same
/// [`AuthnError::InvalidCredentials`].
///
/// # Example
///
/// ```no_run
/// use learnit_shared::auth::authenticator::{Authenticator, Registration};
/// use learnit_shared::auth::password::PasswordParams;
/// use learnit_shared::store::MemoryStore;
/// use chrono::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let authenticator = Authenticator::new(
///     "your-secret-key-at-least-32-bytes-long",
///     Duration::hours(24),
///     PasswordParams::default(),
/// )?;
///
/// let user = authenticator
///     .register(&store, Registration {
///         name: "Ada".to_string(),
///         email: "ada@example.com".to_string(),
///         password: "correct horse".to_string(),
///     })
///     .await?;
///
/// let token = authenticator.login(&store, "ada@example.com", "correct horse").await?;
/// assert_eq!(token.claims.sub, user.id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    jwt::{self, Claims, JwtError},
    password::{self, PasswordError, PasswordParams},
};
use crate::{
    models::user::{CreateUser, User},
    store::{StoreError, UserStore},
};

const DUMMY_PASSWORD: &str = "learnit-timing-equalizer";

/// Errors from registration and login
#[derive(Debug, thiserror::Error)]
pub enum AuthnError {
    /// Another account already uses this email
    #[error("Email is already registered")]
    EmailTaken,

    /// Unknown email or wrong password
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The blocking hashing task panicked or was cancelled
    #[error("Password task failed: {0}")]
    Blocking(String),
}

/// Presence-checked registration input
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// A signed access token and the claims inside it
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// Compact JWT sent to the client
    pub token: String,

    pub claims: Claims,
}

impl AccessToken {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.claims.expires_at()
    }
}

/// Issues and checks credentials
pub struct Authenticator {
    secret: String,
    token_ttl: Duration,
    password_params: PasswordParams,
    dummy_hash: String,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("token_ttl", &self.token_ttl)
            .field("password_params", &self.password_params)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    /// Builds an authenticator, precomputing the dummy hash used for
    /// unknown-email logins
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::HashError` if `password_params` is invalid
    pub fn new(
        secret: impl Into<String>,
        token_ttl: Duration,
        password_params: PasswordParams,
    ) -> Result<Self, PasswordError> {
        let dummy_hash = password::hash_password(DUMMY_PASSWORD, &password_params)?;

        Ok(Self {
            secret: secret.into(),
            token_ttl,
            password_params,
            dummy_hash,
        })
    }

    /// Signing secret shared with the token gate
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Creates an account
    ///
    /// # Errors
    ///
    /// - `AuthnError::EmailTaken` if the email is registered already; the
    ///   existing account is untouched
    /// - `AuthnError::Store` / `AuthnError::Password` on infrastructure failure
    pub async fn register<U>(&self, users: &U, registration: Registration) -> Result<User, AuthnError>
    where
        U: UserStore + ?Sized,
    {
        let params = self.password_params;
        let plaintext = registration.password;
        let password_hash =
            run_blocking(move || password::hash_password(&plaintext, &params)).await??;

        let user = users
            .create_user(CreateUser {
                name: registration.name,
                email: registration.email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(_) => AuthnError::EmailTaken,
                other => AuthnError::Store(other),
            })?;

        info!(user_id = %user.id, "Registered new user");
        Ok(user)
    }

    /// Checks credentials and issues an access token
    ///
    /// # Errors
    ///
    /// - `AuthnError::InvalidCredentials` for an unknown email or a wrong
    ///   password, indistinguishably
    /// - `AuthnError::Store` / `AuthnError::Password` / `AuthnError::Token`
    ///   on infrastructure failure
    pub async fn login<U>(&self, users: &U, email: &str, password: &str) -> Result<AccessToken, AuthnError>
    where
        U: UserStore + ?Sized,
    {
        let user = users.find_user_by_email(email).await?;

        let stored_hash = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| self.dummy_hash.clone());
        let candidate = password.to_string();
        let matches =
            run_blocking(move || password::verify_password(&candidate, &stored_hash)).await??;

        let user = match user {
            Some(user) if matches => user,
            _ => {
                debug!("Rejected login attempt");
                return Err(AuthnError::InvalidCredentials);
            }
        };

        let token = self.issue_token(user.id)?;
        info!(user_id = %user.id, "User logged in");
        Ok(token)
    }

    /// Signs a fresh access token for `user_id`
    ///
    /// # Errors
    ///
    /// `JwtError::CreateError` if the expiry falls outside the calendar
    /// range, or if signing fails
    pub fn issue_token(&self, user_id: Uuid) -> Result<AccessToken, JwtError> {
        let claims = Claims::with_expiration(user_id, self.token_ttl);
        if claims.expires_at().is_none() {
            return Err(JwtError::CreateError("Token expiration out of range".to_string()));
        }
        let token = jwt::create_token(&claims, &self.secret)?;

        Ok(AccessToken { token, claims })
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, AuthnError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AuthnError::Blocking(e.to_string()))
}
