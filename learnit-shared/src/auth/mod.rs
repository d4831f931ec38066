/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: HS256 access token creation and validation
/// - [`authenticator`]: register/login over a [`crate::store::UserStore`]
/// - [`middleware`]: bearer token gate and the `AuthContext` extractor
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id, 64 MB memory, 3 iterations by default
/// - **JWT Tokens**: HS256 with configurable expiration, no server-side sessions
/// - **Constant-time Comparison**: password verification and equalized
///   timing for unknown emails

pub mod authenticator;
pub mod jwt;
pub mod middleware;
pub mod password;
