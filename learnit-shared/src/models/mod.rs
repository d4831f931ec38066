/// Database models for LearnIt
///
/// - `user`: Registered accounts (the credential store rows)
/// - `post`: Learning posts, each owned by one user
///
/// Each model carries its own SQL as associated functions taking a
/// `&PgPool`; the [`crate::store`] adapters call them.

pub mod post;
pub mod user;
