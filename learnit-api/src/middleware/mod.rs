/// Middleware modules for the API server
///
/// - `security`: Security response headers
///
/// Bearer token verification lives in `learnit_shared::auth::middleware` and
/// is wired per route group in `app::build_router`.

pub mod security;
