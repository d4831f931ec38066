/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login and the current-user probe
/// - `posts`: Per-user learning post CRUD

pub mod auth;
pub mod health;
pub mod posts;
