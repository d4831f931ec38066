//! # LearnIt Shared Library
//!
//! Types, persistence and authentication primitives shared by the LearnIt
//! API server and its integration tests.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, JWT issuance/verification, request gate
//! - `db`: PostgreSQL pool and migrations
//! - `models`: Users and posts, with their SQL
//! - `store`: Persistence ports plus PostgreSQL and in-memory adapters

pub mod auth;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the LearnIt shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
