//! # LearnIt API Server Library
//!
//! HTTP surface of the LearnIt learning tracker: account registration and
//! login, plus per-user CRUD over learning posts.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Response middleware
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
