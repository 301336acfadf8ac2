//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for remote access and caching.
//!
//! # Modules
//!
//! - [`cache`] - In-memory TTL cache for history pages
//! - [`http`] - `reqwest` client for the shortening API

pub mod cache;
pub mod http;
