//! # URL Shortener Client
//!
//! Client library and terminal front-end for a remote URL shortening API.
//! The service generates codes, stores links and computes analytics; this
//! crate validates input, talks to the API over HTTPS and keeps the state
//! a front-end renders.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Entities and the [`domain::repositories::ShortenerApi`] port
//! - **Application Layer** ([`application`]) - Forms, history controllers, rate-limit tracking
//! - **Infrastructure Layer** ([`infrastructure`]) - HTTP client and TTL cache
//! - **Utilities** ([`utils`]) - Sanitizer, validators and transport hardening
//!
//! ## Features
//!
//! - Single and bulk shortening with optional alias and expiry
//! - Paginated and infinite-scroll history with a time-boxed page cache
//! - Rate-limit tracking with an auto-clearing countdown
//! - Per-session anti-forgery token and HTTPS enforcement
//!
//! ## Quick Start
//!
//! ```bash
//! export SHORTENER_BASE_URL="https://api.short.ly/"
//! cargo run -- shorten https://example.com/some/long/path --alias my-link
//! ```
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables via [`config::load_from_env`].
//! See [`config`] module for available options.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod telemetry;
pub mod utils;

pub use error::{ClientError, ClientResult};

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{
        AnalyticsPanel, BulkShortenForm, FetchStatus, HistoryController, InfiniteHistory,
        RateLimitTracker, ShortenForm, ShortenRequest,
    };
    pub use crate::domain::entities::{
        AnalyticsSummary, HistoryItem, HistoryPage, PageSize, RateLimitStatus, ShortenResult,
    };
    pub use crate::domain::repositories::{ApiReply, ShortenerApi};
    pub use crate::error::{ClientError, ClientResult};
    pub use crate::infrastructure::cache::HistoryCache;
    pub use crate::infrastructure::http::HttpShortenerApi;
}
