//! Application layer.
//!
//! Controllers that sit between the front-end and the
//! [`crate::domain::repositories::ShortenerApi`] port: they sanitize and
//! validate input, consult the history cache, track rate limits and keep
//! the state a view renders.
//!
//! # Available Services
//!
//! - [`services::ShortenForm`] - Single URL shortening
//! - [`services::BulkShortenForm`] - Many URLs in one request
//! - [`services::HistoryController`] - Paginated history
//! - [`services::InfiniteHistory`] - Infinite-scroll history
//! - [`services::AnalyticsPanel`] - Click analytics for one link
//! - [`services::RateLimitTracker`] - Shared rate-limit countdown

pub mod services;
