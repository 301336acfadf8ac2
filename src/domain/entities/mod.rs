//! Core entities exchanged with the shortening API.
//!
//! # Entity Types
//!
//! - [`ShortenResult`] - A freshly created short link
//! - [`HistoryItem`] / [`HistoryPage`] - Past shortenings, one page at a time
//! - [`AnalyticsSummary`] - Click counters for one link
//! - [`RateLimitStatus`] - Server rate-limit signals
//! - [`PaginationState`] / [`PageSize`] - Position within the history

pub mod analytics;
pub mod history_item;
pub mod pagination;
pub mod rate_limit;
pub mod shorten_result;

pub use analytics::{AnalyticsSummary, DIRECT_REFERRER, Referrer};
pub use history_item::{HistoryItem, HistoryPage};
pub use pagination::{ALLOWED_PAGE_SIZES, PageSize, PaginationState};
pub use rate_limit::RateLimitStatus;
pub use shorten_result::ShortenResult;
