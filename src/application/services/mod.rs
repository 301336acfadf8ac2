//! Use-case controllers driven by the front-end.
//!
//! Each controller owns its own state slice behind a short-lived lock and
//! exposes a `snapshot()` for rendering. History controllers share one
//! [`crate::infrastructure::cache::HistoryCache`]; forms share one
//! [`RateLimitTracker`].

pub mod analytics_service;
pub mod bulk_service;
mod history_loader;
pub mod history_service;
pub mod infinite_history;
pub mod rate_limit_tracker;
pub mod shorten_service;

pub use analytics_service::{AnalyticsPanel, AnalyticsState, TOP_REFERRERS_SHOWN};
pub use bulk_service::{BulkShortenForm, BulkState, parse_url_list, results_csv};
pub use history_service::{FetchStatus, HistoryController, HistoryView};
pub use infinite_history::{InfiniteHistory, InfiniteView};
pub use rate_limit_tracker::RateLimitTracker;
pub use shorten_service::{ShortenForm, ShortenRequest, ShortenState};
