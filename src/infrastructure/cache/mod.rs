//! Caching layer for history pages.
//!
//! Provides a generic [`TtlCache`] and the keying scheme used for history:
//! one entry per `(page, limit)` pair.

mod ttl_cache;

pub use ttl_cache::{CacheStats, DEFAULT_TTL, TtlCache};

use crate::domain::entities::HistoryPage;

/// Cache of normalized history pages.
pub type HistoryCache = TtlCache<HistoryPage>;

/// Deterministic cache key for one history page.
pub fn history_key(page: u32, limit: u32) -> String {
    format!("page_{page}_{limit}")
}
