//! History entries and the page payload cached per `(page, limit)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read-only projection of one previously shortened URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    pub original_url: String,
    pub short_url: String,
    #[serde(default)]
    pub alias: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub clicks: u64,
}

/// One normalized page of history.
///
/// This is the value stored in the TTL cache, so a cache hit can restore
/// the controller state without touching the network.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryPage {
    pub items: Vec<HistoryItem>,
    /// Always at least 1.
    pub total_pages: u32,
    pub total_items: u64,
}

impl HistoryPage {
    /// Creates a page, clamping `total_pages` to at least 1.
    pub fn new(items: Vec<HistoryItem>, total_pages: u32, total_items: u64) -> Self {
        Self {
            items,
            total_pages: total_pages.max(1),
            total_items,
        }
    }

    /// Whether pages after `page` exist.
    pub fn has_more_after(&self, page: u32) -> bool {
        page < self.total_pages
    }
}
