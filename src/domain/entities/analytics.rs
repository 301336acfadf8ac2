//! Click analytics for a single short link.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label used for referrers without a source.
pub const DIRECT_REFERRER: &str = "Direct";

/// Aggregated click counters computed by the server.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsSummary {
    pub total_clicks: u64,
    pub unique_clicks: u64,
    pub today_clicks: u64,
    pub avg_clicks_per_day: f64,
    pub last_click_date: Option<DateTime<Utc>>,
    pub top_referrers: Vec<Referrer>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Referrer {
    pub source: String,
    pub count: u64,
}

impl Referrer {
    /// Source label for display; empty sources are direct visits.
    pub fn label(&self) -> &str {
        if self.source.trim().is_empty() {
            DIRECT_REFERRER
        } else {
            &self.source
        }
    }
}

impl AnalyticsSummary {
    /// The first `n` referrers in server order.
    pub fn top_referrers(&self, n: usize) -> &[Referrer] {
        let end = n.min(self.top_referrers.len());
        &self.top_referrers[..end]
    }
}
