//! Result of a successful shorten call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A freshly created short link as returned by the API.
///
/// Immutable once received; the form that requested it owns it until the
/// next submission or a reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenResult {
    pub original_url: String,
    #[serde(alias = "short_url")]
    pub short_url: String,
    #[serde(default)]
    pub alias: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clicks: Option<u64>,
}
