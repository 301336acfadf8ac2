//! Rate-limit status derived from response headers.

use serde::{Deserialize, Serialize};

/// Snapshot of the server's rate-limit signals.
///
/// `is_rate_limited` is true whenever `remaining_requests <= 0` or a
/// `retry_after` was supplied; [`RateLimitStatus::from_headers_values`]
/// enforces that.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitStatus {
    pub is_rate_limited: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_requests: Option<i64>,
    /// Epoch seconds at which the window resets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_time: Option<i64>,
    /// Seconds to wait before retrying.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl RateLimitStatus {
    /// Builds a status from already-parsed header values.
    pub fn from_headers_values(
        remaining_requests: Option<i64>,
        reset_time: Option<i64>,
        retry_after: Option<u64>,
    ) -> Self {
        let is_rate_limited =
            retry_after.is_some() || remaining_requests.is_some_and(|remaining| remaining <= 0);

        Self {
            is_rate_limited,
            remaining_requests,
            reset_time,
            retry_after,
        }
    }

    /// Seconds left as seen at `now_epoch`, before any elapsed-time countdown.
    ///
    /// `reset_time` wins over `retry_after`; a status that is not limited
    /// always reports zero.
    pub fn seconds_remaining_at(&self, now_epoch: i64) -> u64 {
        if !self.is_rate_limited {
            return 0;
        }

        if let Some(reset) = self.reset_time {
            return u64::try_from(reset - now_epoch).unwrap_or(0);
        }

        self.retry_after.unwrap_or(0)
    }
}
