//! Analytics panel for a single short link.

use crate::domain::entities::AnalyticsSummary;
use crate::domain::repositories::ShortenerApi;
use crate::error::{ClientError, ClientResult};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{error, info};

/// Fallback shown when analytics fail without a server message.
pub const ANALYTICS_FALLBACK: &str = "Failed to fetch analytics";

/// Number of referrers the panel lists.
pub const TOP_REFERRERS_SHOWN: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsState {
    pub short_id: Option<String>,
    pub summary: Option<AnalyticsSummary>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct PanelState {
    view: AnalyticsState,
    generation: u64,
}

/// Loads and keeps the click summary of one short link.
///
/// Loading a different link supersedes a request still in flight for the
/// previous one.
pub struct AnalyticsPanel<A> {
    api: Arc<A>,
    state: Mutex<PanelState>,
}

impl<A: ShortenerApi> AnalyticsPanel<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: Mutex::new(PanelState::default()),
        }
    }

    /// Fetches the summary for `short_id`. A blank id does nothing and
    /// returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns the API error, or [`ClientError::Closed`] when a newer
    /// request superseded this one.
    pub async fn load(&self, short_id: &str) -> ClientResult<Option<AnalyticsSummary>> {
        let short_id = short_id.trim();
        if short_id.is_empty() {
            return Ok(None);
        }

        let generation = {
            let mut state = self.lock();
            state.generation += 1;
            state.view.short_id = Some(short_id.to_string());
            state.view.loading = true;
            state.view.error = None;
            state.generation
        };

        let result = self.api.analytics(short_id).await;

        let mut state = self.lock();
        if state.generation != generation {
            return Err(ClientError::Closed);
        }
        state.view.loading = false;

        match result {
            Ok(reply) => {
                info!("Loaded analytics for {}: {} clicks", short_id, reply.data.total_clicks);
                state.view.summary = Some(reply.data.clone());
                Ok(Some(reply.data))
            }
            Err(e) => {
                error!("Failed to fetch analytics for {}: {}", short_id, e);
                state.view.error = Some(e.user_message(ANALYTICS_FALLBACK));
                Err(e)
            }
        }
    }

    /// Reloads the last requested link, if any.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub async fn refetch(&self) -> ClientResult<Option<AnalyticsSummary>> {
        let short_id = self.lock().view.short_id.clone();
        match short_id {
            Some(short_id) => self.load(&short_id).await,
            None => Ok(None),
        }
    }

    pub fn snapshot(&self) -> AnalyticsState {
        self.lock().view.clone()
    }

    fn lock(&self) -> MutexGuard<'_, PanelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Referrer;
    use crate::domain::repositories::{ApiReply, MockShortenerApi};
    use mockall::predicate::eq;

    fn summary(total: u64) -> AnalyticsSummary {
        AnalyticsSummary {
            total_clicks: total,
            unique_clicks: total / 2,
            top_referrers: vec![
                Referrer {
                    source: String::new(),
                    count: 4,
                },
                Referrer {
                    source: "news.ycombinator.com".to_string(),
                    count: 3,
                },
            ],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_blank_id_is_noop() {
        let mut mock = MockShortenerApi::new();
        mock.expect_analytics().never();

        let panel = AnalyticsPanel::new(Arc::new(mock));
        assert_eq!(panel.load("  ").await.unwrap(), None);
        assert_eq!(panel.refetch().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_load_and_refetch() {
        let mut mock = MockShortenerApi::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_analytics()
            .with(eq("abc123"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(ApiReply::new(summary(10))));
        mock.expect_analytics()
            .with(eq("abc123"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(ApiReply::new(summary(12))));

        let panel = AnalyticsPanel::new(Arc::new(mock));
        panel.load(" abc123 ").await.unwrap();
        assert_eq!(panel.snapshot().summary.unwrap().total_clicks, 10);

        panel.refetch().await.unwrap();
        let state = panel.snapshot();
        assert_eq!(state.summary.as_ref().unwrap().total_clicks, 12);
        assert_eq!(state.short_id.as_deref(), Some("abc123"));

        let summary = state.summary.unwrap();
        let top = summary.top_referrers(TOP_REFERRERS_SHOWN);
        assert_eq!(top[0].label(), "Direct");
        assert_eq!(top[1].label(), "news.ycombinator.com");
    }

    #[tokio::test]
    async fn test_error_keeps_previous_summary() {
        let mut mock = MockShortenerApi::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_analytics()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(ApiReply::new(summary(10))));
        mock.expect_analytics()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(ClientError::api(404, "")));

        let panel = AnalyticsPanel::new(Arc::new(mock));
        panel.load("abc123").await.unwrap();
        assert!(panel.refetch().await.is_err());

        let state = panel.snapshot();
        assert_eq!(state.error.as_deref(), Some(ANALYTICS_FALLBACK));
        assert!(state.summary.is_some());
        assert!(!state.loading);
    }
}
