mod common;

use common::FakeApi;
use std::sync::Arc;
use std::time::Duration;
use url_shortener_client::application::services::InfiniteHistory;
use url_shortener_client::error::ClientError;
use url_shortener_client::infrastructure::cache::{HistoryCache, history_key};

fn controller(api: &Arc<FakeApi>) -> (InfiniteHistory<FakeApi>, Arc<HistoryCache>) {
    let cache = Arc::new(HistoryCache::default());
    (InfiniteHistory::new(api.clone(), cache.clone()), cache)
}

#[tokio::test(start_paused = true)]
async fn test_load_more_concatenates_all_pages_then_stops() {
    let api = Arc::new(FakeApi::new(25));
    let (history, _) = controller(&api);

    history.load().await.unwrap();
    let first = history.snapshot();
    assert_eq!(first.total_pages, 3);
    assert!(first.has_more);

    assert!(history.load_more().await.unwrap());
    assert!(history.load_more().await.unwrap());
    assert!(!history.load_more().await.unwrap());

    let view = history.snapshot();
    assert!(!view.has_more);
    assert_eq!(view.items.len(), 25);
    assert_eq!(view.items[0].id, "link-1");
    assert_eq!(view.items[24].id, "link-25");
    assert_eq!(api.requested_pages(), [(1, 10), (2, 10), (3, 10)]);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_load_more_fetches_one_page() {
    let api = Arc::new(FakeApi::new(30).with_delay(Duration::from_secs(1)));
    let (history, _) = controller(&api);
    history.load().await.unwrap();

    let (first, second) = tokio::join!(history.load_more(), history.load_more());

    assert!(first.unwrap());
    assert!(!second.unwrap());
    assert_eq!(api.history_calls(), 2);

    let view = history.snapshot();
    assert_eq!(view.items.len(), 20);
    assert_eq!(view.current_page, 2);
}

#[tokio::test(start_paused = true)]
async fn test_loading_flag_is_visible_while_fetching() {
    let api = Arc::new(FakeApi::new(30).with_delay(Duration::from_secs(5)));
    let (history, _) = controller(&api);
    let history = Arc::new(history);

    let task = tokio::spawn({
        let history = history.clone();
        async move { history.load().await }
    });

    tokio::time::sleep(Duration::from_secs(1)).await;
    let view = history.snapshot();
    assert!(view.loading);
    assert!(view.is_initial_load);

    task.await.unwrap().unwrap();
    let view = history.snapshot();
    assert!(!view.loading);
    assert!(!view.is_initial_load);
}

#[tokio::test(start_paused = true)]
async fn test_visibility_signal_drives_loading() {
    let api = Arc::new(FakeApi::new(15));
    let (history, _) = controller(&api);
    history.load().await.unwrap();

    assert!(!history.on_visibility_change(false).await.unwrap());
    assert_eq!(api.history_calls(), 1);

    assert!(history.on_visibility_change(true).await.unwrap());
    assert!(!history.on_visibility_change(true).await.unwrap());
    assert_eq!(history.snapshot().items.len(), 15);
}

#[tokio::test(start_paused = true)]
async fn test_second_controller_reads_from_shared_cache() {
    let api = Arc::new(FakeApi::new(25));
    let cache = Arc::new(HistoryCache::default());

    let first = InfiniteHistory::new(api.clone(), cache.clone());
    first.load().await.unwrap();
    first.load_more().await.unwrap();
    assert_eq!(api.history_calls(), 2);

    let second = InfiniteHistory::new(api.clone(), cache.clone());
    second.load().await.unwrap();
    second.load_more().await.unwrap();

    assert_eq!(api.history_calls(), 2);
    assert_eq!(second.snapshot().items.len(), 20);
    assert_eq!(second.cache_stats().valid, 2);
}

#[tokio::test(start_paused = true)]
async fn test_expired_pages_are_fetched_again() {
    let api = Arc::new(FakeApi::new(5));
    let (history, cache) = controller(&api);

    history.load().await.unwrap();
    assert!(cache.has(&history_key(1, 10)));

    tokio::time::advance(Duration::from_secs(301)).await;
    assert!(!cache.has(&history_key(1, 10)));

    history.load().await.unwrap();
    assert_eq!(api.history_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_close_discards_in_flight_response() {
    let api = Arc::new(FakeApi::new(30).with_delay(Duration::from_secs(2)));
    let (history, _) = controller(&api);
    let history = Arc::new(history);

    let task = tokio::spawn({
        let history = history.clone();
        async move { history.load().await }
    });

    tokio::time::sleep(Duration::from_secs(1)).await;
    history.close();

    assert_eq!(task.await.unwrap(), Err(ClientError::Closed));
    assert!(history.snapshot().items.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_refresh_supersedes_pending_append() {
    let api = Arc::new(FakeApi::new(30).with_delay(Duration::from_secs(2)));
    let (history, _) = controller(&api);
    history.load().await.unwrap();
    let history = Arc::new(history);

    let append = tokio::spawn({
        let history = history.clone();
        async move { history.load_more().await }
    });
    tokio::time::sleep(Duration::from_secs(1)).await;

    history.refresh().await.unwrap();

    assert_eq!(append.await.unwrap(), Err(ClientError::Closed));
    let view = history.snapshot();
    assert_eq!(view.items.len(), 10);
    assert_eq!(view.current_page, 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_page_reports_error_and_keeps_items() {
    let api = Arc::new(FakeApi::new(30));
    api.fail_page(2, ClientError::api(500, "History backend unavailable"));
    let (history, _) = controller(&api);

    history.load().await.unwrap();
    assert!(history.load_more().await.is_err());

    let view = history.snapshot();
    assert_eq!(view.error.as_deref(), Some("History backend unavailable"));
    assert_eq!(view.items.len(), 10);
    assert!(view.has_more);
}
