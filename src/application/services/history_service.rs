//! Paginated history controller.
//!
//! Shows one page of past shortenings at a time. Pages are read cache-first
//! from the shared [`HistoryCache`]; a cache hit restores state without a
//! network call, a miss fetches the page and stores it.
//!
//! # State machine
//!
//! `Idle → Loading → Loaded | Error`. A failed fetch keeps the previously
//! loaded items so the user still sees something while retrying.
//!
//! # Cancellation
//!
//! Every request takes a generation number. A newer request or
//! [`HistoryController::close`] bumps the generation, and a response that
//! arrives for an older one is dropped with [`ClientError::Closed`].

use super::history_loader::HistoryLoader;
use crate::domain::entities::{HistoryItem, HistoryPage, PageSize, PaginationState};
use crate::domain::repositories::ShortenerApi;
use crate::error::{ClientError, ClientResult};
use crate::infrastructure::cache::{CacheStats, HistoryCache};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{error, info};

/// Fallback shown when a history fetch fails without a server message.
pub const HISTORY_FALLBACK: &str = "Failed to fetch history";

/// Lifecycle of the most recent history request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error,
}

/// Snapshot of a [`HistoryController`] for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryView {
    pub status: FetchStatus,
    pub items: Vec<HistoryItem>,
    pub pagination: PaginationState,
    pub error: Option<String>,
}

impl HistoryView {
    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }
}

#[derive(Debug, Default)]
struct HistoryState {
    status: FetchStatus,
    items: Vec<HistoryItem>,
    pagination: PaginationState,
    error: Option<String>,
    generation: u64,
    closed: bool,
}

impl HistoryState {
    fn apply(&mut self, page_no: u32, limit: PageSize, page: HistoryPage) {
        self.pagination = PaginationState::new(page_no, page.total_pages, page.total_items, limit);
        self.items = page.items;
        self.status = FetchStatus::Loaded;
        self.error = None;
    }

    /// Starts a request for `(page_no, limit)` and returns its generation.
    fn begin(&mut self, page_no: u32, limit: PageSize) -> u64 {
        self.generation += 1;
        self.status = FetchStatus::Loading;
        self.error = None;
        self.pagination = PaginationState::new(
            page_no,
            self.pagination.total_pages,
            self.pagination.total_items,
            limit,
        );
        self.generation
    }

    fn is_current(&self, generation: u64) -> bool {
        !self.closed && self.generation == generation
    }
}

/// Controller for the paginated history list.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use url_shortener_client::application::services::HistoryController;
/// use url_shortener_client::infrastructure::cache::HistoryCache;
/// use url_shortener_client::infrastructure::http::HttpShortenerApi;
///
/// # async fn example(api: HttpShortenerApi) -> url_shortener_client::error::ClientResult<()> {
/// let controller = HistoryController::new(Arc::new(api), Arc::new(HistoryCache::default()));
/// controller.load().await?;
/// controller.go_to_page(2).await?;
/// println!("{:?}", controller.snapshot().pagination);
/// # Ok(())
/// # }
/// ```
pub struct HistoryController<A> {
    loader: HistoryLoader<A>,
    state: Mutex<HistoryState>,
}

impl<A: ShortenerApi> HistoryController<A> {
    pub fn new(api: Arc<A>, cache: Arc<HistoryCache>) -> Self {
        Self::with_page_size(api, cache, PageSize::DEFAULT)
    }

    pub fn with_page_size(api: Arc<A>, cache: Arc<HistoryCache>, limit: PageSize) -> Self {
        let state = HistoryState {
            pagination: PaginationState::new(1, 1, 0, limit),
            ..Default::default()
        };

        Self {
            loader: HistoryLoader::new(api, cache),
            state: Mutex::new(state),
        }
    }

    /// Loads the current page, cache-first.
    ///
    /// # Errors
    ///
    /// Returns the API error (the view moves to [`FetchStatus::Error`]) or
    /// [`ClientError::Closed`] when the response was superseded.
    pub async fn load(&self) -> ClientResult<()> {
        let (page, limit) = self.position();
        self.fetch(page, limit, false).await
    }

    /// Re-fetches the current page from the network and overwrites its
    /// cache entry.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub async fn refresh(&self) -> ClientResult<()> {
        let (page, limit) = self.position();
        self.fetch(page, limit, true).await
    }

    /// Moves to page `page`, cache-first. Pages outside
    /// `1..=total_pages` are ignored.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub async fn go_to_page(&self, page: u32) -> ClientResult<()> {
        let (in_range, limit) = {
            let state = self.lock();
            (state.pagination.contains_page(page), state.pagination.items_per_page)
        };

        if !in_range {
            return Ok(());
        }
        self.fetch(page, limit, false).await
    }

    /// Switches page size and goes back to page 1, cache-first.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for a size outside 5, 10, 20, 50;
    /// otherwise same as [`load`](Self::load).
    pub async fn change_items_per_page(&self, limit: u32) -> ClientResult<()> {
        let limit = PageSize::try_from(limit)?;
        self.fetch(1, limit, false).await
    }

    /// Drops the cached pages of the current page size.
    pub fn clear_cache(&self) {
        let pagination = self.lock().pagination;
        self.loader
            .purge(pagination.total_pages, pagination.items_per_page);
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.loader.stats()
    }

    /// Tears the view down. Responses still in flight are discarded.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.generation += 1;
        if state.status == FetchStatus::Loading {
            state.status = FetchStatus::Idle;
        }
    }

    pub fn snapshot(&self) -> HistoryView {
        let state = self.lock();
        HistoryView {
            status: state.status,
            items: state.items.clone(),
            pagination: state.pagination,
            error: state.error.clone(),
        }
    }

    async fn fetch(&self, page_no: u32, limit: PageSize, force: bool) -> ClientResult<()> {
        let generation = {
            let mut state = self.lock();
            if state.closed {
                return Err(ClientError::Closed);
            }

            if !force {
                if let Some(page) = self.loader.cached(page_no, limit) {
                    state.generation += 1;
                    state.apply(page_no, limit, page);
                    return Ok(());
                }
            }

            state.begin(page_no, limit)
        };

        let result = self.loader.fetch(page_no, limit).await;

        let mut state = self.lock();
        if !state.is_current(generation) {
            return Err(ClientError::Closed);
        }

        match result {
            Ok(page) => {
                info!(
                    "Loaded history page {} ({} items, {} pages)",
                    page_no,
                    page.items.len(),
                    page.total_pages
                );
                state.apply(page_no, limit, page);
                Ok(())
            }
            Err(e) => {
                error!("Failed to fetch history page {}: {}", page_no, e);
                state.status = FetchStatus::Error;
                state.error = Some(e.user_message(HISTORY_FALLBACK));
                Err(e)
            }
        }
    }

    fn position(&self) -> (u32, PageSize) {
        let state = self.lock();
        (state.pagination.current_page, state.pagination.items_per_page)
    }

    fn lock(&self) -> MutexGuard<'_, HistoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
