//! Tracks the most recent rate-limit status and clears it when it lapses.

use crate::domain::entities::RateLimitStatus;
use crate::error::{ClientError, ClientResult};
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct TrackerState {
    status: Option<RateLimitStatus>,
    received_at: Option<Instant>,
    /// Bumped by every update or clear; a timer only fires for its own.
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl TrackerState {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    fn limited(&self) -> Option<&RateLimitStatus> {
        self.status.as_ref().filter(|s| s.is_rate_limited)
    }

    fn time_remaining(&self) -> u64 {
        let Some(status) = self.limited() else {
            return 0;
        };

        if status.reset_time.is_some() {
            return status.seconds_remaining_at(Utc::now().timestamp());
        }

        let elapsed = self.received_at.map_or(0, |at| at.elapsed().as_secs());
        status.retry_after.unwrap_or(0).saturating_sub(elapsed)
    }

    /// Drops a limited status whose countdown has reached zero.
    fn expire_if_lapsed(&mut self) {
        if self.limited().is_some() && self.time_remaining() == 0 {
            self.cancel_timer();
            self.generation += 1;
            self.status = None;
            self.received_at = None;
            info!("Rate limit cleared");
        }
    }
}

/// Holds the latest [`RateLimitStatus`] seen by any form.
///
/// Every [`update`](Self::update) arms a one-shot timer for the derived
/// countdown; when it elapses the tracker clears itself. A newer update,
/// an explicit [`clear`](Self::clear) or dropping the tracker cancels the
/// pending timer.
///
/// A limited status whose countdown is already zero (a bare `429`, or
/// `remaining: 0` with no reset time) lapses immediately. Reads also
/// expire a lapsed status, so the tracker never reports "limited" with a
/// zero countdown, even without a Tokio runtime to drive the timer.
#[derive(Debug, Default)]
pub struct RateLimitTracker {
    state: Arc<Mutex<TrackerState>>,
}

impl RateLimitTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the held status and re-arms the auto-clear timer.
    pub fn update(&self, status: RateLimitStatus) {
        let mut state = self.lock();
        state.cancel_timer();
        state.generation += 1;

        let received_at = Instant::now();
        state.status = Some(status);
        state.received_at = Some(received_at);

        if state.limited().is_none() {
            return;
        }

        let remaining = state.time_remaining();
        if remaining == 0 {
            debug!("Rate limit carried no countdown");
            state.expire_if_lapsed();
            return;
        }

        info!("Rate limited, retry in {}s", remaining);
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let weak = Arc::downgrade(&self.state);
            let generation = state.generation;
            let deadline = received_at + Duration::from_secs(remaining);
            state.timer = Some(runtime.spawn(expire_at(weak, generation, deadline)));
        }
    }

    /// Resets to "not limited" and cancels the pending timer.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.cancel_timer();
        state.generation += 1;
        state.status = None;
        state.received_at = None;
    }

    pub fn status(&self) -> Option<RateLimitStatus> {
        let mut state = self.lock();
        state.expire_if_lapsed();
        state.status.clone()
    }

    pub fn is_rate_limited(&self) -> bool {
        let mut state = self.lock();
        state.expire_if_lapsed();
        state.limited().is_some()
    }

    /// Seconds until the limit lapses: `reset_time - now` when a reset time
    /// is known, otherwise `retry_after` minus the time since the update.
    pub fn time_remaining(&self) -> u64 {
        self.lock().time_remaining()
    }

    /// Fails fast while limited, so no request is sent.
    ///
    /// # Errors
    ///
    /// Returns a `429` [`ClientError::Api`] whose message carries the
    /// countdown, e.g. "Rate limit exceeded. Try again in 12s".
    pub fn check(&self) -> ClientResult<()> {
        let mut state = self.lock();
        state.expire_if_lapsed();
        match state.limited() {
            Some(status) => Err(ClientError::rate_limited(
                limited_message(state.time_remaining()),
                status.clone(),
            )),
            None => Ok(()),
        }
    }

    /// Records the rate-limit status carried by a failed call, if any.
    ///
    /// Returns the countdown text to show the user while the `429` holds.
    /// A `429` without a countdown returns `None`, leaving the caller to
    /// show the server message.
    pub fn observe_error(&self, error: &ClientError) -> Option<String> {
        let status = error.rate_limit()?;
        warn!("Rate limit hit: {}", error);
        self.update(status.clone());

        let remaining = self.time_remaining();
        (remaining > 0).then(|| limited_message(remaining))
    }

    /// Records a limit signalled on an otherwise successful response.
    pub fn observe_reply(&self, status: Option<&RateLimitStatus>) {
        if let Some(status) = status.filter(|s| s.is_rate_limited) {
            self.update(status.clone());
        }
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for RateLimitTracker {
    fn drop(&mut self) {
        self.lock().cancel_timer();
    }
}

fn limited_message(seconds: u64) -> String {
    format!("Rate limit exceeded. Try again in {seconds}s")
}

async fn expire_at(state: Weak<Mutex<TrackerState>>, generation: u64, deadline: Instant) {
    tokio::time::sleep_until(deadline).await;

    let Some(state) = state.upgrade() else {
        return;
    };
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);

    if state.generation != generation {
        debug!("Rate limit timer superseded");
        return;
    }

    state.status = None;
    state.received_at = None;
    state.timer = None;
    info!("Rate limit cleared");
}
