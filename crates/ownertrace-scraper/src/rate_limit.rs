//! Request pacing shared by every fetch in a search.
//!
//! The people-search site throttles aggressively, so every page request waits
//! for a slot on a [`RateLimiter`]. The limiter is shared (behind an `Arc`)
//! by concurrent relative fetches: slots are handed out one at a time and each
//! caller sleeps until at least `min_gap` (plus optional jitter) has passed
//! since the previous slot. A failed request pushes the next slot further out
//! by `failure_gap`.

use std::time::Duration;

use rand::Rng;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Pacing parameters for a [`RateLimiter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingConfig {
    /// Minimum spacing between consecutive request starts.
    pub min_gap: Duration,
    /// Spacing applied after a failed request instead of `min_gap`.
    pub failure_gap: Duration,
    /// Upper bound of the random delay added on top of the gap.
    pub jitter: Duration,
}

impl PacingConfig {
    #[must_use]
    pub fn from_millis(min_gap_ms: u64, failure_gap_ms: u64, jitter_ms: u64) -> Self {
        Self {
            min_gap: Duration::from_millis(min_gap_ms),
            failure_gap: Duration::from_millis(failure_gap_ms),
            jitter: Duration::from_millis(jitter_ms),
        }
    }

    /// No pacing at all. Used by tests.
    #[must_use]
    pub fn disabled() -> Self {
        Self::from_millis(0, 0, 0)
    }
}

#[derive(Debug)]
struct SlotState {
    /// Earliest instant at which the next request may start.
    next_allowed: Option<Instant>,
}

/// Awaited, shared request pacer.
#[derive(Debug)]
pub struct RateLimiter {
    config: PacingConfig,
    state: Mutex<SlotState>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: PacingConfig) -> Self {
        Self {
            config,
            state: Mutex::new(SlotState { next_allowed: None }),
        }
    }

    #[must_use]
    pub fn config(&self) -> PacingConfig {
        self.config
    }

    /// Waits until the caller may start a request and reserves the slot.
    ///
    /// The lock is held across the sleep so that concurrent callers queue
    /// behind each other instead of all waking at the same instant.
    pub async fn acquire(&self) {
        let mut state = self.state.lock().await;
        if let Some(next_allowed) = state.next_allowed {
            let now = Instant::now();
            if next_allowed > now {
                tokio::time::sleep(next_allowed - now).await;
            }
        }
        let gap = self.config.min_gap + self.jitter();
        state.next_allowed = Some(Instant::now() + gap);
    }

    /// Pushes the next slot out to at least `failure_gap` from now.
    pub async fn record_failure(&self) {
        let mut state = self.state.lock().await;
        let after_failure = Instant::now() + self.config.failure_gap;
        state.next_allowed = Some(match state.next_allowed {
            Some(existing) if existing > after_failure => existing,
            _ => after_failure,
        });
    }

    fn jitter(&self) -> Duration {
        let max_ms = u64::try_from(self.config.jitter.as_millis()).unwrap_or(u64::MAX);
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=max_ms))
    }
}
