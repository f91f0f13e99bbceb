#![forbid(unsafe_code)]

//! Trailing-edge debounce for resize notifications.
//!
//! Every [`notify`](ResizeDebouncer::notify) re-arms the timer with the
//! latest size; [`poll`](ResizeDebouncer::poll) yields that size once the
//! delay has passed without another notification. The caller owns the
//! clock, so the debouncer never sleeps and is trivial to drive from an
//! event loop tick or a test.

use paneshell_core::Size;
use web_time::{Duration, Instant};

/// Default quiet period before a resize is acted on.
pub const DEFAULT_RESIZE_DELAY: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    size: Size,
    deadline: Instant,
}

#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    delay: Duration,
    pending: Option<Pending>,
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_RESIZE_DELAY)
    }
}

impl ResizeDebouncer {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    #[must_use]
    pub const fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a resize to `size` at `now`, replacing any pending one.
    ///
    /// Returns `true` if an earlier pending resize was superseded.
    pub fn notify(&mut self, size: Size, now: Instant) -> bool {
        let superseded = self.pending.is_some();
        self.pending = Some(Pending {
            size,
            deadline: now + self.delay,
        });
        superseded
    }

    /// The settled size, once the delay has elapsed. Fires at most once per
    /// burst of notifications.
    pub fn poll(&mut self, now: Instant) -> Option<Size> {
        match self.pending {
            Some(pending) if now >= pending.deadline => {
                self.pending = None;
                Some(pending.size)
            }
            _ => None,
        }
    }

    /// Drop the pending resize, returning it.
    pub fn cancel(&mut self) -> Option<Size> {
        self.pending.take().map(|pending| pending.size)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending resize will fire.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|pending| pending.deadline)
    }
}
