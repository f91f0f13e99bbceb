#![forbid(unsafe_code)]

//! Cooperative cancellation flags for pool tasks.
//!
//! A [`CancelSource`] is held by the pool, one per tag plus one pool-wide.
//! Every task receives a [`CancelToken`] observing its source and polls
//! [`CancelToken::is_cancelled`] at safe points. Nothing is ever preempted.
//!
//! Unlike a one-shot token, a source can be [`reset`](CancelSource::reset)
//! so a tag can be reused after a cancel request has been served.
//!
//! ```
//! use paneshell_runtime::cancel::CancelSource;
//!
//! let source = CancelSource::new();
//! let token = source.token();
//! source.cancel();
//! assert!(token.is_cancelled());
//! source.reset();
//! assert!(!token.is_cancelled());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use web_time::{Duration, Instant};

struct Flag {
    cancelled: AtomicBool,
    notify: (Mutex<()>, Condvar),
}

/// Read side of a cancel flag. Cheap to clone and `Send`.
#[derive(Clone)]
pub struct CancelToken {
    flag: Arc<Flag>,
}

/// Write side of a cancel flag.
///
/// Dropping the source leaves its tokens in whatever state they were.
#[derive(Clone)]
pub struct CancelSource {
    flag: Arc<Flag>,
}

impl std::fmt::Debug for CancelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelSource")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl CancelSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            flag: Arc::new(Flag {
                cancelled: AtomicBool::new(false),
                notify: (Mutex::new(()), Condvar::new()),
            }),
        }
    }

    #[must_use]
    pub fn token(&self) -> CancelToken {
        CancelToken {
            flag: Arc::clone(&self.flag),
        }
    }

    /// Raise the flag and wake every token blocked in
    /// [`CancelToken::wait_timeout`].
    pub fn cancel(&self) {
        self.flag.cancelled.store(true, Ordering::Release);
        let (lock, cvar) = &self.flag.notify;
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        cvar.notify_all();
    }

    /// Lower the flag. Existing tokens observe the reset.
    pub fn reset(&self) {
        self.flag.cancelled.store(false, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    /// A token that is never cancelled.
    #[must_use]
    pub fn never() -> Self {
        CancelSource::new().token()
    }

    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.cancelled.load(Ordering::Acquire)
    }

    /// Block until cancelled or `duration` elapses.
    ///
    /// Returns `true` if cancelled.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let (lock, cvar) = &self.flag.notify;
        let mut guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if self.is_cancelled() {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            guard = cvar
                .wait_timeout(guard, remaining)
                .unwrap_or_else(|e| e.into_inner())
                .0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn new_source_is_clear() {
        let source = CancelSource::new();
        assert!(!source.is_cancelled());
        assert!(!source.token().is_cancelled());
    }

    #[test]
    fn cancel_reaches_every_token() {
        let source = CancelSource::new();
        let a = source.token();
        let b = a.clone();
        source.cancel();
        source.cancel();
        assert!(a.is_cancelled());
        assert!(b.is_cancelled());
    }

    #[test]
    fn reset_clears_for_reuse() {
        let source = CancelSource::new();
        let token = source.token();
        source.cancel();
        source.reset();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn never_token_stays_clear() {
        assert!(!CancelToken::never().wait_timeout(Duration::from_millis(5)));
    }

    #[test]
    fn wait_timeout_wakes_on_cancel() {
        let source = CancelSource::new();
        let token = source.token();
        let waiter = thread::spawn(move || token.wait_timeout(Duration::from_secs(10)));
        thread::sleep(Duration::from_millis(20));
        source.cancel();
        assert!(waiter.join().unwrap());
    }

    #[test]
    fn wait_timeout_returns_immediately_when_cancelled() {
        let source = CancelSource::new();
        source.cancel();
        assert!(source.token().wait_timeout(Duration::from_secs(10)));
    }
}
