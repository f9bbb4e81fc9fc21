//! Time source and cancellation-aware waiting

use crate::error::{LocalizationError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Granularity at which a sleeping `SystemClock` checks for cancellation
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A monotonic time source that can block the caller
pub trait Clock: Send + Sync {
    /// Time elapsed since the clock was created
    fn now(&self) -> Duration;

    /// Block for `duration`. Returns `Aborted` if the wait was cancelled.
    fn sleep(&self, duration: Duration) -> Result<()>;
}

/// Shared flag used to cancel an in-progress maneuver from another thread
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Wall-clock time, sleeping the calling thread
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
    cancel: CancelToken,
}

impl SystemClock {
    pub fn new(cancel: CancelToken) -> Self {
        SystemClock {
            start: Instant::now(),
            cancel,
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&self, duration: Duration) -> Result<()> {
        let deadline = Instant::now() + duration;
        loop {
            if self.cancel.is_cancelled() {
                log::warn!("Wait of {:?} interrupted by cancellation", duration);
                return Err(LocalizationError::Aborted);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            std::thread::sleep(CANCEL_POLL_INTERVAL.min(deadline - now));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_completes_short_wait() {
        let clock = SystemClock::new(CancelToken::new());
        let before = clock.now();
        assert!(clock.sleep(Duration::from_millis(15)).is_ok());
        assert!(clock.now() - before >= Duration::from_millis(15));
    }

    #[test]
    fn cancelled_wait_reports_aborted() {
        let token = CancelToken::new();
        let clock = SystemClock::new(token.clone());
        token.cancel();
        assert_eq!(
            clock.sleep(Duration::from_secs(5)),
            Err(LocalizationError::Aborted)
        );
    }
}
