//! Monotonic clock abstraction
//!
//! The dispatch loop measures timer due-ness as a duration elapsed since
//! runtime start. Production uses [`SystemClock`]; tests drive the loop with
//! a [`ManualClock`] to make timer behavior deterministic.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source of elapsed time on the runtime's monotonic scale
pub trait Clock {
    /// Time elapsed since the runtime epoch
    fn elapsed(&self) -> Duration;
}

// ----------------------------------------------------------------------------
// System Clock
// ----------------------------------------------------------------------------

/// Wall clock; the epoch is the moment of construction
#[derive(Debug)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

// ----------------------------------------------------------------------------
// Manual Clock
// ----------------------------------------------------------------------------

/// Hand-advanced clock for tests.
///
/// Clones share the same underlying time, so a test can keep one handle and
/// hand another to the runtime.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by `delta`
    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.lock().expect("clock poisoned");
        *now += delta;
    }

    /// Set the clock to an absolute elapsed value
    pub fn set(&self, elapsed: Duration) {
        *self.now.lock().expect("clock poisoned") = elapsed;
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        *self.now.lock().expect("clock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        handle.advance(Duration::from_secs(3));
        assert_eq!(clock.elapsed(), Duration::from_secs(3));

        handle.set(Duration::from_millis(100));
        assert_eq!(clock.elapsed(), Duration::from_millis(100));
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let first = clock.elapsed();
        assert!(clock.elapsed() >= first);
    }
}
