//! Monotonic time sources
//!
//! Deadlines throughout the runtime are plain `f64` seconds read from a
//! [`Clock`]. Production code uses [`MonotonicClock`]; tests drive time by hand
//! with [`ManualClock`].

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// Source of monotonic time in seconds
pub trait Clock: Send + Sync {
    /// Seconds since an arbitrary fixed origin. Never decreases.
    fn now(&self) -> f64;
}

/// Clock handle shared between the scheduler and every node context
pub type SharedClock = Arc<dyn Clock>;

/// Wall-time monotonic clock backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn shared() -> SharedClock {
        Arc::new(Self::new())
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Manually advanced clock for deterministic tests and replays
///
/// Clones share the same time, so a test can keep one handle and give
/// another to the scheduler.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<f64>>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Move time forward by `secs`. Negative steps are ignored.
    pub fn advance(&self, secs: f64) {
        if secs > 0.0 {
            *self.now.lock() += secs;
        }
    }

    /// Jump to an absolute time. Going backwards is ignored.
    pub fn set(&self, secs: f64) {
        let mut now = self.now.lock();
        if secs > *now {
            *now = secs;
        }
    }

    pub fn shared(&self) -> SharedClock {
        Arc::new(self.clone())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        *self.now.lock()
    }
}
