//! Periodic timers owned by a node
//!
//! A node arms timers through its [`NodeInfo`](crate::NodeInfo) and receives
//! `on_timer` callbacks from the scheduler. Timers are serviced on the
//! scheduler thread, after the node ticks of the same spin.

use crate::error::{CoreError, CoreResult};
use crate::scheduling::clock::SharedClock;
use std::fmt;

/// Handle to an armed periodic timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Arms and cancels recurring callbacks at a fixed period
pub trait PeriodicScheduler {
    /// Arm a timer whose first expiry is one `period_secs` from now.
    fn arm(&mut self, period_secs: f64) -> CoreResult<TimerId>;

    /// Cancel an armed timer. Cancelling an unknown or already cancelled
    /// timer is an error.
    fn cancel(&mut self, id: TimerId) -> CoreResult<()>;

    fn is_armed(&self, id: TimerId) -> bool;
}

#[derive(Debug, Clone)]
struct ArmedTimer {
    id: TimerId,
    period: f64,
    next_due: f64,
}

/// Per-node timer table
pub struct TimerTable {
    clock: SharedClock,
    timers: Vec<ArmedTimer>,
    next_id: u64,
}

impl TimerTable {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            timers: Vec::new(),
            next_id: 1,
        }
    }

    /// Number of timers currently armed
    pub fn armed_count(&self) -> usize {
        self.timers.len()
    }

    /// Collect the timers that expired at `now` and reschedule them.
    ///
    /// Each timer fires at most once per call. A timer that fell more than a
    /// period behind skips the missed expiries instead of firing in a burst.
    pub fn take_due(&mut self, now: f64) -> Vec<TimerId> {
        let mut due = Vec::new();
        for timer in self.timers.iter_mut() {
            if now >= timer.next_due {
                due.push(timer.id);
                timer.next_due += timer.period;
                if timer.next_due <= now {
                    tracing::debug!(
                        "Timer {} fell behind by {:.3}s, skipping missed periods",
                        timer.id,
                        now - timer.next_due
                    );
                    timer.next_due = now + timer.period;
                }
            }
        }
        due
    }

    /// Earliest pending expiry, if any timer is armed
    pub fn next_deadline(&self) -> Option<f64> {
        self.timers
            .iter()
            .map(|t| t.next_due)
            .min_by(|a, b| a.total_cmp(b))
    }

    pub(crate) fn clear(&mut self) {
        self.timers.clear();
    }
}

impl PeriodicScheduler for TimerTable {
    fn arm(&mut self, period_secs: f64) -> CoreResult<TimerId> {
        if !(period_secs.is_finite() && period_secs > 0.0) {
            return Err(CoreError::InvalidPeriod(period_secs));
        }

        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(ArmedTimer {
            id,
            period: period_secs,
            next_due: self.clock.now() + period_secs,
        });
        Ok(id)
    }

    fn cancel(&mut self, id: TimerId) -> CoreResult<()> {
        let index = self
            .timers
            .iter()
            .position(|t| t.id == id)
            .ok_or(CoreError::TimerNotArmed(id))?;
        self.timers.remove(index);
        Ok(())
    }

    fn is_armed(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }
}
