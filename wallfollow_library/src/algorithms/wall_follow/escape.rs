//! Corner escape sessions
//!
//! A session is the bounded lifetime of one corner escape: it is created when
//! a corner is detected and dropped when the forward phase expires.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one escape session. Never reused within a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub(crate) u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "escape-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EscapePhase {
    /// Backing away from the corner while turning right
    Reversing,
    /// Driving forward at half speed while still turning right
    DrivingForward,
}

impl fmt::Display for EscapePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EscapePhase::Reversing => f.write_str("reversing"),
            EscapePhase::DrivingForward => f.write_str("driving forward"),
        }
    }
}

/// Phase durations and the driver period of a corner escape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EscapeTiming {
    pub reverse_secs: f64,
    pub forward_secs: f64,
    pub tick_period_secs: f64,
}

impl Default for EscapeTiming {
    fn default() -> Self {
        Self {
            reverse_secs: 8.0,
            forward_secs: 5.0,
            tick_period_secs: 0.1,
        }
    }
}

/// A running corner escape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscapeSession {
    id: SessionId,
    phase: EscapePhase,
    deadline: f64,
    started_at: f64,
}

impl EscapeSession {
    pub(crate) fn begin(id: SessionId, now: f64, timing: &EscapeTiming) -> Self {
        Self {
            id,
            phase: EscapePhase::Reversing,
            deadline: now + timing.reverse_secs,
            started_at: now,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn phase(&self) -> EscapePhase {
        self.phase
    }

    /// Monotonic time at which the current phase expires
    pub fn deadline(&self) -> f64 {
        self.deadline
    }

    pub fn started_at(&self) -> f64 {
        self.started_at
    }

    /// Time equal to the deadline counts as expired.
    pub fn is_expired(&self, now: f64) -> bool {
        now >= self.deadline
    }

    pub(crate) fn enter_forward_phase(&mut self, now: f64, timing: &EscapeTiming) {
        self.phase = EscapePhase::DrivingForward;
        self.deadline = now + timing.forward_secs;
    }
}
