use serde::{Deserialize, Serialize};
use std::fmt;

/// Command velocity message for robot control
///
/// Linear and angular velocity for a differential-drive base. Carries no
/// timestamp, so two commands with the same velocities compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CmdVel {
    pub linear: f32,  // m/s forward velocity
    pub angular: f32, // rad/s turning velocity, positive turns left
}

impl CmdVel {
    pub fn new(linear: f32, angular: f32) -> Self {
        Self { linear, angular }
    }

    /// Create a zero velocity command (stop)
    pub fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn is_zero(&self) -> bool {
        self.linear == 0.0 && self.angular == 0.0
    }
}

impl Default for CmdVel {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for CmdVel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "linear={:.3} angular={:.3}", self.linear, self.angular)
    }
}
