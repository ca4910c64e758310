//! # Wall Follower Library
//!
//! A reactive wall-following controller for a differential-drive robot.
//!
//! ## Structure
//!
//! ```text
//! wallfollow_library/
//! ── messages/       # CmdVel, LaserScan, RangeSample, Status
//! ── algorithms/     # Range classifier and wall-follow controller
//! ── nodes/          # WallFollowerNode
//! ── host            # Sensor, actuator and diagnostics seams
//! ── config          # TOML configuration
//! ```
//!
//! The controller is transport-free: it takes range samples and timer
//! ticks and returns decisions. [`WallFollowerNode`] wires it to topics and
//! to a node timer on the `wallfollow_core` scheduler.
//!
//! ## Usage
//!
//! ```rust
//! use wallfollow_library::{CmdVel, RangeSample, WallFollowConfig};
//!
//! let mut controller = WallFollowConfig::default().controller();
//! let decision = controller.on_sample(RangeSample::new(3.0, 10.0), 0.0);
//! assert_eq!(decision.command, Some(CmdVel::new(0.5, 0.0)));
//! ```

pub mod algorithms;
pub mod config;
pub mod error;
pub mod host;
pub mod messages;
pub mod nodes;

pub use config::WallFollowConfig;
pub use error::{Result, WallFollowError};
pub use host::{ActuatorSink, DiagnosticsSink, SensorFeed};
pub use nodes::WallFollowerNode;

// Re-export message types at the crate root for convenience
pub use messages::*;
