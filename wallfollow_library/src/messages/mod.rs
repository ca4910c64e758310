//! Message types exchanged between nodes
//!
//! - Control: velocity commands for the drive base
//! - Sensor: laser scans and the single forward range sample
//! - Diagnostics: human-readable status lines
//!
//! All message types are re-exported at the crate root for convenience.

pub mod cmd_vel;
pub mod diagnostics;
pub mod sensor;

pub use cmd_vel::CmdVel;
pub use diagnostics::{Status, StatusLevel};
pub use sensor::{LaserScan, RangeSample};
