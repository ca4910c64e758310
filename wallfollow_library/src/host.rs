//! Seams between the wall follower node and its transport
//!
//! The node only sees these traits. Topics implement them for in-process
//! wiring; tests plug in plain vectors.

use crate::messages::{CmdVel, LaserScan, Status};
use wallfollow_core::Topic;

/// Source of laser scans, one per physical scan
pub trait SensorFeed: Send {
    /// Next pending scan, oldest first
    fn next_scan(&mut self) -> Option<LaserScan>;
}

/// Destination for velocity commands. Fire-and-forget.
pub trait ActuatorSink: Send {
    fn apply(&mut self, command: CmdVel);
}

/// Destination for operator status lines
pub trait DiagnosticsSink: Send {
    fn report(&mut self, status: &Status);
}

impl SensorFeed for Topic<LaserScan> {
    fn next_scan(&mut self) -> Option<LaserScan> {
        self.recv()
    }
}

impl ActuatorSink for Topic<CmdVel> {
    fn apply(&mut self, command: CmdVel) {
        self.send(command);
    }
}

impl DiagnosticsSink for Topic<Status> {
    fn report(&mut self, status: &Status) {
        self.send(status.clone());
    }
}
