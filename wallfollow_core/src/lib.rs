//! # Wall Follower Core
//!
//! The host runtime the wall follower runs on.
//!
//! This crate provides the pieces a reactive controller needs from its
//! surroundings, and nothing more:
//!
//! - **Nodes**: units of work ticked by the scheduler
//! - **Communication**: in-process keep-last topics between nodes
//! - **Scheduling**: a serial scheduler, monotonic clocks and periodic timers
//!
//! Every node callback runs on the scheduler thread, one at a time, so node
//! state never needs a lock.
//!
//! ## Quick Start
//!
//! ```rust
//! use wallfollow_core::{Node, NodeInfo, Scheduler, Topic};
//!
//! struct Greeter {
//!     output: Topic<String>,
//! }
//!
//! impl Node for Greeter {
//!     fn name(&self) -> &'static str {
//!         "greeter"
//!     }
//!
//!     fn tick(&mut self, _ctx: &mut NodeInfo) {
//!         self.output.send("hello".to_string());
//!     }
//! }
//!
//! let output = Topic::new("greetings", 10);
//! let mut scheduler = Scheduler::new();
//! scheduler.add(Box::new(Greeter { output: output.clone() }), 0, Some(false));
//! scheduler.spin_once().unwrap();
//! assert_eq!(output.recv().as_deref(), Some("hello"));
//! ```

pub mod communication;
pub mod core;
pub mod error;
pub mod scheduling;

pub use crate::core::{Node, NodeInfo, NodeState};
pub use communication::Topic;
pub use error::{CoreError, CoreResult};
pub use scheduling::{
    Clock, ManualClock, MonotonicClock, PeriodicScheduler, Scheduler, SharedClock, TimerId,
    TimerTable,
};
