//! # Scheduling
//!
//! Serial scheduler that orchestrates node execution:
//!
//! - **Scheduler**: ticks nodes in priority order, optionally rate limited
//! - **Timers**: per-node periodic callbacks, armed and cancelled by the node
//! - **Clocks**: monotonic seconds, real or manually driven
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wallfollow_core::Scheduler;
//!
//! let mut scheduler = Scheduler::new().with_rate(50.0)?;
//! scheduler.add(Box::new(sensor_node), 0, Some(true));
//! scheduler.add(Box::new(control_node), 10, Some(true));
//! scheduler.run()?; // initializes nodes automatically
//! ```

pub mod clock;
pub mod scheduler;
pub mod timer;

pub use clock::{Clock, ManualClock, MonotonicClock, SharedClock};
pub use scheduler::Scheduler;
pub use timer::{PeriodicScheduler, TimerId, TimerTable};
