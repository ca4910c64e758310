use crate::error::CoreResult;
use crate::scheduling::clock::SharedClock;
use crate::scheduling::timer::TimerTable;
use std::fmt;

/// Node states for monitoring and lifecycle management
#[derive(Debug, Clone, PartialEq)]
pub enum NodeState {
    Uninitialized,
    Running,
    Stopped,
    Error(String),
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeState::Uninitialized => write!(f, "Uninitialized"),
            NodeState::Running => write!(f, "Running"),
            NodeState::Stopped => write!(f, "Stopped"),
            NodeState::Error(msg) => write!(f, "Error: {}", msg),
        }
    }
}

/// Runtime context handed to a node on every callback
///
/// Owns the node's timers and gives it the shared clock, so a node never
/// holds a scheduler handle of its own.
pub struct NodeInfo {
    name: String,
    state: NodeState,
    logging_enabled: bool,

    clock: SharedClock,
    timers: TimerTable,

    tick_count: u64,
    timer_fires: u64,
    warnings_count: u64,
    errors_count: u64,
}

impl NodeInfo {
    pub fn new(node_name: &str, logging_enabled: bool, clock: SharedClock) -> Self {
        Self {
            name: node_name.to_string(),
            state: NodeState::Uninitialized,
            logging_enabled,
            timers: TimerTable::new(clock.clone()),
            clock,
            tick_count: 0,
            timer_fires: 0,
            warnings_count: 0,
            errors_count: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &NodeState {
        &self.state
    }

    pub fn set_state(&mut self, new_state: NodeState) {
        if self.state != new_state {
            tracing::debug!(node = %self.name, "{} -> {}", self.state, new_state);
            self.state = new_state;
        }
    }

    /// Current monotonic time in seconds
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn timers(&self) -> &TimerTable {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut TimerTable {
        &mut self.timers
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn timer_fires(&self) -> u64 {
        self.timer_fires
    }

    pub fn warnings_count(&self) -> u64 {
        self.warnings_count
    }

    pub fn errors_count(&self) -> u64 {
        self.errors_count
    }

    pub(crate) fn record_tick(&mut self) {
        self.tick_count += 1;
    }

    pub(crate) fn record_timer_fire(&mut self) {
        self.timer_fires += 1;
    }

    pub fn log_info(&self, message: &str) {
        if self.logging_enabled {
            tracing::info!(node = %self.name, "{}", message);
        }
    }

    pub fn log_debug(&self, message: &str) {
        if self.logging_enabled {
            tracing::debug!(node = %self.name, "{}", message);
        }
    }

    pub fn log_warning(&mut self, message: &str) {
        if self.logging_enabled {
            tracing::warn!(node = %self.name, "{}", message);
        }
        self.warnings_count += 1;
    }

    pub fn log_error(&mut self, message: &str) {
        // Errors are always surfaced, even with logging disabled
        tracing::error!(node = %self.name, "{}", message);
        self.errors_count += 1;
    }
}

/// A unit of work driven by the [`Scheduler`](crate::Scheduler)
///
/// All callbacks of all nodes run serially on the scheduler thread.
pub trait Node: Send {
    /// Get the node's name (must be unique)
    fn name(&self) -> &'static str;

    /// Initialize the node (called once before the first tick)
    fn init(&mut self, ctx: &mut NodeInfo) -> CoreResult<()> {
        ctx.log_info("Node initialized successfully");
        Ok(())
    }

    /// Main execution step (called once per scheduler spin, subject to the
    /// node's rate)
    fn tick(&mut self, ctx: &mut NodeInfo);

    /// A timer armed through `ctx.timers_mut()` expired
    fn on_timer(&mut self, timer: crate::scheduling::TimerId, ctx: &mut NodeInfo) {
        ctx.log_warning(&format!("Unhandled timer {}", timer));
    }

    /// Shutdown the node (called once at cleanup)
    fn shutdown(&mut self, ctx: &mut NodeInfo) -> CoreResult<()> {
        ctx.log_info("Node shutdown successfully");
        Ok(())
    }
}
