use crate::core::{Node, NodeInfo, NodeState};
use crate::error::{CoreError, CoreResult};
use crate::scheduling::clock::{MonotonicClock, SharedClock};
use crate::scheduling::timer::PeriodicScheduler;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const DEFAULT_RATE_HZ: f64 = 100.0;

/// Slack for rate checks so a node due "exactly now" is not pushed to the
/// next spin by rounding.
const RATE_EPSILON: f64 = 1e-9;

/// Node registration info with lifecycle tracking and per-node rate control
struct RegisteredNode {
    node: Box<dyn Node>,
    priority: u32,
    initialized: bool,
    context: NodeInfo,
    rate_hz: Option<f64>,  // None = tick on every spin
    last_tick: Option<f64>,
}

impl RegisteredNode {
    fn is_active(&self) -> bool {
        !matches!(
            self.context.state(),
            NodeState::Error(_) | NodeState::Stopped
        )
    }

    fn is_due(&self, now: f64) -> bool {
        match (self.rate_hz, self.last_tick) {
            (Some(rate), Some(last)) => now - last + RATE_EPSILON >= 1.0 / rate,
            _ => true,
        }
    }
}

/// Central orchestrator: holds nodes, drives the tick loop.
///
/// Everything happens on the calling thread. Within one spin, nodes tick in
/// priority order (0 first), then expired timers are dispatched in the same
/// order. No two callbacks ever overlap.
pub struct Scheduler {
    nodes: Vec<RegisteredNode>,
    running: Arc<AtomicBool>,
    clock: SharedClock,
    rate_hz: f64,
    period: Duration,
    scheduler_name: String,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Create an empty scheduler on the wall-time monotonic clock.
    pub fn new() -> Self {
        Self::new_with_clock(MonotonicClock::shared())
    }

    /// Create an empty scheduler on the given clock. Every node context and
    /// timer table reads time from it.
    pub fn new_with_clock(clock: SharedClock) -> Self {
        Self {
            nodes: Vec::new(),
            running: Arc::new(AtomicBool::new(true)),
            clock,
            rate_hz: DEFAULT_RATE_HZ,
            period: Duration::from_secs_f64(1.0 / DEFAULT_RATE_HZ),
            scheduler_name: "DefaultScheduler".to_string(),
        }
    }

    /// Set the scheduler name (chainable)
    pub fn name(mut self, name: &str) -> Self {
        self.scheduler_name = name.to_string();
        self
    }

    /// Set the global loop rate used by [`run`](Self::run) and
    /// [`run_for`](Self::run_for)
    pub fn with_rate(mut self, rate_hz: f64) -> CoreResult<Self> {
        if !(rate_hz.is_finite() && rate_hz > 0.0) {
            return Err(CoreError::InvalidRate(rate_hz));
        }
        // Rates so low that the period overflows a Duration are rejected too
        self.period = Duration::try_from_secs_f64(1.0 / rate_hz)
            .map_err(|_| CoreError::InvalidRate(rate_hz))?;
        self.rate_hz = rate_hz;
        Ok(self)
    }

    pub fn rate_hz(&self) -> f64 {
        self.rate_hz
    }

    pub fn clock(&self) -> SharedClock {
        Arc::clone(&self.clock)
    }

    /// Register a node. Lower priority numbers tick first; nodes with equal
    /// priority keep their registration order.
    pub fn add(
        &mut self,
        node: Box<dyn Node>,
        priority: u32,
        logging_enabled: Option<bool>,
    ) -> &mut Self {
        let node_name = node.name();
        let logging_enabled = logging_enabled.unwrap_or(false);
        let context = NodeInfo::new(node_name, logging_enabled, Arc::clone(&self.clock));

        let index = self
            .nodes
            .iter()
            .position(|n| n.priority > priority)
            .unwrap_or(self.nodes.len());
        self.nodes.insert(
            index,
            RegisteredNode {
                node,
                priority,
                initialized: false,
                context,
                rate_hz: None,
                last_tick: None,
            },
        );

        tracing::info!(
            "Added node '{}' with priority {} (logging: {})",
            node_name,
            priority,
            logging_enabled
        );
        self
    }

    /// Set per-node rate control (chainable)
    ///
    /// A node with a rate ticks at most that often; nodes without one tick
    /// on every spin.
    pub fn set_node_rate(&mut self, name: &str, rate_hz: f64) -> &mut Self {
        if !(rate_hz.is_finite() && rate_hz > 0.0) {
            tracing::warn!("Ignoring invalid rate {} Hz for node '{}'", rate_hz, name);
            return self;
        }
        match self.nodes.iter_mut().find(|n| n.node.name() == name) {
            Some(registered) => {
                registered.rate_hz = Some(rate_hz);
                tracing::info!("Set node '{}' rate to {:.1} Hz", name, rate_hz);
            }
            None => tracing::warn!("Cannot set rate: no node named '{}'", name),
        }
        self
    }

    /// Node names in execution order
    pub fn node_names(&self) -> Vec<&'static str> {
        self.nodes.iter().map(|n| n.node.name()).collect()
    }

    /// Context of a registered node, for monitoring and tests
    pub fn node_info(&self, name: &str) -> Option<&NodeInfo> {
        self.nodes
            .iter()
            .find(|n| n.node.name() == name)
            .map(|n| &n.context)
    }

    /// Shared flag that keeps [`run`](Self::run) looping; clear it from a
    /// signal handler to stop the scheduler.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Run one scheduling cycle: initialize new nodes, tick every due node,
    /// then dispatch expired timers.
    pub fn spin_once(&mut self) -> CoreResult<()> {
        self.init_pending()?;

        let now = self.clock.now();

        for registered in self.nodes.iter_mut() {
            if !registered.is_active() || !registered.is_due(now) {
                continue;
            }
            registered.last_tick = Some(now);
            registered.node.tick(&mut registered.context);
            registered.context.record_tick();
        }

        for registered in self.nodes.iter_mut() {
            if !registered.is_active() {
                continue;
            }
            let due = registered.context.timers_mut().take_due(now);
            for timer in due {
                // An earlier callback in this batch may have cancelled it
                if !registered.context.timers().is_armed(timer) {
                    continue;
                }
                registered.context.record_timer_fire();
                registered.node.on_timer(timer, &mut registered.context);
            }
        }

        Ok(())
    }

    /// Main loop: spin at the global rate until stopped, then shut down
    pub fn run(&mut self) -> CoreResult<()> {
        self.run_loop(None)
    }

    /// Run all nodes for a specified duration, then shutdown gracefully
    pub fn run_for(&mut self, duration: Duration) -> CoreResult<()> {
        self.run_loop(Some(duration))
    }

    fn run_loop(&mut self, duration: Option<Duration>) -> CoreResult<()> {
        let period = self.period;
        let start_time = Instant::now();

        tracing::info!(
            "Scheduler '{}' running {} node(s) at {:.1} Hz",
            self.scheduler_name,
            self.nodes.len(),
            self.rate_hz
        );

        let result = loop {
            if !self.is_running() {
                tracing::info!("Scheduler '{}' stopped", self.scheduler_name);
                break Ok(());
            }
            if let Some(max_duration) = duration {
                if start_time.elapsed() >= max_duration {
                    tracing::info!("Scheduler reached time limit of {:?}", max_duration);
                    break Ok(());
                }
            }

            let spin_start = Instant::now();
            if let Err(e) = self.spin_once() {
                break Err(e);
            }

            if let Some(remaining) = period.checked_sub(spin_start.elapsed()) {
                std::thread::sleep(remaining);
            }
        };

        let shutdown = self.shutdown();
        result.and(shutdown)
    }

    /// Shut down every initialized node and disarm its timers.
    ///
    /// All nodes are shut down even if one fails; the first failure is
    /// returned.
    pub fn shutdown(&mut self) -> CoreResult<()> {
        let mut first_error = None;

        for registered in self.nodes.iter_mut() {
            if !registered.initialized || *registered.context.state() == NodeState::Stopped {
                continue;
            }
            let name = registered.node.name();
            if let Err(e) = registered.node.shutdown(&mut registered.context) {
                registered.context.log_error(&format!("Shutdown failed: {}", e));
                first_error.get_or_insert(CoreError::NodeShutdown {
                    node: name.to_string(),
                    reason: e.to_string(),
                });
            }
            registered.context.timers_mut().clear();
            registered.context.set_state(NodeState::Stopped);
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn init_pending(&mut self) -> CoreResult<()> {
        for registered in self.nodes.iter_mut() {
            if registered.initialized || !registered.is_active() {
                continue;
            }
            let name = registered.node.name();
            match registered.node.init(&mut registered.context) {
                Ok(()) => {
                    registered.initialized = true;
                    registered.context.set_state(NodeState::Running);
                    tracing::debug!("Initialized node '{}'", name);
                }
                Err(e) => {
                    registered
                        .context
                        .set_state(NodeState::Error(format!("Initialization failed: {}", e)));
                    return Err(CoreError::NodeInit {
                        node: name.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
