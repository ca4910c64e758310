use crate::algorithms::wall_follow::{
    ControlEvent, Decision, SessionId, TimerRequest, WallFollowController,
};
use crate::config::WallFollowConfig;
use crate::host::{ActuatorSink, DiagnosticsSink, SensorFeed};
use crate::messages::{CmdVel, LaserScan, Status};
use wallfollow_core::{CoreResult, Node, NodeInfo, PeriodicScheduler, TimerId, Topic};

/// Wall Follower Node - keeps a stand-off distance from a wall
///
/// Reads the forward beam of every laser scan, publishes velocity commands
/// and escapes corners on a periodic timer. Status lines describing each
/// decision go to the diagnostics sink.
pub struct WallFollowerNode<F = Topic<LaserScan>, A = Topic<CmdVel>, D = Topic<Status>> {
    feed: F,
    actuator: A,
    diagnostics: D,
    controller: WallFollowController,

    // Host timer of the running escape, keyed by its session
    escape_timer: Option<(SessionId, TimerId)>,

    last_command: Option<CmdVel>,
    scans_processed: u64,
    invalid_samples: u64,
    escapes_completed: u64,
}

impl WallFollowerNode {
    /// Create a node with default configuration and its own topics
    pub fn new() -> Self {
        Self::from_config(&WallFollowConfig::default())
    }

    /// Create a node whose topics are named by `config.topics`
    pub fn from_config(config: &WallFollowConfig) -> Self {
        let topics = &config.topics;
        Self::with_io(
            config.controller(),
            Topic::new(&topics.scan, topics.depth),
            Topic::new(&topics.cmd_vel, topics.depth),
            Topic::new(&topics.status, topics.depth),
        )
    }
}

impl Default for WallFollowerNode {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: SensorFeed, A: ActuatorSink, D: DiagnosticsSink> WallFollowerNode<F, A, D> {
    /// Create a node over arbitrary transport
    pub fn with_io(controller: WallFollowController, feed: F, actuator: A, diagnostics: D) -> Self {
        Self {
            feed,
            actuator,
            diagnostics,
            controller,
            escape_timer: None,
            last_command: None,
            scans_processed: 0,
            invalid_samples: 0,
            escapes_completed: 0,
        }
    }

    pub fn controller(&self) -> &WallFollowController {
        &self.controller
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    /// Timer currently driving a corner escape
    pub fn escape_timer(&self) -> Option<TimerId> {
        self.escape_timer.map(|(_, timer)| timer)
    }

    pub fn last_command(&self) -> Option<CmdVel> {
        self.last_command
    }

    pub fn scans_processed(&self) -> u64 {
        self.scans_processed
    }

    pub fn invalid_samples(&self) -> u64 {
        self.invalid_samples
    }

    pub fn escapes_completed(&self) -> u64 {
        self.escapes_completed
    }

    fn handle_scan(&mut self, scan: &LaserScan, ctx: &mut NodeInfo) {
        self.scans_processed += 1;
        let decision = match scan.front_sample() {
            Some(sample) => self.controller.on_sample(sample, ctx.now()),
            None => self.controller.on_empty_scan(),
        };
        self.apply(decision, ctx);
    }

    fn apply(&mut self, decision: Decision, ctx: &mut NodeInfo) {
        if let Some(command) = decision.command {
            self.actuator.apply(command);
            self.last_command = Some(command);
        }

        match decision.timer {
            TimerRequest::Keep => {}
            TimerRequest::Arm {
                session,
                period_secs,
            } => self.arm_escape_timer(session, period_secs, ctx),
            TimerRequest::Cancel { session } => self.cancel_escape_timer(session, ctx),
        }

        self.report(&decision.event, ctx);
    }

    fn arm_escape_timer(&mut self, session: SessionId, period_secs: f64, ctx: &mut NodeInfo) {
        if let Some((stale, timer)) = self.escape_timer.take() {
            self.fault(ctx, format!("Escape timer {} of {} still armed", timer, stale));
            if let Err(e) = ctx.timers_mut().cancel(timer) {
                self.fault(ctx, format!("Failed to cancel stale escape timer: {}", e));
            }
        }

        match ctx.timers_mut().arm(period_secs) {
            Ok(timer) => {
                ctx.log_debug(&format!("Armed {} for {}", timer, session));
                self.escape_timer = Some((session, timer));
            }
            Err(e) => self.fault(ctx, format!("Failed to arm escape timer: {}", e)),
        }
    }

    fn cancel_escape_timer(&mut self, session: SessionId, ctx: &mut NodeInfo) {
        match self.escape_timer.take() {
            Some((armed, timer)) if armed == session => {
                if let Err(e) = ctx.timers_mut().cancel(timer) {
                    self.fault(ctx, format!("Failed to cancel escape timer: {}", e));
                }
                self.escapes_completed += 1;
            }
            Some(other) => {
                self.fault(ctx, format!("Cancel for {} while {} is armed", session, other.0));
                self.escape_timer = Some(other);
            }
            None => ctx.log_warning(&format!("Cancel for {} with no timer armed", session)),
        }
    }

    /// Timer bookkeeping failures are logged and surface as error statuses
    fn fault(&mut self, ctx: &mut NodeInfo, message: String) {
        ctx.log_error(&message);
        self.diagnostics.report(&Status::error(message));
    }

    fn report(&mut self, event: &ControlEvent, ctx: &mut NodeInfo) {
        let message = event.to_string();
        let status = match event {
            ControlEvent::Invalid(_) => {
                self.invalid_samples += 1;
                ctx.log_warning(&message);
                Status::warn(message)
            }
            ControlEvent::EscapeStarted { .. }
            | ControlEvent::ReverseComplete
            | ControlEvent::EscapeComplete { .. } => {
                ctx.log_info(&message);
                Status::info(message)
            }
            _ => {
                ctx.log_debug(&message);
                Status::info(message)
            }
        };
        self.diagnostics.report(&status);
    }
}

impl<F: SensorFeed, A: ActuatorSink, D: DiagnosticsSink> Node for WallFollowerNode<F, A, D> {
    fn name(&self) -> &'static str {
        "wall_follower"
    }

    fn init(&mut self, ctx: &mut NodeInfo) -> CoreResult<()> {
        let bands = self.controller.bands();
        ctx.log_info(&format!(
            "Wall follower ready: desired {:.2} m +/- {:.2}, corner below {:.2} m",
            bands.desired, bands.tolerance, bands.corner_threshold
        ));
        Ok(())
    }

    fn tick(&mut self, ctx: &mut NodeInfo) {
        while let Some(scan) = self.feed.next_scan() {
            self.handle_scan(&scan, ctx);
        }
    }

    fn on_timer(&mut self, timer: TimerId, ctx: &mut NodeInfo) {
        match self.escape_timer {
            Some((_, armed)) if armed == timer => {
                let decision = self.controller.on_tick(ctx.now());
                self.apply(decision, ctx);
            }
            _ => ctx.log_warning(&format!("Unknown timer {} fired", timer)),
        }
    }

    fn shutdown(&mut self, ctx: &mut NodeInfo) -> CoreResult<()> {
        if let Some((session, timer)) = self.escape_timer.take() {
            ctx.log_info(&format!("Abandoning {} at shutdown", session));
            // The robot is stopped below even if the timer is already gone
            if let Err(e) = ctx.timers_mut().cancel(timer) {
                self.fault(ctx, format!("Failed to cancel escape timer: {}", e));
            }
        }

        self.actuator.apply(CmdVel::zero());
        self.last_command = Some(CmdVel::zero());
        ctx.log_info(&format!(
            "Wall follower stopped after {} scans, {} corner escapes",
            self.scans_processed, self.escapes_completed
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::wall_follow::{EscapePhase, Mode};
    use crate::messages::StatusLevel;
    use wallfollow_core::ManualClock;

    #[derive(Default)]
    struct VecFeed(Vec<LaserScan>);

    impl SensorFeed for VecFeed {
        fn next_scan(&mut self) -> Option<LaserScan> {
            if self.0.is_empty() {
                None
            } else {
                Some(self.0.remove(0))
            }
        }
    }

    #[derive(Default)]
    struct VecSink(Vec<CmdVel>);

    impl ActuatorSink for VecSink {
        fn apply(&mut self, command: CmdVel) {
            self.0.push(command);
        }
    }

    #[derive(Default)]
    struct VecDiagnostics(Vec<Status>);

    impl DiagnosticsSink for VecDiagnostics {
        fn report(&mut self, status: &Status) {
            self.0.push(status.clone());
        }
    }

    fn scan(front: f32) -> LaserScan {
        LaserScan {
            angle_min: -0.1,
            angle_max: 0.1,
            angle_increment: 0.1,
            range_min: 0.1,
            range_max: 10.0,
            ranges: vec![5.0, front, 5.0],
        }
    }

    fn node(scans: Vec<LaserScan>) -> WallFollowerNode<VecFeed, VecSink, VecDiagnostics> {
        WallFollowerNode::with_io(
            WallFollowConfig::default().controller(),
            VecFeed(scans),
            VecSink::default(),
            VecDiagnostics::default(),
        )
    }

    #[test]
    fn test_tick_drains_scans_in_order() {
        let clock = ManualClock::new(0.0);
        let mut ctx = NodeInfo::new("wall_follower", false, clock.shared());
        let mut node = node(vec![scan(2.5), scan(3.0), scan(3.5)]);

        node.tick(&mut ctx);

        assert_eq!(
            node.actuator().0,
            vec![
                CmdVel::new(0.25, -0.3),
                CmdVel::new(0.5, 0.0),
                CmdVel::new(0.25, 0.3 / 3.0),
            ]
        );
        assert_eq!(node.scans_processed(), 3);
        assert_eq!(node.diagnostics().0.len(), 3);
    }

    #[test]
    fn test_invalid_scans_warn_without_command() {
        let clock = ManualClock::new(0.0);
        let mut ctx = NodeInfo::new("wall_follower", false, clock.shared());
        let empty = LaserScan {
            ranges: Vec::new(),
            ..scan(0.0)
        };
        let mut node = node(vec![scan(f32::NAN), scan(f32::INFINITY), empty]);

        node.tick(&mut ctx);

        assert!(node.actuator().0.is_empty());
        assert_eq!(node.invalid_samples(), 3);
        assert_eq!(ctx.warnings_count(), 3);
        assert!(node
            .diagnostics()
            .0
            .iter()
            .all(|s| s.level == StatusLevel::Warn));
        assert_eq!(node.controller().mode(), Mode::NormalFollow);
    }

    #[test]
    fn test_corner_arms_timer_and_ignores_rest_of_queue() {
        let clock = ManualClock::new(10.0);
        let mut ctx = NodeInfo::new("wall_follower", false, clock.shared());
        let mut node = node(vec![scan(1.5), scan(3.0)]);

        node.tick(&mut ctx);

        assert!(node.actuator().0.is_empty());
        assert_eq!(node.controller().escape_phase(), Some(EscapePhase::Reversing));
        let timer = node.escape_timer().unwrap();
        assert!(ctx.timers().is_armed(timer));
        assert_eq!(ctx.timers().armed_count(), 1);
    }

    #[test]
    fn test_foreign_timer_is_a_warning() {
        let clock = ManualClock::new(0.0);
        let mut ctx = NodeInfo::new("wall_follower", false, clock.shared());
        let mut node = node(Vec::new());
        let foreign = ctx.timers_mut().arm(1.0).unwrap();

        node.on_timer(foreign, &mut ctx);

        assert_eq!(ctx.warnings_count(), 1);
        assert!(node.actuator().0.is_empty());
    }

    #[test]
    fn test_shutdown_mid_escape_cancels_timer_and_stops() {
        let clock = ManualClock::new(0.0);
        let mut ctx = NodeInfo::new("wall_follower", false, clock.shared());
        let mut node = node(vec![scan(1.0)]);
        node.tick(&mut ctx);
        assert_eq!(ctx.timers().armed_count(), 1);

        node.shutdown(&mut ctx).unwrap();

        assert_eq!(ctx.timers().armed_count(), 0);
        assert_eq!(node.escape_timer(), None);
        assert_eq!(node.actuator().0.last(), Some(&CmdVel::zero()));
    }

    #[test]
    fn test_shutdown_stops_robot_when_timer_cancel_fails() {
        let clock = ManualClock::new(0.0);
        let mut ctx = NodeInfo::new("wall_follower", false, clock.shared());
        let mut node = node(vec![scan(1.0)]);
        node.tick(&mut ctx);
        // Timer vanishes behind the node's back
        let timer = node.escape_timer().unwrap();
        ctx.timers_mut().cancel(timer).unwrap();

        assert!(node.shutdown(&mut ctx).is_ok());

        assert_eq!(node.actuator().0.last(), Some(&CmdVel::zero()));
        assert_eq!(node.last_command(), Some(CmdVel::zero()));
        assert_eq!(ctx.errors_count(), 1);
        let last = node.diagnostics().0.last().unwrap();
        assert_eq!(last.level, StatusLevel::Error);
        assert!(last.message.contains("Failed to cancel escape timer"));
    }

    #[test]
    fn test_stale_timer_cancel_failure_is_reported() {
        let clock = ManualClock::new(0.0);
        let mut ctx = NodeInfo::new("wall_follower", false, clock.shared());
        let mut node = node(vec![scan(1.0)]);
        // Bookkeeping still holds a timer the table no longer knows
        let stale = ctx.timers_mut().arm(1.0).unwrap();
        ctx.timers_mut().cancel(stale).unwrap();
        node.escape_timer = Some((SessionId(99), stale));

        node.tick(&mut ctx);

        assert_eq!(ctx.errors_count(), 2);
        let errors: Vec<_> = node
            .diagnostics()
            .0
            .iter()
            .filter(|s| s.level == StatusLevel::Error)
            .map(|s| s.message.as_str())
            .collect();
        assert_eq!(errors.len(), 2);
        assert!(errors[1].contains("Failed to cancel stale escape timer"));

        // The new escape still gets its timer
        let timer = node.escape_timer().unwrap();
        assert_ne!(timer, stale);
        assert!(ctx.timers().is_armed(timer));
        assert_eq!(ctx.timers().armed_count(), 1);
    }
}
