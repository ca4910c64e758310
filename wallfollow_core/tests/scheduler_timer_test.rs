// Timer dispatch through the scheduler
use wallfollow_core::{
    CoreError, CoreResult, ManualClock, Node, NodeInfo, NodeState, PeriodicScheduler, Scheduler,
    TimerId, Topic,
};

/// Arms a timer on init and cancels it after a fixed number of fires
struct BurstNode {
    period: f64,
    fires_before_cancel: u32,
    timer: Option<TimerId>,
    fired: Topic<f64>,
}

impl BurstNode {
    fn new(period: f64, fires_before_cancel: u32, fired: Topic<f64>) -> Self {
        Self {
            period,
            fires_before_cancel,
            timer: None,
            fired,
        }
    }
}

impl Node for BurstNode {
    fn name(&self) -> &'static str {
        "burst"
    }

    fn init(&mut self, ctx: &mut NodeInfo) -> CoreResult<()> {
        self.timer = Some(ctx.timers_mut().arm(self.period)?);
        Ok(())
    }

    fn tick(&mut self, _ctx: &mut NodeInfo) {}

    fn on_timer(&mut self, timer: TimerId, ctx: &mut NodeInfo) {
        assert_eq!(Some(timer), self.timer);
        self.fired.send(ctx.now());
        if self.fired.published_count() >= u64::from(self.fires_before_cancel) {
            if let Some(id) = self.timer.take() {
                ctx.timers_mut()
                    .cancel(id)
                    .expect("timer cancelled exactly once");
            }
        }
    }
}

struct FailingNode;

impl Node for FailingNode {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn init(&mut self, _ctx: &mut NodeInfo) -> CoreResult<()> {
        Err(CoreError::InvalidPeriod(-1.0))
    }

    fn tick(&mut self, _ctx: &mut NodeInfo) {
        panic!("a node that failed to initialize must never tick");
    }
}

#[test]
fn test_timer_fires_until_cancelled() {
    let clock = ManualClock::new(100.0);
    let fired = Topic::new("fired", 64);
    let mut scheduler = Scheduler::new_with_clock(clock.shared());
    scheduler.add(Box::new(BurstNode::new(0.5, 3, fired.clone())), 0, Some(true));

    for _ in 0..20 {
        scheduler.spin_once().unwrap();
        clock.advance(0.25);
    }

    assert_eq!(fired.drain(), vec![100.5, 101.0, 101.5]);

    let info = scheduler.node_info("burst").unwrap();
    assert_eq!(info.timer_fires(), 3);
    assert_eq!(info.timers().armed_count(), 0);
    assert_eq!(info.tick_count(), 20);
}

#[test]
fn test_init_failure_is_reported() {
    let mut scheduler = Scheduler::new_with_clock(ManualClock::new(0.0).shared());
    scheduler.add(Box::new(FailingNode), 0, None);

    let result = scheduler.spin_once();
    assert!(matches!(result, Err(CoreError::NodeInit { ref node, .. }) if node == "failing"));
    assert!(matches!(
        scheduler.node_info("failing").unwrap().state(),
        NodeState::Error(_)
    ));

    // Failed nodes stay parked on later spins
    assert!(scheduler.spin_once().is_ok());
}

#[test]
fn test_shutdown_disarms_timers() {
    let clock = ManualClock::new(0.0);
    let fired = Topic::new("fired", 8);
    let mut scheduler = Scheduler::new_with_clock(clock.shared());
    scheduler.add(Box::new(BurstNode::new(1.0, 100, fired.clone())), 0, None);

    scheduler.spin_once().unwrap();
    assert_eq!(scheduler.node_info("burst").unwrap().timers().armed_count(), 1);

    scheduler.shutdown().unwrap();
    let info = scheduler.node_info("burst").unwrap();
    assert_eq!(*info.state(), NodeState::Stopped);
    assert_eq!(info.timers().armed_count(), 0);

    clock.advance(5.0);
    scheduler.spin_once().unwrap();
    assert!(fired.is_empty());
}

#[test]
fn test_run_for_stops_on_time() {
    let fired = Topic::new("fired", 8);
    let mut scheduler = Scheduler::new().with_rate(200.0).unwrap();
    scheduler.add(Box::new(BurstNode::new(10.0, 1, fired)), 0, None);

    let result = scheduler.run_for(std::time::Duration::from_millis(50));
    assert!(result.is_ok());
    assert_eq!(
        *scheduler.node_info("burst").unwrap().state(),
        NodeState::Stopped
    );
}
