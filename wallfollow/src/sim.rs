//! Headless 2D world for the wall follower
//!
//! A unicycle robot in an axis-aligned rectangular room. The room spans
//! `[0, room_width] x [0, room_height]`; the robot carries a planar laser
//! whose middle beam points along its heading.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use wallfollow_core::{CoreError, CoreResult, Node, NodeInfo, Topic};
use wallfollow_library::{CmdVel, LaserScan};

/// Simulated world configuration (`[sim]` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub room_width: f32,  // m
    pub room_height: f32, // m
    pub start_x: f32,
    pub start_y: f32,
    pub start_heading: f32, // rad, 0 = +x
    /// Robot footprint radius used to keep it off the walls
    pub robot_radius: f32,

    pub beam_count: usize,
    pub field_of_view: f32, // rad, centered on the heading
    pub range_min: f32,
    pub range_max: f32,

    /// Gaussian range noise, 0 disables it
    pub noise_std_dev: f32,
    /// Chance that a beam returns NaN
    pub dropout_probability: f64,
    pub seed: u64,
    pub scan_rate_hz: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            room_width: 20.0,
            room_height: 12.0,
            start_x: 4.0,
            start_y: 6.0,
            start_heading: 0.0,
            robot_radius: 0.2,
            beam_count: 181,
            field_of_view: std::f32::consts::PI,
            range_min: 0.1,
            range_max: 10.0,
            noise_std_dev: 0.0,
            dropout_probability: 0.0,
            seed: 42,
            scan_rate_hz: 10.0,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.room_width > 0.0 && self.room_height > 0.0) {
            return Err("sim room dimensions must be positive".to_string());
        }
        let r = self.robot_radius;
        if !(r.is_finite() && r >= 0.0) {
            return Err(format!("sim robot_radius must be non-negative, got {}", r));
        }
        if 2.0 * r >= self.room_width.min(self.room_height) {
            return Err(format!(
                "sim robot_radius {} does not fit a {}x{} room",
                r, self.room_width, self.room_height
            ));
        }
        // The robot body must start clear of every wall
        if !((r..=self.room_width - r).contains(&self.start_x)
            && (r..=self.room_height - r).contains(&self.start_y))
        {
            return Err(format!(
                "sim start ({}, {}) lies outside the room",
                self.start_x, self.start_y
            ));
        }
        if self.beam_count == 0 {
            return Err("sim beam_count must be at least 1".to_string());
        }
        if !(self.range_min >= 0.0 && self.range_max > self.range_min) {
            return Err("sim range_max must exceed range_min".to_string());
        }
        if !(self.noise_std_dev >= 0.0 && self.noise_std_dev.is_finite()) {
            return Err("sim noise_std_dev must be non-negative".to_string());
        }
        if !(0.0..=1.0).contains(&self.dropout_probability) {
            return Err("sim dropout_probability must lie in [0, 1]".to_string());
        }
        if !(self.scan_rate_hz > 0.0 && self.scan_rate_hz.is_finite()) {
            return Err("sim scan_rate_hz must be positive".to_string());
        }
        Ok(())
    }
}

/// Planar robot pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose2D {
    pub x: f32,
    pub y: f32,
    pub theta: f32,
}

/// Distance from `origin` along `direction` to the first room wall
pub fn raycast_room(origin: [f32; 2], direction: [f32; 2], width: f32, height: f32) -> Option<f32> {
    let mut min_t = f32::INFINITY;

    for (axis, bound) in [(0, 0.0), (0, width), (1, 0.0), (1, height)] {
        let d = direction[axis];
        if d == 0.0 {
            continue;
        }
        let t = (bound - origin[axis]) / d;
        if t <= 0.0 {
            continue;
        }
        let other = 1 - axis;
        let hit = origin[other] + t * direction[other];
        let limit = if other == 0 { width } else { height };
        if (0.0..=limit).contains(&hit) {
            min_t = min_t.min(t);
        }
    }

    if min_t.is_finite() {
        Some(min_t)
    } else {
        None
    }
}

/// Sim World Node - robot kinematics and laser for the demo
///
/// Applies the most recent velocity command, integrates the pose over the
/// clock delta and publishes a scan at `scan_rate_hz`.
pub struct SimWorldNode {
    config: SimConfig,
    pose: Pose2D,
    command: CmdVel,

    commands: Topic<CmdVel>,
    scans: Topic<LaserScan>,

    rng: StdRng,
    noise: Option<Normal<f32>>,

    last_update: Option<f64>,
    last_scan: Option<f64>,
    wall_contacts: u64,
}

impl SimWorldNode {
    pub fn new(config: SimConfig, commands: Topic<CmdVel>, scans: Topic<LaserScan>) -> CoreResult<Self> {
        config.validate().map_err(|reason| CoreError::NodeInit {
            node: "sim_world".to_string(),
            reason,
        })?;

        let noise = if config.noise_std_dev > 0.0 {
            Normal::new(0.0, config.noise_std_dev).ok()
        } else {
            None
        };

        Ok(Self {
            pose: Pose2D {
                x: config.start_x,
                y: config.start_y,
                theta: config.start_heading,
            },
            command: CmdVel::zero(),
            commands,
            scans,
            rng: StdRng::seed_from_u64(config.seed),
            noise,
            last_update: None,
            last_scan: None,
            wall_contacts: 0,
            config,
        })
    }

    pub fn pose(&self) -> Pose2D {
        self.pose
    }

    /// Advance the robot by `dt` seconds under the current command.
    ///
    /// Returns true when the robot was stopped by a wall.
    pub fn integrate(&mut self, dt: f32) -> bool {
        let CmdVel { linear, angular } = self.command;
        let pose = &mut self.pose;

        pose.theta = normalize_angle(pose.theta + angular * dt);
        let x = pose.x + linear * pose.theta.cos() * dt;
        let y = pose.y + linear * pose.theta.sin() * dt;

        let r = self.config.robot_radius;
        let clamped_x = x.clamp(r, self.config.room_width - r);
        let clamped_y = y.clamp(r, self.config.room_height - r);
        pose.x = clamped_x;
        pose.y = clamped_y;

        clamped_x != x || clamped_y != y
    }

    /// Render a scan from the current pose
    pub fn scan(&mut self) -> LaserScan {
        let n = self.config.beam_count;
        let (angle_min, angle_increment) = if n > 1 {
            let half = self.config.field_of_view / 2.0;
            (-half, self.config.field_of_view / (n - 1) as f32)
        } else {
            (0.0, 0.0)
        };

        let origin = [self.pose.x, self.pose.y];
        let mut ranges = Vec::with_capacity(n);
        for i in 0..n {
            let bearing = self.pose.theta + angle_min + i as f32 * angle_increment;
            let direction = [bearing.cos(), bearing.sin()];
            let mut range = raycast_room(
                origin,
                direction,
                self.config.room_width,
                self.config.room_height,
            )
            .unwrap_or(f32::INFINITY);

            if let Some(noise) = &self.noise {
                range += noise.sample(&mut self.rng);
            }
            if range > self.config.range_max {
                range = f32::INFINITY;
            }
            if self.config.dropout_probability > 0.0
                && self.rng.gen_bool(self.config.dropout_probability)
            {
                range = f32::NAN;
            }
            ranges.push(range);
        }

        LaserScan {
            angle_min,
            angle_max: angle_min + (n.saturating_sub(1)) as f32 * angle_increment,
            angle_increment,
            range_min: self.config.range_min,
            range_max: self.config.range_max,
            ranges,
        }
    }
}

fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::PI;
    let mut a = angle;
    while a > PI {
        a -= 2.0 * PI;
    }
    while a < -PI {
        a += 2.0 * PI;
    }
    a
}

impl Node for SimWorldNode {
    fn name(&self) -> &'static str {
        "sim_world"
    }

    fn init(&mut self, ctx: &mut NodeInfo) -> CoreResult<()> {
        ctx.log_info(&format!(
            "Room {:.1} x {:.1} m, robot at ({:.2}, {:.2}) heading {:.2} rad",
            self.config.room_width,
            self.config.room_height,
            self.pose.x,
            self.pose.y,
            self.pose.theta
        ));
        Ok(())
    }

    fn tick(&mut self, ctx: &mut NodeInfo) {
        let now = ctx.now();

        // Only the latest command matters
        if let Some(command) = self.commands.drain().pop() {
            self.command = command;
        }

        if let Some(last) = self.last_update {
            let dt = (now - last) as f32;
            if dt > 0.0 && self.integrate(dt) {
                self.wall_contacts += 1;
                if self.wall_contacts == 1 || self.wall_contacts % 100 == 0 {
                    ctx.log_warning(&format!(
                        "Robot touching wall at ({:.2}, {:.2})",
                        self.pose.x, self.pose.y
                    ));
                }
            }
        }
        self.last_update = Some(now);

        let scan_due = match self.last_scan {
            Some(last) => now - last >= 1.0 / self.config.scan_rate_hz - 1e-9,
            None => true,
        };
        if scan_due {
            let scan = self.scan();
            self.scans.send(scan);
            self.last_scan = Some(now);
        }
    }

    fn shutdown(&mut self, ctx: &mut NodeInfo) -> CoreResult<()> {
        ctx.log_info(&format!(
            "Final pose ({:.2}, {:.2}, {:.2} rad), {} wall contacts",
            self.pose.x, self.pose.y, self.pose.theta, self.wall_contacts
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use wallfollow_core::ManualClock;

    fn room_10x10() -> SimConfig {
        SimConfig {
            room_width: 10.0,
            room_height: 10.0,
            start_x: 5.0,
            start_y: 5.0,
            beam_count: 5,
            ..SimConfig::default()
        }
    }

    fn world(config: SimConfig) -> (SimWorldNode, Topic<CmdVel>, Topic<LaserScan>) {
        let commands = Topic::new("cmd_vel", 10);
        let scans = Topic::new("scan", 10);
        let node = SimWorldNode::new(config, commands.clone(), scans.clone()).unwrap();
        (node, commands, scans)
    }

    #[test]
    fn test_raycast_hits_nearest_wall() {
        assert_relative_eq!(raycast_room([5.0, 5.0], [1.0, 0.0], 10.0, 10.0).unwrap(), 5.0);
        assert_relative_eq!(raycast_room([2.0, 5.0], [-1.0, 0.0], 10.0, 10.0).unwrap(), 2.0);
        assert_relative_eq!(raycast_room([5.0, 3.0], [0.0, -1.0], 10.0, 10.0).unwrap(), 3.0);

        let diagonal = std::f32::consts::FRAC_1_SQRT_2;
        let t = raycast_room([5.0, 5.0], [diagonal, diagonal], 10.0, 10.0).unwrap();
        assert_relative_eq!(t, 5.0 * std::f32::consts::SQRT_2, epsilon = 1e-4);
    }

    #[test]
    fn test_front_beam_sees_wall_ahead() {
        let (mut node, _, _) = world(room_10x10());
        let scan = node.scan();
        assert_eq!(scan.ranges.len(), 5);
        assert_relative_eq!(scan.ranges[scan.front_index()], 5.0, epsilon = 1e-4);
        assert_relative_eq!(scan.angle_of(scan.front_index()), 0.0, epsilon = 1e-6);
        // Leftmost beam points at +y
        assert_relative_eq!(scan.ranges[4], 5.0, epsilon = 1e-4);
    }

    #[test]
    fn test_beyond_max_range_is_infinite() {
        let (mut node, _, _) = world(SimConfig {
            range_max: 3.0,
            ..room_10x10()
        });
        let scan = node.scan();
        assert!(scan.ranges.iter().all(|r| r.is_infinite()));
    }

    #[test]
    fn test_full_dropout_yields_nan() {
        let (mut node, _, _) = world(SimConfig {
            dropout_probability: 1.0,
            ..room_10x10()
        });
        assert!(node.scan().ranges.iter().all(|r| r.is_nan()));
    }

    #[test]
    fn test_noise_is_reproducible_per_seed() {
        let noisy = SimConfig {
            noise_std_dev: 0.05,
            seed: 7,
            ..room_10x10()
        };
        let (mut a, _, _) = world(noisy.clone());
        let (mut b, _, _) = world(noisy);
        let scan_a = a.scan();
        assert_eq!(scan_a, b.scan());
        assert!(scan_a.ranges.iter().any(|&r| r != 5.0));
    }

    #[test]
    fn test_kinematics_straight_and_turning() {
        let (mut node, _, _) = world(room_10x10());
        node.command = CmdVel::new(1.0, 0.0);
        assert!(!node.integrate(1.0));
        assert_relative_eq!(node.pose().x, 6.0, epsilon = 1e-5);
        assert_relative_eq!(node.pose().y, 5.0, epsilon = 1e-5);

        node.command = CmdVel::new(0.0, std::f32::consts::FRAC_PI_2);
        node.integrate(1.0);
        assert_relative_eq!(node.pose().theta, std::f32::consts::FRAC_PI_2, epsilon = 1e-5);
        assert_relative_eq!(node.pose().x, 6.0, epsilon = 1e-5);
    }

    #[test]
    fn test_walls_stop_the_robot() {
        let (mut node, _, _) = world(room_10x10());
        node.command = CmdVel::new(1.0, 0.0);
        assert!(node.integrate(10.0));
        assert_relative_eq!(node.pose().x, 10.0 - 0.2, epsilon = 1e-5);
    }

    #[test]
    fn test_tick_applies_latest_command_and_publishes_at_scan_rate() {
        let clock = ManualClock::new(0.0);
        let mut ctx = NodeInfo::new("sim_world", false, clock.shared());
        let (mut node, commands, scans) = world(room_10x10());

        commands.send(CmdVel::new(-1.0, 0.0));
        commands.send(CmdVel::new(0.5, 0.0));
        node.tick(&mut ctx);
        assert_eq!(scans.drain().len(), 1);

        for _ in 0..10 {
            clock.advance(0.05);
            node.tick(&mut ctx);
        }

        // 0.5 s at 0.5 m/s, scans every 0.1 s
        assert_relative_eq!(node.pose().x, 5.25, epsilon = 1e-4);
        assert_eq!(scans.drain().len(), 5);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let bad = SimConfig {
            start_x: 50.0,
            ..SimConfig::default()
        };
        assert!(bad.validate().is_err());
        let commands = Topic::new("cmd_vel", 1);
        let scans = Topic::new("scan", 1);
        assert!(matches!(
            SimWorldNode::new(bad, commands, scans),
            Err(CoreError::NodeInit { .. })
        ));
    }

    #[test]
    fn test_robot_radius_must_fit_the_room() {
        // Wider than the 12 m room height
        let oversized = SimConfig {
            robot_radius: 7.0,
            ..SimConfig::default()
        };
        assert!(oversized.validate().is_err());

        let undefined = SimConfig {
            robot_radius: f32::NAN,
            ..SimConfig::default()
        };
        assert!(undefined.validate().is_err());

        let negative = SimConfig {
            robot_radius: -0.1,
            ..SimConfig::default()
        };
        assert!(negative.validate().is_err());

        // Start pose inside the room but within one radius of a wall
        let touching = SimConfig {
            start_x: 0.1,
            ..SimConfig::default()
        };
        assert!(touching.validate().is_err());

        let flush = SimConfig {
            start_x: 0.2,
            start_y: 11.5,
            ..SimConfig::default()
        };
        assert!(flush.validate().is_ok());
    }
}
