//! Configuration loading for the wall follower

use crate::algorithms::range_classifier::ZoneBands;
use crate::algorithms::wall_follow::{EscapeTiming, SpeedProfile, WallFollowController};
use crate::error::{Result, WallFollowError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Wall follower configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WallFollowConfig {
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub escape: EscapeConfig,
    #[serde(default)]
    pub topics: TopicConfig,
}

/// Distance bands and speeds for normal following
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Stand-off distance to keep from the wall in meters (default: 3.0)
    #[serde(default = "default_desired_distance")]
    pub desired_distance: f32,

    /// Half-width of the on-target band in meters (default: 0.3)
    #[serde(default = "default_tolerance")]
    pub tolerance: f32,

    /// Forward readings below this trigger a corner escape (default: 1.9)
    #[serde(default = "default_corner_threshold")]
    pub corner_threshold: f32,

    /// Cruise speed in m/s (default: 0.5)
    #[serde(default = "default_forward_speed")]
    pub forward_speed: f32,

    /// Turn rate in rad/s (default: 0.3)
    #[serde(default = "default_turn_speed")]
    pub turn_speed: f32,
}

/// Corner escape timing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EscapeConfig {
    /// Reverse phase duration in seconds (default: 8.0)
    #[serde(default = "default_reverse_secs")]
    pub reverse_secs: f64,

    /// Forward phase duration in seconds (default: 5.0)
    #[serde(default = "default_forward_secs")]
    pub forward_secs: f64,

    /// Escape timer period in seconds (default: 0.1)
    #[serde(default = "default_tick_period_secs")]
    pub tick_period_secs: f64,
}

/// Topic names and queue depth
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopicConfig {
    #[serde(default = "default_scan_topic")]
    pub scan: String,

    #[serde(default = "default_cmd_vel_topic")]
    pub cmd_vel: String,

    #[serde(default = "default_status_topic")]
    pub status: String,

    /// Keep-last history depth of every topic (default: 10)
    #[serde(default = "default_depth")]
    pub depth: usize,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            desired_distance: default_desired_distance(),
            tolerance: default_tolerance(),
            corner_threshold: default_corner_threshold(),
            forward_speed: default_forward_speed(),
            turn_speed: default_turn_speed(),
        }
    }
}

impl Default for EscapeConfig {
    fn default() -> Self {
        Self {
            reverse_secs: default_reverse_secs(),
            forward_secs: default_forward_secs(),
            tick_period_secs: default_tick_period_secs(),
        }
    }
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            scan: default_scan_topic(),
            cmd_vel: default_cmd_vel_topic(),
            status: default_status_topic(),
            depth: default_depth(),
        }
    }
}

fn default_desired_distance() -> f32 {
    3.0
}
fn default_tolerance() -> f32 {
    0.3
}
fn default_corner_threshold() -> f32 {
    1.9
}
fn default_forward_speed() -> f32 {
    0.5
}
fn default_turn_speed() -> f32 {
    0.3
}
fn default_reverse_secs() -> f64 {
    8.0
}
fn default_forward_secs() -> f64 {
    5.0
}
fn default_tick_period_secs() -> f64 {
    0.1
}
fn default_scan_topic() -> String {
    "/diff_drive/scan".to_string()
}
fn default_cmd_vel_topic() -> String {
    "/diff_drive/cmd_vel".to_string()
}
fn default_status_topic() -> String {
    "/wall_follower/status".to_string()
}
fn default_depth() -> usize {
    10
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(WallFollowError::Config(format!(
            "{} must be positive and finite, got {}",
            name, value
        )))
    }
}

impl WallFollowConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: WallFollowConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let control = &self.control;
        require_positive("control.desired_distance", control.desired_distance as f64)?;
        require_positive("control.corner_threshold", control.corner_threshold as f64)?;
        require_positive("control.forward_speed", control.forward_speed as f64)?;
        require_positive("control.turn_speed", control.turn_speed as f64)?;
        if !(control.tolerance.is_finite() && control.tolerance >= 0.0) {
            return Err(WallFollowError::Config(format!(
                "control.tolerance must be non-negative, got {}",
                control.tolerance
            )));
        }

        let escape = &self.escape;
        require_positive("escape.reverse_secs", escape.reverse_secs)?;
        require_positive("escape.forward_secs", escape.forward_secs)?;
        require_positive("escape.tick_period_secs", escape.tick_period_secs)?;

        let topics = &self.topics;
        for (name, value) in [
            ("topics.scan", &topics.scan),
            ("topics.cmd_vel", &topics.cmd_vel),
            ("topics.status", &topics.status),
        ] {
            if value.trim().is_empty() {
                return Err(WallFollowError::Config(format!("{} must not be empty", name)));
            }
        }
        if topics.depth == 0 {
            return Err(WallFollowError::Config(
                "topics.depth must be at least 1".to_string(),
            ));
        }

        if control.corner_threshold >= control.desired_distance - control.tolerance {
            tracing::warn!(
                "corner_threshold {} reaches into the stand-off band, TooClose will never fire",
                control.corner_threshold
            );
        }
        Ok(())
    }

    pub fn zone_bands(&self) -> ZoneBands {
        ZoneBands {
            corner_threshold: self.control.corner_threshold,
            desired: self.control.desired_distance,
            tolerance: self.control.tolerance,
        }
    }

    pub fn speed_profile(&self) -> SpeedProfile {
        SpeedProfile {
            forward_speed: self.control.forward_speed,
            turn_speed: self.control.turn_speed,
        }
    }

    pub fn escape_timing(&self) -> EscapeTiming {
        EscapeTiming {
            reverse_secs: self.escape.reverse_secs,
            forward_secs: self.escape.forward_secs,
            tick_period_secs: self.escape.tick_period_secs,
        }
    }

    /// Build a controller in normal-follow mode from this configuration
    pub fn controller(&self) -> WallFollowController {
        WallFollowController::new(self.zone_bands(), self.speed_profile(), self.escape_timing())
    }
}
