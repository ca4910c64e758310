//! Application configuration: the wall follower, the simulated world and
//! the runtime, one TOML table each.

use crate::sim::SimConfig;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use wallfollow_library::WallFollowConfig;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "wallfollow.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub wall_follower: WallFollowConfig,
    #[serde(default)]
    pub sim: SimConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Scheduler spin rate in Hz (default: 100)
    #[serde(default = "default_rate_hz")]
    pub rate_hz: f64,

    /// Stop after this many seconds; run until Ctrl+C when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            rate_hz: default_rate_hz(),
            duration_secs: None,
        }
    }
}

fn default_rate_hz() -> f64 {
    100.0
}

impl RuntimeConfig {
    /// Run limit as a `Duration`, `None` to run until stopped
    pub fn duration(&self) -> Result<Option<Duration>> {
        self.duration_secs
            .map(|secs| {
                Duration::try_from_secs_f64(secs)
                    .with_context(|| format!("runtime.duration_secs {} is out of range", secs))
            })
            .transpose()
    }

    fn validate(&self) -> Result<()> {
        if !(self.rate_hz.is_finite() && self.rate_hz > 0.0) {
            bail!("runtime.rate_hz must be positive, got {}", self.rate_hz);
        }
        Duration::try_from_secs_f64(1.0 / self.rate_hz)
            .with_context(|| format!("runtime.rate_hz {} is too low", self.rate_hz))?;
        self.duration()?;
        Ok(())
    }
}

impl AppConfig {
    /// Load from `path`, or from `wallfollow.toml` if present, or defaults
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::load(DEFAULT_CONFIG_FILE),
            None => {
                tracing::debug!("No configuration file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.wall_follower.validate()?;
        self.sim.validate().map_err(anyhow::Error::msg)?;

        self.runtime.validate()
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
