//! wallfollow - wall follower controller driving a simulated robot
//!
//! Usage:
//!   wallfollow                          # defaults, or ./wallfollow.toml if present
//!   wallfollow --config my.toml --duration 60
//!   wallfollow --print-config > wallfollow.toml

mod config;
mod sim;

use anyhow::{Context, Result};
use clap::Parser;
use config::AppConfig;
use sim::SimWorldNode;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wallfollow_core::Scheduler;
use wallfollow_library::WallFollowerNode;

const DEFAULT_LOG_FILTER: &str = "wallfollow=info,wallfollow_library=info,wallfollow_core=info";

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "wallfollow")]
#[command(about = "Reactive wall follower with corner escape, run against a 2D room simulation")]
struct Args {
    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop after this many seconds
    #[arg(long)]
    duration: Option<f64>,

    /// Scheduler rate in Hz
    #[arg(long)]
    rate: Option<f64>,

    /// Simulator random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Log filter, e.g. "debug" or "wallfollow_library=debug"
    #[arg(long)]
    log_level: Option<String>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn init_tracing(log_level: Option<&str>) {
    let filter = match log_level {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn effective_config(args: &Args) -> Result<AppConfig> {
    let mut config = AppConfig::resolve(args.config.as_deref())?;

    if let Some(duration) = args.duration {
        config.runtime.duration_secs = Some(duration);
    }
    if let Some(rate) = args.rate {
        config.runtime.rate_hz = rate;
    }
    if let Some(seed) = args.seed {
        config.sim.seed = seed;
    }

    config.validate().context("Invalid command line override")?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());

    let config = effective_config(&args)?;
    if args.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let follower = WallFollowerNode::from_config(&config.wall_follower);
    let scans = follower.feed().clone();
    let commands = follower.actuator().clone();
    let status = follower.diagnostics().clone();

    let world = SimWorldNode::new(config.sim.clone(), commands.clone(), scans.clone())?;

    let mut scheduler = Scheduler::new()
        .name("wallfollow")
        .with_rate(config.runtime.rate_hz)?;
    // The world publishes first so each scan is handled in the same spin
    scheduler.add(Box::new(world), 0, Some(true));
    scheduler.add(Box::new(follower), 1, Some(true));

    let running = scheduler.running_flag();
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .context("Failed to install Ctrl+C handler")?;

    info!(
        "Following walls: {} -> {} (status on {})",
        scans.name(),
        commands.name(),
        status.name()
    );

    match config.runtime.duration()? {
        Some(limit) => scheduler.run_for(limit)?,
        None => scheduler.run()?,
    }

    if let Some(last) = status.latest() {
        info!("Last status: {}", last);
    }
    info!(
        "Published {} commands, {} scans ({} dropped)",
        commands.published_count(),
        scans.published_count(),
        scans.dropped_count()
    );
    Ok(())
}
