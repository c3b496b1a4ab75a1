//! # Dota Sim
//!
//! Runs a debuff scenario on a fixed-step clock and reports the final
//! state of every unit.
//!
//! Usage: `dota-sim [scenario.toml] [--init]`. With `--init` the default
//! scenario is written to the given path and the program exits.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod config;
mod scenario;

use anyhow::{Context, Result};
use config::{SimConfig, CONFIG_FILE};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    let mut path = PathBuf::from(CONFIG_FILE);
    let mut init = false;
    for arg in std::env::args().skip(1) {
        if arg == "--init" {
            init = true;
        } else {
            path = PathBuf::from(arg);
        }
    }

    // Loading runs before the subscriber exists, so its outcome is
    // reported once logging is up
    let loaded = SimConfig::load_from(&path);
    let mut config = match &loaded {
        Ok(Some(config)) => config.clone(),
        Ok(None) | Err(_) => SimConfig::default(),
    };
    config.validate();

    // RUST_LOG wins over the scenario's filter
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_filter)
            .with_context(|| format!("invalid log filter '{}'", config.log_filter))?,
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match loaded {
        Ok(Some(_)) => info!("Loaded config from {}", path.display()),
        Ok(None) => info!("Config file not found, using default scenario"),
        Err(e) => warn!("Failed to load {}, using default scenario: {e}", path.display()),
    }

    if init {
        SimConfig::default()
            .save_to(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        return Ok(());
    }

    info!("Dota sim starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!(
        scenario = %path.display(),
        units = config.units.len(),
        debuffs = config.debuffs.len(),
        step = config.step_seconds,
        "Scenario loaded"
    );

    let summary = scenario::run(&config)?;

    for unit in &summary.units {
        info!(
            unit = unit.name.as_str(),
            health = unit.health,
            armour = unit.armour,
            regen = unit.effective_health_regen_rate,
            speed = unit.movement_speed,
            "Final unit state"
        );
    }
    info!(
        steps = summary.steps,
        elapsed = summary.elapsed,
        applied = summary.applied,
        rejected = summary.rejected,
        expired = summary.expired,
        active = summary.active,
        "Dota sim finished"
    );
    Ok(())
}
