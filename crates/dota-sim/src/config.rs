//! Scenario configuration.
//!
//! A scenario declares the units in play and the debuffs applied to them.
//! It is loaded from a TOML file. The binary falls back to the built-in
//! demo scenario when the file is missing or broken.

use dota_common::{ConfigError, DotaResult};
use dota_gameplay::{DebuffKind, UnitStats};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::info;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "dota-sim.toml";

/// A unit declared by the scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitConfig {
    /// Unique name, referenced by debuffs.
    pub name: String,
    /// Starting health (defaults to max).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<f32>,
    /// Starting attributes.
    #[serde(default)]
    pub stats: UnitStats,
}

/// A debuff the scenario applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebuffConfig {
    /// Item producing the debuff.
    pub kind: DebuffKind,
    /// Name of the target unit.
    pub target: String,
    /// Duration in seconds.
    pub duration: f32,
    /// Simulation time at which it is applied.
    #[serde(default)]
    pub apply_at: f32,
}

/// Simulation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seconds per simulation step
    pub step_seconds: f32,
    /// Hard cap on simulated steps
    pub max_steps: u32,
    /// `tracing` filter directive
    pub log_filter: String,
    /// Pace steps against the wall clock instead of a fixed delta
    pub realtime: bool,
    /// Units in play
    pub units: Vec<UnitConfig>,
    /// Debuffs to apply
    pub debuffs: Vec<DebuffConfig>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            step_seconds: 0.5,
            max_steps: 40,
            log_filter: "dota_sim=info,dota_gameplay=debug".to_string(),
            realtime: false,
            units: vec![
                UnitConfig {
                    name: "axe".to_string(),
                    health: Some(300.0),
                    stats: UnitStats::new()
                        .with_armour(10.0)
                        .with_health_regeneration_rate(2.0)
                        .with_movement_speed(310.0),
                },
                UnitConfig {
                    name: "lion".to_string(),
                    health: None,
                    stats: UnitStats::new().with_armour(3.0).with_movement_speed(290.0),
                },
            ],
            debuffs: vec![
                DebuffConfig {
                    kind: DebuffKind::BlightStone,
                    target: "axe".to_string(),
                    duration: 5.0,
                    apply_at: 0.0,
                },
                DebuffConfig {
                    kind: DebuffKind::SpiritVessel,
                    target: "axe".to_string(),
                    duration: 4.0,
                    apply_at: 1.0,
                },
                DebuffConfig {
                    kind: DebuffKind::OrbOfVenom,
                    target: "lion".to_string(),
                    duration: 3.0,
                    apply_at: 0.0,
                },
            ],
        }
    }
}

impl SimConfig {
    /// Parse a config from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a path.
    /// Returns `Ok(None)` if the file doesn't exist.
    pub fn load_from<P: AsRef<Path>>(path: P) -> DotaResult<Option<Self>> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path)?;
        Ok(Some(Self::from_toml(&contents)?))
    }

    /// Save configuration to a path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> DotaResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Clamp values to sensible ranges.
    pub fn validate(&mut self) {
        self.step_seconds = self.step_seconds.clamp(0.001, 10.0);
        self.max_steps = self.max_steps.clamp(1, 100_000);
        for debuff in &mut self.debuffs {
            debuff.apply_at = debuff.apply_at.max(0.0);
        }
    }

    /// Check that unit names are unique and every debuff targets a
    /// declared unit.
    pub fn check_references(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for unit in &self.units {
            if !names.insert(unit.name.as_str()) {
                return Err(ConfigError::DuplicateUnit(unit.name.clone()));
            }
        }

        match self.debuffs.iter().find(|d| !names.contains(d.target.as_str())) {
            Some(debuff) => Err(ConfigError::UnknownUnit(debuff.target.clone())),
            None => Ok(()),
        }
    }
}
