//! Fixed-step scenario runner.
//!
//! Builds the unit table from a [`SimConfig`], applies each configured
//! debuff once simulation time reaches its `apply_at`, and steps the
//! tracker until every debuff is gone or the step cap is hit.

use crate::config::{DebuffConfig, SimConfig};
use ahash::AHashMap;
use dota_common::{Clock, DotaResult, EntityId, FixedStepClock, FrameClock};
use dota_gameplay::{Attackable, DebuffTracker, Movable, Unit};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Final state of one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitReport {
    /// Unit name.
    pub name: String,
    /// Health at the end of the run.
    pub health: f32,
    /// Armour at the end of the run.
    pub armour: f32,
    /// Effective health regeneration at the end of the run.
    pub effective_health_regen_rate: f32,
    /// Movement speed at the end of the run.
    pub movement_speed: f32,
}

impl UnitReport {
    fn from_unit(unit: &Unit) -> Self {
        Self {
            name: unit.name().to_string(),
            health: unit.health(),
            armour: unit.armour(),
            effective_health_regen_rate: unit.effective_health_regen_rate(),
            movement_speed: unit.movement_speed(),
        }
    }
}

/// Outcome of a scenario run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimSummary {
    /// Steps simulated.
    pub steps: u32,
    /// Simulated seconds.
    pub elapsed: f32,
    /// Debuffs successfully applied.
    pub applied: usize,
    /// Debuffs rejected at application.
    pub rejected: usize,
    /// Debuffs that expired naturally.
    pub expired: usize,
    /// Debuffs still active when the run stopped.
    pub active: usize,
    /// Units in declaration order.
    pub units: Vec<UnitReport>,
}

/// Clock driving the run: a fixed delta, or wall time paced by sleeping
/// one step per iteration.
#[derive(Debug)]
enum StepClock {
    Fixed(FixedStepClock),
    Realtime { clock: FrameClock, step: Duration },
}

impl StepClock {
    fn from_config(config: &SimConfig) -> Self {
        if config.realtime {
            Self::Realtime {
                clock: FrameClock::new().with_max_dt(config.step_seconds * 2.0),
                step: Duration::try_from_secs_f32(config.step_seconds).unwrap_or_default(),
            }
        } else {
            Self::Fixed(FixedStepClock::new(config.step_seconds))
        }
    }

    /// Wait for the next step and measure it.
    fn advance(&mut self) {
        if let Self::Realtime { clock, step } = self {
            thread::sleep(*step);
            clock.sample();
        }
    }
}

impl Clock for StepClock {
    fn elapsed(&self) -> f32 {
        match self {
            Self::Fixed(clock) => clock.elapsed(),
            Self::Realtime { clock, .. } => clock.elapsed(),
        }
    }
}

/// Run a scenario to completion.
pub fn run(config: &SimConfig) -> DotaResult<SimSummary> {
    config.check_references()?;

    let mut units: AHashMap<EntityId, Unit> = AHashMap::new();
    let mut by_name: AHashMap<&str, EntityId> = AHashMap::new();
    let mut order = Vec::with_capacity(config.units.len());
    for unit_config in &config.units {
        let mut unit = Unit::new(unit_config.name.as_str(), unit_config.stats.clone());
        if let Some(health) = unit_config.health {
            unit.set_health(health);
        }
        by_name.insert(unit_config.name.as_str(), unit.id());
        order.push(unit.id());
        units.insert(unit.id(), unit);
    }

    let mut pending: Vec<&DebuffConfig> = config.debuffs.iter().collect();
    pending.sort_by(|a, b| a.apply_at.total_cmp(&b.apply_at));
    let mut pending = pending.into_iter().peekable();

    let mut clock = StepClock::from_config(config);
    let mut tracker: DebuffTracker<Unit> = DebuffTracker::new();
    let mut summary = SimSummary::default();

    loop {
        while let Some(debuff) = pending.next_if(|d| d.apply_at <= summary.elapsed) {
            let target = by_name
                .get(debuff.target.as_str())
                .and_then(|id| units.get_mut(id));
            let Some(target) = target else {
                continue;
            };
            match tracker.apply_kind(debuff.kind, debuff.duration, target) {
                Ok(id) => {
                    summary.applied += 1;
                    info!(
                        %id,
                        kind = %debuff.kind,
                        unit = debuff.target.as_str(),
                        at = summary.elapsed,
                        "Debuff applied"
                    );
                }
                Err(e) => {
                    summary.rejected += 1;
                    warn!(
                        kind = %debuff.kind,
                        unit = debuff.target.as_str(),
                        "Rejected debuff: {e}"
                    );
                }
            }
        }

        if summary.steps >= config.max_steps || (tracker.is_empty() && pending.peek().is_none()) {
            break;
        }

        clock.advance();
        let report = tracker.tick(&mut units, &clock);
        for unit in units.values_mut() {
            unit.regenerate(clock.elapsed());
        }

        for expired in &report.expired {
            info!(
                id = %expired.id,
                kind = %expired.kind,
                at = summary.elapsed + clock.elapsed(),
                "Debuff expired"
            );
        }
        summary.expired += report.expired.len();
        summary.steps += 1;
        summary.elapsed += clock.elapsed();
        debug!(step = summary.steps, active = tracker.len(), "Step complete");
    }

    summary.active = tracker.len();
    summary.units = order
        .iter()
        .filter_map(|id| units.get(id))
        .map(UnitReport::from_unit)
        .collect();
    Ok(summary)
}
