//! Reference debuff target.
//!
//! [`Unit`] is a minimal hero/creep that satisfies every capability
//! contract. Debuffs only ever see it through those traits.

use crate::capabilities::{Attackable, Movable, Targetable};
use dota_common::EntityId;
use serde::{Deserialize, Serialize};

/// Starting attributes for a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitStats {
    /// Maximum health.
    pub max_health: f32,
    /// Armour.
    pub armour: f32,
    /// Base health regeneration per second.
    pub health_regeneration_rate: f32,
    /// Movement speed.
    pub movement_speed: f32,
}

impl Default for UnitStats {
    fn default() -> Self {
        Self {
            max_health: 600.0,
            armour: 2.0,
            health_regeneration_rate: 1.5,
            movement_speed: 300.0,
        }
    }
}

impl UnitStats {
    /// Create stats with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum health.
    #[must_use]
    pub fn with_max_health(mut self, max_health: f32) -> Self {
        self.max_health = max_health.max(1.0);
        self
    }

    /// Set armour.
    #[must_use]
    pub fn with_armour(mut self, armour: f32) -> Self {
        self.armour = armour;
        self
    }

    /// Set base health regeneration.
    #[must_use]
    pub fn with_health_regeneration_rate(mut self, rate: f32) -> Self {
        self.health_regeneration_rate = rate;
        self
    }

    /// Set movement speed.
    #[must_use]
    pub fn with_movement_speed(mut self, speed: f32) -> Self {
        self.movement_speed = speed.max(0.0);
        self
    }
}

/// A unit that debuffs can target.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    id: EntityId,
    name: String,
    health: f32,
    max_health: f32,
    armour: f32,
    health_regeneration_rate: f32,
    effective_health_regen_rate: f32,
    movement_speed: f32,
}

impl Unit {
    /// Create a unit at full health.
    #[must_use]
    pub fn new(name: impl Into<String>, stats: UnitStats) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            health: stats.max_health,
            max_health: stats.max_health,
            armour: stats.armour,
            health_regeneration_rate: stats.health_regeneration_rate,
            effective_health_regen_rate: stats.health_regeneration_rate,
            movement_speed: stats.movement_speed,
        }
    }

    /// Handle of this unit.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current health.
    #[must_use]
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Set current health, clamped to `[0, max_health]`.
    pub fn set_health(&mut self, health: f32) {
        self.health = health.clamp(0.0, self.max_health);
    }

    /// Change the base regeneration rate.
    ///
    /// The effective rate is left alone; modifiers that depend on the base
    /// rate pick the change up on their next step.
    pub fn set_health_regeneration_rate(&mut self, rate: f32) {
        self.health_regeneration_rate = rate;
    }

    /// Regenerate for `dt` seconds at the effective rate.
    ///
    /// Returns the health actually gained (negative if the effective rate
    /// is below zero).
    pub fn regenerate(&mut self, dt: f32) -> f32 {
        let before = self.health;
        self.set_health(self.health + self.effective_health_regen_rate * dt);
        self.health - before
    }
}

impl Targetable for Unit {
    fn entity_id(&self) -> EntityId {
        self.id
    }
}

impl Attackable for Unit {
    fn armour(&self) -> f32 {
        self.armour
    }

    fn set_armour(&mut self, armour: f32) {
        self.armour = armour;
    }

    fn health_regeneration_rate(&self) -> f32 {
        self.health_regeneration_rate
    }

    fn effective_health_regen_rate(&self) -> f32 {
        self.effective_health_regen_rate
    }

    fn set_effective_health_regen_rate(&mut self, rate: f32) {
        self.effective_health_regen_rate = rate;
    }
}

impl Movable for Unit {
    fn movement_speed(&self) -> f32 {
        self.movement_speed
    }

    fn set_movement_speed(&mut self, speed: f32) {
        self.movement_speed = speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_from_stats() {
        let unit = Unit::new(
            "axe",
            UnitStats::new().with_armour(5.0).with_health_regeneration_rate(3.0),
        );

        assert_eq!(unit.name(), "axe");
        assert!(unit.id().is_valid());
        assert_eq!(unit.armour(), 5.0);
        assert_eq!(unit.health_regeneration_rate(), 3.0);
        assert_eq!(unit.effective_health_regen_rate(), 3.0);
        assert_eq!(unit.health(), unit.max_health());
    }

    #[test]
    fn test_base_rate_change_leaves_effective_rate() {
        let mut unit = Unit::new("lion", UnitStats::new().with_health_regeneration_rate(2.0));
        unit.set_health_regeneration_rate(6.0);

        assert_eq!(unit.health_regeneration_rate(), 6.0);
        assert_eq!(unit.effective_health_regen_rate(), 2.0);
    }

    #[test]
    fn test_regenerate_clamps_to_max() {
        let mut unit = Unit::new(
            "lion",
            UnitStats::new()
                .with_max_health(100.0)
                .with_health_regeneration_rate(10.0),
        );
        unit.set_health(95.0);

        let gained = unit.regenerate(1.0);
        assert_eq!(gained, 5.0);
        assert_eq!(unit.health(), 100.0);
    }

    #[test]
    fn test_stat_builders_clamp() {
        let stats = UnitStats::new().with_max_health(-5.0).with_movement_speed(-10.0);
        assert_eq!(stats.max_health, 1.0);
        assert_eq!(stats.movement_speed, 0.0);
    }
}
