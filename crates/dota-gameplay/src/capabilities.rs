//! Capability contracts a debuff target must satisfy.
//!
//! Each debuff binds to the narrowest contract it needs, so one entity
//! type can be the target of any combination of debuffs.

use dota_common::EntityId;

/// Anything that can be the target of a debuff.
pub trait Targetable {
    /// Handle of this entity.
    fn entity_id(&self) -> EntityId;
}

/// Entity with armour and health regeneration.
pub trait Attackable: Targetable {
    /// Current armour.
    fn armour(&self) -> f32;

    /// Overwrite armour.
    fn set_armour(&mut self, armour: f32);

    /// Base health regeneration per second.
    fn health_regeneration_rate(&self) -> f32;

    /// Regeneration actually applied by the simulation, after modifiers.
    fn effective_health_regen_rate(&self) -> f32;

    /// Overwrite the effective regeneration rate.
    fn set_effective_health_regen_rate(&mut self, rate: f32);
}

/// Entity with a movement speed.
pub trait Movable: Targetable {
    /// Current movement speed.
    fn movement_speed(&self) -> f32;

    /// Overwrite movement speed.
    fn set_movement_speed(&mut self, speed: f32);
}
