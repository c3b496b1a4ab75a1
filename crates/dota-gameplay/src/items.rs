//! Item debuffs.
//!
//! Spirit Vessel re-derives its regen reduction from the target's live
//! base rate every step. Blight Stone and Orb of Venom fix their magnitude
//! at activation and revert exactly that amount.

use crate::capabilities::{Attackable, Movable};
use crate::debuff::{DebuffEffect, DebuffKind, TimedDebuff};
use dota_common::DebuffError;
use tracing::trace;

/// Fraction of base health regeneration removed by Spirit Vessel.
pub const SPIRIT_VESSEL_REGEN_REDUCTION: f32 = 0.25;
/// Flat armour removed by Blight Stone.
pub const BLIGHT_STONE_ARMOUR_REDUCTION: f32 = 2.0;
/// Fraction of movement speed removed by Orb of Venom.
pub const ORB_OF_VENOM_SLOW: f32 = 0.13;

// ============================================================================
// Spirit Vessel
// ============================================================================

/// Health regeneration reduction that follows the target's base rate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpiritVesselDebuff {
    regen_reduction: f32,
}

impl SpiritVesselDebuff {
    /// Apply Spirit Vessel to `target` for `duration` seconds.
    pub fn apply<T>(duration: f32, target: &mut T) -> Result<TimedDebuff<Self>, DebuffError>
    where
        T: Attackable + ?Sized,
    {
        TimedDebuff::apply(duration, target, Self::default())
    }

    /// Reduction currently subtracted from the effective regen rate.
    #[must_use]
    pub fn regen_reduction(&self) -> f32 {
        self.regen_reduction
    }
}

impl<T: Attackable + ?Sized> DebuffEffect<T> for SpiritVesselDebuff {
    const KIND: DebuffKind = DebuffKind::SpiritVessel;

    fn activate(&mut self, target: &mut T) {
        <Self as DebuffEffect<T>>::update(self, target);
    }

    fn update(&mut self, target: &mut T) {
        let reduction = target.health_regeneration_rate() * SPIRIT_VESSEL_REGEN_REDUCTION;
        let scale = reduction.abs().max(self.regen_reduction.abs());
        if (reduction - self.regen_reduction).abs() <= f32::EPSILON * scale {
            return;
        }

        // Swap the old reduction for the new one in a single adjustment
        let effective = target.effective_health_regen_rate();
        target.set_effective_health_regen_rate(effective + self.regen_reduction - reduction);
        trace!(
            entity = %target.entity_id(),
            old = self.regen_reduction,
            new = reduction,
            "Spirit vessel regen reduction changed"
        );
        self.regen_reduction = reduction;
    }

    fn deactivate(&mut self, target: &mut T) {
        let effective = target.effective_health_regen_rate();
        target.set_effective_health_regen_rate(effective + self.regen_reduction);
        self.regen_reduction = 0.0;
    }
}

// ============================================================================
// Blight Stone
// ============================================================================

/// Flat armour reduction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlightStoneDebuff {
    armour_reduction: f32,
}

impl Default for BlightStoneDebuff {
    fn default() -> Self {
        Self {
            armour_reduction: BLIGHT_STONE_ARMOUR_REDUCTION,
        }
    }
}

impl BlightStoneDebuff {
    /// Apply Blight Stone to `target` for `duration` seconds.
    pub fn apply<T>(duration: f32, target: &mut T) -> Result<TimedDebuff<Self>, DebuffError>
    where
        T: Attackable + ?Sized,
    {
        TimedDebuff::apply(duration, target, Self::default())
    }

    /// Armour removed while active.
    #[must_use]
    pub fn armour_reduction(&self) -> f32 {
        self.armour_reduction
    }
}

impl<T: Attackable + ?Sized> DebuffEffect<T> for BlightStoneDebuff {
    const KIND: DebuffKind = DebuffKind::BlightStone;

    fn activate(&mut self, target: &mut T) {
        target.set_armour(target.armour() - self.armour_reduction);
    }

    fn update(&mut self, _target: &mut T) {}

    fn deactivate(&mut self, target: &mut T) {
        target.set_armour(target.armour() + self.armour_reduction);
    }
}

// ============================================================================
// Orb of Venom
// ============================================================================

/// Movement slow sized from the target's speed at activation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrbOfVenomDebuff {
    move_speed_reduction: f32,
}

impl OrbOfVenomDebuff {
    /// Apply Orb of Venom to `target` for `duration` seconds.
    pub fn apply<T>(duration: f32, target: &mut T) -> Result<TimedDebuff<Self>, DebuffError>
    where
        T: Movable + ?Sized,
    {
        TimedDebuff::apply(duration, target, Self::default())
    }

    /// Speed removed at activation.
    #[must_use]
    pub fn move_speed_reduction(&self) -> f32 {
        self.move_speed_reduction
    }
}

impl<T: Movable + ?Sized> DebuffEffect<T> for OrbOfVenomDebuff {
    const KIND: DebuffKind = DebuffKind::OrbOfVenom;

    fn activate(&mut self, target: &mut T) {
        self.move_speed_reduction = target.movement_speed() * ORB_OF_VENOM_SLOW;
        target.set_movement_speed(target.movement_speed() - self.move_speed_reduction);
    }

    fn update(&mut self, _target: &mut T) {}

    fn deactivate(&mut self, target: &mut T) {
        target.set_movement_speed(target.movement_speed() + self.move_speed_reduction);
    }
}

// ============================================================================
// Tests
// ============================================================================
