//! Debuff driver.
//!
//! [`DebuffTracker`] owns every active debuff for one target type and
//! advances them once per step, in insertion order. Targets live in a
//! separate entity table and are looked up by handle each step.

use crate::capabilities::{Attackable, Movable, Targetable};
use crate::debuff::{ActiveDebuff, DebuffEffect, DebuffKind, StepOutcome, TimedDebuff};
use crate::items::{BlightStoneDebuff, OrbOfVenomDebuff, SpiritVesselDebuff};
use ahash::AHashMap;
use dota_common::{Clock, DebuffError, DebuffId, EntityId};
use std::fmt;
use tracing::{debug, warn};

// ============================================================================
// Entity lookup
// ============================================================================

/// Resolves entity handles to targets.
pub trait TargetTable<T: ?Sized> {
    /// Mutable access to the entity with this handle, if it exists.
    fn target_mut(&mut self, id: EntityId) -> Option<&mut T>;
}

impl<T: Targetable> TargetTable<T> for AHashMap<EntityId, T> {
    fn target_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.get_mut(&id)
    }
}

impl<T: Targetable> TargetTable<T> for Vec<T> {
    fn target_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.iter_mut().find(|t| t.entity_id() == id)
    }
}

// ============================================================================
// Step report
// ============================================================================

/// A debuff that expired during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiredDebuff {
    /// Tracker ID.
    pub id: DebuffId,
    /// Item kind.
    pub kind: DebuffKind,
    /// Target it was removed from.
    pub target: EntityId,
}

/// Summary of one tracker step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Debuffs that ran their per-step update.
    pub updated: usize,
    /// Debuffs that expired this step.
    pub expired: Vec<ExpiredDebuff>,
    /// Debuffs dropped because their target no longer exists.
    pub orphaned: Vec<DebuffId>,
}

// ============================================================================
// Tracker
// ============================================================================

struct TrackedDebuff<T: ?Sized> {
    id: DebuffId,
    debuff: Box<dyn ActiveDebuff<T>>,
}

/// Collection of active debuffs acting on targets of type `T`.
pub struct DebuffTracker<T: ?Sized> {
    entries: Vec<TrackedDebuff<T>>,
    next_id: DebuffId,
}

impl<T: ?Sized> Default for DebuffTracker<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for DebuffTracker<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebuffTracker")
            .field("active", &self.entries.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl<T: ?Sized> DebuffTracker<T> {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: DebuffId::new(1),
        }
    }

    /// Start tracking an already applied debuff.
    pub fn insert<D>(&mut self, debuff: D) -> DebuffId
    where
        D: ActiveDebuff<T> + 'static,
    {
        let id = self.next_id;
        self.next_id = id.next();
        self.entries.push(TrackedDebuff {
            id,
            debuff: Box::new(debuff),
        });
        id
    }

    /// Number of tracked debuffs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a debuff by ID.
    #[must_use]
    pub fn get(&self, id: DebuffId) -> Option<&(dyn ActiveDebuff<T> + 'static)> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.debuff.as_ref())
    }

    /// All tracked debuffs in step order.
    pub fn iter(&self) -> impl Iterator<Item = (DebuffId, &(dyn ActiveDebuff<T> + 'static))> + '_ {
        self.entries.iter().map(|e| (e.id, e.debuff.as_ref()))
    }

    /// Debuffs acting on one entity.
    pub fn for_target(
        &self,
        target: EntityId,
    ) -> impl Iterator<Item = (DebuffId, &(dyn ActiveDebuff<T> + 'static))> + '_ {
        self.iter().filter(move |(_, d)| d.target() == target)
    }

    /// Whether `target` carries a debuff of this kind.
    #[must_use]
    pub fn has_debuff(&self, target: EntityId, kind: DebuffKind) -> bool {
        self.for_target(target).any(|(_, d)| d.kind() == kind)
    }

    /// Advance every debuff by the clock's elapsed time.
    ///
    /// Finished debuffs are dropped afterwards. A debuff whose target is
    /// missing from `table` is dropped without reverting anything.
    pub fn tick<M, C>(&mut self, table: &mut M, clock: &C) -> TickReport
    where
        M: TargetTable<T> + ?Sized,
        C: Clock + ?Sized,
    {
        let elapsed = clock.elapsed();
        let mut report = TickReport::default();

        for entry in &mut self.entries {
            let entity = entry.debuff.target();
            let Some(target) = table.target_mut(entity) else {
                warn!(
                    debuff = %entry.id,
                    %entity,
                    kind = %entry.debuff.kind(),
                    "Dropping debuff whose target is gone"
                );
                report.orphaned.push(entry.id);
                continue;
            };

            match entry.debuff.advance(target, elapsed) {
                StepOutcome::Updated => report.updated += 1,
                StepOutcome::Expired => report.expired.push(ExpiredDebuff {
                    id: entry.id,
                    kind: entry.debuff.kind(),
                    target: entity,
                }),
                StepOutcome::Inert => {}
            }
        }

        self.entries
            .retain(|e| !e.debuff.is_finished() && !report.orphaned.contains(&e.id));
        report
    }

    /// Cancel one debuff, reverting its modification, and stop tracking it.
    ///
    /// If the target cannot be resolved the debuff stays tracked.
    pub fn cancel<M>(&mut self, id: DebuffId, table: &mut M) -> Result<DebuffKind, DebuffError>
    where
        M: TargetTable<T> + ?Sized,
    {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(DebuffError::UnknownDebuff(id))?;

        let entity = self.entries[index].debuff.target();
        let target = table
            .target_mut(entity)
            .ok_or(DebuffError::MissingTarget { debuff: id, target: entity })?;

        let mut entry = self.entries.remove(index);
        entry.debuff.cancel(target);
        Ok(entry.debuff.kind())
    }
}

impl<T: Targetable + ?Sized> DebuffTracker<T> {
    /// Apply `effect` to `target` and track the resulting debuff.
    pub fn apply<E>(
        &mut self,
        duration: f32,
        target: &mut T,
        effect: E,
    ) -> Result<DebuffId, DebuffError>
    where
        E: DebuffEffect<T> + 'static,
    {
        let debuff = TimedDebuff::apply(duration, target, effect)?;
        Ok(self.insert(debuff))
    }

    /// Cancel every debuff on `target`. Returns how many were removed.
    pub fn cleanse(&mut self, target: &mut T) -> usize {
        let entity = target.entity_id();
        let mut removed = 0;

        self.entries.retain_mut(|entry| {
            if entry.debuff.target() != entity {
                return true;
            }
            entry.debuff.cancel(target);
            removed += 1;
            false
        });

        if removed > 0 {
            debug!(%entity, removed, "Cleansed debuffs");
        }
        removed
    }
}

impl<T: Attackable + Movable + ?Sized> DebuffTracker<T> {
    /// Apply the debuff for an item kind.
    pub fn apply_kind(
        &mut self,
        kind: DebuffKind,
        duration: f32,
        target: &mut T,
    ) -> Result<DebuffId, DebuffError> {
        match kind {
            DebuffKind::SpiritVessel => self.apply(duration, target, SpiritVesselDebuff::default()),
            DebuffKind::BlightStone => self.apply(duration, target, BlightStoneDebuff::default()),
            DebuffKind::OrbOfVenom => self.apply(duration, target, OrbOfVenomDebuff::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::{Unit, UnitStats};
    use dota_common::{FixedStepClock, ManualClock};

    fn table() -> (AHashMap<EntityId, Unit>, EntityId, EntityId) {
        let axe = Unit::new(
            "axe",
            UnitStats::new()
                .with_armour(10.0)
                .with_health_regeneration_rate(4.0)
                .with_movement_speed(100.0),
        );
        let lion = Unit::new("lion", UnitStats::new().with_armour(3.0));
        let (axe_id, lion_id) = (axe.id(), lion.id());

        let mut units = AHashMap::new();
        units.insert(axe_id, axe);
        units.insert(lion_id, lion);
        (units, axe_id, lion_id)
    }

    fn unit(units: &mut AHashMap<EntityId, Unit>, id: EntityId) -> &mut Unit {
        units.get_mut(&id).expect("unit exists")
    }

    fn view(units: &AHashMap<EntityId, Unit>, id: EntityId) -> &Unit {
        units.get(&id).expect("unit exists")
    }

    #[test]
    fn test_apply_and_expire() {
        let (mut units, axe, _) = table();
        let mut tracker = DebuffTracker::new();

        let id = tracker
            .apply_kind(DebuffKind::BlightStone, 2.0, unit(&mut units, axe))
            .expect("valid duration");
        assert_eq!(tracker.len(), 1);
        assert!(tracker.has_debuff(axe, DebuffKind::BlightStone));
        assert_eq!(view(&units, axe).armour(), 8.0);

        let clock = FixedStepClock::new(1.0);
        let report = tracker.tick(&mut units, &clock);
        assert_eq!(report.updated, 1);
        assert!(report.expired.is_empty());

        let report = tracker.tick(&mut units, &clock);
        assert_eq!(
            report.expired,
            vec![ExpiredDebuff {
                id,
                kind: DebuffKind::BlightStone,
                target: axe,
            }]
        );
        assert!(tracker.is_empty());
        assert_eq!(view(&units, axe).armour(), 10.0);
    }

    #[test]
    fn test_ids_are_sequential() {
        let (mut units, axe, lion) = table();
        let mut tracker = DebuffTracker::new();

        let first = tracker
            .apply_kind(DebuffKind::OrbOfVenom, 1.0, unit(&mut units, axe))
            .expect("valid duration");
        let second = tracker
            .apply_kind(DebuffKind::SpiritVessel, 1.0, unit(&mut units, lion))
            .expect("valid duration");
        assert_eq!(second, first.next());
        assert_eq!(tracker.get(second).map(|d| d.kind()), Some(DebuffKind::SpiritVessel));
    }

    #[test]
    fn test_invalid_duration_not_tracked() {
        let (mut units, axe, _) = table();
        let mut tracker = DebuffTracker::new();

        let result = tracker.apply_kind(DebuffKind::BlightStone, 0.0, unit(&mut units, axe));
        assert!(matches!(result, Err(DebuffError::InvalidDuration { .. })));
        assert!(tracker.is_empty());
        assert_eq!(view(&units, axe).armour(), 10.0);
    }

    #[test]
    fn test_cancel_reverts_and_removes() {
        let (mut units, axe, _) = table();
        let mut tracker = DebuffTracker::new();

        let id = tracker
            .apply_kind(DebuffKind::OrbOfVenom, 5.0, unit(&mut units, axe))
            .expect("valid duration");
        assert!(view(&units, axe).movement_speed() < 100.0);

        assert_eq!(tracker.cancel(id, &mut units), Ok(DebuffKind::OrbOfVenom));
        assert!(tracker.is_empty());
        assert!((view(&units, axe).movement_speed() - 100.0).abs() < 0.001);

        assert_eq!(
            tracker.cancel(id, &mut units),
            Err(DebuffError::UnknownDebuff(id))
        );
    }

    #[test]
    fn test_cancel_with_missing_target_keeps_debuff() {
        let (mut units, axe, _) = table();
        let mut tracker = DebuffTracker::new();

        let id = tracker
            .apply_kind(DebuffKind::BlightStone, 5.0, unit(&mut units, axe))
            .expect("valid duration");
        units.remove(&axe);

        assert_eq!(
            tracker.cancel(id, &mut units),
            Err(DebuffError::MissingTarget { debuff: id, target: axe })
        );
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_orphaned_debuffs_dropped() {
        let (mut units, axe, lion) = table();
        let mut tracker = DebuffTracker::new();

        let orphan = tracker
            .apply_kind(DebuffKind::BlightStone, 5.0, unit(&mut units, axe))
            .expect("valid duration");
        tracker
            .apply_kind(DebuffKind::BlightStone, 5.0, unit(&mut units, lion))
            .expect("valid duration");
        units.remove(&axe);

        let report = tracker.tick(&mut units, &FixedStepClock::new(1.0));
        assert_eq!(report.orphaned, vec![orphan]);
        assert_eq!(report.updated, 1);
        assert_eq!(tracker.len(), 1);
        assert!(tracker.has_debuff(lion, DebuffKind::BlightStone));
    }

    #[test]
    fn test_cleanse_only_touches_target() {
        let (mut units, axe, lion) = table();
        let mut tracker = DebuffTracker::new();

        for kind in DebuffKind::ALL {
            tracker
                .apply_kind(kind, 5.0, unit(&mut units, axe))
                .expect("valid duration");
        }
        tracker
            .apply_kind(DebuffKind::BlightStone, 5.0, unit(&mut units, lion))
            .expect("valid duration");

        assert_eq!(tracker.cleanse(unit(&mut units, axe)), 3);
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.for_target(axe).count(), 0);

        let axe_unit = view(&units, axe);
        assert_eq!(axe_unit.armour(), 10.0);
        assert!((axe_unit.movement_speed() - 100.0).abs() < 0.001);
        assert!((axe_unit.effective_health_regen_rate() - 4.0).abs() < 0.001);
        assert_eq!(view(&units, lion).armour(), 1.0);
    }

    #[test]
    fn test_uneven_steps_expire_each_debuff_once() {
        let (mut units, axe, _) = table();
        let mut tracker = DebuffTracker::new();

        tracker
            .apply_kind(DebuffKind::BlightStone, 1.0, unit(&mut units, axe))
            .expect("valid duration");
        tracker
            .apply_kind(DebuffKind::BlightStone, 2.5, unit(&mut units, axe))
            .expect("valid duration");
        assert_eq!(view(&units, axe).armour(), 6.0);

        let mut clock = ManualClock::default();
        let mut expired = 0;
        for dt in [0.3, 0.0, 0.9, 0.05, 2.0, 0.7, 3.0] {
            clock.set_elapsed(dt);
            expired += tracker.tick(&mut units, &clock).expired.len();
        }

        assert_eq!(expired, 2);
        assert!(tracker.is_empty());
        assert_eq!(view(&units, axe).armour(), 10.0);
    }

    #[test]
    fn test_vec_table_lookup() {
        let mut units = vec![Unit::new("a", UnitStats::new()), Unit::new("b", UnitStats::new())];
        let b = units[1].id();
        let mut tracker = DebuffTracker::new();

        tracker
            .apply_kind(DebuffKind::BlightStone, 1.0, &mut units[1])
            .expect("valid duration");
        let report = tracker.tick(&mut units, &FixedStepClock::new(1.0));

        assert_eq!(report.expired.len(), 1);
        assert_eq!(report.expired[0].target, b);
        assert_eq!(units[1].armour(), UnitStats::new().armour);
    }
}
