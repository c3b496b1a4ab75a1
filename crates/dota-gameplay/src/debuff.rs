//! Timed debuff lifecycle.
//!
//! A [`TimedDebuff`] wraps one [`DebuffEffect`] and owns everything about
//! time: the remaining duration, expiry detection and the terminal phase.
//! The effect only decides what happens to the target on activation, on
//! each step while active, and on deactivation.
//!
//! Lifecycle:
//! - `apply` validates the duration and runs `activate` once
//! - `advance` runs `update` while time remains
//! - the first `advance` that drains the duration runs `deactivate` once
//! - `cancel` runs `deactivate` once if the debuff is still active
//!
//! Once a debuff is terminal every further call is inert, so no call order
//! can revert the same modification twice.

use crate::capabilities::Targetable;
use dota_common::{Clock, DebuffError, EntityId};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

// ============================================================================
// Kinds and phases
// ============================================================================

/// Item that produced a debuff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebuffKind {
    /// Spirit Vessel: reduces health regeneration.
    SpiritVessel,
    /// Blight Stone: reduces armour.
    BlightStone,
    /// Orb of Venom: reduces movement speed.
    OrbOfVenom,
}

impl DebuffKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 3] = [Self::SpiritVessel, Self::BlightStone, Self::OrbOfVenom];

    /// Human readable item name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::SpiritVessel => "Spirit Vessel",
            Self::BlightStone => "Blight Stone",
            Self::OrbOfVenom => "Orb of Venom",
        }
    }
}

impl fmt::Display for DebuffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Lifecycle phase of a debuff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DebuffPhase {
    /// Activated and being advanced.
    Active,
    /// Duration ran out; deactivation has run.
    Expired,
    /// Removed early; deactivation has run.
    Cancelled,
}

impl DebuffPhase {
    /// Whether no hook will ever run again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// What a single `advance` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// Still active; `update` ran.
    Updated,
    /// Expired on this step; `deactivate` ran.
    Expired,
    /// Already terminal; nothing ran.
    Inert,
}

// ============================================================================
// Effect hooks
// ============================================================================

/// Attribute mutation carried by a timed debuff.
///
/// All three hooks are required. `T` is the target type, usually bounded
/// by one of the capability traits.
pub trait DebuffEffect<T: ?Sized> {
    /// Item this effect belongs to.
    const KIND: DebuffKind;

    /// Apply the initial modification. Runs once, at creation.
    fn activate(&mut self, target: &mut T);

    /// Per-step work while the debuff is active.
    fn update(&mut self, target: &mut T);

    /// Revert everything this effect applied. Runs at most once.
    fn deactivate(&mut self, target: &mut T);
}

// ============================================================================
// State machine
// ============================================================================

/// A debuff instance bound to one target for a finite duration.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedDebuff<E> {
    kind: DebuffKind,
    duration: f32,
    duration_left: f32,
    target: EntityId,
    phase: DebuffPhase,
    effect: E,
}

impl<E> TimedDebuff<E> {
    /// Create the debuff and activate it on `target`.
    ///
    /// Non-positive or non-finite durations are rejected before the target
    /// is touched.
    pub fn apply<T>(duration: f32, target: &mut T, mut effect: E) -> Result<Self, DebuffError>
    where
        T: Targetable + ?Sized,
        E: DebuffEffect<T>,
    {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(DebuffError::InvalidDuration { duration });
        }

        let entity = target.entity_id();
        effect.activate(target);
        debug!(%entity, duration, kind = %E::KIND, "Applied debuff");

        Ok(Self {
            kind: E::KIND,
            duration,
            duration_left: duration,
            target: entity,
            phase: DebuffPhase::Active,
            effect,
        })
    }

    /// Advance by `elapsed` seconds.
    ///
    /// Negative or NaN deltas count as zero.
    pub fn advance<T>(&mut self, target: &mut T, elapsed: f32) -> StepOutcome
    where
        T: Targetable + ?Sized,
        E: DebuffEffect<T>,
    {
        if self.phase.is_terminal() {
            return StepOutcome::Inert;
        }
        debug_assert_eq!(
            target.entity_id(),
            self.target,
            "debuff advanced against a different entity"
        );

        self.duration_left -= sanitize_elapsed(elapsed);

        if self.is_expired() {
            self.effect.deactivate(target);
            self.phase = DebuffPhase::Expired;
            debug!(
                entity = %self.target,
                duration = self.duration,
                kind = %self.kind,
                "Debuff expired"
            );
            return StepOutcome::Expired;
        }

        self.effect.update(target);
        StepOutcome::Updated
    }

    /// Advance by the clock's elapsed time.
    pub fn tick<T, C>(&mut self, target: &mut T, clock: &C) -> StepOutcome
    where
        T: Targetable + ?Sized,
        E: DebuffEffect<T>,
        C: Clock + ?Sized,
    {
        self.advance(target, clock.elapsed())
    }

    /// Remove the debuff before it expires.
    ///
    /// Returns `false` if it had already expired or been cancelled.
    pub fn cancel<T>(&mut self, target: &mut T) -> bool
    where
        T: Targetable + ?Sized,
        E: DebuffEffect<T>,
    {
        if self.phase.is_terminal() {
            return false;
        }

        self.effect.deactivate(target);
        self.phase = DebuffPhase::Cancelled;
        debug!(
            entity = %self.target,
            remaining = self.remaining(),
            kind = %self.kind,
            "Debuff cancelled"
        );
        true
    }

    /// True iff the remaining duration has run out.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.duration_left <= 0.0
    }

    /// True once expired or cancelled.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Total lifespan in seconds.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Remaining lifespan; negative once overshot.
    #[must_use]
    pub fn duration_left(&self) -> f32 {
        self.duration_left
    }

    /// Remaining lifespan clamped at zero.
    #[must_use]
    pub fn remaining(&self) -> f32 {
        self.duration_left.max(0.0)
    }

    /// Handle of the target.
    #[must_use]
    pub fn target(&self) -> EntityId {
        self.target
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> DebuffPhase {
        self.phase
    }

    /// Item kind.
    #[must_use]
    pub fn kind(&self) -> DebuffKind {
        self.kind
    }

    /// Variant state.
    #[must_use]
    pub fn effect(&self) -> &E {
        &self.effect
    }
}

fn sanitize_elapsed(elapsed: f32) -> f32 {
    if elapsed.is_nan() || elapsed < 0.0 {
        warn!(elapsed, "Ignoring invalid step delta");
        0.0
    } else {
        elapsed
    }
}

// ============================================================================
// Type-erased driver interface
// ============================================================================

/// Object-safe view of a debuff acting on targets of type `T`.
///
/// Lets a driver keep every debuff kind that can act on `T` in one
/// collection.
pub trait ActiveDebuff<T: ?Sized> {
    /// Item kind.
    fn kind(&self) -> DebuffKind;
    /// Handle of the target.
    fn target(&self) -> EntityId;
    /// Total lifespan in seconds.
    fn duration(&self) -> f32;
    /// Remaining lifespan.
    fn duration_left(&self) -> f32;
    /// Current phase.
    fn phase(&self) -> DebuffPhase;
    /// True iff the remaining duration has run out.
    fn is_expired(&self) -> bool;
    /// True once expired or cancelled.
    fn is_finished(&self) -> bool;
    /// Advance by `elapsed` seconds.
    fn advance(&mut self, target: &mut T, elapsed: f32) -> StepOutcome;
    /// Remove before expiry.
    fn cancel(&mut self, target: &mut T) -> bool;
}

impl<T, E> ActiveDebuff<T> for TimedDebuff<E>
where
    T: Targetable + ?Sized,
    E: DebuffEffect<T>,
{
    fn kind(&self) -> DebuffKind {
        self.kind
    }

    fn target(&self) -> EntityId {
        self.target
    }

    fn duration(&self) -> f32 {
        self.duration
    }

    fn duration_left(&self) -> f32 {
        self.duration_left
    }

    fn phase(&self) -> DebuffPhase {
        self.phase
    }

    fn is_expired(&self) -> bool {
        TimedDebuff::is_expired(self)
    }

    fn is_finished(&self) -> bool {
        TimedDebuff::is_finished(self)
    }

    fn advance(&mut self, target: &mut T, elapsed: f32) -> StepOutcome {
        TimedDebuff::advance(self, target, elapsed)
    }

    fn cancel(&mut self, target: &mut T) -> bool {
        TimedDebuff::cancel(self, target)
    }
}

// ============================================================================
// Tests
// ============================================================================
