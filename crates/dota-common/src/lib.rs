//! # Dota Common
//!
//! Common types and shared abstractions for the debuff simulation.
//!
//! This crate provides foundational types used by the gameplay core and
//! the simulation driver:
//! - ID types (EntityId, DebuffId)
//! - The step clock contract and its implementations
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod clock;
pub mod error;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::clock::*;
    pub use crate::error::*;
    pub use crate::ids::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_generation() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
        assert!(id1.is_valid());
        assert!(!EntityId::NULL.is_valid());
    }

    #[test]
    fn test_fixed_clock_is_steady() {
        let clock = FixedStepClock::new(0.25);
        assert_eq!(clock.elapsed(), 0.25);
        assert_eq!(clock.elapsed(), 0.25);
    }

    #[test]
    fn test_error_conversion() {
        let err: DotaError = DebuffError::InvalidDuration { duration: -1.0 }.into();
        assert!(matches!(err, DotaError::Debuff(_)));
        assert!(err.to_string().contains("-1"));
    }
}
