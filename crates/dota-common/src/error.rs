//! Error types for the debuff simulation.

use crate::ids::{DebuffId, EntityId};
use thiserror::Error;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum DotaError {
    /// Debuff lifecycle errors
    #[error("Debuff error: {0}")]
    Debuff(#[from] DebuffError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised when creating or managing debuffs.
///
/// Advancing a debuff never fails; these only come out of construction
/// and out of driver-level bookkeeping.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DebuffError {
    /// Duration was zero, negative or not finite
    #[error("Invalid debuff duration: {duration} (must be positive and finite)")]
    InvalidDuration {
        /// Rejected duration in seconds
        duration: f32,
    },

    /// No tracked debuff has this ID
    #[error("Unknown debuff: {0}")]
    UnknownDebuff(DebuffId),

    /// The debuff's target is not present in the entity table
    #[error("Target {target} of {debuff} is missing")]
    MissingTarget {
        /// Debuff whose target could not be resolved
        debuff: DebuffId,
        /// Unresolved target
        target: EntityId,
    },
}

/// Scenario configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A debuff references a unit that is not declared
    #[error("Debuff targets unknown unit '{0}'")]
    UnknownUnit(String),

    /// Two units share a name
    #[error("Duplicate unit name '{0}'")]
    DuplicateUnit(String),

    /// Config text could not be parsed
    #[error("Failed to parse config: {0}")]
    Parse(String),
}

/// Result type alias for simulation operations.
pub type DotaResult<T> = Result<T, DotaError>;
