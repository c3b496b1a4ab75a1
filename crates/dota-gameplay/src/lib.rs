//! # Dota Gameplay
//!
//! Time-bounded item debuffs for the simulation.
//!
//! This crate provides:
//! - Capability contracts a debuff target must satisfy
//! - The timed debuff lifecycle state machine
//! - Spirit Vessel, Blight Stone and Orb of Venom debuffs
//! - A reference unit type
//! - A tracker that drives debuffs once per simulation step

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod capabilities;
pub mod debuff;
pub mod items;
pub mod tracker;
pub mod unit;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::capabilities::*;
    pub use crate::debuff::*;
    pub use crate::items::*;
    pub use crate::tracker::*;
    pub use crate::unit::*;
}

pub use prelude::*;
