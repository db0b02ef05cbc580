//! # Maelstrom Gameplay
//!
//! Host-independent combat helpers for creature mods.
//!
//! This crate provides:
//! - Area impact resolution (splash damage, fire, knockback)
//! - Directed leap velocity
//! - Impact targets and the capability filter
//! - Host collaborator traits and an in-memory sandbox world

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod impact;
pub mod leap;
pub mod target;
pub mod world;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::impact::*;
    pub use crate::leap::*;
    pub use crate::target::*;
    pub use crate::world::*;
}

pub use prelude::*;
