//! # Maelstrom Common
//!
//! Common types and shared abstractions for the Maelstrom gameplay helpers.
//!
//! This crate provides the foundational types every other crate builds on:
//! - Entity ids
//! - 3D geometry (bounding boxes, host-style normalization)
//! - Error types for impact, leap and scenario handling
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod geometry;
pub mod ids;

pub use glam::DVec3;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::geometry::*;
    pub use crate::ids::*;
    pub use glam::DVec3;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_from_host() {
        let id = EntityId::from_raw(42);
        assert_eq!(id.raw(), 42);
        assert!(id.is_valid());
        assert_eq!(id.to_string(), "#42");
        assert!(!EntityId::NULL.is_valid());
    }

    #[test]
    fn test_default_entity_id_is_null() {
        assert_eq!(EntityId::default(), EntityId::NULL);
        assert_eq!(EntityId::default(), EntityId::default());
    }

    #[test]
    fn test_feet_box_center() {
        let bounds = Aabb::from_feet(DVec3::new(0.0, 64.0, 0.0), 0.6, 1.8);
        assert!((bounds.center() - DVec3::new(0.0, 64.9, 0.0)).length() < 1e-9);
    }
}
