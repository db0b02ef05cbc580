//! Impact targets and the capability filter that decides which entities an
//! area impact may touch.
//!
//! Targets are read-only snapshots handed over by the host's spatial query.
//! Whether a target can be hit is a capability check, not a type check: the
//! host tags each snapshot with [`TargetFlags`] and a [`TargetFilter`]
//! decides.

use maelstrom_common::{Aabb, DVec3, EntityId};
use serde::{Deserialize, Serialize};

/// Capability flags carried by a target.
#[allow(non_snake_case)]
pub mod TargetFlags {
    /// Flag type.
    pub type Flags = u8;

    /// Living creature (has health, takes damage).
    pub const LIVING: Flags = 1 << 0;
    /// Segment of a multi-part entity; routes damage to its owner.
    pub const PART: Flags = 1 << 1;
    /// Otherwise collidable (boats, minecarts, armor stands).
    pub const COLLIDABLE: Flags = 1 << 2;
    /// No capabilities.
    pub const NONE: Flags = 0;
    /// Every capability the default filter accepts.
    pub const IMPACTABLE: Flags = LIVING | PART | COLLIDABLE;

    /// Parses a capability name as used in scenario files.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Flags> {
        match name {
            "living" => Some(LIVING),
            "part" => Some(PART),
            "collidable" => Some(COLLIDABLE),
            _ => None,
        }
    }
}

/// Snapshot of an entity as seen by the impact resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Host entity id.
    pub id: EntityId,
    /// Base (feet) position.
    pub position: DVec3,
    /// World-space bounding box.
    pub bounds: Aabb,
    /// Head/camera position.
    pub eye_position: DVec3,
    /// Capability flags.
    pub flags: TargetFlags::Flags,
}

impl Target {
    /// Creates a living target standing at `position` with a `width` x
    /// `height` box and eyes at `eye_height` above the feet.
    #[must_use]
    pub fn standing(
        id: EntityId,
        position: DVec3,
        width: f64,
        height: f64,
        eye_height: f64,
    ) -> Self {
        Self {
            id,
            position,
            bounds: Aabb::from_feet(position, width, height),
            eye_position: position + DVec3::new(0.0, eye_height, 0.0),
            flags: TargetFlags::LIVING,
        }
    }

    /// Replaces the capability flags.
    #[must_use]
    pub const fn with_flags(mut self, flags: TargetFlags::Flags) -> Self {
        self.flags = flags;
        self
    }

    /// Checks for a capability flag.
    #[must_use]
    pub const fn has(&self, flag: TargetFlags::Flags) -> bool {
        self.flags & flag != 0
    }

    /// True when every coordinate of the snapshot is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.eye_position.is_finite() && self.bounds.is_finite()
    }
}

/// Decides whether a queried entity is eligible for an area impact.
pub trait TargetFilter {
    /// Returns true if the target may be hit.
    fn accepts(&self, target: &Target) -> bool;
}

/// Default filter: living creatures, multi-part segments and collidables.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapabilityFilter;

impl TargetFilter for CapabilityFilter {
    fn accepts(&self, target: &Target) -> bool {
        target.has(TargetFlags::IMPACTABLE)
    }
}

impl<F> TargetFilter for F
where
    F: Fn(&Target) -> bool,
{
    fn accepts(&self, target: &Target) -> bool {
        self(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(flags: TargetFlags::Flags) -> Target {
        Target::standing(EntityId::from_raw(7), DVec3::ZERO, 0.6, 1.8, 1.62).with_flags(flags)
    }

    #[test]
    fn test_standing_geometry() {
        let t = target(TargetFlags::LIVING);
        assert!((t.eye_position.y - 1.62).abs() < 1e-12);
        assert!((t.bounds.max.y - 1.8).abs() < 1e-12);
        assert!(t.is_finite());
    }

    #[test]
    fn test_capability_filter() {
        let filter = CapabilityFilter;
        assert!(filter.accepts(&target(TargetFlags::LIVING)));
        assert!(filter.accepts(&target(TargetFlags::PART)));
        assert!(filter.accepts(&target(TargetFlags::COLLIDABLE)));
        assert!(!filter.accepts(&target(TargetFlags::NONE)));
    }

    #[test]
    fn test_closure_filter() {
        let only_living = |t: &Target| t.has(TargetFlags::LIVING);
        assert!(only_living.accepts(&target(TargetFlags::LIVING | TargetFlags::PART)));
        assert!(!only_living.accepts(&target(TargetFlags::COLLIDABLE)));
    }

    #[test]
    fn test_flag_names() {
        assert_eq!(TargetFlags::from_name("part"), Some(TargetFlags::PART));
        assert_eq!(TargetFlags::from_name("ghost"), None);
    }
}
