//! 3D geometry primitives shared by the impact and leap helpers.
//!
//! Positions and velocities are [`DVec3`]. Boxes follow the host's
//! conventions: overlap tests are strict and unit "block" cells are anchored
//! at the floored integer corner.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Vectors shorter than this normalize to zero.
pub const NORMALIZE_EPSILON: f64 = 1.0e-4;

/// Normalizes `v`, returning the zero vector for near-zero lengths.
///
/// Matches the host engine's normalize: a degenerate direction never
/// produces NaN components.
#[must_use]
pub fn safe_normalize(v: DVec3) -> DVec3 {
    let length = v.length();
    if length < NORMALIZE_EPSILON {
        DVec3::ZERO
    } else {
        v / length
    }
}

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub min: DVec3,
    /// Maximum corner
    pub max: DVec3,
}

impl Aabb {
    /// Creates a box from two corners.
    #[must_use]
    pub const fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Creates an entity box standing on `feet`, `width` wide on X and Z.
    #[must_use]
    pub fn from_feet(feet: DVec3, width: f64, height: f64) -> Self {
        let half = width * 0.5;
        Self {
            min: DVec3::new(feet.x - half, feet.y, feet.z - half),
            max: DVec3::new(feet.x + half, feet.y + height, feet.z + half),
        }
    }

    /// Unit block cell containing `point`.
    #[must_use]
    pub fn block_at(point: DVec3) -> Self {
        let min = point.floor();
        Self {
            min,
            max: min + DVec3::ONE,
        }
    }

    /// Returns the center of the box.
    #[must_use]
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the extents on each axis.
    #[must_use]
    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// Mean of the three side lengths; a scalar proxy for entity size.
    #[must_use]
    pub fn average_side_length(&self) -> f64 {
        let size = self.size();
        (size.x + size.y + size.z) / 3.0
    }

    /// Expands the box by a margin on all sides.
    #[must_use]
    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            min: self.min - DVec3::splat(margin),
            max: self.max + DVec3::splat(margin),
        }
    }

    /// Checks if this box overlaps another (touching faces do not count).
    #[must_use]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// True when both corners are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::new(DVec3::ZERO, DVec3::ONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_safe_normalize_degenerate() {
        assert_eq!(safe_normalize(DVec3::ZERO), DVec3::ZERO);
        assert_eq!(safe_normalize(DVec3::splat(1.0e-5)), DVec3::ZERO);
    }

    #[test]
    fn test_safe_normalize_unit() {
        let n = safe_normalize(DVec3::new(3.0, 0.0, 4.0));
        assert!((n - DVec3::new(0.6, 0.0, 0.8)).length() < 1e-12);
    }

    #[test]
    fn test_average_side_length() {
        let bounds = Aabb::new(DVec3::ZERO, DVec3::new(1.0, 2.0, 3.0));
        assert!((bounds.average_side_length() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_block_at_negative() {
        let cell = Aabb::block_at(DVec3::new(-0.5, 64.2, 3.9));
        assert_eq!(cell.min, DVec3::new(-1.0, 64.0, 3.0));
        assert_eq!(cell.max, DVec3::new(0.0, 65.0, 4.0));
    }

    #[test]
    fn test_intersects_strict() {
        let a = Aabb::new(DVec3::ZERO, DVec3::ONE);
        let touching = Aabb::new(DVec3::new(1.0, 0.0, 0.0), DVec3::new(2.0, 1.0, 1.0));
        let overlapping = Aabb::new(DVec3::splat(0.5), DVec3::splat(1.5));
        assert!(!a.intersects(&touching));
        assert!(a.intersects(&overlapping));
        assert!(a.expanded(0.1).intersects(&touching));
    }

    #[test]
    fn test_is_finite() {
        let mut bounds = Aabb::default();
        assert!(bounds.is_finite());
        bounds.max.y = f64::NAN;
        assert!(!bounds.is_finite());
    }

    proptest! {
        #[test]
        fn normalized_length_is_zero_or_one(
            x in -1.0e3f64..1.0e3,
            y in -1.0e3f64..1.0e3,
            z in -1.0e3f64..1.0e3,
        ) {
            let n = safe_normalize(DVec3::new(x, y, z));
            let len = n.length();
            prop_assert!(len == 0.0 || (len - 1.0).abs() < 1e-9);
        }
    }
}
