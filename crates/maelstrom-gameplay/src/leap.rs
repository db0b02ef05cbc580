//! Directed leap velocity for creatures.
//!
//! A leap pushes a creature horizontally toward a point and, if it is not
//! already rising, kicks it upward. The horizontal result is clamped so that
//! stacking leaps onto existing momentum never exceeds the leap speed.

use maelstrom_common::{safe_normalize, DVec3, LeapError};
use tracing::trace;

use crate::target::Target;
use crate::world::VelocityControl;

/// Vertical velocity at or above which a creature counts as already rising.
pub const RISING_THRESHOLD: f64 = 0.1;

fn ensure_finite_vec(v: DVec3, field: &'static str) -> Result<(), LeapError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(LeapError::NonFinite { field })
    }
}

fn ensure_finite(x: f64, field: &'static str) -> Result<(), LeapError> {
    if x.is_finite() {
        Ok(())
    } else {
        Err(LeapError::NonFinite { field })
    }
}

/// Computes the velocity of a creature leaping toward `target_position`.
///
/// The prior vertical velocity is replaced, not summed: the result's Y is
/// `vertical_speed` when the creature is not rising, otherwise zero.
pub fn compute_leap(
    current_velocity: DVec3,
    current_position: DVec3,
    target_position: DVec3,
    horizontal_speed: f64,
    vertical_speed: f64,
) -> Result<DVec3, LeapError> {
    ensure_finite_vec(current_velocity, "current_velocity")?;
    ensure_finite_vec(current_position, "current_position")?;
    ensure_finite_vec(target_position, "target_position")?;
    ensure_finite(horizontal_speed, "horizontal_speed")?;
    ensure_finite(vertical_speed, "vertical_speed")?;
    if horizontal_speed < 0.0 {
        return Err(LeapError::NegativeSpeed(horizontal_speed));
    }

    let direction = safe_normalize(target_position - current_position);
    let leap = safe_normalize(DVec3::new(direction.x, 0.0, direction.z)) * horizontal_speed;
    let vertical = if current_velocity.y < RISING_THRESHOLD {
        vertical_speed
    } else {
        0.0
    };

    let combined = DVec3::new(current_velocity.x + leap.x, 0.0, current_velocity.z + leap.z);
    let length = combined.length();
    // Only ever scale down.
    let scale = if length > 0.0 {
        (horizontal_speed / length).min(1.0)
    } else {
        1.0
    };

    Ok(DVec3::new(combined.x * scale, vertical, combined.z * scale))
}

/// Makes `target` leap toward `destination`, writing the new velocity back
/// through the host.
pub fn leap_towards<W: VelocityControl>(
    world: &mut W,
    target: &Target,
    destination: DVec3,
    horizontal_speed: f64,
    vertical_speed: f64,
) -> Result<DVec3, LeapError> {
    let velocity = compute_leap(
        world.velocity(target.id),
        target.position,
        destination,
        horizontal_speed,
        vertical_speed,
    )?;
    world.set_velocity(target.id, velocity);
    trace!(target_id = %target.id, ?velocity, "leap");
    Ok(velocity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::SandboxWorld;
    use maelstrom_common::EntityId;
    use proptest::prelude::*;

    fn horizontal(v: DVec3) -> f64 {
        DVec3::new(v.x, 0.0, v.z).length()
    }

    #[test]
    fn test_leap_from_rest() {
        let target = DVec3::new(10.0, 3.0, 0.0);
        let v = compute_leap(DVec3::ZERO, DVec3::ZERO, target, 0.8, 0.5).expect("valid");
        assert!((v - DVec3::new(0.8, 0.5, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_rising_creature_gets_no_vertical_kick() {
        let v = compute_leap(
            DVec3::new(0.0, 0.3, 0.0),
            DVec3::ZERO,
            DVec3::new(0.0, 0.0, 5.0),
            1.0,
            0.7,
        )
        .expect("valid");
        assert_eq!(v.y, 0.0);
        assert!((v.z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_falling_vertical_is_replaced() {
        let v = compute_leap(
            DVec3::new(0.0, -0.5, 0.0),
            DVec3::ZERO,
            DVec3::new(3.0, 0.0, 4.0),
            1.0,
            0.4,
        )
        .expect("valid");
        assert!((v.y - 0.4).abs() < 1e-12);
        assert!((v - DVec3::new(0.6, 0.4, 0.8)).length() < 1e-12);
    }

    #[test]
    fn test_existing_momentum_is_clamped() {
        let v = compute_leap(
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::ZERO,
            DVec3::new(10.0, 0.0, 0.0),
            1.0,
            0.0,
        )
        .expect("valid");
        assert!((v - DVec3::new(1.0, 0.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_never_scales_up() {
        let v = compute_leap(
            DVec3::new(-0.5, 0.0, 0.0),
            DVec3::ZERO,
            DVec3::new(10.0, 0.0, 0.0),
            1.0,
            0.0,
        )
        .expect("valid");
        assert!((v.x - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_target_straight_above() {
        let above = DVec3::new(0.0, 5.0, 0.0);
        let v = compute_leap(DVec3::ZERO, DVec3::ZERO, above, 1.0, 0.6).expect("valid");
        assert_eq!(v, DVec3::new(0.0, 0.6, 0.0));
    }

    #[test]
    fn test_zero_horizontal_speed_stops_drift() {
        let drift = DVec3::new(0.3, 0.0, 0.4);
        let v = compute_leap(drift, DVec3::ZERO, DVec3::X, 0.0, 0.2).expect("valid");
        assert_eq!(horizontal(v), 0.0);
        assert!(v.is_finite());
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(
            compute_leap(DVec3::ZERO, DVec3::ZERO, DVec3::X, -1.0, 0.0),
            Err(LeapError::NegativeSpeed(-1.0))
        );
        assert_eq!(
            compute_leap(DVec3::new(f64::NAN, 0.0, 0.0), DVec3::ZERO, DVec3::X, 1.0, 0.0),
            Err(LeapError::NonFinite {
                field: "current_velocity"
            })
        );
        assert_eq!(
            compute_leap(DVec3::ZERO, DVec3::ZERO, DVec3::X, 1.0, f64::INFINITY),
            Err(LeapError::NonFinite {
                field: "vertical_speed"
            })
        );
    }

    #[test]
    fn test_leap_towards_writes_velocity() {
        let mut world = SandboxWorld::new();
        let at = DVec3::new(1.0, 64.0, 1.0);
        let wolf = Target::standing(EntityId::from_raw(4), at, 0.6, 0.85, 0.68);
        world.spawn_with_velocity(wolf.clone(), DVec3::new(0.0, 0.0, 0.2));

        let destination = DVec3::new(1.0, 64.0, 10.0);
        let v = leap_towards(&mut world, &wolf, destination, 0.5, 0.4).expect("valid");

        assert_eq!(world.velocity(wolf.id), v);
        assert!((horizontal(v) - 0.5).abs() < 1e-12);
        assert!((v.y - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_leap_towards_rejects_without_writing() {
        let mut world = SandboxWorld::new();
        let wolf = Target::standing(EntityId::from_raw(4), DVec3::ZERO, 0.6, 0.85, 0.68);
        world.spawn_with_velocity(wolf.clone(), DVec3::ONE);

        assert!(leap_towards(&mut world, &wolf, DVec3::X, -2.0, 0.4).is_err());
        assert_eq!(world.velocity(wolf.id), DVec3::ONE);
    }

    proptest! {
        #[test]
        fn horizontal_speed_never_exceeds_limit(
            vx in -5.0f64..5.0,
            vy in -2.0f64..2.0,
            vz in -5.0f64..5.0,
            tx in -20.0f64..20.0,
            tz in -20.0f64..20.0,
            speed in 0.0f64..3.0,
        ) {
            let v = compute_leap(
                DVec3::new(vx, vy, vz),
                DVec3::ZERO,
                DVec3::new(tx, 1.0, tz),
                speed,
                0.5,
            ).expect("finite inputs");
            prop_assert!(horizontal(v) <= speed + 1e-9);
        }
    }
}
