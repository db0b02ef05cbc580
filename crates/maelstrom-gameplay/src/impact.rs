//! Area impact resolution.
//!
//! Resolves explosion and splash attacks against every eligible entity near
//! a blast center:
//! - Distance is measured to the closest of box center, head and feet
//! - Large targets get a size discount so direct hits land full damage
//! - Damage falls off with the square of a linear squared-distance factor
//! - Fire duration and knockback scale with the same factor
//!
//! [`resolve`] is the pure computation. [`AreaImpactResolver::handle_impact`]
//! wraps it with the host collaborators: spatial query, candidate filter,
//! damage pipeline, velocity and an observer.
//!
//! # Example
//!
//! ```
//! use maelstrom_common::{DVec3, EntityId};
//! use maelstrom_gameplay::impact::{resolve, ImpactRequest};
//! use maelstrom_gameplay::target::Target;
//!
//! let request = ImpactRequest::new(DVec3::ZERO, 4.0, 10.0);
//! let at = DVec3::new(2.0, 0.0, 0.0);
//! let zombie = Target::standing(EntityId::from_raw(1), at, 0.6, 1.95, 1.74);
//!
//! let hits = resolve(&request, &[zombie]).expect("valid request");
//! assert_eq!(hits.len(), 1);
//! assert!(hits[0].result.damage > 0.0);
//! ```

use maelstrom_common::{safe_normalize, Aabb, DVec3, EntityId, ImpactError};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::target::{CapabilityFilter, Target, TargetFilter};
use crate::world::{DamageSink, DamageSource, SpatialQuery, VelocityControl};

/// Fraction of the average side length discounted from the hit distance.
pub const SIZE_DISCOUNT: f64 = 0.75;

/// Knockback multiplier used when a request does not set one.
pub const DEFAULT_KNOCKBACK_FACTOR: f64 = 1.0;

fn default_knockback_factor() -> f64 {
    DEFAULT_KNOCKBACK_FACTOR
}

fn default_damage_decay() -> bool {
    true
}

/// Parameters of one area impact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactRequest {
    /// Blast center.
    pub center: DVec3,
    /// Blast radius, > 0.
    pub radius: f64,
    /// Damage dealt at full strength, >= 0.
    pub max_damage: f32,
    /// Knockback multiplier.
    #[serde(default = "default_knockback_factor")]
    pub knockback_factor: f64,
    /// Fire ticks at full strength.
    #[serde(default)]
    pub fire_factor: u32,
    /// Whether damage falls off with distance.
    #[serde(default = "default_damage_decay")]
    pub damage_decay: bool,
    /// Source tag passed to the damage pipeline.
    #[serde(default)]
    pub damage_source: DamageSource,
    /// Entity that caused the impact; never hit by it.
    #[serde(default)]
    pub source: Option<EntityId>,
}

impl ImpactRequest {
    /// Creates a request with default knockback, no fire and decay enabled.
    #[must_use]
    pub fn new(center: DVec3, radius: f64, max_damage: f32) -> Self {
        Self {
            center,
            radius,
            max_damage,
            knockback_factor: DEFAULT_KNOCKBACK_FACTOR,
            fire_factor: 0,
            damage_decay: true,
            damage_source: DamageSource::explosion(),
            source: None,
        }
    }

    /// Set the knockback multiplier.
    #[must_use]
    pub fn with_knockback(mut self, factor: f64) -> Self {
        self.knockback_factor = factor;
        self
    }

    /// Set fire ticks at full strength.
    #[must_use]
    pub fn with_fire(mut self, ticks: u32) -> Self {
        self.fire_factor = ticks;
        self
    }

    /// Enable or disable distance falloff.
    #[must_use]
    pub fn with_damage_decay(mut self, decay: bool) -> Self {
        self.damage_decay = decay;
        self
    }

    /// Set the damage source tag.
    #[must_use]
    pub fn with_damage_source(mut self, source: DamageSource) -> Self {
        self.damage_source = source;
        self
    }

    /// Set the entity that caused the impact.
    #[must_use]
    pub fn with_source(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }

    /// Checks the request preconditions.
    pub fn validate(&self) -> Result<(), ImpactError> {
        if !self.center.is_finite() {
            return Err(ImpactError::NonFinite { field: "center" });
        }
        // radius² feeds the falloff and must not overflow
        if !(self.radius * self.radius).is_finite() || self.radius <= 0.0 {
            return Err(ImpactError::InvalidRadius(self.radius));
        }
        if !self.max_damage.is_finite() || self.max_damage < 0.0 {
            return Err(ImpactError::InvalidMaxDamage(self.max_damage));
        }
        if !self.knockback_factor.is_finite() {
            return Err(ImpactError::NonFinite {
                field: "knockback_factor",
            });
        }
        Ok(())
    }

    /// Region handed to the spatial query: the block cell holding the
    /// center, grown by the radius.
    #[must_use]
    pub fn query_region(&self) -> Aabb {
        Aabb::block_at(self.center).expanded(self.radius)
    }

    /// Evaluates one target against an already validated request.
    ///
    /// Returns `None` when the target is out of range or would take no
    /// damage.
    #[must_use]
    pub fn evaluate(&self, target: &Target) -> Option<ImpactResult> {
        let avg_size = target.bounds.average_side_length() * SIZE_DISCOUNT;
        let box_center = target.bounds.center();

        let distance = box_center
            .distance(self.center)
            .min(target.eye_position.distance(self.center))
            .min(target.position.distance(self.center));

        let adjusted = (distance - avg_size).max(0.0);
        let adjusted_sq = adjusted * adjusted;
        let radius_sq = self.radius * self.radius;

        let damage_factor = if self.damage_decay {
            ((radius_sq - adjusted_sq) / radius_sq).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let damage_factor_sq = damage_factor * damage_factor;
        let damage = f64::from(self.max_damage) * damage_factor_sq;

        if !(damage > 0.0 && adjusted_sq < radius_sq) {
            trace!(target_id = %target.id, adjusted, "impact out of range");
            return None;
        }

        let size_factor = entity_size_factor(avg_size);
        let knockback = safe_normalize(box_center - self.center)
            * damage_factor_sq
            * self.knockback_factor
            * (size_factor * size_factor);

        Some(ImpactResult {
            damage: damage as f32,
            fire_ticks: (f64::from(self.fire_factor) * damage_factor_sq).floor() as u32,
            knockback,
            damage_factor_sq,
        })
    }
}

/// Knockback scale for a target of the given discounted size.
///
/// Small targets are capped at full strength, large ones bottom out at half.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn entity_size_factor(avg_size: f64) -> f64 {
    if avg_size == 0.0 {
        1.0
    } else {
        (1.0 / avg_size).clamp(0.5, 1.0)
    }
}

/// Outcome of an impact on one target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactResult {
    /// Damage dealt.
    pub damage: f32,
    /// Fire duration in ticks.
    pub fire_ticks: u32,
    /// Velocity impulse.
    pub knockback: DVec3,
    /// Squared damage factor in [0, 1].
    pub damage_factor_sq: f64,
}

/// A target together with what the impact does to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactHit {
    /// The target that was hit.
    pub target: Target,
    /// The computed effect.
    pub result: ImpactResult,
}

/// Resolves an impact against pre-filtered candidates.
///
/// Pure: nothing is mutated. Candidates that do not qualify are left out of
/// the result. Fails without partial output when the request or any
/// candidate is malformed.
pub fn resolve(
    request: &ImpactRequest,
    candidates: &[Target],
) -> Result<Vec<ImpactHit>, ImpactError> {
    request.validate()?;
    if let Some(bad) = candidates.iter().find(|t| !t.is_finite()) {
        return Err(ImpactError::NonFiniteTarget { id: bad.id });
    }

    Ok(candidates
        .iter()
        .filter_map(|target| {
            request.evaluate(target).map(|result| ImpactHit {
                target: target.clone(),
                result,
            })
        })
        .collect())
}

/// Receives a notification for every target an impact lands on.
pub trait ImpactObserver {
    /// Called after damage and knockback were applied.
    fn on_impact(&mut self, target: &Target, damage_factor_sq: f64);
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ImpactObserver for NoopObserver {
    fn on_impact(&mut self, _target: &Target, _damage_factor_sq: f64) {}
}

impl<F> ImpactObserver for F
where
    F: FnMut(&Target, f64),
{
    fn on_impact(&mut self, target: &Target, damage_factor_sq: f64) {
        self(target, damage_factor_sq);
    }
}

/// Runs area impacts against a host world.
#[derive(Debug, Clone, Default)]
pub struct AreaImpactResolver<F = CapabilityFilter> {
    filter: F,
}

impl AreaImpactResolver {
    /// Creates a resolver with the default capability filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F: TargetFilter> AreaImpactResolver<F> {
    /// Creates a resolver with a custom candidate filter.
    #[must_use]
    pub fn with_filter(filter: F) -> Self {
        Self { filter }
    }

    /// Queries the world and keeps the candidates the filter accepts.
    pub fn candidates<W: SpatialQuery>(&self, request: &ImpactRequest, world: &W) -> Vec<Target> {
        world
            .query_entities_in_box(&request.query_region(), request.source)
            .into_iter()
            .filter(|t| self.filter.accepts(t))
            .collect()
    }

    /// Resolves an impact and applies it.
    ///
    /// For each hit, in order: ignite (when the fire duration is non-zero),
    /// deal damage, add knockback, notify the observer. A rejected request
    /// touches nothing.
    pub fn handle_impact<W, O>(
        &self,
        request: &ImpactRequest,
        world: &mut W,
        observer: &mut O,
    ) -> Result<Vec<ImpactHit>, ImpactError>
    where
        W: SpatialQuery + DamageSink + VelocityControl,
        O: ImpactObserver,
    {
        if let Err(e) = request.validate() {
            warn!("Rejected impact request: {e}");
            return Err(e);
        }

        let candidates = self.candidates(request, world);
        let hits = match resolve(request, &candidates) {
            Ok(hits) => hits,
            Err(e) => {
                warn!("Rejected impact candidates: {e}");
                return Err(e);
            },
        };

        for hit in &hits {
            let id = hit.target.id;
            if hit.result.fire_ticks > 0 {
                world.set_on_fire(id, hit.result.fire_ticks);
            }
            world.apply_damage(id, &request.damage_source, hit.result.damage);
            world.add_velocity(id, hit.result.knockback);
            observer.on_impact(&hit.target, hit.result.damage_factor_sq);
            trace!(target_id = %id, damage = hit.result.damage, "impact applied");
        }

        debug!(
            "Impact at {:?} r={} hit {}/{} candidates",
            request.center,
            request.radius,
            hits.len(),
            candidates.len()
        );
        Ok(hits)
    }
}
