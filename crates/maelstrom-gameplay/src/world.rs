//! Host world collaborators.
//!
//! The helpers in this crate never own entities. They read candidate
//! snapshots through [`SpatialQuery`] and push their effects back through
//! [`DamageSink`] and [`VelocityControl`]. [`SandboxWorld`] implements all
//! three over an in-memory table for tests and the headless harness.

use std::collections::BTreeMap;

use maelstrom_common::{Aabb, DVec3, EntityId};
use serde::{Deserialize, Serialize};

use crate::target::Target;

/// Tag describing what dealt a hit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DamageSource {
    /// Source name, e.g. "explosion" or "mob".
    pub name: String,
    /// Entity credited with the hit.
    pub attacker: Option<EntityId>,
}

impl DamageSource {
    /// Creates a source with no attacker.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attacker: None,
        }
    }

    /// Explosion source, the default for area impacts.
    #[must_use]
    pub fn explosion() -> Self {
        Self::new("explosion")
    }
}

impl Default for DamageSource {
    fn default() -> Self {
        Self::explosion()
    }
}

/// Spatial index lookup provided by the host.
pub trait SpatialQuery {
    /// Returns snapshots of every entity whose bounds intersect `region`,
    /// skipping `exclude`.
    fn query_entities_in_box(&self, region: &Aabb, exclude: Option<EntityId>) -> Vec<Target>;
}

/// Damage pipeline provided by the host.
pub trait DamageSink {
    /// Deals `amount` damage to an entity.
    fn apply_damage(&mut self, id: EntityId, source: &DamageSource, amount: f32);

    /// Sets an entity on fire for at least `ticks`.
    fn set_on_fire(&mut self, id: EntityId, ticks: u32);
}

/// Velocity access provided by the host.
pub trait VelocityControl {
    /// Current velocity of an entity.
    fn velocity(&self, id: EntityId) -> DVec3;

    /// Overwrites the velocity of an entity.
    fn set_velocity(&mut self, id: EntityId, velocity: DVec3);

    /// Adds an impulse to the current velocity.
    fn add_velocity(&mut self, id: EntityId, delta: DVec3) {
        let current = self.velocity(id);
        self.set_velocity(id, current + delta);
    }
}

/// One hit recorded by the sandbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageRecord {
    /// Source of the hit.
    pub source: DamageSource,
    /// Damage dealt.
    pub amount: f32,
}

/// Entity state tracked by [`SandboxWorld`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SandboxEntity {
    /// Geometry snapshot handed to queries.
    pub target: Target,
    /// Current velocity.
    pub velocity: DVec3,
    /// Remaining burn time in ticks.
    pub fire_ticks: u32,
    /// Hits received, in order.
    pub hits: Vec<DamageRecord>,
}

impl SandboxEntity {
    /// Sum of all damage received.
    #[must_use]
    pub fn total_damage(&self) -> f32 {
        self.hits.iter().map(|hit| hit.amount).sum()
    }
}

/// In-memory world implementing every collaborator trait.
#[derive(Debug, Clone, Default)]
pub struct SandboxWorld {
    entities: BTreeMap<EntityId, SandboxEntity>,
}

impl SandboxWorld {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity at rest. Returns false if the id is already taken.
    pub fn spawn(&mut self, target: Target) -> bool {
        self.spawn_with_velocity(target, DVec3::ZERO)
    }

    /// Adds an entity moving at `velocity`. Returns false if the id is
    /// already taken.
    pub fn spawn_with_velocity(&mut self, target: Target, velocity: DVec3) -> bool {
        if self.entities.contains_key(&target.id) {
            return false;
        }
        self.entities.insert(
            target.id,
            SandboxEntity {
                target,
                velocity,
                fire_ticks: 0,
                hits: Vec::new(),
            },
        );
        true
    }

    /// Looks up an entity.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&SandboxEntity> {
        self.entities.get(&id)
    }

    /// Iterates entities in id order.
    pub fn entities(&self) -> impl Iterator<Item = &SandboxEntity> {
        self.entities.values()
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True when the world holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl SpatialQuery for SandboxWorld {
    fn query_entities_in_box(&self, region: &Aabb, exclude: Option<EntityId>) -> Vec<Target> {
        self.entities
            .values()
            .filter(|e| Some(e.target.id) != exclude && e.target.bounds.intersects(region))
            .map(|e| e.target.clone())
            .collect()
    }
}

impl DamageSink for SandboxWorld {
    fn apply_damage(&mut self, id: EntityId, source: &DamageSource, amount: f32) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.hits.push(DamageRecord {
                source: source.clone(),
                amount,
            });
        }
    }

    fn set_on_fire(&mut self, id: EntityId, ticks: u32) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.fire_ticks = entity.fire_ticks.max(ticks);
        }
    }
}

impl VelocityControl for SandboxWorld {
    fn velocity(&self, id: EntityId) -> DVec3 {
        self.entities.get(&id).map_or(DVec3::ZERO, |e| e.velocity)
    }

    fn set_velocity(&mut self, id: EntityId, velocity: DVec3) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.velocity = velocity;
        }
    }
}
