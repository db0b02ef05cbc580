//! Scenario files and runs.
//!
//! A scenario declares entities, area impacts and leaps in TOML:
//!
//! ```toml
//! [[entities]]
//! id = 2
//! position = [2.5, 64.0, 0.5]
//! capabilities = ["living"]
//!
//! [[impacts]]
//! center = [0.5, 64.0, 0.5]
//! radius = 4.0
//! max_damage = 10.0
//! fire_factor = 100
//!
//! [[leaps]]
//! entity = 2
//! target = [8.0, 64.0, 0.5]
//! horizontal_speed = 0.8
//! vertical_speed = 0.42
//! ```
//!
//! Impacts run first, in file order, then leaps.

use std::fs;
use std::path::Path;

use maelstrom_common::{DVec3, EntityId, MaelstromResult, ScenarioError};
use maelstrom_gameplay::{
    leap_towards, AreaImpactResolver, ImpactRequest, SandboxEntity, SandboxWorld, Target,
    TargetFlags,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::SimConfig;

fn default_width() -> f64 {
    0.6
}

fn default_height() -> f64 {
    1.8
}

fn default_capabilities() -> Vec<String> {
    vec!["living".to_string()]
}

/// Eye height as a fraction of body height when none is given.
const DEFAULT_EYE_RATIO: f64 = 0.85;

/// Entity declared by a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpec {
    /// Entity id.
    pub id: EntityId,
    /// Feet position.
    pub position: DVec3,
    /// Box width on X and Z.
    #[serde(default = "default_width")]
    pub width: f64,
    /// Box height.
    #[serde(default = "default_height")]
    pub height: f64,
    /// Eye height above the feet.
    #[serde(default)]
    pub eye_height: Option<f64>,
    /// Initial velocity.
    #[serde(default)]
    pub velocity: DVec3,
    /// Capability names: "living", "part", "collidable".
    #[serde(default = "default_capabilities")]
    pub capabilities: Vec<String>,
}

impl EntitySpec {
    /// Builds the target snapshot.
    pub fn to_target(&self) -> Result<Target, ScenarioError> {
        let flags = self.capabilities.iter().try_fold(TargetFlags::NONE, |acc, name| {
            TargetFlags::from_name(name)
                .map(|flag| acc | flag)
                .ok_or_else(|| ScenarioError::UnknownCapability(name.clone()))
        })?;
        let eye_height = self.eye_height.unwrap_or(self.height * DEFAULT_EYE_RATIO);

        let target = Target::standing(self.id, self.position, self.width, self.height, eye_height);
        Ok(target.with_flags(flags))
    }
}

/// Leap declared by a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeapSpec {
    /// Leaping entity.
    pub entity: EntityId,
    /// Point to leap toward.
    pub target: DVec3,
    /// Horizontal leap speed.
    pub horizontal_speed: f64,
    /// Vertical kick.
    pub vertical_speed: f64,
}

/// A complete scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Entities to spawn.
    #[serde(default)]
    pub entities: Vec<EntitySpec>,
    /// Impacts to resolve, in order.
    #[serde(default)]
    pub impacts: Vec<ImpactRequest>,
    /// Leaps to perform after the impacts, in order.
    #[serde(default)]
    pub leaps: Vec<LeapSpec>,
}

/// What one impact did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactReport {
    /// Position of the impact in the scenario.
    pub index: usize,
    /// Per-target results.
    pub hits: Vec<HitReport>,
    /// Rejection reason, when the request was invalid.
    pub error: Option<String>,
}

/// One target hit by an impact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HitReport {
    /// Target id.
    pub entity: EntityId,
    /// Damage dealt.
    pub damage: f32,
    /// Fire ticks applied.
    pub fire_ticks: u32,
    /// Knockback impulse.
    pub knockback: DVec3,
    /// Squared damage factor.
    pub damage_factor_sq: f64,
}

/// What one leap did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeapReport {
    /// Leaping entity.
    pub entity: EntityId,
    /// Resulting velocity, when the leap was accepted.
    pub velocity: Option<DVec3>,
    /// Rejection reason.
    pub error: Option<String>,
}

/// Full outcome of a scenario run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Impact outcomes, in order.
    pub impacts: Vec<ImpactReport>,
    /// Leap outcomes, in order.
    pub leaps: Vec<LeapReport>,
    /// Final entity states, if requested.
    pub entities: Vec<SandboxEntity>,
}

impl Scenario {
    /// Parses a scenario from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ScenarioError> {
        toml::from_str(contents).map_err(|e| ScenarioError::Parse(e.to_string()))
    }

    /// Reads and parses a scenario file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let scenario = Self::from_toml_str(&contents)?;
        info!(
            "Loaded scenario {} ({} entities, {} impacts, {} leaps)",
            path.display(),
            scenario.entities.len(),
            scenario.impacts.len(),
            scenario.leaps.len()
        );
        Ok(scenario)
    }

    /// Spawns every declared entity into a fresh sandbox.
    pub fn build_world(&self) -> Result<SandboxWorld, ScenarioError> {
        let mut world = SandboxWorld::new();
        for spec in &self.entities {
            if !world.spawn_with_velocity(spec.to_target()?, spec.velocity) {
                return Err(ScenarioError::DuplicateEntity(spec.id));
            }
        }
        Ok(world)
    }

    /// Runs the scenario against a fresh sandbox.
    pub fn run(&self, config: &SimConfig) -> MaelstromResult<Report> {
        let mut world = self.build_world()?;
        let resolver = AreaImpactResolver::new();

        let mut impacts = Vec::with_capacity(self.impacts.len());
        for (index, request) in self.impacts.iter().enumerate() {
            let mut log_hit = |target: &Target, factor: f64| {
                debug!("Impact {index} hit {} (factor {factor:.3})", target.id);
            };
            match resolver.handle_impact(request, &mut world, &mut log_hit) {
                Ok(hits) => impacts.push(ImpactReport {
                    index,
                    hits: hits
                        .iter()
                        .map(|hit| HitReport {
                            entity: hit.target.id,
                            damage: hit.result.damage,
                            fire_ticks: hit.result.fire_ticks,
                            knockback: hit.result.knockback,
                            damage_factor_sq: hit.result.damage_factor_sq,
                        })
                        .collect(),
                    error: None,
                }),
                Err(e) if config.stop_on_error => return Err(e.into()),
                Err(e) => impacts.push(ImpactReport {
                    index,
                    hits: Vec::new(),
                    error: Some(e.to_string()),
                }),
            }
        }

        let mut leaps = Vec::with_capacity(self.leaps.len());
        for spec in &self.leaps {
            let target = world
                .entity(spec.entity)
                .map(|e| e.target.clone())
                .ok_or(ScenarioError::UnknownEntity(spec.entity))?;
            match leap_towards(
                &mut world,
                &target,
                spec.target,
                spec.horizontal_speed,
                spec.vertical_speed,
            ) {
                Ok(velocity) => leaps.push(LeapReport {
                    entity: spec.entity,
                    velocity: Some(velocity),
                    error: None,
                }),
                Err(e) if config.stop_on_error => return Err(e.into()),
                Err(e) => {
                    warn!("Leap for {} rejected: {e}", spec.entity);
                    leaps.push(LeapReport {
                        entity: spec.entity,
                        velocity: None,
                        error: Some(e.to_string()),
                    });
                },
            }
        }

        let entities = if config.include_entities {
            world.entities().cloned().collect()
        } else {
            Vec::new()
        };

        Ok(Report {
            impacts,
            leaps,
            entities,
        })
    }
}
