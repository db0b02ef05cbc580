//! Error types for Maelstrom.

use thiserror::Error;

use crate::ids::EntityId;

/// Top-level error type for Maelstrom operations.
#[derive(Debug, Error)]
pub enum MaelstromError {
    /// Area impact request was rejected
    #[error("Impact error: {0}")]
    Impact(#[from] ImpactError),

    /// Leap computation was rejected
    #[error("Leap error: {0}")]
    Leap(#[from] LeapError),

    /// Scenario file could not be used
    #[error("Scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Precondition failures for an area impact.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImpactError {
    /// Radius must be finite and strictly positive
    #[error("radius must be finite and > 0, got {0}")]
    InvalidRadius(f64),

    /// Max damage must be finite and non-negative
    #[error("max damage must be finite and >= 0, got {0}")]
    InvalidMaxDamage(f32),

    /// A request field is NaN or infinite
    #[error("{field} must be finite")]
    NonFinite {
        /// Name of the offending field
        field: &'static str,
    },

    /// A candidate target carries NaN or infinite geometry
    #[error("target {id} has non-finite geometry")]
    NonFiniteTarget {
        /// Offending target
        id: EntityId,
    },
}

/// Precondition failures for a leap.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LeapError {
    /// An input is NaN or infinite
    #[error("{field} must be finite")]
    NonFinite {
        /// Name of the offending input
        field: &'static str,
    },

    /// Horizontal speed cannot be negative
    #[error("horizontal speed must be >= 0, got {0}")]
    NegativeSpeed(f64),
}

/// Scenario loading and lookup errors.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Scenario file could not be read
    #[error("failed to read scenario: {0}")]
    Read(#[from] std::io::Error),

    /// Scenario file is not valid TOML for the expected schema
    #[error("failed to parse scenario: {0}")]
    Parse(String),

    /// A leap names an entity the scenario never declares
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),

    /// Two entities share an id
    #[error("duplicate entity {0}")]
    DuplicateEntity(EntityId),

    /// A capability name is not recognised
    #[error("unknown capability '{0}'")]
    UnknownCapability(String),
}

/// Result type alias for Maelstrom operations.
pub type MaelstromResult<T> = Result<T, MaelstromError>;
