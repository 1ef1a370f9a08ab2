//! Error types for the combat core.

use geosmash_common::ParamError;
use thiserror::Error;

/// Errors raised while building fighters, stages and hazards.
///
/// All of these are configuration errors and surface before the first frame.
#[derive(Debug, Error)]
pub enum CombatError {
    /// Parameter lookup failed
    #[error(transparent)]
    Param(#[from] ParamError),

    /// A moveset refers to an attack that does not exist
    #[error("unknown attack '{name}'")]
    UnknownAttack {
        /// Attack name as written
        name: String,
    },

    /// Unknown fighter type name
    #[error("unknown fighter type '{name}'")]
    UnknownFighter {
        /// Fighter type as written
        name: String,
    },

    /// Stage description is unusable
    #[error("invalid stage: {0}")]
    Stage(String),

    /// Stage TOML syntax error
    #[error("failed to parse stage TOML: {0}")]
    StageParse(#[from] toml::de::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for combat setup.
pub type CombatResult<T> = Result<T, CombatError>;
