//! Error types for GeoSmash.

use thiserror::Error;

/// Errors raised while loading or reading tunable parameters.
///
/// Every one of these is a configuration error: the combat core resolves all
/// parameters it needs before the first frame, so none of them can surface
/// mid-match.
#[derive(Debug, Error)]
pub enum ParamError {
    /// A required key is absent
    #[error("missing parameter '{key}'")]
    Missing {
        /// Fully qualified key
        key: String,
    },

    /// A key was defined twice
    #[error("duplicate parameter '{key}'")]
    Duplicate {
        /// Fully qualified key
        key: String,
    },

    /// A value could not be read as a number
    #[error("parameter '{key}' is not a number")]
    NotANumber {
        /// Fully qualified key
        key: String,
    },

    /// A line of a plain-text parameter file could not be split into key and value
    #[error("malformed parameter line {line}: '{content}'")]
    Malformed {
        /// 1-based line number
        line: usize,
        /// Offending line
        content: String,
    },

    /// A value is present but unusable
    #[error("invalid parameter '{key}': {reason}")]
    Invalid {
        /// Fully qualified key
        key: String,
        /// Why the value was rejected
        reason: String,
    },

    /// TOML syntax error
    #[error("failed to parse parameter TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for parameter operations.
pub type ParamResult<T> = Result<T, ParamError>;
