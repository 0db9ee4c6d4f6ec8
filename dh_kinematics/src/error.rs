//! Error types for chain construction, evaluation and calibration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the kinematics core.
///
/// Every variant is raised synchronously at the point of construction or
/// validation. Joint-limit violations are not errors; they are reported as
/// flags on the evaluated [`FrameSequence`](crate::FrameSequence).
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum KinematicsError {
    /// A link was built from non-finite values or an inverted joint range.
    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParameter {
        /// Name of the offending field.
        field: String,
        /// Human readable reason.
        reason: String,
    },

    /// A chain was built from zero links.
    #[error("kinematic chain needs at least one link")]
    EmptyChain,

    /// A joint vector does not match the number of links in the chain.
    #[error("expected {expected} joint values, got {actual}")]
    DimensionMismatch {
        /// Number of links in the chain.
        expected: usize,
        /// Length of the supplied joint vector.
        actual: usize,
    },

    /// A calibration search range cannot be enumerated.
    #[error("invalid search range for {dimension}: {reason}")]
    InvalidSearchRange {
        /// Display form of the offending search dimension.
        dimension: String,
        /// Human readable reason.
        reason: String,
    },

    /// A robot configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl KinematicsError {
    /// Stable identifier for the error kind, used by callers that report
    /// failures as `kind + message`.
    pub fn kind(&self) -> &'static str {
        match self {
            KinematicsError::InvalidParameter { .. } => "InvalidParameterError",
            KinematicsError::EmptyChain => "EmptyChainError",
            KinematicsError::DimensionMismatch { .. } => "DimensionMismatchError",
            KinematicsError::InvalidSearchRange { .. } => "InvalidSearchRangeError",
            KinematicsError::Config(_) => "ConfigError",
        }
    }

    pub(crate) fn invalid_parameter(field: impl Into<String>, reason: impl Into<String>) -> Self {
        KinematicsError::InvalidParameter {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_range(dimension: impl ToString, reason: impl Into<String>) -> Self {
        KinematicsError::InvalidSearchRange {
            dimension: dimension.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for kinematics operations.
pub type Result<T> = std::result::Result<T, KinematicsError>;
