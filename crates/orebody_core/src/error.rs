//! # Model Error Types
//!
//! All errors that can occur while building or transforming a block model.
//!
//! Missing block fields during export are not errors: they degrade to the
//! `0.0000` sentinel and never reach this type.

use thiserror::Error;

/// Errors that can occur in the block-model engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A grid or generator parameter is out of its valid range.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name as it appears in the config.
        name: &'static str,
        /// What was wrong with the supplied value.
        reason: String,
    },

    /// A rock-type label outside the material vocabulary.
    #[error("unknown rock type: {0}")]
    UnknownRockType(String),

    /// A generator name with no entry in the registry.
    #[error("unknown generator: {0}")]
    UnknownGenerator(String),

    /// Invalid configuration document.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ModelError {
    /// Shorthand for [`ModelError::InvalidParameter`].
    #[must_use]
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
