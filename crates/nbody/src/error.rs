//! Error types for the simulation crate.

use ordered_sequence::SequenceError;
use thiserror::Error;

use crate::body::BodyId;

/// Errors that can occur while configuring or stepping a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// A bookkeeping sequence was searched while out of order.
    #[error(transparent)]
    Sequence(#[from] SequenceError),

    /// Settings failed validation.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// A body definition failed validation.
    #[error("invalid body {id}: {reason}")]
    InvalidBody {
        /// Offending body.
        id: BodyId,
        /// What was wrong with it.
        reason: String,
    },

    /// Two body definitions share an id.
    #[error("duplicate body id {0}")]
    DuplicateBodyId(BodyId),

    /// Configuration JSON could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl SimulationError {
    /// Creates an invalid settings error.
    #[must_use]
    pub fn invalid_settings(reason: impl Into<String>) -> Self {
        Self::InvalidSettings(reason.into())
    }

    /// Creates an invalid body error.
    #[must_use]
    pub fn invalid_body(id: BodyId, reason: impl Into<String>) -> Self {
        Self::InvalidBody {
            id,
            reason: reason.into(),
        }
    }
}

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, SimulationError>;
