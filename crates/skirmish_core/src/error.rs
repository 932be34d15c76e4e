//! Error types for the entity simulation.

use thiserror::Error;

use crate::components::{EntityId, Team};

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all simulation errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// A team's decision logic failed while choosing a unit's action.
    ///
    /// Never recovered inside the registry: the orchestrator turns it into a
    /// forfeit for `team`.
    #[error("Decision logic of team {team} failed on entity {entity}: {message}")]
    DecisionFault {
        /// Team whose decision logic raised the fault.
        team: Team,
        /// Unit being decided for.
        entity: EntityId,
        /// Message reported by the decision logic.
        message: String,
    },

    /// Invalid entity reference.
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

/// Failure raised by a team's decision logic.
///
/// Carries only a message; the registry tags it with the offending team
/// when wrapping it into [`GameError::DecisionFault`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DecisionError {
    /// Human-readable description of the failure.
    pub message: String,
}

impl DecisionError {
    /// Create a decision error from any message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
