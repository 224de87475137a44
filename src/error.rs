//! Error types for the board engine

use thiserror::Error;

/// Result type for board operations
pub type Result<T> = std::result::Result<T, BoardError>;

/// Errors that can occur in board operations
#[derive(Debug, Error)]
pub enum BoardError {
    /// Position name was empty or all whitespace
    #[error("position name must not be empty")]
    EmptyPositionName,

    /// A live position with this name already exists on the board
    #[error("duplicate position name: {name}")]
    DuplicatePosition { name: String },

    /// Position not found among the board's live positions
    #[error("position not found: {id}")]
    PositionNotFound { id: String },

    /// Athlete not found on the current board
    #[error("athlete not found: {id}")]
    AthleteNotFound { id: String },

    /// Target column is neither a live position nor the unassigned sentinel
    #[error("unknown column: {name}")]
    UnknownColumn { name: String },

    /// The remote store reported a failure
    #[error("persistence failure: {message}")]
    Persistence { message: String },

    /// A persistence call exceeded the session's configured timeout
    #[error("persistence call timed out after {elapsed_ms}ms")]
    PersistenceTimeout { elapsed_ms: u64 },
}

impl BoardError {
    /// Create a persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Create a duplicate position error
    pub fn duplicate_position(name: impl Into<String>) -> Self {
        Self::DuplicatePosition { name: name.into() }
    }

    /// Create an unknown column error
    pub fn unknown_column(name: impl Into<String>) -> Self {
        Self::UnknownColumn { name: name.into() }
    }

    /// Check if this error was rejected before any state or network mutation.
    ///
    /// Validation errors leave local state and the remote store untouched;
    /// everything else is resolved by the reload path.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyPositionName
                | Self::DuplicatePosition { .. }
                | Self::PositionNotFound { .. }
                | Self::AthleteNotFound { .. }
                | Self::UnknownColumn { .. }
        )
    }

    /// Check if this error came from the persistence layer.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Self::Persistence { .. } | Self::PersistenceTimeout { .. }
        )
    }
}
