//! World construction and mutation errors.

use crate::error::{ErrorSeverity, GameError};
use crate::state::{EntityId, Position};

/// Errors raised while building or editing a [`World`](super::World).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WorldError {
    /// Grid dimensions must be positive.
    #[error("Invalid world dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    /// Position is outside the map bounds.
    #[error("Position {position} is out of bounds (map size: {width}x{height})")]
    OutOfBounds {
        position: Position,
        width: i32,
        height: i32,
    },

    /// Another actor already stands on the cell.
    #[error("Position {position} is already occupied by {occupant}")]
    CellOccupied {
        position: Position,
        occupant: EntityId,
    },

    /// A player was placed twice.
    #[error("The player is already placed")]
    PlayerAlreadyPlaced,

    /// Lookup of an actor that is not in the roster.
    #[error("Unknown actor {0}")]
    UnknownActor(EntityId),
}

impl GameError for WorldError {
    fn severity(&self) -> ErrorSeverity {
        use WorldError::*;
        match self {
            InvalidDimensions { .. } | OutOfBounds { .. } | CellOccupied { .. } => {
                ErrorSeverity::Validation
            }
            PlayerAlreadyPlaced => ErrorSeverity::Validation,
            UnknownActor(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        use WorldError::*;
        match self {
            InvalidDimensions { .. } => "WORLD_INVALID_DIMENSIONS",
            OutOfBounds { .. } => "WORLD_OUT_OF_BOUNDS",
            CellOccupied { .. } => "WORLD_CELL_OCCUPIED",
            PlayerAlreadyPlaced => "WORLD_PLAYER_ALREADY_PLACED",
            UnknownActor(_) => "WORLD_UNKNOWN_ACTOR",
        }
    }
}
