//! Error severity and context shared by every beam-core error type.
//!
//! `BoltError`, `WorldError` and `CatalogError` live beside the code that
//! raises them and implement [`GameError`] so callers can sort failures
//! without matching on each enum. A shot never panics on bad input: a broken
//! invariant comes back as a `Fatal` error carrying the shot number.

use crate::state::{EntityId, Position};

/// How a caller should treat a failed shot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Retrying later, or with another target, may succeed.
    Recoverable,

    /// Bad input such as an off-map actor or an unknown attack id.
    Validation,

    /// The world and its occupancy disagree.
    Internal,

    /// The shot itself was malformed: fired from off the map, negative range.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Internal and fatal errors point at a bug in the caller or the engine.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Where a shot was when it failed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorContext {
    /// Who fired, when known.
    pub actor: Option<EntityId>,

    /// The bolt's cell at the moment of failure.
    pub position: Option<Position>,

    /// Dice stream shot number; feeding it back replays the failure.
    pub shot: u64,

    pub message: Option<&'static str>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(shot: u64) -> Self {
        Self {
            actor: None,
            position: None,
            shot,
            message: None,
        }
    }

    #[must_use]
    pub const fn with_actor(mut self, actor: EntityId) -> Self {
        self.actor = Some(actor);
        self
    }

    #[must_use]
    pub const fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Implemented by every error a shot, the world or the attack catalog can
/// return.
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    fn context(&self) -> Option<&ErrorContext> {
        None
    }

    /// Stable identifier for logs. Defaults to the type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
