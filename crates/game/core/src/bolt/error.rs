//! Bolt resolution errors.
//!
//! Almost everything a bolt meets is game behaviour, not an error. These
//! variants cover broken caller invariants and world lookups that failed
//! mid-flight.

use crate::env::CatalogError;
use crate::error::{ErrorContext, ErrorSeverity, GameError};
use crate::state::WorldError;

use super::Flavour;

/// Errors raised while configuring or firing a bolt.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(bound(deserialize = "'de: 'static")))]
pub enum BoltError {
    /// The flavour cannot be fired the way the bolt is configured.
    #[error("Flavour {flavour} cannot be fired this way")]
    InvalidFlavour {
        flavour: Flavour,
        context: ErrorContext,
    },

    /// The source cell lies outside the map.
    #[error("Bolt source is out of bounds")]
    SourceOutOfBounds { context: ErrorContext },

    /// Range below zero after defaults were applied.
    #[error("Bolt range {range} is negative")]
    NegativeRange { range: i32, context: ErrorContext },

    /// The bolt left the map and could not be walked back onto it.
    #[error("Bolt endpoint could not be recovered")]
    UnrecoverableEndpoint { context: ErrorContext },

    /// An explosion was asked to explode again.
    #[error("Explosion is already in progress")]
    ExplosionReentered { context: ErrorContext },

    /// An attack id was not found or its template is malformed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The world rejected a change the bolt tried to make.
    #[error(transparent)]
    World(#[from] WorldError),
}

impl BoltError {
    pub fn invalid_flavour(flavour: Flavour, shot: u64) -> Self {
        Self::InvalidFlavour {
            flavour,
            context: ErrorContext::new(shot).with_message("flavour needs an explosion"),
        }
    }
}

impl GameError for BoltError {
    fn severity(&self) -> ErrorSeverity {
        use BoltError::*;
        match self {
            InvalidFlavour { .. } | SourceOutOfBounds { .. } | NegativeRange { .. } => {
                ErrorSeverity::Fatal
            }
            UnrecoverableEndpoint { .. } | ExplosionReentered { .. } => ErrorSeverity::Fatal,
            Catalog(e) => e.severity(),
            World(_) => ErrorSeverity::Internal,
        }
    }

    fn context(&self) -> Option<&ErrorContext> {
        use BoltError::*;
        match self {
            InvalidFlavour { context, .. }
            | SourceOutOfBounds { context }
            | NegativeRange { context, .. }
            | UnrecoverableEndpoint { context }
            | ExplosionReentered { context } => Some(context),
            Catalog(_) | World(_) => None,
        }
    }

    fn error_code(&self) -> &'static str {
        use BoltError::*;
        match self {
            InvalidFlavour { .. } => "BOLT_INVALID_FLAVOUR",
            SourceOutOfBounds { .. } => "BOLT_SOURCE_OUT_OF_BOUNDS",
            NegativeRange { .. } => "BOLT_NEGATIVE_RANGE",
            UnrecoverableEndpoint { .. } => "BOLT_UNRECOVERABLE_ENDPOINT",
            ExplosionReentered { .. } => "BOLT_EXPLOSION_REENTERED",
            Catalog(_) => "BOLT_CATALOG",
            World(_) => "BOLT_WORLD",
        }
    }
}
