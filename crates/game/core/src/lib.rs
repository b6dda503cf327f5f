//! Deterministic bolt, beam, and explosion resolution for a grid roguelike.
//!
//! `beam-core` simulates one ranged attack from the moment it leaves its
//! source to the moment it stops: the path it flies, the walls it digs,
//! burns, or bounces off, the creatures it hits or enchants, and the blast it
//! may end in. Every shot can also run as a tracer that only counts who would
//! be hit, so callers can decide whether to fire at all.
//!
//! All state the simulation touches is passed in explicitly through
//! [`BoltEnv`]; randomness, perception, messages, and confirmation prompts are
//! oracles supplied by the caller.
pub mod bolt;
pub mod combat;
pub mod config;
pub mod env;
pub mod error;
pub mod state;

pub use bolt::{
    Bolt, BoltBuilder, BoltError, EnchantOutcome, ExplosionMap, Flavour, FloodRules, Hooks, NeighborMask,
    Ray, RunState, Termination, Thrower, TracerInfo, fire_tracer, player_tracer, radial_sweep,
    zapping,
};
pub use combat::{DamageRoll, DiceDef, HitOutcome, ToHit};
pub use config::BeamConfig;
pub use env::{
    AttackCatalog, AttackId, AttackTemplate, BoltEnv, Channel, Dice, MessageLog, MessageSink,
    Prompter, RngOracle, VisibilityOracle,
};
pub use error::{ErrorContext, ErrorSeverity, GameError};
pub use state::{Actor, Attitude, EntityId, Feature, Position, World};
