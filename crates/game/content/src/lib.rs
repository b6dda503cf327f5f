//! Data-driven content for the beam simulator.
//!
//! This crate houses static content and the loaders for its RON/TOML files:
//! - Attack catalog (embedded RON, served through `AttackCatalog`)
//! - Scenario maps with their actors (RON, ASCII terrain rows)
//! - Beam tunables (TOML)
//!
//! Content is consumed through `beam-core` oracles and types; nothing here
//! takes part in bolt resolution itself.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    ActorSpec, AttackRegistry, ConfigLoader, ContentFactory, LoadResult, ScenarioLoader,
    ScenarioRon,
};
