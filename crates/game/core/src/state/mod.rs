//! World state a bolt reads and writes.
//!
//! This module owns the terrain grid, the actor roster, clouds, floor items,
//! and the damage history. Live bolts mutate it exclusively through [`World`]
//! methods; tracer runs never call a mutating method.
mod actor;
mod cloud;
mod common;
mod error;
mod record;
mod terrain;
mod world;

pub use actor::{Actor, ActorFlags, Attitude, Holiness, Patron, Resists, Shield, Status};
pub use cloud::{Cloud, CloudKind};
pub use common::{COMPASS, EntityId, Position, ResourceMeter};
pub use error::WorldError;
pub use record::{DamageCause, DamageRecord, KillCategory};
pub use terrain::Feature;
pub use world::{Item, Noise, World};
