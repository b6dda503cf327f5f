//! Damage, to-hit, and resistance rules.
//!
//! These are pure functions over actors and dice. The bolt module decides
//! when to call them and whether their results are committed.
//!
//! # Modules
//!
//! - `damage`: dice, armour draws, and the three-stage [`DamageRoll`]
//! - `hit`: the to-hit ladder and shield blocks
//! - `resist`: the flavour property table and per-flavour resistance

pub mod damage;
pub mod hit;
pub mod resist;

pub use damage::{DamageRoll, DiceDef, armour_reduction, maybe_random2};
pub use hit::{HitOutcome, Mitigation, ToHit, hit_ladder, shield_blocks, test_beam_hit};
pub use resist::{
    BounceRule, EffectMode, FlavourEffect, FlavourProps, Flavoured, ResistKind, adjust_flavoured,
    resist_adjust_damage,
};
