//! Externally supplied callbacks that customise a bolt.
//!
//! Each list runs in registration order. Hooks are plain function pointers:
//! they borrow nothing and are copied freely into nested bolts.

use super::Bolt;
use crate::state::{Actor, EntityId, Position, World};

/// Adjusts damage before armour. Returning true vetoes the hit entirely.
///
/// Text pushed onto the list is shown after a damaging hit.
pub type DamageHook = fn(&Bolt, &Actor, &mut i32, &mut Vec<String>) -> bool;

/// Runs after a target was struck with the final damage. Returns whether the
/// hook affected the target. Hooks must check `bolt.is_tracer` themselves
/// before writing to the world.
pub type HitHook = fn(&Bolt, EntityId, i32, &mut World) -> bool;

/// Overrides the range consumed by a hit. The first hook returning true wins.
pub type RangeHook = fn(&Bolt, &Actor, &mut i32) -> bool;

/// Decides whether an explosion may touch a cell. Every hook must agree.
pub type AoeHook = fn(&Bolt, &World, Position) -> bool;

/// The four callback lists.
#[derive(Clone, Debug)]
pub struct Hooks {
    pub damage: Vec<DamageHook>,
    pub hit: Vec<HitHook>,
    pub range: Vec<RangeHook>,
    pub aoe: Vec<AoeHook>,
}

impl Default for Hooks {
    /// Only the sanctuary veto is installed.
    fn default() -> Self {
        Self {
            damage: Vec::new(),
            hit: Vec::new(),
            range: Vec::new(),
            aoe: vec![sanctuary_veto as AoeHook],
        }
    }
}

impl Hooks {
    /// No callbacks at all, not even the sanctuary veto.
    pub fn none() -> Self {
        Self {
            damage: Vec::new(),
            hit: Vec::new(),
            range: Vec::new(),
            aoe: Vec::new(),
        }
    }

    pub fn on_damage(mut self, hook: DamageHook) -> Self {
        self.damage.push(hook);
        self
    }

    pub fn on_hit(mut self, hook: HitHook) -> Self {
        self.hit.push(hook);
        self
    }

    pub fn on_range(mut self, hook: RangeHook) -> Self {
        self.range.push(hook);
        self
    }

    pub fn on_aoe(mut self, hook: AoeHook) -> Self {
        self.aoe.push(hook);
        self
    }
}

/// Keeps explosions out of sanctuary cells.
pub fn sanctuary_veto(_bolt: &Bolt, world: &World, pos: Position) -> bool {
    !world.is_sanctuary(pos)
}

impl Bolt {
    /// Runs the damage hooks. Returns false if one vetoed the hit.
    pub(crate) fn apply_damage_hooks(
        &self,
        victim: &Actor,
        damage: &mut i32,
        messages: &mut Vec<String>,
    ) -> bool {
        for hook in &self.hooks.damage {
            if hook(self, victim, damage, messages) {
                return false;
            }
        }
        true
    }

    /// Runs every hit hook, even after one reports an effect.
    pub(crate) fn apply_hit_hooks(&self, victim: EntityId, damage: i32, world: &mut World) -> bool {
        self.hooks
            .hit
            .iter()
            .fold(false, |affected, hook| hook(self, victim, damage, world) || affected)
    }

    /// Runs the range hooks until one claims the hit.
    pub(crate) fn apply_range_hooks(&self, victim: &Actor, used: &mut i32) {
        for hook in &self.hooks.range {
            if hook(self, victim, used) {
                break;
            }
        }
    }

    /// Whether every area hook lets the explosion reach `pos`.
    pub(crate) fn aoe_allows(&self, world: &World, pos: Position) -> bool {
        self.hooks.aoe.iter().all(|hook| hook(self, world, pos))
    }
}
