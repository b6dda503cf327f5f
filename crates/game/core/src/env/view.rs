//! What the player can perceive.
//!
//! Bolt resolution only reads visibility; it never computes field of view
//! itself. Callers plug in whatever line-of-sight model their map uses.

use crate::config::BeamConfig;
use crate::state::{Actor, Position, World};

/// Answers perception questions on behalf of the player.
pub trait VisibilityOracle {
    /// Whether the player has line of sight to `pos`.
    fn player_sees_cell(&self, world: &World, pos: Position) -> bool;

    /// Whether the player can currently see `actor`.
    fn player_sees_actor(&self, world: &World, actor: &Actor) -> bool {
        if actor.is_player() {
            return true;
        }
        if actor.submerged() || !self.player_sees_cell(world, actor.position) {
            return false;
        }
        !actor.invisible() || world.player().is_some_and(|p| self.actor_sees_invisible(p))
    }

    /// Whether `actor` perceives invisible things.
    fn actor_sees_invisible(&self, actor: &Actor) -> bool {
        actor.sees_invisible()
    }
}

/// Radius-limited sight blocked by solid terrain.
#[derive(Clone, Copy, Debug)]
pub struct ClearSight {
    radius: i32,
}

impl ClearSight {
    pub fn new(radius: i32) -> Self {
        Self { radius }
    }
}

impl Default for ClearSight {
    fn default() -> Self {
        Self::new(BeamConfig::LOS_RADIUS)
    }
}

impl VisibilityOracle for ClearSight {
    fn player_sees_cell(&self, world: &World, pos: Position) -> bool {
        let Some(player) = world.player() else {
            return false;
        };
        let from = player.position;
        if !world.in_bounds(pos) || from.distance(pos) > self.radius {
            return false;
        }
        line_is_clear(world, from, pos)
    }
}

/// Walks a straight line and fails on the first solid cell strictly between
/// the endpoints. The endpoints themselves may be solid: walls are visible.
fn line_is_clear(world: &World, from: Position, to: Position) -> bool {
    let delta = to - from;
    let steps = delta.rdist();
    for step in 1..steps {
        let x = from.x as f64 + delta.x as f64 * step as f64 / steps as f64;
        let y = from.y as f64 + delta.y as f64 * step as f64 / steps as f64;
        let cell = Position::new(x.round() as i32, y.round() as i32);
        if world.is_solid(cell) {
            return false;
        }
    }
    true
}

/// Sees everything, invisible actors included. Handy for tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct Omniscient;

impl VisibilityOracle for Omniscient {
    fn player_sees_cell(&self, world: &World, pos: Position) -> bool {
        world.in_bounds(pos)
    }

    fn player_sees_actor(&self, _world: &World, _actor: &Actor) -> bool {
        true
    }
}
