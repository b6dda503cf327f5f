//! Mutable state of one propagation run.
//!
//! Everything a tracer may change but must not leave changed lives here, so
//! a tracer clones the whole struct before it runs and swaps it back after.
//! A field added here is covered by that discipline automatically.

use super::{Flavour, Ray};
use crate::combat::{DiceDef, ToHit};
use crate::env::Colour;
use crate::state::{EntityId, Position};

/// Trajectory, targeting, and presentation state of a bolt in flight.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunState {
    pub source: Position,
    pub target: Position,
    /// Cells the bolt may cover; `-1` asks for the configured default.
    pub range: i32,
    pub range_used: i32,
    /// Aimed at a cell rather than past it; the bolt stops on arrival.
    pub aimed_at_spot: bool,
    /// Aimed at the caster's own cell.
    pub aimed_at_feet: bool,
    pub auto_hit: bool,
    pub ray: Ray,
    pub colour: Colour,
    /// Effective flavour at the current cell.
    pub flavour: Flavour,
    /// Flavour as configured; random flavours reroll `flavour` from it.
    pub real_flavour: Flavour,
    pub name: String,
    pub damage: DiceDef,
    pub hit: ToHit,
    /// Explosion radius.
    pub ex_size: i32,
    /// Last open cell before a bounce; reflections aim back at it.
    pub bounce_pos: Option<Position>,
    pub passed_target: bool,
    pub in_explosion_phase: bool,
    /// Pin [`pos`](Self::pos) to the target instead of the ray.
    pub use_target_as_pos: bool,
    pub bounces: u32,
    pub reflections: u32,
    /// Whoever reflected the bolt last; `None` for walls and unseen causes.
    pub reflector: Option<EntityId>,
    /// A wall the bolt acted on ended the run.
    pub stopped_by_wall: bool,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            source: Position::ORIGIN,
            target: Position::ORIGIN,
            range: -1,
            range_used: 0,
            aimed_at_spot: false,
            aimed_at_feet: false,
            auto_hit: false,
            ray: Ray::default(),
            colour: Colour::default(),
            flavour: Flavour::default(),
            real_flavour: Flavour::default(),
            name: String::new(),
            damage: DiceDef::default(),
            hit: ToHit::default(),
            ex_size: 0,
            bounce_pos: None,
            passed_target: false,
            in_explosion_phase: false,
            use_target_as_pos: false,
            bounces: 0,
            reflections: 0,
            reflector: None,
            stopped_by_wall: false,
        }
    }
}

impl RunState {
    /// The cell the bolt is currently resolving.
    pub fn pos(&self) -> Position {
        if self.in_explosion_phase || self.use_target_as_pos {
            self.target
        } else {
            self.ray.pos()
        }
    }

    pub fn range_left(&self) -> i32 {
        (self.range - self.range_used).max(0)
    }

    /// Spends the rest of the range.
    pub fn finish(&mut self) {
        self.range_used = self.range;
    }

    /// Consumes `amount` of range, never past the total.
    pub fn spend(&mut self, amount: i32) {
        self.range_used = (self.range_used + amount.max(0)).min(self.range.max(0));
    }

    pub fn is_finished(&self) -> bool {
        self.range_used >= self.range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pos_follows_ray_until_pinned() {
        let mut run = RunState {
            source: Position::new(1, 1),
            target: Position::new(5, 1),
            ray: Ray::new(Position::new(1, 1), Position::new(5, 1)),
            range: 8,
            ..RunState::default()
        };
        run.ray.advance();
        assert_eq!(run.pos(), Position::new(2, 1));
        run.in_explosion_phase = true;
        assert_eq!(run.pos(), Position::new(5, 1));
    }

    #[test]
    fn finish_spends_remaining_range() {
        let mut run = RunState {
            range: 6,
            range_used: 2,
            ..RunState::default()
        };
        assert_eq!(run.range_left(), 4);
        run.finish();
        assert!(run.is_finished());
        assert_eq!(run.range_left(), 0);
    }

    #[test]
    fn spending_never_overshoots() {
        let mut run = RunState {
            range: 5,
            ..RunState::default()
        };
        run.spend(3);
        assert_eq!(run.range_used, 3);
        run.spend(1000);
        assert_eq!(run.range_used, 5);
        let mut feet = RunState {
            range: 0,
            ..RunState::default()
        };
        feet.spend(1);
        assert!(feet.is_finished());
        assert_eq!(feet.range_used, 0);
    }
}
