//! RNG oracle for deterministic random number generation.
//!
//! This module provides a trait-based RNG system that ensures deterministic
//! random number generation for to-hit rolls, damage dice, chaotic flavours,
//! bounce perturbation, and cloud durations.
//!
//! # Determinism
//!
//! All RNG implementations must be deterministic: given the same seed,
//! they must produce the same sequence of random numbers. Bolts draw through
//! a [`Dice`] cursor, so a shot is fully reproducible from `(game_seed, shot)`.

use std::collections::BTreeMap;

/// RNG oracle for deterministic random number generation.
///
/// Implementations must be deterministic and produce the same values
/// given the same seed.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// This implementation uses PCG-XSH-RR, which produces 32-bit output from
/// 64-bit state.
///
/// # References
///
/// - PCG paper: <https://www.pcg-random.org/>
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    /// Advance the PCG state by one step.
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// PCG output function using XSH-RR (xorshift high, random rotate).
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        let state = Self::pcg_step(seed);
        Self::pcg_output(state)
    }
}

/// Oracle that returns the same raw value for every seed.
///
/// `ConstRng(0)` makes every draw its minimum and `ConstRng(u32::MAX)` makes
/// every draw its maximum, which pins down otherwise random outcomes.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConstRng(pub u32);

impl RngOracle for ConstRng {
    fn next_u32(&self, _seed: u64) -> u32 {
        self.0
    }
}

/// Compute deterministic seed from game state components.
///
/// # Arguments
///
/// * `game_seed` - Base seed set at game start (for replay/determinism)
/// * `shot` - Sequence number of the shot being resolved
/// * `actor_id` - Entity firing the shot
/// * `context` - Index of the draw within the shot
pub fn compute_seed(game_seed: u64, shot: u64, actor_id: u32, context: u32) -> u64 {
    // These constants are based on SplitMix64 and FxHash multipliers
    let mut hash = game_seed;

    hash ^= shot.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (actor_id as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);

    // Final avalanche step
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}

/// A cursor over an [`RngOracle`] providing the classic roguelike draws.
///
/// Every draw advances the cursor by one. Tracer runs save and rewind the
/// cursor, so previewing a shot never changes what the live shot rolls.
pub struct Dice<'a> {
    rng: &'a dyn RngOracle,
    game_seed: u64,
    shot: u64,
    actor: u32,
    cursor: u32,
}

impl<'a> Dice<'a> {
    pub fn new(rng: &'a dyn RngOracle, game_seed: u64, shot: u64) -> Self {
        Self {
            rng,
            game_seed,
            shot,
            actor: 0,
            cursor: 0,
        }
    }

    /// Mixes the firing actor into the seed.
    pub fn for_actor(mut self, actor: u32) -> Self {
        self.actor = actor;
        self
    }

    pub fn shot(&self) -> u64 {
        self.shot
    }

    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    pub(crate) fn rewind(&mut self, cursor: u32) {
        self.cursor = cursor;
    }

    fn raw(&mut self) -> u32 {
        let seed = compute_seed(self.game_seed, self.shot, self.actor, self.cursor);
        self.cursor = self.cursor.wrapping_add(1);
        self.rng.next_u32(seed)
    }

    /// Uniform integer in `[0, n)`; zero when `n <= 0`.
    pub fn random2(&mut self, n: i32) -> i32 {
        if n <= 0 {
            return 0;
        }
        scale(self.raw(), n)
    }

    /// Uniform integer in `[lo, hi]`.
    pub fn random_range(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        lo + self.random2(hi - lo + 1)
    }

    /// Average of `rolls` draws, biased towards the middle of `[0, n)`.
    pub fn random2avg(&mut self, n: i32, rolls: i32) -> i32 {
        let rolls = rolls.max(1);
        let mut sum = self.random2(n);
        for _ in 1..rolls {
            sum += self.random2(n + 1);
        }
        sum / rolls
    }

    pub fn x_chance_in_y(&mut self, x: i32, y: i32) -> bool {
        if x <= 0 {
            return false;
        }
        if x >= y {
            return true;
        }
        self.random2(y) < x
    }

    pub fn one_chance_in(&mut self, n: i32) -> bool {
        n <= 1 || self.random2(n) == 0
    }

    pub fn coinflip(&mut self) -> bool {
        self.random2(2) == 0
    }

    /// Sum of `num` dice with `size` faces each.
    pub fn roll_dice(&mut self, num: i32, size: i32) -> i32 {
        if num <= 0 || size <= 0 {
            return 0;
        }
        (0..num).map(|_| 1 + self.random2(size)).sum()
    }

    /// Picks one entry proportionally to its weight.
    pub fn choose_weighted<T: Copy>(&mut self, options: &[(T, i32)]) -> Option<T> {
        let total: i32 = options.iter().map(|(_, w)| (*w).max(0)).sum();
        if total <= 0 {
            return None;
        }
        let mut pick = self.random2(total);
        for (value, weight) in options {
            let weight = (*weight).max(0);
            if pick < weight {
                return Some(*value);
            }
            pick -= weight;
        }
        None
    }
}

impl core::fmt::Debug for Dice<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Dice")
            .field("game_seed", &self.game_seed)
            .field("shot", &self.shot)
            .field("cursor", &self.cursor)
            .finish()
    }
}

#[inline]
fn scale(raw: u32, n: i32) -> i32 {
    ((raw as u64 * n as u64) >> 32) as i32
}

/// Draws that are taken once and then reused by every later question.
///
/// A hit ladder asks "would this have hit with fewer mitigations?" several
/// times; each rung must see the same underlying rolls, so the answers stay
/// monotone.
#[derive(Debug, Default)]
pub struct DeferredRolls {
    draws: BTreeMap<(u8, u8), u32>,
}

impl DeferredRolls {
    pub fn new() -> Self {
        Self::default()
    }

    fn raw(&mut self, dice: &mut Dice<'_>, slot: u8, sub: u8) -> u32 {
        *self.draws.entry((slot, sub)).or_insert_with(|| dice.raw())
    }

    pub fn random2(&mut self, dice: &mut Dice<'_>, slot: u8, n: i32) -> i32 {
        if n <= 0 {
            return 0;
        }
        scale(self.raw(dice, slot, 0), n)
    }

    pub fn random_range(&mut self, dice: &mut Dice<'_>, slot: u8, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        lo + self.random2(dice, slot, hi - lo + 1)
    }

    pub fn random2avg(&mut self, dice: &mut Dice<'_>, slot: u8, n: i32, rolls: u8) -> i32 {
        let rolls = rolls.max(1);
        let mut sum = if n <= 0 {
            0
        } else {
            scale(self.raw(dice, slot, 0), n)
        };
        for sub in 1..rolls {
            sum += scale(self.raw(dice, slot, sub), n + 1);
        }
        sum / rolls as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcg_is_deterministic() {
        let rng = PcgRng;
        assert_eq!(rng.next_u32(42), rng.next_u32(42));
        assert_ne!(rng.next_u32(42), rng.next_u32(43));
    }

    #[test]
    fn dice_stay_in_range() {
        let rng = PcgRng;
        let mut dice = Dice::new(&rng, 7, 1);
        for _ in 0..500 {
            let r = dice.random2(6);
            assert!((0..6).contains(&r));
            let d = dice.roll_dice(3, 6);
            assert!((3..=18).contains(&d));
            let m = dice.random_range(-2, 2);
            assert!((-2..=2).contains(&m));
            let a = dice.random2avg(10, 2);
            assert!((0..=10).contains(&a));
        }
    }

    #[test]
    fn const_rng_pins_extremes() {
        let low = ConstRng(0);
        let high = ConstRng(u32::MAX);
        let mut min = Dice::new(&low, 0, 0);
        let mut max = Dice::new(&high, 0, 0);
        assert_eq!(min.roll_dice(3, 6), 3);
        assert_eq!(max.roll_dice(3, 6), 18);
        assert_eq!(max.random2(10), 9);
        assert!(min.one_chance_in(4));
        assert!(!max.x_chance_in_y(2, 21));
    }

    #[test]
    fn rewinding_replays_the_same_draws() {
        let rng = PcgRng;
        let mut dice = Dice::new(&rng, 99, 3);
        let mark = dice.cursor();
        let first: Vec<_> = (0..5).map(|_| dice.random2(100)).collect();
        dice.rewind(mark);
        let again: Vec<_> = (0..5).map(|_| dice.random2(100)).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn deferred_rolls_reuse_each_slot() {
        let rng = PcgRng;
        let mut dice = Dice::new(&rng, 5, 5);
        let mut rolls = DeferredRolls::new();
        let a = rolls.random2(&mut dice, 1, 50);
        let b = rolls.random2(&mut dice, 1, 50);
        assert_eq!(a, b);
        let cursor = dice.cursor();
        rolls.random2avg(&mut dice, 2, 20, 2);
        assert_eq!(dice.cursor(), cursor + 2);
        rolls.random2avg(&mut dice, 2, 20, 2);
        assert_eq!(dice.cursor(), cursor + 2);
    }

    #[test]
    fn weighted_choice_respects_zero_weights() {
        let rng = PcgRng;
        let mut dice = Dice::new(&rng, 1, 1);
        for _ in 0..100 {
            assert_eq!(dice.choose_weighted(&[('a', 0), ('b', 3)]), Some('b'));
        }
        assert_eq!(dice.choose_weighted::<char>(&[]), None);
    }
}
