//! Damage dice and armour reduction.

use crate::env::Dice;

// ============================================================================
// Dice
// ============================================================================

/// `num` dice with `size` faces each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiceDef {
    pub num: i32,
    pub size: i32,
}

impl DiceDef {
    pub const fn new(num: i32, size: i32) -> Self {
        Self { num, size }
    }

    /// Integer mean of the roll, used by tracers.
    ///
    /// # Formula
    ///
    /// ```text
    /// mean = num * (size + 1) / 2
    /// ```
    pub const fn mean(&self) -> i32 {
        if self.num <= 0 || self.size <= 0 {
            return 0;
        }
        self.num * (self.size + 1) / 2
    }

    pub const fn max(&self) -> i32 {
        if self.num <= 0 || self.size <= 0 {
            return 0;
        }
        self.num * self.size
    }

    /// Rolls every die independently and sums them.
    pub fn roll(&self, dice: &mut Dice<'_>) -> i32 {
        dice.roll_dice(self.num, self.size)
    }

    /// The mean in preview, a real roll otherwise.
    pub fn resolve(&self, random: bool, dice: &mut Dice<'_>) -> i32 {
        if random { self.roll(dice) } else { self.mean() }
    }
}

// ============================================================================
// Armour
// ============================================================================

/// `random2(x)` when `random`, otherwise its midpoint `x / 2`.
pub fn maybe_random2(x: i32, random: bool, dice: &mut Dice<'_>) -> i32 {
    if random { dice.random2(x) } else { x / 2 }
}

/// Total damage absorbed by armour.
///
/// # Formula
///
/// ```text
/// reduction = sum over draws of random2(1 + ac)
/// ```
///
/// Each draw is uniform over `[0, ac]`; previews use the midpoint instead.
pub fn armour_reduction(ac: i32, draws: u32, random: bool, dice: &mut Dice<'_>) -> i32 {
    (0..draws)
        .map(|_| maybe_random2(1 + ac.max(0), random, dice))
        .sum()
}

/// The three damage figures every hit produces.
///
/// Tracers weigh threat by `final_dmg / pre_ac`, so all three are kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageRoll {
    /// Before armour.
    pub pre_ac: i32,
    /// After armour, never negative.
    pub post_ac: i32,
    /// After flavour-specific resistance.
    pub final_dmg: i32,
}
