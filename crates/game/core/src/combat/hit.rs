//! To-hit resolution for bolts.
//!
//! Accuracy is compared against a randomised defence. Defences that only
//! sometimes help (repulsion, deflection, phasing) are layered as a ladder of
//! progressively harder tests over one shared set of deferred rolls, so a
//! bolt that would miss without a mitigation can never hit with it.

use crate::env::{DeferredRolls, Dice};
use crate::state::{Actor, ActorFlags};

/// Accuracy of a bolt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ToHit {
    /// Bypasses every probabilistic step.
    Automatic,
    Value(i32),
}

impl Default for ToHit {
    fn default() -> Self {
        Self::Value(0)
    }
}

impl ToHit {
    pub const fn is_automatic(self) -> bool {
        matches!(self, Self::Automatic)
    }

    /// Subtracts `n`, flooring at zero. Automatic accuracy is untouched.
    pub const fn reduced(self, n: i32) -> Self {
        match self {
            Self::Automatic => Self::Automatic,
            Self::Value(v) => Self::Value(if v > n { v - n } else { 0 }),
        }
    }

    pub const fn halved(self) -> Self {
        match self {
            Self::Automatic => Self::Automatic,
            Self::Value(v) => Self::Value(v / 2),
        }
    }

    pub const fn plus(self, n: i32) -> Self {
        match self {
            Self::Automatic => Self::Automatic,
            Self::Value(v) => Self::Value(v + n),
        }
    }

    pub const fn value(self) -> Option<i32> {
        match self {
            Self::Automatic => None,
            Self::Value(v) => Some(v),
        }
    }
}

/// Missile defences a defender brings to the ladder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Mitigation {
    pub deflect: bool,
    pub repel: bool,
}

impl Mitigation {
    pub const NONE: Self = Self {
        deflect: false,
        repel: false,
    };

    /// Deflection always brings repulsion along with it.
    pub fn for_actor(actor: &Actor) -> Self {
        let deflect = actor.flags.contains(ActorFlags::DEFLECT_MISSILES);
        Self {
            deflect,
            repel: deflect || actor.flags.contains(ActorFlags::REPEL_MISSILES),
        }
    }
}

/// Slots in [`DeferredRolls`] used by the ladder.
const ATTACK_REROLL: u8 = 0;
const ATTACK_ROLL: u8 = 1;
const DEFENCE_ROLL: u8 = 2;

/// One rung of the ladder.
///
/// # Formula
///
/// ```text
/// beam + deflect:   attack = random2(attack * 2) / 3
/// beam + repel:     attack = random_range((attack + 1) / 2 + 1, attack)
/// bolt + deflect:   attack = random2(attack / 2)
/// bolt + repel:     attack = random2(attack)
/// hit if random2(attack) >= random2avg(defence, 2)
/// ```
pub fn test_beam_hit(
    attack: ToHit,
    defence: i32,
    is_beam: bool,
    mitigation: Mitigation,
    rolls: &mut DeferredRolls,
    dice: &mut Dice<'_>,
) -> bool {
    let ToHit::Value(mut attack) = attack else {
        return true;
    };

    if is_beam && mitigation.deflect {
        attack = rolls.random2(dice, ATTACK_REROLL, attack * 2) / 3;
    } else if is_beam && mitigation.repel {
        if attack >= 2 {
            attack = rolls.random_range(dice, ATTACK_REROLL, (attack + 1) / 2 + 1, attack);
        }
    } else if mitigation.deflect {
        attack = rolls.random2(dice, ATTACK_REROLL, attack / 2);
    } else if mitigation.repel {
        attack = rolls.random2(dice, ATTACK_REROLL, attack);
    }

    let attack = rolls.random2(dice, ATTACK_ROLL, attack);
    let defence = rolls.random2avg(dice, DEFENCE_ROLL, defence, 2);
    attack >= defence
}

/// Result of running the full ladder against the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitOutcome {
    Miss,
    Repelled,
    Deflected,
    PhasedOut,
    Hit,
}

/// Runs the four-tier ladder: plain miss, repulsion, deflection, phasing.
///
/// `phase_defence` is the defence including any phasing bonus; the first
/// three rungs use `defence` alone.
pub fn hit_ladder(
    attack: ToHit,
    defence: i32,
    phase_defence: i32,
    is_beam: bool,
    mitigation: Mitigation,
    dice: &mut Dice<'_>,
) -> HitOutcome {
    let mut rolls = DeferredRolls::new();
    let repel_only = Mitigation {
        deflect: false,
        repel: mitigation.repel,
    };

    if !test_beam_hit(attack, defence, is_beam, Mitigation::NONE, &mut rolls, dice) {
        HitOutcome::Miss
    } else if !test_beam_hit(attack, defence, is_beam, repel_only, &mut rolls, dice) {
        HitOutcome::Repelled
    } else if !test_beam_hit(attack, defence, is_beam, mitigation, &mut rolls, dice) {
        HitOutcome::Deflected
    } else if !test_beam_hit(attack, phase_defence, is_beam, mitigation, &mut rolls, dice) {
        HitOutcome::PhasedOut
    } else {
        HitOutcome::Hit
    }
}

/// Whether a shield stops the bolt before the ladder runs.
///
/// # Formula
///
/// ```text
/// blocked if random2(hit * 130 / 100 + penalty) < block
/// ```
pub fn shield_blocks(hit: ToHit, block: i32, penalty: i32, dice: &mut Dice<'_>) -> bool {
    let ToHit::Value(hit) = hit else {
        return false;
    };
    block > 0 && dice.random2(hit * 130 / 100 + penalty) < block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{ConstRng, PcgRng};

    #[test]
    fn reduction_floors_at_zero() {
        assert_eq!(ToHit::Value(3).reduced(2), ToHit::Value(1));
        assert_eq!(ToHit::Value(1).reduced(2), ToHit::Value(0));
        assert_eq!(ToHit::Automatic.reduced(2), ToHit::Automatic);
    }

    #[test]
    fn automatic_always_hits() {
        let rng = ConstRng(0);
        let mut dice = Dice::new(&rng, 0, 0);
        let mut rolls = DeferredRolls::new();
        let full = Mitigation {
            deflect: true,
            repel: true,
        };
        assert!(test_beam_hit(ToHit::Automatic, 100, false, full, &mut rolls, &mut dice));
        assert!(!shield_blocks(ToHit::Automatic, 50, 0, &mut dice));
    }

    #[test]
    fn zero_rolls_favour_the_attacker_only_without_defence() {
        let rng = ConstRng(0);
        let mut dice = Dice::new(&rng, 0, 0);
        let outcome = hit_ladder(ToHit::Value(10), 20, 28, false, Mitigation::NONE, &mut dice);
        assert_eq!(outcome, HitOutcome::Hit);
    }

    #[test]
    fn ladder_is_monotone() {
        let rng = PcgRng;
        let full = Mitigation {
            deflect: true,
            repel: true,
        };
        for shot in 0..200 {
            let mut plain = Dice::new(&rng, 3, shot);
            let mut mitigated = Dice::new(&rng, 3, shot);
            let without = hit_ladder(ToHit::Value(15), 10, 10, true, Mitigation::NONE, &mut plain);
            let with = hit_ladder(ToHit::Value(15), 10, 10, true, full, &mut mitigated);
            if without == HitOutcome::Miss {
                assert_eq!(with, HitOutcome::Miss);
            }
            if with == HitOutcome::Hit {
                assert_eq!(without, HitOutcome::Hit);
            }
        }
    }
}
