//! Flavour-keyed resistance rules.
//!
//! [`FlavourProps`] is the single table of physical properties per flavour:
//! which resistance applies, how much of the damage it can reduce, how many
//! armour draws the hit suffers, what the bolt bounces off, and at which
//! resistance level the player is safe from it. Everything else in the
//! pipeline reads this table instead of branching on flavour names.

use crate::bolt::Flavour;
use crate::env::Dice;
use crate::state::{Actor, ActorFlags, Feature, Holiness, Status};

// ============================================================================
// Property table
// ============================================================================

/// Which resistance an actor applies against a flavour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResistKind {
    None,
    Fire,
    Cold,
    Elec,
    Poison,
    Negative,
    Acid,
    Steam,
    Rot,
    Holy,
}

impl ResistKind {
    /// Resistance level of `actor` for this kind.
    pub fn level(self, actor: &Actor) -> i32 {
        let r = &actor.resists;
        match self {
            Self::None => 0,
            Self::Fire => r.fire,
            Self::Cold => r.cold,
            Self::Elec => r.elec,
            Self::Poison => r.poison,
            Self::Negative => r.negative,
            Self::Acid => r.acid,
            Self::Steam => r.steam,
            Self::Rot => i32::from(r.rot),
            Self::Holy => actor.res_holy(),
        }
    }
}

/// Which solid features a flavour bounces off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BounceRule {
    Never,
    /// Any solid cell.
    Anything,
    /// Anything but metal, which grounds it.
    UnlessMetal,
    /// Only green crystal.
    GreenCrystal,
}

impl BounceRule {
    pub const fn bounces_off(self, feature: Feature) -> bool {
        match self {
            Self::Never => false,
            Self::Anything => feature.is_solid(),
            Self::UnlessMetal => !matches!(feature, Feature::MetalWall),
            Self::GreenCrystal => matches!(feature, Feature::GreenCrystalWall),
        }
    }
}

/// Physical properties of a flavour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlavourProps {
    pub resist: ResistKind,
    /// Share of the damage, in percent, that resistance can reduce.
    pub resistible_pct: i32,
    /// The resistance counts one level higher for damage purposes.
    pub boolean_resist: bool,
    /// Independent armour draws subtracted from the hit.
    pub armour_draws: u32,
    pub bounce: BounceRule,
    pub fiery: bool,
    /// Player resistance at or above which the flavour cannot hurt them.
    pub harmless_at: Option<i32>,
    /// Discharges harmlessly into water around a submerged target.
    pub grounded_by_water: bool,
}

impl FlavourProps {
    const BASE: Self = Self {
        resist: ResistKind::None,
        resistible_pct: 100,
        boolean_resist: false,
        armour_draws: 1,
        bounce: BounceRule::Never,
        fiery: false,
        harmless_at: None,
        grounded_by_water: false,
    };

    const fn resisted_by(resist: ResistKind) -> Self {
        Self {
            resist,
            ..Self::BASE
        }
    }

    pub const fn of(flavour: Flavour) -> Self {
        use Flavour::*;
        match flavour {
            Fire => Self {
                fiery: true,
                bounce: BounceRule::GreenCrystal,
                ..Self::resisted_by(ResistKind::Fire)
            },
            Hellfire => Self {
                fiery: true,
                ..Self::resisted_by(ResistKind::Fire)
            },
            Lava => Self {
                fiery: true,
                ..Self::resisted_by(ResistKind::Fire)
            },
            Cold => Self {
                bounce: BounceRule::GreenCrystal,
                ..Self::resisted_by(ResistKind::Cold)
            },
            Ice => Self {
                resistible_pct: 50,
                ..Self::resisted_by(ResistKind::Cold)
            },
            Electricity => Self {
                boolean_resist: true,
                bounce: BounceRule::UnlessMetal,
                harmless_at: Some(1),
                grounded_by_water: true,
                ..Self::resisted_by(ResistKind::Elec)
            },
            Poison | PoisonArrow | PotionStinkingCloud | PotionPoison => Self {
                harmless_at: Some(1),
                ..Self::resisted_by(ResistKind::Poison)
            },
            NegativeEnergy => Self {
                harmless_at: Some(3),
                ..Self::resisted_by(ResistKind::Negative)
            },
            Acid => Self::resisted_by(ResistKind::Acid),
            Steam | PotionSteam => Self {
                harmless_at: Some(3),
                ..Self::resisted_by(ResistKind::Steam)
            },
            Miasma | PotionMiasma => Self {
                boolean_resist: true,
                harmless_at: Some(1),
                ..Self::resisted_by(ResistKind::Rot)
            },
            Holy => Self {
                harmless_at: Some(1),
                ..Self::resisted_by(ResistKind::Holy)
            },
            Frag => Self {
                armour_draws: crate::config::BeamConfig::FRAG_ARMOUR_DRAWS,
                ..Self::BASE
            },
            Chaos => Self {
                bounce: BounceRule::Anything,
                ..Self::BASE
            },
            PotionFire => Self::resisted_by(ResistKind::Fire),
            PotionCold => Self::resisted_by(ResistKind::Cold),
            _ => Self::BASE,
        }
    }
}

// ============================================================================
// Resistance arithmetic
// ============================================================================

/// Scales `raw` damage by a resistance level.
///
/// # Formula
///
/// ```text
/// resistible = raw * pct / 100
/// res > 0, creature: resistible / (1 + bonus + res^2), zero at res >= 3
/// res > 0, player:   resistible / ((3 * (res + bonus) + 1) / 2)
/// res < 0:           resistible * 1.5 (ranged) or * 2 (point blank)
/// ```
///
/// `bonus` is 1 for boolean resistances. The unresistible remainder is added
/// back unchanged.
pub fn resist_adjust_damage(res: i32, raw: i32, flavour: Flavour, creature: bool, ranged: bool) -> i32 {
    if res == 0 {
        return raw;
    }
    let props = flavour.props();
    let mut resistible = raw * props.resistible_pct / 100;
    let irresistible = raw - resistible;
    let bonus = i32::from(props.boolean_resist);

    if res > 0 {
        if creature && res >= 3 {
            resistible = 0;
        } else if creature {
            resistible /= 1 + bonus + res * res;
        } else {
            resistible /= ((3 * (res + bonus)) + 1) / 2;
        }
    } else {
        resistible = resistible * if ranged { 15 } else { 20 } / 10;
    }
    (resistible + irresistible).max(0)
}

// ============================================================================
// Flavoured adjustment
// ============================================================================

/// Whether flavour side effects are applied or only previewed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectMode {
    /// Compute the same number; no messages, no side effects, no draws.
    Preview,
    Commit,
}

impl EffectMode {
    pub const fn is_commit(self) -> bool {
        matches!(self, Self::Commit)
    }
}

/// A lasting effect riding on a hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlavourEffect {
    Poison(i32),
    Drain,
    Rot,
}

impl FlavourEffect {
    pub fn apply(self, actor: &mut Actor) {
        match self {
            Self::Poison(levels) => actor.stack_status(Status::Poison, levels),
            Self::Drain => actor.stack_status(Status::Drain, 1),
            Self::Rot => actor.stack_status(Status::Rot, 1),
        }
    }
}

/// Outcome of [`adjust_flavoured`].
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Flavoured {
    pub damage: i32,
    /// Text to show if the target is visible. Always `None` in preview.
    pub message: Option<String>,
    pub effect: Option<FlavourEffect>,
    /// The flavour made itself known, even without visible damage.
    pub observed: bool,
}

impl Flavoured {
    fn plain(damage: i32) -> Self {
        Self {
            damage,
            ..Self::default()
        }
    }
}

fn says(target: &Actor, creature: &str, player: &str) -> String {
    if target.is_player() {
        player.to_string()
    } else {
        format!("{}{}", target.the_name_cap(), creature)
    }
}

/// Unresisted outcome line for one of the scaled elements.
fn scaled_message(target: &Actor, flavour: Flavour, original: i32, hurted: i32) -> Option<String> {
    if hurted == 0 {
        let text = if original > 0 {
            says(target, " completely resists.", "You completely resist.")
        } else {
            says(target, " appears unharmed.", "You appear unharmed.")
        };
        return Some(text);
    }
    if hurted < original {
        return match flavour {
            Flavour::Ice | Flavour::Lava | Flavour::Hellfire => {
                Some(says(target, " partially resists.", "You partially resist."))
            }
            Flavour::Electricity | Flavour::Acid => None,
            _ => Some(says(target, " resists.", "You resist.")),
        };
    }
    if hurted > original {
        let text = match flavour {
            Flavour::Fire | Flavour::Lava | Flavour::Hellfire => {
                says(target, " is burned terribly!", "You are burned terribly!")
            }
            Flavour::Steam => says(target, " is scalded terribly!", "The steam scalds you terribly!"),
            Flavour::Cold | Flavour::Ice => says(target, " is frozen!", "You feel a terrible chill!"),
            _ => return None,
        };
        return Some(text);
    }
    None
}

/// Applies the per-flavour resistance rule to post-armour damage.
///
/// In [`EffectMode::Preview`] this only computes the number. In
/// [`EffectMode::Commit`] it also composes the outcome message and the
/// lasting effect the caller should apply.
pub fn adjust_flavoured(
    target: &Actor,
    flavour: Flavour,
    hurted: i32,
    mode: EffectMode,
    dice: &mut Dice<'_>,
) -> Flavoured {
    let creature = !target.is_player();
    let props = flavour.props();
    let res = props.resist.level(target);
    let original = hurted;
    let commit = mode.is_commit();

    let mut out = match flavour {
        Flavour::Fire
        | Flavour::Steam
        | Flavour::Cold
        | Flavour::Electricity
        | Flavour::Acid
        | Flavour::Ice
        | Flavour::Lava => {
            Flavoured::plain(resist_adjust_damage(res, hurted, flavour, creature, true))
        }

        Flavour::Poison => {
            let mut out = Flavoured::plain(resist_adjust_damage(res, hurted, flavour, creature, true));
            if res <= 0 && commit && !dice.one_chance_in(3) {
                out.effect = Some(FlavourEffect::Poison(1));
            }
            out
        }

        Flavour::PoisonArrow => {
            let mut out = Flavoured::plain(resist_adjust_damage(res, hurted, flavour, creature, false));
            if out.damage < original {
                out.message = Some(says(target, " partially resists.", "You partially resist."));
                if target.holiness == Holiness::Natural || target.holiness == Holiness::Holy {
                    out.effect = Some(FlavourEffect::Poison(2));
                }
            } else {
                out.effect = Some(FlavourEffect::Poison(4));
            }
            out
        }

        Flavour::NegativeEnergy if res >= 3 => Flavoured {
            damage: 0,
            message: Some(says(target, " completely resists.", "You completely resist.")),
            ..Flavoured::default()
        },
        Flavour::NegativeEnergy => Flavoured {
            damage: hurted,
            effect: Some(FlavourEffect::Drain),
            observed: true,
            ..Flavoured::default()
        },

        Flavour::Miasma if res > 0 => Flavoured {
            damage: 0,
            message: Some(says(target, " completely resists.", "You completely resist.")),
            ..Flavoured::default()
        },
        Flavour::Miasma => Flavoured {
            damage: hurted,
            effect: Some(FlavourEffect::Rot),
            ..Flavoured::default()
        },

        Flavour::Holy => {
            let damage = match res {
                r if r > 0 => 0,
                0 => hurted / 2,
                -1 => hurted,
                _ => hurted * 3 / 2,
            };
            let message = if damage == 0 {
                says(target, " appears unharmed.", "You appear unharmed.")
            } else {
                says(target, " writhes in agony!", "You writhe in agony!")
            };
            Flavoured {
                damage,
                message: Some(message),
                ..Flavoured::default()
            }
        }

        Flavour::Hellfire => {
            let damage = match res {
                r if r > 2 => 0,
                r if r > 0 => hurted / 2,
                _ => hurted * 12 / 10,
            };
            Flavoured::plain(damage)
        }

        Flavour::Spore if target.flags.contains(ActorFlags::FUNGAL) => Flavoured::plain(0),

        _ => Flavoured::plain(hurted),
    };

    if out.message.is_none()
        && matches!(
            flavour,
            Flavour::Fire
                | Flavour::Steam
                | Flavour::Cold
                | Flavour::Electricity
                | Flavour::Acid
                | Flavour::Ice
                | Flavour::Lava
                | Flavour::Hellfire
        )
    {
        out.message = scaled_message(target, flavour, original, out.damage);
    }

    if !commit {
        out.message = None;
        out.effect = None;
        out.observed = false;
    }
    out
}
