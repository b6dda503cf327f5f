//! Damage and effect types carried by a bolt.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::combat::FlavourProps;
use crate::env::Dice;
use crate::state::CloudKind;

/// What a bolt does to whatever it strikes.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Flavour {
    // ===== damage =====
    #[default]
    Missile,
    Magic,
    Fire,
    Cold,
    Electricity,
    Poison,
    PoisonArrow,
    NegativeEnergy,
    Acid,
    Miasma,
    Holy,
    Ice,
    Lava,
    Steam,
    Hellfire,
    Napalm,
    Frag,
    Nuke,
    Energy,
    Spore,
    Visual,
    /// Rerolls into a basic element on every cell.
    Random,
    /// Rerolls into anything on every cell.
    Chaos,

    // ===== enchantments =====
    Slow,
    Haste,
    Might,
    Berserk,
    Healing,
    Paralysis,
    Petrify,
    Confusion,
    Sleep,
    Hibernation,
    Invisibility,
    Teleport,
    Banish,
    Charm,
    Polymorph,
    Corona,
    Pain,
    DispelUndead,
    Disintegration,
    Digging,

    // ===== thrown potions: clouds only =====
    PotionStinkingCloud,
    PotionSteam,
    PotionFire,
    PotionCold,
    PotionPoison,
    PotionMiasma,
}

/// Elements a [`Flavour::Random`] bolt picks from.
const RANDOM_PICKS: [Flavour; 7] = [
    Flavour::Fire,
    Flavour::Cold,
    Flavour::Magic,
    Flavour::Electricity,
    Flavour::Poison,
    Flavour::NegativeEnergy,
    Flavour::Acid,
];

/// Weighted table a [`Flavour::Chaos`] bolt picks from.
const CHAOS_PICKS: [(Flavour, i32); 19] = [
    (Flavour::Fire, 10),
    (Flavour::Cold, 10),
    (Flavour::Electricity, 10),
    (Flavour::Poison, 10),
    (Flavour::NegativeEnergy, 10),
    (Flavour::Acid, 10),
    (Flavour::Hellfire, 10),
    (Flavour::Napalm, 10),
    (Flavour::Slow, 10),
    (Flavour::Haste, 10),
    (Flavour::Might, 10),
    (Flavour::Berserk, 10),
    (Flavour::Healing, 10),
    (Flavour::Paralysis, 10),
    (Flavour::Confusion, 10),
    (Flavour::Invisibility, 10),
    (Flavour::Polymorph, 10),
    (Flavour::Banish, 10),
    (Flavour::Disintegration, 10),
];

impl Flavour {
    /// Enchantments resolve through the saving-throw path instead of damage.
    pub const fn is_enchantment(self) -> bool {
        matches!(
            self,
            Self::Slow
                | Self::Haste
                | Self::Might
                | Self::Berserk
                | Self::Healing
                | Self::Paralysis
                | Self::Petrify
                | Self::Confusion
                | Self::Sleep
                | Self::Hibernation
                | Self::Invisibility
                | Self::Teleport
                | Self::Banish
                | Self::Charm
                | Self::Polymorph
                | Self::Corona
                | Self::Pain
                | Self::DispelUndead
                | Self::Disintegration
                | Self::Digging
        )
    }

    pub const fn is_fiery(self) -> bool {
        self.props().fiery
    }

    pub const fn is_potion(self) -> bool {
        matches!(
            self,
            Self::PotionStinkingCloud
                | Self::PotionSteam
                | Self::PotionFire
                | Self::PotionCold
                | Self::PotionPoison
                | Self::PotionMiasma
        )
    }

    /// Flavours that reroll their effective flavour on every cell.
    pub const fn is_random(self) -> bool {
        matches!(self, Self::Random | Self::Chaos)
    }

    /// Enchantments that a target's magic resistance can shrug off.
    pub const fn has_saving_throw(self) -> bool {
        !matches!(
            self,
            Self::Haste
                | Self::Might
                | Self::Berserk
                | Self::Healing
                | Self::Invisibility
                | Self::Corona
                | Self::DispelUndead
                | Self::Digging
        ) && self.is_enchantment()
    }

    /// Flavour-keyed physical properties.
    pub const fn props(self) -> FlavourProps {
        FlavourProps::of(self)
    }

    /// One of the basic elements, uniformly.
    pub fn random_pick(dice: &mut Dice<'_>) -> Self {
        RANDOM_PICKS[dice.random2(RANDOM_PICKS.len() as i32) as usize]
    }

    /// Anything from the chaos table, by weight.
    pub fn chaos_pick(dice: &mut Dice<'_>) -> Self {
        dice.choose_weighted(&CHAOS_PICKS).unwrap_or(Self::Fire)
    }

    /// Gas a thrown potion of this flavour bursts into.
    pub const fn potion_cloud(self) -> Option<CloudKind> {
        match self {
            Self::PotionStinkingCloud => Some(CloudKind::Stink),
            Self::PotionSteam => Some(CloudKind::Steam),
            Self::PotionFire => Some(CloudKind::Fire),
            Self::PotionCold => Some(CloudKind::Cold),
            Self::PotionPoison => Some(CloudKind::Poison),
            Self::PotionMiasma => Some(CloudKind::Miasma),
            _ => None,
        }
    }

    /// Short human-readable name used for unnamed bolts.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Missile => "missile",
            Self::Magic => "magic",
            Self::Fire | Self::PotionFire => "fire",
            Self::Cold | Self::PotionCold => "cold",
            Self::Electricity => "electricity",
            Self::Poison | Self::PotionPoison | Self::PotionStinkingCloud => "poison",
            Self::PoisonArrow => "poison arrow",
            Self::NegativeEnergy => "negative energy",
            Self::Acid => "acid",
            Self::Miasma | Self::PotionMiasma => "miasma",
            Self::Holy => "holy energy",
            Self::Ice => "ice",
            Self::Lava => "magma",
            Self::Steam | Self::PotionSteam => "steam",
            Self::Hellfire => "hellfire",
            Self::Napalm => "sticky fire",
            Self::Frag => "fragments",
            Self::Nuke => "nuke",
            Self::Energy => "energy",
            Self::Spore => "spores",
            Self::Visual => "visual effects",
            Self::Random => "random",
            Self::Chaos => "chaos",
            Self::Slow => "slow",
            Self::Haste => "haste",
            Self::Might => "might",
            Self::Berserk => "berserk",
            Self::Healing => "healing",
            Self::Paralysis => "paralysis",
            Self::Petrify => "petrify",
            Self::Confusion => "confusion",
            Self::Sleep => "sleep",
            Self::Hibernation => "hibernation",
            Self::Invisibility => "invisibility",
            Self::Teleport => "teleportation",
            Self::Banish => "banishment",
            Self::Charm => "enslave",
            Self::Polymorph => "polymorph",
            Self::Corona => "backlight",
            Self::Pain => "pain",
            Self::DispelUndead => "dispel undead",
            Self::Disintegration => "disintegration",
            Self::Digging => "digging",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::PcgRng;
    use strum::IntoEnumIterator;

    #[test]
    fn saving_throws_are_enchantment_only() {
        for flavour in Flavour::iter() {
            if flavour.has_saving_throw() {
                assert!(flavour.is_enchantment(), "{flavour}");
            }
        }
        assert!(Flavour::Slow.has_saving_throw());
        assert!(!Flavour::Haste.has_saving_throw());
        assert!(!Flavour::Fire.has_saving_throw());
    }

    #[test]
    fn rerolls_never_return_themselves() {
        let rng = PcgRng;
        let mut dice = Dice::new(&rng, 9, 1);
        for _ in 0..100 {
            assert!(!Flavour::chaos_pick(&mut dice).is_random());
            let basic = Flavour::random_pick(&mut dice);
            assert!(RANDOM_PICKS.contains(&basic));
        }
    }

    #[test]
    fn only_potions_burst_into_clouds() {
        for flavour in Flavour::iter() {
            assert_eq!(flavour.is_potion(), flavour.potion_cloud().is_some(), "{flavour}");
        }
    }

    #[test]
    fn parses_data_file_names() {
        assert_eq!("negative_energy".parse::<Flavour>(), Ok(Flavour::NegativeEnergy));
        assert_eq!(Flavour::PotionStinkingCloud.to_string(), "potion_stinking_cloud");
    }
}
