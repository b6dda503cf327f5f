//! Actors: the player and every creature a bolt can strike.

use std::collections::BTreeMap;

use bitflags::bitflags;
use strum::{Display, EnumIter, IntoStaticStr};

use super::{EntityId, Position, ResourceMeter};
use crate::config::BeamConfig;

/// Disposition of an actor towards the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Attitude {
    #[default]
    Hostile,
    Neutral,
    GoodNeutral,
    Friendly,
}

impl Attitude {
    /// Friendly and good-neutral actors never attack the player.
    pub const fn wont_attack(self) -> bool {
        matches!(self, Self::Friendly | Self::GoodNeutral)
    }

    /// Whether two attitudes fight on the same side.
    pub fn aligned_with(self, other: Attitude) -> bool {
        if self.wont_attack() {
            other.wont_attack()
        } else {
            self == other
        }
    }
}

/// Broad nature of an actor, used by holy and enchantment rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Holiness {
    Holy,
    #[default]
    Natural,
    Undead,
    Demonic,
    Nonliving,
    Plant,
}

/// Power an actor worships; only the protective one matters to bolts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Patron {
    /// Shields same-attitude plants from the worshipper's own attacks.
    Verdant,
    /// Any other patron.
    Other,
}

bitflags! {
    /// Intrinsic actor properties relevant to bolt resolution.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct ActorFlags: u32 {
        const SUBMERGED        = 1 << 0;
        const INVISIBLE        = 1 << 1;
        const BACKLIT          = 1 << 2;
        const SEES_INVISIBLE   = 1 << 3;
        const DEFLECT_MISSILES = 1 << 4;
        const REPEL_MISSILES   = 1 << 5;
        const STATUE           = 1 << 6;
        const STATIONARY       = 1 << 7;
        const SUMMONED         = 1 << 8;
        /// Lives inside rock and is shielded by it.
        const WALL_SHIELDED    = 1 << 9;
        const FUNGAL           = 1 << 10;
        const UNCONFUSABLE     = 1 << 11;
        /// Polymorph is always welcome and never resisted.
        const SHAPESHIFTER     = 1 << 12;
        /// Thrown missiles pass by without striking.
        const BUSH             = 1 << 13;
        const CANNOT_MUTATE    = 1 << 14;
        const UNIQUE           = 1 << 15;
        /// Stops sticky flame from taking hold.
        const RES_STICKY_FLAME = 1 << 16;
        /// Phases out of the way of some attacks that would otherwise land.
        const PHASE_SHIFT      = 1 << 17;
    }
}

/// Resistance levels per damage family. Positive resists, negative is vulnerable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Resists {
    pub fire: i32,
    pub cold: i32,
    pub elec: i32,
    pub poison: i32,
    pub negative: i32,
    pub acid: i32,
    pub steam: i32,
    pub rot: bool,
}

/// Shield carried by an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shield {
    /// Block rating compared against the attacker's reroll.
    pub block: i32,
    /// Added to the attacker's reroll range.
    pub penalty: i32,
    /// Reflective shields bounce blocked bolts back.
    pub reflective: bool,
}

/// Timed conditions an actor can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Status {
    Slow,
    Haste,
    Might,
    Berserk,
    Paralysis,
    Petrified,
    Confusion,
    Sleep,
    Invisibility,
    Charm,
    Corona,
    StickyFlame,
    Poison,
    Drain,
    Rot,
}

/// An actor on the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Actor {
    pub id: EntityId,
    pub name: String,
    pub position: Position,
    pub hp: ResourceMeter,
    pub armour: i32,
    pub evasion: i32,
    pub shield: Option<Shield>,
    pub attitude: Attitude,
    pub holiness: Holiness,
    pub resists: Resists,
    /// Percentile magic resistance; `BeamConfig::MAGIC_IMMUNE` means immune.
    pub magic_resistance: i32,
    /// Hit dice for creatures, experience level for the player.
    pub power: i32,
    pub flags: ActorFlags,
    pub patron: Option<Patron>,
    pub statuses: BTreeMap<Status, i32>,
}

impl Actor {
    pub fn new(name: impl Into<String>, position: Position, hp: i32) -> Self {
        Self {
            id: EntityId::SYSTEM,
            name: name.into(),
            position,
            hp: ResourceMeter::full(hp),
            armour: 0,
            evasion: 0,
            shield: None,
            attitude: Attitude::Hostile,
            holiness: Holiness::Natural,
            resists: Resists::default(),
            magic_resistance: 0,
            power: 1,
            flags: ActorFlags::empty(),
            patron: None,
            statuses: BTreeMap::new(),
        }
    }

    pub fn with_defences(mut self, armour: i32, evasion: i32) -> Self {
        self.armour = armour;
        self.evasion = evasion;
        self
    }

    pub fn with_attitude(mut self, attitude: Attitude) -> Self {
        self.attitude = attitude;
        self
    }

    pub fn with_holiness(mut self, holiness: Holiness) -> Self {
        self.holiness = holiness;
        self
    }

    pub fn with_resists(mut self, resists: Resists) -> Self {
        self.resists = resists;
        self
    }

    pub fn with_shield(mut self, shield: Shield) -> Self {
        self.shield = Some(shield);
        self
    }

    pub fn with_flags(mut self, flags: ActorFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_power(mut self, power: i32) -> Self {
        self.power = power;
        self
    }

    pub fn with_magic_resistance(mut self, mr: i32) -> Self {
        self.magic_resistance = mr;
        self
    }

    pub fn with_patron(mut self, patron: Patron) -> Self {
        self.patron = Some(patron);
        self
    }

    pub fn is_player(&self) -> bool {
        self.id.is_player()
    }

    /// Name with a definite article: "the orc", "you", or a unique's name.
    pub fn the_name(&self) -> String {
        if self.is_player() {
            "you".to_string()
        } else if self.flags.contains(ActorFlags::UNIQUE) {
            self.name.clone()
        } else {
            format!("the {}", self.name)
        }
    }

    /// [`the_name`](Self::the_name) for the start of a sentence.
    pub fn the_name_cap(&self) -> String {
        let name = self.the_name();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => name,
        }
    }

    pub fn alive(&self) -> bool {
        self.hp.current > 0
    }

    pub fn wont_attack(&self) -> bool {
        self.is_player() || self.attitude.wont_attack()
    }

    /// Attitude used for friend/foe bookkeeping; the player is always friendly.
    pub fn effective_attitude(&self) -> Attitude {
        if self.is_player() || self.has_status(Status::Charm) {
            Attitude::Friendly
        } else {
            self.attitude
        }
    }

    pub fn submerged(&self) -> bool {
        self.flags.contains(ActorFlags::SUBMERGED)
    }

    pub fn invisible(&self) -> bool {
        self.flags.contains(ActorFlags::INVISIBLE) || self.has_status(Status::Invisibility)
    }

    pub fn backlit(&self) -> bool {
        self.flags.contains(ActorFlags::BACKLIT) || self.has_status(Status::Corona)
    }

    pub fn sees_invisible(&self) -> bool {
        self.flags.contains(ActorFlags::SEES_INVISIBLE)
    }

    pub fn is_statue(&self) -> bool {
        self.flags.contains(ActorFlags::STATUE)
    }

    pub fn is_summoned(&self) -> bool {
        self.flags.contains(ActorFlags::SUMMONED)
    }

    pub fn can_mutate(&self) -> bool {
        !self.flags.contains(ActorFlags::CANNOT_MUTATE)
            && !matches!(self.holiness, Holiness::Nonliving | Holiness::Plant)
    }

    pub fn can_hibernate(&self) -> bool {
        self.holiness == Holiness::Natural
            && !self.flags.contains(ActorFlags::STATIONARY)
            && !self.has_status(Status::Sleep)
    }

    pub fn is_confusable(&self) -> bool {
        !self.flags.contains(ActorFlags::UNCONFUSABLE) && self.holiness != Holiness::Nonliving
    }

    /// Holy resistance derived from holiness.
    pub fn res_holy(&self) -> i32 {
        match self.holiness {
            Holiness::Holy => 1,
            Holiness::Undead | Holiness::Demonic => -2,
            Holiness::Natural | Holiness::Nonliving | Holiness::Plant => 0,
        }
    }

    pub fn magic_immune(&self) -> bool {
        self.magic_resistance >= BeamConfig::MAGIC_IMMUNE
    }

    pub fn status(&self, status: Status) -> i32 {
        self.statuses.get(&status).copied().unwrap_or(0)
    }

    pub fn has_status(&self, status: Status) -> bool {
        self.status(status) > 0
    }

    /// Adds `turns` of `status`, keeping the longer duration.
    ///
    /// Returns false if the status was already active.
    pub fn add_status(&mut self, status: Status, turns: i32) -> bool {
        let entry = self.statuses.entry(status).or_insert(0);
        let fresh = *entry <= 0;
        *entry = (*entry).max(turns.max(1));
        fresh
    }

    /// Stacks `levels` onto a cumulative status such as poison.
    pub fn stack_status(&mut self, status: Status, levels: i32) {
        *self.statuses.entry(status).or_insert(0) += levels.max(0);
    }

    pub fn remove_status(&mut self, status: Status) -> bool {
        self.statuses.remove(&status).is_some_and(|turns| turns > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attitudes_align_by_side() {
        assert!(Attitude::Friendly.aligned_with(Attitude::GoodNeutral));
        assert!(Attitude::Hostile.aligned_with(Attitude::Hostile));
        assert!(!Attitude::Hostile.aligned_with(Attitude::Neutral));
        assert!(!Attitude::Friendly.aligned_with(Attitude::Hostile));
    }

    #[test]
    fn statuses_keep_longest_duration() {
        let mut orc = Actor::new("orc", Position::new(1, 1), 10);
        assert!(orc.add_status(Status::Slow, 5));
        assert!(!orc.add_status(Status::Slow, 3));
        assert_eq!(orc.status(Status::Slow), 5);
        orc.stack_status(Status::Poison, 2);
        orc.stack_status(Status::Poison, 1);
        assert_eq!(orc.status(Status::Poison), 3);
        assert!(orc.remove_status(Status::Slow));
        assert!(!orc.has_status(Status::Slow));
    }

    #[test]
    fn corona_counts_as_backlit() {
        let mut orc = Actor::new("orc", Position::new(1, 1), 10);
        assert!(!orc.backlit());
        orc.add_status(Status::Corona, 4);
        assert!(orc.backlit());
    }

    #[test]
    fn names_take_articles() {
        let orc = Actor::new("orc", Position::ORIGIN, 1);
        assert_eq!(orc.the_name_cap(), "The orc");
        let boss = Actor::new("Sigmund", Position::ORIGIN, 1).with_flags(ActorFlags::UNIQUE);
        assert_eq!(boss.the_name(), "Sigmund");
        let mut you = Actor::new("player", Position::ORIGIN, 1);
        you.id = EntityId::PLAYER;
        assert_eq!(you.the_name_cap(), "You");
    }

    #[test]
    fn holy_resistance_follows_holiness() {
        let base = Actor::new("x", Position::ORIGIN, 1);
        assert_eq!(base.clone().with_holiness(Holiness::Holy).res_holy(), 1);
        assert_eq!(base.clone().with_holiness(Holiness::Undead).res_holy(), -2);
        assert_eq!(base.with_holiness(Holiness::Plant).res_holy(), 0);
    }
}
