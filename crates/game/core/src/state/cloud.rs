use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use super::EntityId;

/// Kind of gas occupying a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CloudKind {
    Fire,
    ForestFire,
    Cold,
    Poison,
    Stink,
    Steam,
    Miasma,
}

impl CloudKind {
    pub const fn is_fiery(self) -> bool {
        matches!(self, Self::Fire | Self::ForestFire)
    }

    pub const fn is_cold(self) -> bool {
        matches!(self, Self::Cold)
    }

    /// Name used in messages.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Fire => "flame",
            Self::ForestFire => "fire",
            Self::Cold => "freezing vapour",
            Self::Poison => "poison gas",
            Self::Stink => "noxious fumes",
            Self::Steam => "steam",
            Self::Miasma => "foul pestilence",
        }
    }

    /// Cloud a polymorph bolt turns this one into.
    pub const fn polymorphed(self) -> Self {
        match self {
            Self::Fire | Self::ForestFire => Self::Cold,
            Self::Cold => Self::Fire,
            Self::Poison => Self::Stink,
            Self::Stink => Self::Miasma,
            Self::Steam => Self::Poison,
            Self::Miasma => Self::Steam,
        }
    }
}

/// A placed cloud.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cloud {
    pub kind: CloudKind,
    /// Remaining lifetime in turns.
    pub duration: i32,
    /// Whoever is blamed for damage the cloud deals.
    pub owner: Option<EntityId>,
}

impl Cloud {
    pub fn new(kind: CloudKind, duration: i32, owner: Option<EntityId>) -> Self {
        Self {
            kind,
            duration,
            owner,
        }
    }
}
