//! Bookkeeping of harm dealt by bolts.

use super::EntityId;

/// Who gets credit for a kill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum KillCategory {
    You,
    Friendly,
    Other,
}

/// How the player came to be hurt by a bolt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DamageCause {
    /// Exploding creature (spores, ball lightning).
    Spores,
    /// The player's own bolt, turned back by a reflector (`None` when
    /// nothing visible reflected it).
    Reflection { reflector: Option<EntityId> },
    /// The player's own bolt, after bouncing off a wall.
    Bounce,
    /// Deliberately aimed at the player's own cell.
    SelfAimed,
    /// The player's own bolt, through bad targeting.
    Targeting,
    Disintegration,
    /// A creature's bolt.
    Beam,
    /// Anything without a clear originator.
    WildMagic,
}

/// One application of bolt damage.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageRecord {
    pub victim: EntityId,
    pub attacker: Option<EntityId>,
    pub amount: i32,
    /// Name of the bolt that dealt the damage.
    pub aux: String,
    pub cause: DamageCause,
    pub credit: KillCategory,
    pub killed: bool,
}
