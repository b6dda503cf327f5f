//! Attack catalog oracle and template definitions.
//!
//! Templates are static data: each one maps an [`AttackId`] to the numbers a
//! bolt is configured from. The catalog itself lives outside the core (the
//! content crate loads it from RON); the core only consumes it through
//! [`AttackCatalog`].

use std::collections::BTreeMap;
use std::fmt;

use bitflags::bitflags;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::bolt::Flavour;
use crate::combat::{DiceDef, ToHit};
use crate::error::{ErrorSeverity, GameError};
use crate::state::CloudKind;

/// Identifier of a catalog entry, e.g. `"bolt_of_fire"`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AttackId(String);

impl AttackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AttackId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for AttackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display colour of a bolt.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Colour {
    Black,
    Blue,
    Green,
    Cyan,
    Red,
    Magenta,
    Brown,
    #[default]
    LightGrey,
    DarkGrey,
    LightBlue,
    LightGreen,
    LightCyan,
    LightRed,
    LightMagenta,
    Yellow,
    White,
}

/// `adder + power * num / den`, the shape every scaled formula shares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scaling {
    pub adder: i32,
    pub num: i32,
    pub den: i32,
}

impl Scaling {
    pub const fn new(adder: i32, num: i32, den: i32) -> Self {
        Self { adder, num, den }
    }

    pub const fn apply(self, power: i32) -> i32 {
        if self.den == 0 {
            return self.adder;
        }
        self.adder + power * self.num / self.den
    }
}

/// How a template turns power into damage dice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DamageFormula {
    /// No damage at all (most enchantments).
    #[default]
    None,
    /// Dice that ignore power.
    Fixed { num: i32, size: i32 },
    /// `num` dice whose size scales with power.
    Scaled { num: i32, size: Scaling },
    /// A power-scaled total spread over `num` dice.
    CalcDice { num: i32, total: Scaling },
}

impl DamageFormula {
    pub fn dice(&self, power: i32) -> DiceDef {
        match *self {
            Self::None => DiceDef::new(0, 0),
            Self::Fixed { num, size } => DiceDef::new(num, size),
            Self::Scaled { num, size } => DiceDef::new(num, size.apply(power)),
            Self::CalcDice { num, total } => calc_dice(num, total.apply(power)),
        }
    }
}

/// How a template turns power into accuracy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ToHitFormula {
    #[default]
    Automatic,
    Scaled(Scaling),
}

impl ToHitFormula {
    pub fn to_hit(&self, power: i32) -> ToHit {
        match *self {
            Self::Automatic => ToHit::Automatic,
            Self::Scaled(scaling) => ToHit::Value(scaling.apply(power).max(0)),
        }
    }
}

/// Spreads `total` damage over `num` dice so the maximum roll equals `total`
/// as closely as integer dice allow.
pub fn calc_dice(num: i32, total: i32) -> DiceDef {
    if num <= 0 || total <= 0 {
        return DiceDef::new(0, 0);
    }
    if num == 1 {
        return DiceDef::new(1, total);
    }
    if total <= num {
        return DiceDef::new(total, 1);
    }
    let size = total / num;
    let rem = total % num;
    DiceDef::new(num, if rem * 2 >= num { size + 1 } else { size })
}

bitflags! {
    /// Per-attack classification that name comparisons used to decide.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct AttackTraits: u32 {
        /// Hot enough to burn down wax walls and trees.
        const SUPERHOT           = 1 << 0;
        /// Explodes at its endpoint in live fire only.
        const SECRETLY_EXPLOSIVE = 1 << 1;
        /// Leaves burning napalm on whatever it hits.
        const STICKY_FLAME       = 1 << 2;
        /// Drops its projectile where it lands.
        const DROPS_ITEM         = 1 << 3;
        /// Behaves as a spreading cloud rather than a bolt.
        const BIG_CLOUD          = 1 << 4;
        /// Explosion cells may spawn a fire vortex.
        const SUMMONS_VORTEX     = 1 << 5;
        /// Only superhot once exploding.
        const SUPERHOT_EXPLOSION = 1 << 6;
    }
}

/// A cloud an attack leaves behind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CloudSpec {
    pub kind: CloudKind,
    pub min_duration: i32,
    pub max_duration: i32,
    /// Cells covered; `1` places a single cloud.
    #[cfg_attr(feature = "serde", serde(default = "CloudSpec::single"))]
    pub size: usize,
}

impl CloudSpec {
    pub const fn new(kind: CloudKind, min_duration: i32, max_duration: i32) -> Self {
        Self {
            kind,
            min_duration,
            max_duration,
            size: 1,
        }
    }

    pub const fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    const fn single() -> usize {
        1
    }
}

/// Radius chosen when an attack explodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ExplosionRadius {
    /// Keep whatever radius the bolt already has.
    #[default]
    Keep,
    Fixed(i32),
    /// 2, or 3 when `random2(power) > 75`; tracers assume the worst case.
    Storm,
}

/// How a bolt changes as it turns into an explosion.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExplosionRefinement {
    pub rename: Option<String>,
    /// Apply `rename` only in live fire.
    pub rename_live_only: bool,
    pub flavour: Option<Flavour>,
    /// Replace the number of damage dice.
    pub damage_num: Option<i32>,
    pub colour: Option<Colour>,
    pub radius: ExplosionRadius,
    pub see_message: Option<String>,
    pub hear_message: Option<String>,
}

/// Static description of one attack.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackTemplate {
    pub name: String,
    pub power_cap: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage: DamageFormula,
    #[cfg_attr(feature = "serde", serde(default))]
    pub to_hit: ToHitFormula,
    #[cfg_attr(feature = "serde", serde(default))]
    pub colour: Colour,
    #[cfg_attr(feature = "serde", serde(default = "AttackTemplate::default_glyph"))]
    pub glyph: char,
    pub flavour: Flavour,
    #[cfg_attr(feature = "serde", serde(default))]
    pub obvious: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub can_beam: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_explosion: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub loudness: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub traits: AttackTraits,
    #[cfg_attr(feature = "serde", serde(default))]
    pub trail_cloud: Option<CloudSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub endpoint_cloud: Option<CloudSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub explosion_cloud: Option<CloudSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub refinement: Option<ExplosionRefinement>,
}

impl AttackTemplate {
    pub fn new(name: impl Into<String>, flavour: Flavour) -> Self {
        Self {
            name: name.into(),
            power_cap: 100,
            damage: DamageFormula::None,
            to_hit: ToHitFormula::Automatic,
            colour: Colour::default(),
            glyph: Self::default_glyph(),
            flavour,
            obvious: false,
            can_beam: false,
            is_explosion: false,
            loudness: 0,
            traits: AttackTraits::empty(),
            trail_cloud: None,
            endpoint_cloud: None,
            explosion_cloud: None,
            refinement: None,
        }
    }

    const fn default_glyph() -> char {
        '*'
    }

    pub fn with_power_cap(mut self, cap: i32) -> Self {
        self.power_cap = cap;
        self
    }

    pub fn with_damage(mut self, damage: DamageFormula) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_to_hit(mut self, to_hit: ToHitFormula) -> Self {
        self.to_hit = to_hit;
        self
    }

    pub fn with_traits(mut self, traits: AttackTraits) -> Self {
        self.traits |= traits;
        self
    }

    pub fn with_loudness(mut self, loudness: i32) -> Self {
        self.loudness = loudness;
        self
    }

    pub fn beam(mut self) -> Self {
        self.can_beam = true;
        self
    }

    pub fn explosion(mut self, refinement: ExplosionRefinement) -> Self {
        self.is_explosion = true;
        self.refinement = Some(refinement);
        self
    }

    pub fn is_enchantment(&self) -> bool {
        self.flavour.is_enchantment()
    }

    /// Power after the cap is applied.
    pub fn capped_power(&self, power: i32) -> i32 {
        power.clamp(0, self.power_cap.max(0))
    }

    /// Checks internal consistency.
    pub fn validate(&self, id: &AttackId) -> Result<(), CatalogError> {
        let invalid = |reason: &'static str| CatalogError::InvalidTemplate {
            id: id.as_str().to_string(),
            reason,
        };
        if self.name.is_empty() {
            return Err(invalid("empty name"));
        }
        if self.power_cap < 0 {
            return Err(invalid("negative power cap"));
        }
        if self.is_explosion && self.traits.contains(AttackTraits::SECRETLY_EXPLOSIVE) {
            return Err(invalid("explosive both openly and secretly"));
        }
        for cloud in [self.trail_cloud, self.endpoint_cloud, self.explosion_cloud]
            .into_iter()
            .flatten()
        {
            if cloud.min_duration > cloud.max_duration || cloud.size == 0 {
                return Err(invalid("malformed cloud spec"));
            }
        }
        Ok(())
    }
}

/// Lookup of attack templates by identifier.
pub trait AttackCatalog {
    fn template(&self, id: &AttackId) -> Option<&AttackTemplate>;

    /// Like [`template`](Self::template) but reports a missing id as an error.
    fn require(&self, id: &AttackId) -> Result<&AttackTemplate, CatalogError> {
        self.template(id)
            .ok_or_else(|| CatalogError::UnknownAttack(id.as_str().to_string()))
    }
}

impl AttackCatalog for BTreeMap<AttackId, AttackTemplate> {
    fn template(&self, id: &AttackId) -> Option<&AttackTemplate> {
        self.get(id)
    }
}

/// Errors raised while looking up or validating templates.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CatalogError {
    #[error("attack '{0}' not found in catalog")]
    UnknownAttack(String),

    #[error("attack '{id}' is malformed: {reason}")]
    InvalidTemplate { id: String, reason: &'static str },
}

impl GameError for CatalogError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownAttack(_) => "CATALOG_UNKNOWN_ATTACK",
            Self::InvalidTemplate { .. } => "CATALOG_INVALID_TEMPLATE",
        }
    }
}
