//! Bolts, beams, and explosions.
//!
//! A [`Bolt`] is one projectile from creation to termination. It walks a
//! [`Ray`] cell by cell, resolves walls, creatures, and the player on each
//! cell, and may turn into an explosion at its endpoint. The same code runs in
//! two modes:
//!
//! - **live**: damage, enchantments, terrain changes, clouds, and messages;
//! - **tracer**: a dry run that only counts who would be hit. Tracers never
//!   write to the world, never emit messages, and leave the dice stream where
//!   they found it. They may ask the player for confirmation.
//!
//! The pieces are split by concern:
//!
//! - [`fire`]: propagation, walls, bounces, ground effects, endpoints;
//! - [`actor`]: resolution against the player and creatures;
//! - [`enchant`]: saving throws and enchantment effects;
//! - [`explosion`]: the flood-filled area and its sweep order;
//! - [`zap`]: configuring bolts from catalog templates and tracer entry points.

pub mod actor;
pub mod attribution;
pub mod enchant;
pub mod error;
pub mod explosion;
pub mod fire;
pub mod flavour;
pub mod hooks;
pub mod ray;
pub mod run;
pub mod tracer;
pub mod zap;

use std::collections::BTreeSet;

pub use attribution::Thrower;
pub use enchant::{EnchantOutcome, check_res_magic};
pub use error::BoltError;
pub use explosion::{ExplosionMap, FloodRules, radial_sweep};
pub use flavour::Flavour;
pub use hooks::{AoeHook, DamageHook, HitHook, Hooks, RangeHook, sanctuary_veto};
pub use ray::{NeighborMask, Ray};
pub use run::RunState;
pub use tracer::TracerInfo;
pub use zap::{fire_tracer, player_tracer, zapping};

use crate::combat::{DiceDef, ToHit};
use crate::env::{
    AttackTraits, BoltEnv, Channel, CloudSpec, Colour, ExplosionRefinement,
};
use crate::state::{Attitude, EntityId, Item, Position};

/// Why a propagation run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Termination {
    RangeExhausted,
    /// The player declined a tracer prompt.
    Cancelled,
    /// Stopped by a wall it could neither pass nor bounce off.
    WallStop,
    /// Reached a target it was told to stop at.
    ReachedTarget,
    /// Ran off the map and was walked back to the last cell on it.
    MapEdge,
}

/// One projectile, beam, or explosion.
#[derive(Clone, Debug)]
pub struct Bolt {
    // ===== configuration =====
    /// Glyph drawn for the bolt; `None` for bolts nobody can see.
    pub glyph: Option<char>,
    /// Power used by saving throws and enchantment durations.
    pub ench_power: i32,
    /// Passes through targets instead of stopping at the first.
    pub is_beam: bool,
    pub is_explosion: bool,
    pub is_big_cloud: bool,
    pub is_tracer: bool,
    /// Flies without touching anything it passes.
    pub affects_nothing: bool,
    /// The player already knows what this bolt is.
    pub effect_known: bool,
    /// Projectile to drop at the endpoint.
    pub drop_item: Option<Item>,
    pub loudness: i32,
    pub traits: AttackTraits,
    pub trail_cloud: Option<CloudSpec>,
    pub endpoint_cloud: Option<CloudSpec>,
    pub explosion_cloud: Option<CloudSpec>,
    pub refinement: Option<ExplosionRefinement>,
    pub thrower: Thrower,
    /// The creature that fired the bolt, if any.
    pub agent: Option<EntityId>,
    /// Side the bolt fights for.
    pub attitude: Attitude,
    pub can_see_invis: bool,
    /// Percentage of total threat that must be foes before a creature fires.
    pub foe_ratio: i32,
    /// Explosions skip their own centre.
    pub hole_in_the_middle: bool,
    pub hooks: Hooks,
    /// Fired at the endpoint before this bolt's own endpoint effects.
    pub special_explosion: Option<Box<Bolt>>,

    // ===== per-run state =====
    pub run: RunState,

    // ===== outcome =====
    pub foe_info: TracerInfo,
    pub friend_info: TracerInfo,
    pub seen: bool,
    pub heard: bool,
    pub obvious_effect: bool,
    pub cancelled: bool,
    /// Something already told the player what happened.
    pub msg_generated: bool,
    /// The player agreed to be caught in the bolt.
    pub dont_stop_player: bool,
    /// Cells visited, in order, by the last run.
    pub path_taken: Vec<Position>,
    pub termination: Option<Termination>,

    message_cache: BTreeSet<String>,
}

impl Default for Bolt {
    fn default() -> Self {
        Self {
            glyph: Some('*'),
            ench_power: 0,
            is_beam: false,
            is_explosion: false,
            is_big_cloud: false,
            is_tracer: false,
            affects_nothing: false,
            effect_known: true,
            drop_item: None,
            loudness: 0,
            traits: AttackTraits::empty(),
            trail_cloud: None,
            endpoint_cloud: None,
            explosion_cloud: None,
            refinement: None,
            thrower: Thrower::Misc,
            agent: None,
            attitude: Attitude::Hostile,
            can_see_invis: false,
            foe_ratio: 0,
            hole_in_the_middle: false,
            hooks: Hooks::default(),
            special_explosion: None,
            run: RunState::default(),
            foe_info: TracerInfo::default(),
            friend_info: TracerInfo::default(),
            seen: false,
            heard: false,
            obvious_effect: false,
            cancelled: false,
            msg_generated: false,
            dont_stop_player: false,
            path_taken: Vec::new(),
            termination: None,
            message_cache: BTreeSet::new(),
        }
    }
}

impl Bolt {
    pub fn builder() -> BoltBuilder {
        BoltBuilder::default()
    }

    /// The cell currently being resolved.
    #[inline]
    pub fn pos(&self) -> Position {
        self.run.pos()
    }

    pub fn flavour(&self) -> Flavour {
        self.run.flavour
    }

    pub fn name(&self) -> &str {
        &self.run.name
    }

    /// Stops the bolt at the current cell.
    pub fn finish(&mut self) {
        self.run.finish();
    }

    /// Consumes range without ever passing the total.
    pub(crate) fn spend_range(&mut self, amount: i32) {
        self.run.spend(amount);
    }

    /// Shields may block it. Chain lightning redirects rather than flies, so
    /// electricity never counts.
    pub fn is_blockable(&self) -> bool {
        !self.is_beam && !self.is_explosion && self.run.flavour != Flavour::Electricity
    }

    /// No glyph is drawn and nothing announces its arrival.
    pub fn invisible(&self) -> bool {
        self.glyph.is_none() || self.run.flavour.is_enchantment()
    }

    /// Superhot bolts burn down wax and trees.
    pub fn is_superhot(&self) -> bool {
        self.run.flavour.is_fiery()
            && (self.traits.contains(AttackTraits::SUPERHOT)
                || (self.traits.contains(AttackTraits::SUPERHOT_EXPLOSION)
                    && self.run.in_explosion_phase))
    }

    /// Player-facing text. Tracers stay silent.
    pub(crate) fn say(&self, env: &mut BoltEnv<'_>, channel: Channel, text: &str) {
        if !self.is_tracer {
            env.emit(channel, text);
        }
    }

    /// Like [`say`](Self::say), but each distinct text is shown once per run.
    pub(crate) fn emit_message(&mut self, env: &mut BoltEnv<'_>, channel: Channel, text: &str) {
        if self.is_tracer {
            return;
        }
        if self.message_cache.insert(text.to_string()) {
            env.emit(channel, text);
        }
    }

    pub(crate) fn clear_message_cache(&mut self) {
        self.message_cache.clear();
    }
}

/// Prefixes `noun` with a capitalised indefinite article.
pub(crate) fn a_noun_cap(noun: &str) -> String {
    let article = if noun.starts_with(['a', 'e', 'i', 'o', 'u']) {
        "An"
    } else {
        "A"
    };
    format!("{article} {noun}")
}

/// Prefixes `noun` with an indefinite article.
pub(crate) fn a_noun(noun: &str) -> String {
    let article = if noun.starts_with(['a', 'e', 'i', 'o', 'u']) {
        "an"
    } else {
        "a"
    };
    format!("{article} {noun}")
}

/// Builder for [`Bolt`].
#[derive(Clone, Debug, Default)]
pub struct BoltBuilder {
    bolt: Bolt,
}

impl BoltBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.bolt.run.name = name.into();
        self
    }

    /// Sets both the effective and the configured flavour.
    pub fn flavour(mut self, flavour: Flavour) -> Self {
        self.bolt.run.flavour = flavour;
        self.bolt.run.real_flavour = flavour;
        self
    }

    pub fn damage(mut self, damage: DiceDef) -> Self {
        self.bolt.run.damage = damage;
        self
    }

    pub fn hit(mut self, hit: ToHit) -> Self {
        self.bolt.run.hit = hit;
        self
    }

    pub fn colour(mut self, colour: Colour) -> Self {
        self.bolt.run.colour = colour;
        self
    }

    pub fn glyph(mut self, glyph: Option<char>) -> Self {
        self.bolt.glyph = glyph;
        self
    }

    pub fn source(mut self, source: Position) -> Self {
        self.bolt.run.source = source;
        self
    }

    pub fn target(mut self, target: Position) -> Self {
        self.bolt.run.target = target;
        self
    }

    /// Cells the bolt may cover; `-1` picks the configured default.
    pub fn range(mut self, range: i32) -> Self {
        self.bolt.run.range = range;
        self
    }

    pub fn aimed_at_spot(mut self) -> Self {
        self.bolt.run.aimed_at_spot = true;
        self
    }

    pub fn ench_power(mut self, power: i32) -> Self {
        self.bolt.ench_power = power;
        self
    }

    pub fn beam(mut self) -> Self {
        self.bolt.is_beam = true;
        self
    }

    /// Makes the bolt explode at its endpoint with radius `size`.
    pub fn explosion(mut self, size: i32) -> Self {
        self.bolt.is_explosion = true;
        self.bolt.run.ex_size = size;
        self
    }

    pub fn big_cloud(mut self) -> Self {
        self.bolt.is_big_cloud = true;
        self
    }

    pub fn tracer(mut self) -> Self {
        self.bolt.is_tracer = true;
        self
    }

    pub fn affects_nothing(mut self) -> Self {
        self.bolt.affects_nothing = true;
        self
    }

    pub fn effect_known(mut self, known: bool) -> Self {
        self.bolt.effect_known = known;
        self
    }

    pub fn drop_item(mut self, item: Item) -> Self {
        self.bolt.drop_item = Some(item);
        self
    }

    pub fn loudness(mut self, loudness: i32) -> Self {
        self.bolt.loudness = loudness;
        self
    }

    pub fn traits(mut self, traits: AttackTraits) -> Self {
        self.bolt.traits |= traits;
        self
    }

    pub fn trail_cloud(mut self, cloud: CloudSpec) -> Self {
        self.bolt.trail_cloud = Some(cloud);
        self
    }

    pub fn endpoint_cloud(mut self, cloud: CloudSpec) -> Self {
        self.bolt.endpoint_cloud = Some(cloud);
        self
    }

    pub fn explosion_cloud(mut self, cloud: CloudSpec) -> Self {
        self.bolt.explosion_cloud = Some(cloud);
        self
    }

    pub fn refinement(mut self, refinement: ExplosionRefinement) -> Self {
        self.bolt.refinement = Some(refinement);
        self
    }

    /// Player throwers fight on the player's side.
    pub fn thrower(mut self, thrower: Thrower) -> Self {
        self.bolt.thrower = thrower;
        if thrower.is_player() {
            self.bolt.attitude = Attitude::Friendly;
        }
        self
    }

    pub fn agent(mut self, agent: EntityId) -> Self {
        self.bolt.agent = Some(agent);
        self
    }

    pub fn attitude(mut self, attitude: Attitude) -> Self {
        self.bolt.attitude = attitude;
        self
    }

    pub fn can_see_invis(mut self, sees: bool) -> Self {
        self.bolt.can_see_invis = sees;
        self
    }

    pub fn foe_ratio(mut self, ratio: i32) -> Self {
        self.bolt.foe_ratio = ratio;
        self
    }

    pub fn hole_in_the_middle(mut self) -> Self {
        self.bolt.hole_in_the_middle = true;
        self
    }

    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.bolt.hooks = hooks;
        self
    }

    pub fn special_explosion(mut self, explosion: Bolt) -> Self {
        self.bolt.special_explosion = Some(Box::new(explosion));
        self
    }

    pub fn build(self) -> Bolt {
        let mut bolt = self.bolt;
        if bolt.run.name.is_empty() {
            bolt.run.name = bolt.run.flavour.describe().to_string();
        }
        bolt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BeamConfig;
    use crate::env::{AlwaysYes, ConstRng, Dice, MessageLog, Omniscient};
    use crate::state::World;

    #[test]
    fn builder_names_unnamed_bolts_after_their_flavour() {
        let bolt = Bolt::builder().flavour(Flavour::Cold).build();
        assert_eq!(bolt.name(), "cold");
        assert_eq!(bolt.run.real_flavour, Flavour::Cold);
        let named = Bolt::builder().name("frost").flavour(Flavour::Cold).build();
        assert_eq!(named.name(), "frost");
    }

    #[test]
    fn player_throwers_are_friendly() {
        let bolt = Bolt::builder().thrower(Thrower::PlayerMissile).build();
        assert_eq!(bolt.attitude, Attitude::Friendly);
        let bolt = Bolt::builder().thrower(Thrower::MonsterSpell).build();
        assert_eq!(bolt.attitude, Attitude::Hostile);
    }

    #[test]
    fn blockable_excludes_beams_explosions_and_lightning() {
        assert!(Bolt::builder().build().is_blockable());
        assert!(!Bolt::builder().beam().build().is_blockable());
        assert!(!Bolt::builder().explosion(1).build().is_blockable());
        assert!(
            !Bolt::builder()
                .flavour(Flavour::Electricity)
                .build()
                .is_blockable()
        );
    }

    #[test]
    fn superhot_depends_on_traits_and_phase() {
        let mut bolt = Bolt::builder()
            .flavour(Flavour::Fire)
            .traits(AttackTraits::SUPERHOT_EXPLOSION)
            .build();
        assert!(!bolt.is_superhot());
        bolt.run.in_explosion_phase = true;
        assert!(bolt.is_superhot());
        let cold = Bolt::builder()
            .flavour(Flavour::Cold)
            .traits(AttackTraits::SUPERHOT)
            .build();
        assert!(!cold.is_superhot());
    }

    #[test]
    fn cached_messages_show_once_and_tracers_stay_quiet() {
        let mut world = World::new(3, 3).unwrap();
        let rng = ConstRng(0);
        let mut log = MessageLog::new();
        let mut prompt = AlwaysYes;
        let config = BeamConfig::default();
        let mut env = BoltEnv::new(
            &mut world,
            Dice::new(&rng, 0, 0),
            &Omniscient,
            &mut log,
            &mut prompt,
            &config,
        );
        let mut bolt = Bolt::builder().build();
        bolt.emit_message(&mut env, Channel::Plain, "You smell warm wax.");
        bolt.emit_message(&mut env, Channel::Plain, "You smell warm wax.");
        bolt.is_tracer = true;
        bolt.say(&mut env, Channel::Plain, "hidden");
        drop(env);
        assert_eq!(log.count("You smell warm wax."), 1);
        assert!(!log.contains("hidden"));
    }

    #[test]
    fn articles() {
        assert_eq!(a_noun_cap("orb of fire"), "An orb of fire");
        assert_eq!(a_noun("rock wall"), "a rock wall");
    }
}
