//! Collaborators a bolt consults but does not own.
//!
//! Oracles expose randomness, perception, message output, confirmation
//! prompts, and the attack catalog. The [`BoltEnv`] aggregate bundles them
//! with the mutable [`World`] so every propagation call receives one explicit
//! context instead of reaching for ambient state.
mod catalog;
mod messages;
mod prompt;
mod rng;
mod view;

pub use catalog::{
    AttackCatalog, AttackId, AttackTemplate, AttackTraits, CatalogError, CloudSpec, Colour,
    DamageFormula, ExplosionRadius, ExplosionRefinement, Scaling, ToHitFormula, calc_dice,
};
pub use messages::{Channel, Message, MessageLog, MessageSink, Silent};
pub use prompt::{AlwaysNo, AlwaysYes, Prompter, ScriptedPrompter};
pub use rng::{ConstRng, DeferredRolls, Dice, PcgRng, RngOracle, compute_seed};
pub use view::{ClearSight, Omniscient, VisibilityOracle};

use crate::config::BeamConfig;
use crate::state::{Actor, Position, World};

/// Everything a bolt touches while it resolves.
///
/// The bolt is the sole writer of `world` for the duration of a call, but
/// nested bolts (reflections, explosions) reuse the same context.
pub struct BoltEnv<'a> {
    pub world: &'a mut World,
    pub dice: Dice<'a>,
    pub view: &'a dyn VisibilityOracle,
    pub messages: &'a mut dyn MessageSink,
    pub prompt: &'a mut dyn Prompter,
    pub config: &'a BeamConfig,
}

impl<'a> BoltEnv<'a> {
    pub fn new(
        world: &'a mut World,
        dice: Dice<'a>,
        view: &'a dyn VisibilityOracle,
        messages: &'a mut dyn MessageSink,
        prompt: &'a mut dyn Prompter,
        config: &'a BeamConfig,
    ) -> Self {
        Self {
            world,
            dice,
            view,
            messages,
            prompt,
            config,
        }
    }

    pub fn player_sees_cell(&self, pos: Position) -> bool {
        self.view.player_sees_cell(&*self.world, pos)
    }

    pub fn player_sees_actor(&self, actor: &Actor) -> bool {
        self.view.player_sees_actor(&*self.world, actor)
    }

    pub fn player_pos(&self) -> Option<Position> {
        self.world.player().map(|p| p.position)
    }

    pub fn emit(&mut self, channel: Channel, text: &str) {
        self.messages.emit(channel, text);
    }

    pub fn ask(&mut self, question: &str) -> bool {
        self.prompt.yes_no(question)
    }
}

impl core::fmt::Debug for BoltEnv<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BoltEnv")
            .field("dice", &self.dice)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
