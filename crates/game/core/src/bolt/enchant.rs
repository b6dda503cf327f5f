//! Enchantment classification and resolution against creatures.

use super::{Bolt, BoltError, Flavour};
use crate::config::BeamConfig;
use crate::env::{BoltEnv, Channel, Dice};
use crate::state::{Actor, ActorFlags, EntityId, Holiness, Position, Status};

/// How an enchantment attempt ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EnchantOutcome {
    Affected,
    /// The flavour means nothing to this target.
    Unaffected,
    /// The target made its saving throw.
    Resisted,
    /// Something else happened instead; no message is owed.
    Other,
}

/// Diminishing returns for enchantment power.
///
/// # Formula
///
/// ```text
/// every 30 points past 40 (up to 100) count half, capped at 120
/// ```
fn stepdown_power(power: i32) -> i32 {
    const FIRST_STEP: i32 = 40;
    const STEPPING: i32 = 30;
    const LAST_STEP: i32 = 100;
    const CEILING: i32 = 120;

    let mut value = power;
    let mut step = FIRST_STEP;
    while step <= LAST_STEP && value > step {
        value = (value - step) / 2 + step;
        step += STEPPING;
    }
    value.min(CEILING)
}

/// Saving throw against an enchantment. Returns true if it was resisted.
///
/// # Formula
///
/// ```text
/// resisted if random2(100) + random2(101) < 100 + mr - stepdown(power)
/// ```
///
/// Targets with very low resistance also shrug off half of all attempts
/// for free, and `BeamConfig::MAGIC_IMMUNE` always resists.
pub fn check_res_magic(power: i32, magic_resistance: i32, dice: &mut Dice<'_>) -> bool {
    if magic_resistance >= BeamConfig::MAGIC_IMMUNE {
        return true;
    }
    if magic_resistance < 6 && dice.coinflip() {
        return false;
    }
    let chance = 100 + magic_resistance - stepdown_power(power);
    let roll = dice.random2(100) + dice.random2(101);
    roll < chance
}

/// Whether `flavour` can do anything at all to `target`.
pub(super) fn ench_affects(flavour: Flavour, target: &Actor) -> bool {
    match flavour {
        Flavour::Polymorph => target.can_mutate(),
        Flavour::DispelUndead => target.holiness == Holiness::Undead,
        Flavour::Pain => target.resists.negative <= 0,
        Flavour::Hibernation => target.can_hibernate(),
        Flavour::Confusion | Flavour::Spore => target.is_confusable(),
        _ => true,
    }
}

impl Bolt {
    /// Whether the target would regard this bolt as an attack.
    pub fn nasty_to(&self, target: &Actor) -> bool {
        let flavour = self.run.flavour;
        if flavour == Flavour::Holy {
            return target.res_holy() <= 0;
        }
        if !flavour.is_enchantment() {
            return true;
        }
        if flavour == Flavour::Digging || self.nice_to(target) {
            return false;
        }
        match flavour {
            Flavour::Charm => target.holiness == Holiness::Holy,
            Flavour::Teleport => !target.wont_attack(),
            Flavour::Hibernation => target.holiness == Holiness::Natural,
            Flavour::DispelUndead => target.holiness == Holiness::Undead,
            Flavour::Pain => target.resists.negative <= 0,
            _ => true,
        }
    }

    /// Whether the target would welcome this bolt. Not the inverse of
    /// [`nasty_to`](Self::nasty_to): neutral effects are neither.
    pub fn nice_to(&self, target: &Actor) -> bool {
        match self.run.flavour {
            Flavour::Polymorph => target.flags.contains(ActorFlags::SHAPESHIFTER),
            Flavour::Haste | Flavour::Healing | Flavour::Invisibility => true,
            _ => false,
        }
    }

    /// Whether the bolt cannot hurt `target`, used to skip pointless prompts.
    pub fn is_harmless(&self, target: &Actor) -> bool {
        let flavour = self.run.flavour;
        if flavour.is_enchantment() {
            return !self.nasty_to(target);
        }
        match flavour {
            Flavour::Visual | Flavour::Digging => true,
            Flavour::Holy => target.res_holy() > 0,
            Flavour::Steam
            | Flavour::Fire
            | Flavour::Cold
            | Flavour::Electricity
            | Flavour::Poison
            | Flavour::Acid => flavour.props().resist.level(target) >= 3,
            Flavour::Miasma => target.resists.rot,
            Flavour::NegativeEnergy => target.resists.negative >= 3,
            _ => false,
        }
    }

    /// [`is_harmless`](Self::is_harmless) from the player's point of view.
    pub fn harmless_to_player(&self, player: &Actor) -> bool {
        let flavour = self.run.flavour;
        match flavour {
            Flavour::Visual
            | Flavour::Digging
            | Flavour::Haste
            | Flavour::Healing
            | Flavour::Invisibility => true,
            _ => {
                let props = flavour.props();
                props
                    .harmless_at
                    .is_some_and(|threshold| props.resist.level(player) >= threshold)
            }
        }
    }

    pub(super) fn ench_duration(&self, dice: &mut Dice<'_>) -> i32 {
        dice.random_range(5, 5 + self.ench_power / 5)
    }

    /// Saving throw, then the effect.
    pub fn try_enchant(
        &mut self,
        env: &mut BoltEnv<'_>,
        id: EntityId,
    ) -> Result<EnchantOutcome, BoltError> {
        let Some(mon) = env.world.actor(id).cloned() else {
            return Ok(EnchantOutcome::Unaffected);
        };
        let flavour = self.run.flavour;
        if !ench_affects(flavour, &mon) {
            return Ok(EnchantOutcome::Unaffected);
        }

        if flavour.has_saving_throw() && !self.run.aimed_at_feet {
            if mon.magic_immune() {
                return Ok(EnchantOutcome::Unaffected);
            }
            let welcome =
                flavour == Flavour::Polymorph && mon.flags.contains(ActorFlags::SHAPESHIFTER);
            if !welcome && check_res_magic(self.ench_power, mon.magic_resistance, &mut env.dice) {
                tracing::debug!(%id, %flavour, "saving throw made");
                return Ok(EnchantOutcome::Resisted);
            }
        }

        self.apply_enchantment(env, id, &mon)
    }

    /// "The orc falls asleep!", shown only if the player can see it.
    fn monster_message(&mut self, env: &mut BoltEnv<'_>, mon: &Actor, text: &str) -> bool {
        if !env.player_sees_actor(mon) {
            return false;
        }
        let line = format!("{}{}", mon.the_name_cap(), text);
        self.say(env, Channel::Plain, &line);
        true
    }

    pub(super) fn random_vacant_cell(&self, env: &mut BoltEnv<'_>) -> Option<Position> {
        let (width, height) = (env.world.width(), env.world.height());
        (0..100).find_map(|_| {
            let cell = Position::new(env.dice.random2(width), env.dice.random2(height));
            env.world.is_vacant(cell).then_some(cell)
        })
    }

    fn apply_enchantment(
        &mut self,
        env: &mut BoltEnv<'_>,
        id: EntityId,
        mon: &Actor,
    ) -> Result<EnchantOutcome, BoltError> {
        let flavour = self.run.flavour;
        tracing::trace!(%id, %flavour, "enchanting");

        let outcome = match flavour {
            Flavour::Teleport => {
                if env.player_sees_actor(mon) {
                    self.obvious_effect = true;
                }
                if let Some(cell) = self.random_vacant_cell(env) {
                    env.world.move_actor(id, cell)?;
                }
                EnchantOutcome::Affected
            }

            Flavour::Polymorph => {
                if self.monster_message(env, mon, " changes shape!") {
                    self.obvious_effect = true;
                }
                EnchantOutcome::Affected
            }

            Flavour::Banish => {
                self.monster_message(env, mon, " is banished!");
                env.world.remove_actor(id);
                self.obvious_effect = true;
                EnchantOutcome::Affected
            }

            Flavour::DispelUndead => {
                if self.monster_message(env, mon, " convulses!") {
                    self.obvious_effect = true;
                }
                let damage = self.run.damage.roll(&mut env.dice);
                self.internal_ouch(env, id, damage)?;
                EnchantOutcome::Affected
            }

            Flavour::Pain => {
                if self.monster_message(env, mon, " convulses in agony!") {
                    self.obvious_effect = true;
                }
                let damage = self.run.damage.roll(&mut env.dice);
                self.internal_ouch(env, id, damage)?;
                EnchantOutcome::Affected
            }

            Flavour::Disintegration => {
                if self.monster_message(env, mon, " is blasted.") {
                    self.obvious_effect = true;
                }
                let damage = self.run.damage.roll(&mut env.dice);
                self.internal_ouch(env, id, damage)?;
                EnchantOutcome::Affected
            }

            Flavour::Hibernation => {
                let turns = self.ench_duration(&mut env.dice);
                if let Some(target) = env.world.actor_mut(id) {
                    target.add_status(Status::Sleep, turns);
                }
                if self.monster_message(env, mon, " looks drowsy...") {
                    self.obvious_effect = true;
                }
                EnchantOutcome::Affected
            }

            Flavour::Corona => {
                let turns = self.ench_duration(&mut env.dice);
                let fresh = env
                    .world
                    .actor_mut(id)
                    .is_some_and(|target| target.add_status(Status::Corona, turns));
                if !fresh {
                    return Ok(EnchantOutcome::Unaffected);
                }
                if self.monster_message(env, mon, " is outlined in light.") {
                    self.obvious_effect = true;
                }
                EnchantOutcome::Affected
            }

            Flavour::Slow => {
                let turns = self.ench_duration(&mut env.dice);
                let fresh = env
                    .world
                    .actor_mut(id)
                    .is_some_and(|target| target.add_status(Status::Slow, turns));
                if fresh && self.monster_message(env, mon, " seems to slow down.") {
                    self.obvious_effect = true;
                }
                EnchantOutcome::Affected
            }

            Flavour::Haste => {
                let turns = self.ench_duration(&mut env.dice);
                let Some(target) = env.world.actor_mut(id) else {
                    return Ok(EnchantOutcome::Unaffected);
                };
                let was_slow = target.remove_status(Status::Slow);
                let hasted = !was_slow
                    && !target.flags.contains(ActorFlags::STATIONARY)
                    && target.add_status(Status::Haste, turns);
                if was_slow {
                    if self.monster_message(env, mon, " is no longer moving slowly.") {
                        self.obvious_effect = true;
                    }
                } else if hasted && self.monster_message(env, mon, " seems to speed up.") {
                    self.obvious_effect = true;
                }
                EnchantOutcome::Affected
            }

            Flavour::Might => {
                let turns = self.ench_duration(&mut env.dice);
                let fresh = env.world.actor_mut(id).is_some_and(|target| {
                    !target.flags.contains(ActorFlags::STATIONARY)
                        && target.add_status(Status::Might, turns)
                });
                if fresh && self.monster_message(env, mon, " seems to grow stronger.") {
                    self.obvious_effect = true;
                }
                EnchantOutcome::Affected
            }

            Flavour::Berserk => {
                let turns = self.ench_duration(&mut env.dice);
                let fresh = env
                    .world
                    .actor_mut(id)
                    .is_some_and(|target| target.add_status(Status::Berserk, turns));
                if fresh {
                    self.monster_message(env, mon, " goes berserk!");
                    self.obvious_effect = env.player_sees_cell(mon.position);
                }
                EnchantOutcome::Affected
            }

            Flavour::Healing => {
                let amount = 5 + self.run.damage.roll(&mut env.dice);
                let (healed, full) = env.world.actor_mut(id).map_or((0, false), |target| {
                    let healed = target.hp.restore(amount);
                    (healed, target.hp.is_full())
                });
                if healed > 0 {
                    let text = if full {
                        "'s wounds heal themselves!"
                    } else {
                        " is healed somewhat."
                    };
                    if self.monster_message(env, mon, text) {
                        self.obvious_effect = true;
                    }
                }
                if self.thrower.is_player() {
                    self.msg_generated = true;
                }
                EnchantOutcome::Affected
            }

            Flavour::Paralysis => {
                let turns = self.ench_duration(&mut env.dice);
                let fresh = env
                    .world
                    .actor_mut(id)
                    .is_some_and(|target| target.add_status(Status::Paralysis, turns));
                if fresh && self.monster_message(env, mon, " suddenly stops moving!") {
                    self.obvious_effect = true;
                }
                EnchantOutcome::Affected
            }

            Flavour::Petrify => {
                let turns = self.ench_duration(&mut env.dice);
                let fresh = env
                    .world
                    .actor_mut(id)
                    .is_some_and(|target| target.add_status(Status::Petrified, turns));
                if fresh && self.monster_message(env, mon, " is moving more slowly.") {
                    self.obvious_effect = true;
                }
                EnchantOutcome::Affected
            }

            Flavour::Confusion | Flavour::Spore => {
                let turns = self.ench_duration(&mut env.dice);
                let fresh = env
                    .world
                    .actor_mut(id)
                    .is_some_and(|target| target.add_status(Status::Confusion, turns));
                if fresh && self.monster_message(env, mon, " appears confused.") {
                    self.obvious_effect = true;
                }
                EnchantOutcome::Affected
            }

            Flavour::Sleep => {
                if mon.has_status(Status::Sleep) {
                    return Ok(EnchantOutcome::Unaffected);
                }
                let turns = self.ench_duration(&mut env.dice);
                if let Some(target) = env.world.actor_mut(id) {
                    target.add_status(Status::Sleep, turns);
                }
                if self.monster_message(env, mon, " falls asleep!") {
                    self.obvious_effect = true;
                }
                EnchantOutcome::Affected
            }

            Flavour::Invisibility => {
                let turns = self.ench_duration(&mut env.dice);
                let fresh = env.world.actor_mut(id).is_some_and(|target| {
                    let fresh = !target.invisible() && target.add_status(Status::Invisibility, turns);
                    if fresh {
                        target.remove_status(Status::Corona);
                    }
                    fresh
                });
                if fresh {
                    if env.player_sees_cell(mon.position) {
                        let still_seen = env
                            .world
                            .actor(id)
                            .is_some_and(|target| env.player_sees_actor(target));
                        let how = if still_seen { "for a moment." } else { "and vanishes!" };
                        let text = format!("{} flickers {how}", mon.the_name_cap());
                        self.say(env, Channel::Plain, &text);
                    }
                    self.obvious_effect = true;
                }
                EnchantOutcome::Affected
            }

            Flavour::Charm => {
                if mon.holiness == Holiness::Holy && self.thrower.is_player() {
                    self.monster_message(env, mon, " is repulsed!");
                    return Ok(EnchantOutcome::Other);
                }
                let turns = self.ench_duration(&mut env.dice);
                let fresh = env
                    .world
                    .actor_mut(id)
                    .is_some_and(|target| target.add_status(Status::Charm, turns));
                if fresh && self.monster_message(env, mon, " is charmed.") {
                    self.obvious_effect = true;
                }
                EnchantOutcome::Affected
            }

            _ => EnchantOutcome::Affected,
        };
        Ok(outcome)
    }
}
