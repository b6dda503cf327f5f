//! Resolution against the player and creatures.

use super::{Bolt, BoltError, Flavour, Ray, Thrower};
use crate::combat::{
    DamageRoll, EffectMode, HitOutcome, Mitigation, ToHit, adjust_flavoured, armour_reduction,
    hit_ladder, shield_blocks, test_beam_hit,
};
use crate::config::BeamConfig;
use crate::env::{AttackTraits, BoltEnv, Channel, DeferredRolls};
use crate::state::{
    Actor, ActorFlags, Attitude, DamageRecord, EntityId, Holiness, Patron, Position, Status,
    World,
};

use super::enchant::{EnchantOutcome, ench_affects};
use super::fire::{FIRE_VORTEX, player_silenced};

impl Bolt {
    fn hit_verb(&self) -> &'static str {
        if self.is_explosion || self.is_big_cloud {
            "engulfs"
        } else {
            "hits"
        }
    }

    /// Range a hit on `victim` consumes, before hooks.
    pub fn range_used_on_hit(&self) -> i32 {
        let flavour = self.run.flavour;
        let used = if !self.is_beam {
            BeamConfig::BEAM_STOP
        } else if flavour.is_enchantment() {
            if flavour == Flavour::Digging {
                0
            } else {
                BeamConfig::BEAM_STOP
            }
        } else if flavour == Flavour::Hellfire {
            0
        } else if self.is_explosion || self.is_big_cloud || flavour == Flavour::Acid {
            BeamConfig::BEAM_STOP
        } else if flavour == Flavour::Electricity {
            0
        } else {
            1
        };

        // Player tracers keep going so they can reveal what lies behind.
        if self.is_tracer
            && self.thrower.is_player()
            && used == BeamConfig::BEAM_STOP
            && !self.run.hit.is_automatic()
        {
            return 1;
        }
        used
    }

    fn consume_range_on_hit(&mut self, victim: &Actor) {
        let mut used = self.range_used_on_hit();
        if !self.run.in_explosion_phase {
            self.apply_range_hooks(victim, &mut used);
        }
        self.spend_range(used);
    }

    /// Applies damage and records who dealt it.
    pub(crate) fn internal_ouch(
        &mut self,
        env: &mut BoltEnv<'_>,
        victim: EntityId,
        amount: i32,
    ) -> Result<bool, BoltError> {
        if amount <= 0 {
            return Ok(false);
        }
        let cause = self.damage_cause(env.world);
        let credit = self.whose_kill(env.world);
        let killed = env.world.hurt(victim, amount)?;
        env.world.record_damage(DamageRecord {
            victim,
            attacker: self.killer(),
            amount,
            aux: self.run.name.clone(),
            cause,
            credit,
            killed,
        });
        tracing::debug!(%victim, amount, killed, "hurt");
        Ok(killed)
    }

    fn side_for(&mut self, friendly: bool) -> &mut super::TracerInfo {
        if friendly {
            &mut self.friend_info
        } else {
            &mut self.foe_info
        }
    }

    // ========================================================================
    // Player
    // ========================================================================

    pub(crate) fn affect_player(&mut self, env: &mut BoltEnv<'_>) -> Result<(), BoltError> {
        if self.is_explosion && !self.run.in_explosion_phase {
            self.finish();
            return Ok(());
        }
        if self.run.flavour == Flavour::Digging {
            return Ok(());
        }
        if self.is_tracer {
            self.tracer_affect_player(env);
            return Ok(());
        }
        if env.world.player().is_none() {
            return Ok(());
        }
        if self.run.flavour.is_enchantment() {
            return self.affect_player_enchantment(env);
        }

        self.msg_generated = true;
        if self.misses_player(env) {
            return Ok(());
        }
        let Some(player) = env.world.player().cloned() else {
            return Ok(());
        };

        let text = format!("The {} {} you!", self.run.name, self.hit_verb());
        self.say(env, Channel::Plain, &text);

        let flavour = self.run.flavour;
        let mut pre_ac = self.run.damage.roll(&mut env.dice);
        let mut messages = Vec::new();
        if !self.apply_damage_hooks(&player, &mut pre_ac, &mut messages) {
            return Ok(());
        }
        let draws = flavour.props().armour_draws;
        let post_ac = (pre_ac - armour_reduction(player.armour, draws, true, &mut env.dice)).max(0);
        let flavoured = adjust_flavoured(&player, flavour, post_ac, EffectMode::Commit, &mut env.dice);
        if let Some(text) = &flavoured.message {
            self.say(env, Channel::Plain, text);
        }
        if flavoured.observed {
            self.obvious_effect = true;
        }
        if let Some(effect) = flavoured.effect
            && let Some(player) = env.world.player_mut()
        {
            effect.apply(player);
        }

        if self.traits.contains(AttackTraits::STICKY_FLAME)
            && !player.flags.contains(ActorFlags::RES_STICKY_FLAME)
        {
            let levels = env.dice.random2avg(7, 3) + 1;
            if let Some(player) = env.world.player_mut() {
                player.stack_status(Status::StickyFlame, levels);
            }
        }

        let hurted = flavoured.damage;
        self.apply_hit_hooks(EntityId::PLAYER, hurted, env.world);
        if hurted > 0 {
            let friendly = self.attitude.wont_attack();
            self.side_for(friendly).hurt += 1;
            for text in &messages {
                self.say(env, Channel::Plain, text);
            }
        }

        self.internal_ouch(env, EntityId::PLAYER, hurted)?;
        self.consume_range_on_hit(&player);
        Ok(())
    }

    /// Shield, then the hit ladder. Returns true if the bolt missed.
    fn misses_player(&mut self, env: &mut BoltEnv<'_>) -> bool {
        if self.is_explosion
            || self.run.aimed_at_feet
            || self.run.auto_hit
            || self.run.flavour.is_enchantment()
        {
            return false;
        }
        let Some(player) = env.world.player().cloned() else {
            return true;
        };

        let mut hit = self.run.hit;
        if player.invisible() && !self.can_see_invis {
            hit = hit.halved();
        }
        if player.backlit() {
            hit = hit.plus(2 + env.dice.random2(8));
        }

        if self.is_blockable()
            && let Some(shield) = player.shield
            && shield_blocks(hit, shield.block, shield.penalty, &mut env.dice)
        {
            if shield.reflective && self.run.range_used < self.run.range {
                let text = format!("Your shield reflects the {}!", self.run.name);
                self.say(env, Channel::Plain, &text);
                self.reflect(env);
            } else {
                let text = format!("You block the {}.", self.run.name);
                self.say(env, Channel::Plain, &text);
                self.finish();
            }
            return true;
        }

        let phase_defence = if player.flags.contains(ActorFlags::PHASE_SHIFT) {
            player.evasion + BeamConfig::PHASE_SHIFT_EVASION
        } else {
            player.evasion
        };
        let outcome = hit_ladder(
            hit,
            player.evasion,
            phase_defence,
            self.is_beam,
            Mitigation::for_actor(&player),
            &mut env.dice,
        );
        let name = &self.run.name;
        let text = match outcome {
            HitOutcome::Hit => return false,
            HitOutcome::Miss => format!("The {name} misses you."),
            HitOutcome::Repelled => format!("The {name} is repelled."),
            HitOutcome::Deflected => format!("You deflect the {name}!"),
            HitOutcome::PhasedOut => {
                format!("You momentarily phase out as the {name} passes through you.")
            }
        };
        self.say(env, Channel::Plain, &text);
        true
    }

    fn tracer_affect_player(&mut self, env: &mut BoltEnv<'_>) {
        let Some(player) = env.world.player().cloned() else {
            return;
        };

        if self.thrower.is_player() {
            if !self.run.aimed_at_feet && !self.dont_stop_player && !self.harmless_to_player(&player) {
                if env.ask("That beam is likely to hit you. Continue anyway?") {
                    self.friend_info.count += 1;
                    self.friend_info.power += player.power;
                    self.dont_stop_player = true;
                } else {
                    self.cancelled = true;
                    self.finish();
                }
            }
        } else if self.can_see_invis || !player.invisible() || self.fuzz_invis_tracer(env) {
            let friendly = self.attitude.wont_attack();
            let side = self.side_for(friendly);
            side.count += 1;
            side.power += player.power;
        }

        let mut dummy = 0;
        let mut messages = Vec::new();
        self.apply_damage_hooks(&player, &mut dummy, &mut messages);
        self.apply_hit_hooks(EntityId::PLAYER, 0, env.world);
        self.consume_range_on_hit(&player);
    }

    /// A creature guessing at an invisible player's position.
    fn fuzz_invis_tracer(&mut self, env: &mut BoltEnv<'_>) -> bool {
        let Some(player_pos) = env.player_pos() else {
            return false;
        };
        let radius = env.config.invisible_fuzz_radius;
        let dist = self.run.target.distance(player_pos);
        if dist > radius {
            return false;
        }
        let senses = self
            .agent
            .and_then(|id| env.world.actor(id))
            .is_some_and(|agent| env.view.actor_sees_invisible(agent));
        if senses {
            return dist == 0;
        }
        let fuzz = Position::new(
            env.dice.random_range(-radius, radius),
            env.dice.random_range(-radius, radius),
        );
        let guess = self.run.target + fuzz;
        if env.world.in_bounds(guess) {
            self.run.target = guess;
        }
        true
    }

    fn affect_player_enchantment(&mut self, env: &mut BoltEnv<'_>) -> Result<(), BoltError> {
        let Some(player) = env.world.player().cloned() else {
            return Ok(());
        };
        let flavour = self.run.flavour;

        if flavour != Flavour::Polymorph
            && flavour.has_saving_throw()
            && !self.run.aimed_at_feet
            && super::check_res_magic(self.ench_power, player.magic_resistance, &mut env.dice)
        {
            let hidden_agent = !self.thrower.is_missile()
                && self
                    .agent
                    .and_then(|id| env.world.actor(id))
                    .is_some_and(|agent| !env.player_sees_actor(agent));
            let text = if hidden_agent {
                "Something tries to affect you, but you resist."
            } else {
                "You resist."
            };
            self.say(env, Channel::Plain, text);
            self.consume_range_on_hit(&player);
            return Ok(());
        }

        let turns = self.ench_duration(&mut env.dice);
        let gain = |status: Status, env: &mut BoltEnv<'_>| {
            if let Some(p) = env.world.player_mut() {
                p.add_status(status, turns);
            }
        };

        let text: Option<&str> = match flavour {
            Flavour::Sleep | Flavour::Hibernation => {
                gain(Status::Sleep, env);
                Some("You fall asleep.")
            }
            Flavour::Corona => {
                gain(Status::Corona, env);
                Some("You are outlined in light.")
            }
            Flavour::Polymorph => {
                if self.thrower.is_monster() {
                    Some("Strange energies course through your body.")
                } else {
                    self.say(env, Channel::Plain, "Nothing appears to happen.");
                    self.msg_generated = true;
                    None
                }
            }
            Flavour::Slow => {
                gain(Status::Slow, env);
                Some("You feel yourself slow down.")
            }
            Flavour::Haste => {
                gain(Status::Haste, env);
                Some("You feel yourself speed up.")
            }
            Flavour::Might => {
                gain(Status::Might, env);
                Some("You feel very mighty all of a sudden.")
            }
            Flavour::Berserk => {
                gain(Status::Berserk, env);
                Some("A red film seems to cover your vision as you go berserk!")
            }
            Flavour::Healing => {
                let amount = 5 + self.run.damage.roll(&mut env.dice);
                if let Some(p) = env.world.player_mut() {
                    p.hp.restore(amount);
                }
                Some("You feel better.")
            }
            Flavour::Paralysis => {
                gain(Status::Paralysis, env);
                Some("You suddenly lose the ability to move!")
            }
            Flavour::Petrify => {
                gain(Status::Petrified, env);
                Some("You turn to stone!")
            }
            Flavour::Confusion | Flavour::Charm => {
                gain(Status::Confusion, env);
                Some("You feel confused.")
            }
            Flavour::Invisibility => {
                gain(Status::Invisibility, env);
                Some("You fade into invisibility!")
            }
            Flavour::Teleport => {
                if let Some(cell) = self.random_vacant_cell(env) {
                    env.world.move_actor(EntityId::PLAYER, cell)?;
                }
                Some("Your surroundings suddenly seem different.")
            }
            Flavour::Banish => {
                if self.thrower.is_player() {
                    Some("This spell isn't strong enough to banish yourself.")
                } else {
                    Some("You are cast into the Abyss!")
                }
            }
            Flavour::Pain => {
                if player.resists.negative > 0 {
                    Some("You are unaffected.")
                } else {
                    self.say(env, Channel::Plain, "Pain shoots through your body!");
                    self.obvious_effect = true;
                    let damage = self.run.damage.roll(&mut env.dice);
                    self.internal_ouch(env, EntityId::PLAYER, damage)?;
                    None
                }
            }
            Flavour::DispelUndead => {
                if player.holiness == Holiness::Undead {
                    self.say(env, Channel::Plain, "You convulse!");
                    self.obvious_effect = true;
                    let damage = self.run.damage.roll(&mut env.dice);
                    self.internal_ouch(env, EntityId::PLAYER, damage)?;
                    None
                } else {
                    Some("You are unaffected.")
                }
            }
            Flavour::Disintegration => {
                self.say(env, Channel::Plain, "You are blasted!");
                self.obvious_effect = true;
                let damage = self.run.damage.roll(&mut env.dice);
                self.internal_ouch(env, EntityId::PLAYER, damage)?;
                None
            }
            _ => None,
        };
        if let Some(text) = text {
            self.say(env, Channel::Plain, text);
            self.obvious_effect = true;
        }

        let friendly = self.attitude.wont_attack();
        if self.nasty_to(&player) {
            self.side_for(friendly).hurt += 1;
        } else if self.nice_to(&player) {
            self.side_for(friendly).helped += 1;
        }
        self.apply_hit_hooks(EntityId::PLAYER, 0, env.world);
        self.consume_range_on_hit(&player);
        Ok(())
    }

    // ========================================================================
    // Creatures
    // ========================================================================

    pub(crate) fn affect_monster(
        &mut self,
        env: &mut BoltEnv<'_>,
        id: EntityId,
    ) -> Result<(), BoltError> {
        let Some(mon) = env.world.actor(id).cloned() else {
            return Ok(());
        };
        if !mon.alive() {
            self.apply_hit_hooks(id, 0, env.world);
            return Ok(());
        }

        let flavour = self.run.flavour;
        if flavour == Flavour::Digging {
            self.apply_hit_hooks(id, 0, env.world);
            return Ok(());
        }
        if mon.flags.contains(ActorFlags::BUSH)
            && !self.is_beam
            && !self.is_explosion
            && matches!(flavour, Flavour::Missile | Flavour::Magic)
        {
            self.apply_hit_hooks(id, 0, env.world);
            return Ok(());
        }
        if self.traits.contains(AttackTraits::SUMMONS_VORTEX) && mon.name == FIRE_VORTEX {
            self.apply_hit_hooks(id, 0, env.world);
            return Ok(());
        }

        if self.is_tracer {
            return self.tracer_affect_monster(env, &mon);
        }

        if flavour == Flavour::Visual {
            self.apply_hit_hooks(id, 0, env.world);
            return Ok(());
        }
        if matches!(flavour, Flavour::Disintegration | Flavour::Nuke) && mon.is_statue() {
            return self.disintegrate_statue(env, &mon);
        }
        if flavour.is_enchantment() {
            return self.enchantment_affect_monster(env, &mon);
        }
        if mon.submerged() && !self.run.aimed_at_spot {
            return Ok(());
        }
        if self.is_explosion && !self.run.in_explosion_phase {
            self.finish();
            return Ok(());
        }

        let Some((roll, messages)) = self.determine_damage(env, &mon) else {
            return Ok(());
        };
        tracing::trace!(
            %id,
            pre_ac = roll.pre_ac,
            post_ac = roll.post_ac,
            final_dmg = roll.final_dmg,
            "damage against creature"
        );

        let engulfs = self.is_explosion || self.is_big_cloud;
        if engulfs && flavour == Flavour::Spore && mon.holiness == Holiness::Natural {
            self.apply_enchantment_to(env, id)?;
        }

        let mut hit = self.run.hit;
        if mon.invisible() && !self.can_see_invis {
            hit = hit.halved();
        }
        if mon.backlit() {
            hit = hit.plus(2 + env.dice.random2(8));
        }

        let visible = env.player_sees_actor(&mon);
        if !engulfs {
            let rand_ev = env.dice.random2(mon.evasion);
            let mut rolls = DeferredRolls::new();
            let mitigation = Mitigation::for_actor(&mon);
            if !test_beam_hit(hit, rand_ev, self.is_beam, mitigation, &mut rolls, &mut env.dice) {
                if visible {
                    let unmitigated = test_beam_hit(
                        hit,
                        rand_ev,
                        self.is_beam,
                        Mitigation::NONE,
                        &mut rolls,
                        &mut env.dice,
                    );
                    let text = if unmitigated {
                        format!("{} deflects the {}!", mon.the_name_cap(), self.run.name)
                    } else {
                        format!("The {} misses {}.", self.run.name, mon.the_name())
                    };
                    self.say(env, Channel::Plain, &text);
                }
                return Ok(());
            }
            if self.is_blockable() && self.attempt_block(env, &mon, hit) {
                return Ok(());
            }
        }

        self.update_hurt_or_helped(&mon);

        if !self.is_explosion {
            let heard = env.world.noisy(self.loudness, self.pos(), self.killer());
            self.heard |= heard;
        }

        if env.player_sees_cell(mon.position) {
            let who = if visible {
                mon.the_name()
            } else {
                "something".to_string()
            };
            let text = format!("The {} {} {}.", self.run.name, self.hit_verb(), who);
            self.say(env, Channel::Plain, &text);
        } else if !player_silenced(env.world)
            && flavour == Flavour::Missile
            && self.thrower == Thrower::PlayerMissile
        {
            let text = format!("The {} hits something.", self.run.name);
            self.say(env, Channel::Sound, &text);
        }

        if roll.final_dmg > 0 {
            for text in &messages {
                self.say(env, Channel::Plain, text);
            }
        }

        let flavoured = adjust_flavoured(&mon, flavour, roll.post_ac, EffectMode::Commit, &mut env.dice);
        if visible && let Some(text) = &flavoured.message {
            self.say(env, Channel::Plain, text);
        }
        if flavoured.observed {
            self.obvious_effect = true;
        }
        if let Some(effect) = flavoured.effect
            && let Some(target) = env.world.actor_mut(id)
        {
            effect.apply(target);
        }

        let killed = self.internal_ouch(env, id, roll.final_dmg)?;
        if killed {
            if visible {
                let text = format!("{} is killed!", mon.the_name_cap());
                self.say(env, Channel::Plain, &text);
            }
        } else if self.traits.contains(AttackTraits::STICKY_FLAME)
            && !mon.flags.contains(ActorFlags::RES_STICKY_FLAME)
        {
            let levels = (1 + env.dice.random2(self.ench_power) / 2).min(BeamConfig::MAX_NAPALM_LEVELS);
            if let Some(target) = env.world.actor_mut(id) {
                target.stack_status(Status::StickyFlame, levels);
            }
        }

        self.apply_hit_hooks(id, roll.final_dmg, env.world);
        self.consume_range_on_hit(&mon);
        Ok(())
    }

    /// Spore clouds confuse the natural creatures they engulf.
    fn apply_enchantment_to(&mut self, env: &mut BoltEnv<'_>, id: EntityId) -> Result<(), BoltError> {
        let real = self.run.flavour;
        self.run.flavour = Flavour::Confusion;
        let outcome = self.try_enchant(env, id);
        self.run.flavour = real;
        outcome.map(|_| ())
    }

    /// Patron of whoever launched the bolt. Explosions have no originator.
    fn originator_patron(&self, world: &World) -> Option<Patron> {
        if self.is_explosion {
            return None;
        }
        if self.thrower.is_player() {
            world.player().and_then(|p| p.patron)
        } else {
            self.agent.and_then(|id| world.actor(id)).and_then(|a| a.patron)
        }
    }

    /// The three damage figures, or `None` if the target is untouched.
    ///
    /// Tracers use the dice mean and preview resistance; live bolts roll.
    pub fn determine_damage(
        &mut self,
        env: &mut BoltEnv<'_>,
        mon: &Actor,
    ) -> Option<(DamageRoll, Vec<String>)> {
        let flavour = self.run.flavour;

        let verdant = self.originator_patron(env.world) == Some(Patron::Verdant);
        if !flavour.is_enchantment()
            && verdant
            && self.attitude == mon.attitude
            && mon.holiness == Holiness::Plant
        {
            let whose = if self.attitude == Attitude::Friendly { "your" } else { "a" };
            let text = format!("Verdant protects {whose} plant from harm.");
            self.say(env, Channel::God, &text);
            return None;
        }

        let live = !self.is_tracer;
        let mut pre_ac = self.run.damage.resolve(live, &mut env.dice);
        let mut messages = Vec::new();
        if !self.apply_damage_hooks(mon, &mut pre_ac, &mut messages) {
            return None;
        }

        let props = flavour.props();
        if mon.submerged() {
            if !self.run.aimed_at_spot {
                return None;
            }
            if props.grounded_by_water {
                if env.player_sees_cell(mon.position) {
                    let text = format!("The {} arcs harmlessly into the water.", self.run.name);
                    self.say(env, Channel::Plain, &text);
                }
                self.finish();
                return None;
            }
            pre_ac = pre_ac * 2 / 3;
        }

        let post_ac =
            (pre_ac - armour_reduction(mon.armour, props.armour_draws, live, &mut env.dice)).max(0);
        let final_dmg = adjust_flavoured(mon, flavour, post_ac, EffectMode::Preview, &mut env.dice).damage;
        Some((
            DamageRoll {
                pre_ac,
                post_ac,
                final_dmg,
            },
            messages,
        ))
    }

    fn tracer_affect_monster(&mut self, env: &mut BoltEnv<'_>, mon: &Actor) -> Result<(), BoltError> {
        if !env.player_sees_actor(mon) {
            return Ok(());
        }
        if self.is_explosion && !self.run.in_explosion_phase {
            self.finish();
            return Ok(());
        }

        let aligned = self.attitude.aligned_with(mon.effective_attitude());
        if self.run.flavour.is_enchantment() {
            let flavour = self.run.flavour;
            let immune = flavour.has_saving_throw() && mon.magic_immune();
            if flavour != Flavour::Digging && ench_affects(flavour, mon) && !immune {
                let side = self.side_for(aligned);
                side.count += 1;
                side.power += mon.power;
            }
        } else {
            let Some((roll, _)) = self.determine_damage(env, mon) else {
                return Ok(());
            };
            if roll.final_dmg > 0 {
                let power = if roll.pre_ac > 0 {
                    2 * roll.final_dmg * mon.power / roll.pre_ac
                } else {
                    0
                };
                let side = self.side_for(aligned);
                side.count += 1;
                side.power += power;
            }
        }

        self.handle_stop_attack_prompt(env, mon, aligned);
        if !self.cancelled {
            self.apply_hit_hooks(mon.id, 0, env.world);
            self.consume_range_on_hit(mon);
        }
        Ok(())
    }

    /// Asks before a player's bolt strikes a creature that is not hostile.
    fn handle_stop_attack_prompt(&mut self, env: &mut BoltEnv<'_>, mon: &Actor, aligned: bool) {
        if !self.thrower.is_player() || self.is_harmless(mon) {
            return;
        }
        let info = if aligned { self.friend_info } else { self.foe_info };
        if info.count != 1 || info.dont_stop || mon.attitude == Attitude::Hostile {
            return;
        }
        let question = format!("Really fire at {}?", mon.the_name());
        if env.ask(&question) {
            self.side_for(aligned).dont_stop = true;
        } else {
            self.cancelled = true;
            self.finish();
        }
    }

    fn enchantment_affect_monster(&mut self, env: &mut BoltEnv<'_>, mon: &Actor) -> Result<(), BoltError> {
        if mon.submerged() {
            return Ok(());
        }
        match self.try_enchant(env, mon.id)? {
            EnchantOutcome::Resisted => {
                if env.player_sees_actor(mon) {
                    let text = format!("{} resists.", mon.the_name_cap());
                    self.say(env, Channel::Plain, &text);
                    self.msg_generated = true;
                }
            }
            EnchantOutcome::Unaffected => {
                if env.player_sees_actor(mon) {
                    let text = format!("{} is unaffected.", mon.the_name_cap());
                    self.say(env, Channel::Plain, &text);
                    self.msg_generated = true;
                }
            }
            EnchantOutcome::Affected | EnchantOutcome::Other => self.update_hurt_or_helped(mon),
        }
        self.apply_hit_hooks(mon.id, 0, env.world);
        self.consume_range_on_hit(mon);
        Ok(())
    }

    /// Tallies a hurt or helped target on the side it fights for.
    pub fn update_hurt_or_helped(&mut self, mon: &Actor) {
        let aligned = self.attitude.aligned_with(mon.effective_attitude());
        if self.nasty_to(mon) {
            self.side_for(aligned).hurt += 1;
        } else if self.nice_to(mon) {
            self.side_for(aligned).helped += 1;
        }
    }

    /// A creature's shield may block or reflect the bolt.
    fn attempt_block(&mut self, env: &mut BoltEnv<'_>, mon: &Actor, hit: ToHit) -> bool {
        let Some(shield) = mon.shield else {
            return false;
        };
        if !shield_blocks(hit, shield.block, shield.penalty, &mut env.dice) {
            return false;
        }
        if shield.reflective {
            if env.player_sees_actor(mon) {
                let text = format!(
                    "{} reflects the {} off its shield!",
                    mon.the_name_cap(),
                    self.run.name
                );
                self.say(env, Channel::Plain, &text);
            } else if env.player_sees_cell(mon.position) {
                let text = format!("The {} bounces off of thin air!", self.run.name);
                self.say(env, Channel::Plain, &text);
            }
            self.reflect(env);
        } else {
            if env.player_sees_actor(mon) {
                let text = format!("{} blocks the {}.", mon.the_name_cap(), self.run.name);
                self.say(env, Channel::Plain, &text);
            }
            self.finish();
        }
        true
    }

    /// Turns the bolt back towards its last bounce point or its source.
    pub fn reflect(&mut self, env: &BoltEnv<'_>) {
        self.run.reflections += 1;
        let here = self.pos();
        let target = match self.run.bounce_pos {
            Some(p) if self.run.bounces > 0 && env.world.in_bounds(p) => p,
            _ => self.run.source,
        };
        self.run.reflector = if env.world.player_at(here) {
            Some(EntityId::PLAYER)
        } else {
            env.world.monster_at(here)
        };
        self.run.target = target;
        self.run.source = here;
        self.run.bounce_pos = None;
        self.run.flavour = self.run.real_flavour;
        self.run.ray = Ray::new(here, target);
        tracing::debug!(%here, %target, reflections = self.run.reflections, "reflected");
    }

    fn disintegrate_statue(&mut self, env: &mut BoltEnv<'_>, mon: &Actor) -> Result<(), BoltError> {
        let seen = env.player_sees_cell(mon.position);
        if !player_silenced(env.world) {
            let (channel, text) = if seen {
                (Channel::Plain, "The statue screams as its substance crumbles away!")
            } else {
                (Channel::Sound, "You hear a hideous screaming!")
            };
            self.say(env, channel, text);
        } else if seen {
            self.say(env, Channel::Plain, "The statue twists and shakes as its substance crumbles away!");
        }
        self.obvious_effect = true;
        self.update_hurt_or_helped(mon);
        let instant = mon.hp.current.max(1);
        self.internal_ouch(env, mon.id, instant)?;
        self.apply_hit_hooks(mon.id, instant, env.world);
        self.finish();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::DiceDef;
    use crate::env::{AlwaysNo, AlwaysYes, ConstRng, Dice, MessageLog, Omniscient, Prompter};
    use crate::state::{Feature, Position, Shield, World};

    fn world() -> World {
        let mut world = World::new(12, 5).unwrap();
        world
            .place_player(Actor::new("you", Position::new(1, 2), 40).with_power(10))
            .unwrap();
        world
    }

    fn shoot(
        world: &mut World,
        log: &mut MessageLog,
        prompt: &mut dyn Prompter,
        bolt: &mut Bolt,
    ) -> super::super::Termination {
        let rng = ConstRng(0);
        let config = BeamConfig::default();
        let mut env = BoltEnv::new(world, Dice::new(&rng, 5, 5), &Omniscient, log, prompt, &config);
        bolt.fire(&mut env).unwrap()
    }

    fn magic_dart() -> crate::bolt::BoltBuilder {
        Bolt::builder()
            .name("magic dart")
            .flavour(Flavour::Magic)
            .damage(DiceDef::new(3, 6))
            .hit(ToHit::Automatic)
            .thrower(Thrower::PlayerSpell)
            .source(Position::new(1, 2))
    }

    #[test]
    fn tracers_use_the_dice_mean_and_never_touch_hp() {
        let mut world = world();
        let orc = world.spawn(Actor::new("orc", Position::new(4, 2), 30).with_power(5)).unwrap();
        let mut log = MessageLog::new();
        let mut bolt = magic_dart().target(Position::new(4, 2)).tracer().build();
        shoot(&mut world, &mut log, &mut AlwaysYes, &mut bolt);

        assert_eq!(world.actor(orc).unwrap().hp.current, 30);
        assert_eq!(bolt.foe_info.count, 1);
        // mean 10, no armour: 2 * 10 * 5 / 10
        assert_eq!(bolt.foe_info.power, 10);
        assert!(log.is_empty());
    }

    #[test]
    fn live_hits_record_damage_and_credit() {
        let mut world = world();
        let orc = world.spawn(Actor::new("orc", Position::new(4, 2), 30)).unwrap();
        let mut log = MessageLog::new();
        let mut bolt = magic_dart().target(Position::new(4, 2)).build();
        shoot(&mut world, &mut log, &mut AlwaysYes, &mut bolt);

        let record = world.damage_log().last().unwrap();
        assert_eq!(record.victim, orc);
        assert_eq!(record.attacker, Some(EntityId::PLAYER));
        assert_eq!(record.credit, crate::state::KillCategory::You);
        assert!((3..=18).contains(&record.amount));
        assert!(log.contains("The magic dart hits the orc."));
        assert_eq!(bolt.foe_info.hurt, 1);
    }

    #[test]
    fn declining_to_shoot_a_neutral_cancels() {
        let mut world = world();
        world
            .spawn(
                Actor::new("merchant", Position::new(4, 2), 30)
                    .with_attitude(Attitude::Neutral),
            )
            .unwrap();
        let mut log = MessageLog::new();
        let mut bolt = magic_dart().target(Position::new(4, 2)).tracer().build();
        let stop = shoot(&mut world, &mut log, &mut AlwaysNo, &mut bolt);
        assert_eq!(stop, super::super::Termination::Cancelled);
        assert!(bolt.cancelled);
    }

    #[test]
    fn reflective_shields_turn_bolts_around() {
        let mut world = world();
        let knight = world
            .spawn(Actor::new("knight", Position::new(5, 2), 30).with_shield(Shield {
                block: 1000,
                penalty: 0,
                reflective: true,
            }))
            .unwrap();
        let mut log = MessageLog::new();
        let mut bolt = Bolt::builder()
            .name("bolt of fire")
            .flavour(Flavour::Fire)
            .damage(DiceDef::new(1, 2))
            .hit(ToHit::Value(10))
            .thrower(Thrower::MonsterSpell)
            .source(Position::new(9, 2))
            .target(Position::new(5, 2))
            .build();
        shoot(&mut world, &mut log, &mut AlwaysYes, &mut bolt);

        assert_eq!(bolt.run.reflections, 1);
        assert_eq!(bolt.run.reflector, Some(knight));
        assert_eq!(bolt.run.source, Position::new(5, 2));
        assert_eq!(bolt.run.target, Position::new(9, 2));
        assert!(log.contains("The knight reflects the bolt of fire off its shield!"));
    }

    #[test]
    fn electricity_arcs_into_water_around_submerged_targets() {
        let mut world = world();
        let eel = world
            .spawn(Actor::new("eel", Position::new(4, 2), 20).with_flags(ActorFlags::SUBMERGED))
            .unwrap();
        let mut log = MessageLog::new();
        let mut bolt = magic_dart()
            .name("bolt of lightning")
            .flavour(Flavour::Electricity)
            .beam()
            .target(Position::new(4, 2))
            .aimed_at_spot()
            .build();
        shoot(&mut world, &mut log, &mut AlwaysYes, &mut bolt);

        assert_eq!(world.actor(eel).unwrap().hp.current, 20);
        assert_eq!(bolt.path_taken.last(), Some(&Position::new(4, 2)));
        assert_eq!(bolt.run.bounces, 0);
        assert!(log.contains("The bolt of lightning arcs harmlessly into the water."));
    }

    #[test]
    fn statues_crumble() {
        let mut world = world();
        let statue = world
            .spawn(Actor::new("statue", Position::new(4, 2), 200).with_flags(ActorFlags::STATUE))
            .unwrap();
        let mut log = MessageLog::new();
        let mut bolt = magic_dart()
            .name("disintegration")
            .flavour(Flavour::Disintegration)
            .target(Position::new(4, 2))
            .build();
        shoot(&mut world, &mut log, &mut AlwaysYes, &mut bolt);
        assert!(world.actor(statue).is_none());
        assert!(log.contains("The statue screams as its substance crumbles away!"));
    }

    #[test]
    fn range_cost_per_hit() {
        let dart = magic_dart().build();
        assert_eq!(dart.range_used_on_hit(), BeamConfig::BEAM_STOP);
        let lightning = magic_dart().flavour(Flavour::Electricity).beam().build();
        assert_eq!(lightning.range_used_on_hit(), 0);
        let beam = magic_dart().flavour(Flavour::Fire).beam().build();
        assert_eq!(beam.range_used_on_hit(), 1);
        let tracer = magic_dart().hit(ToHit::Value(5)).tracer().build();
        assert_eq!(tracer.range_used_on_hit(), 1);
    }

    fn plant(world: &mut World, attitude: Attitude) -> EntityId {
        world
            .spawn(
                Actor::new("oklob plant", Position::new(4, 2), 30)
                    .with_holiness(Holiness::Plant)
                    .with_attitude(attitude),
            )
            .unwrap()
    }

    fn caster_bolt(caster: EntityId) -> Bolt {
        Bolt::builder()
            .name("magic dart")
            .flavour(Flavour::Magic)
            .damage(DiceDef::new(3, 6))
            .hit(ToHit::Automatic)
            .thrower(Thrower::MonsterSpell)
            .agent(caster)
            .attitude(Attitude::Hostile)
            .source(Position::new(8, 2))
            .target(Position::new(4, 2))
            .build()
    }

    #[test]
    fn verdant_shields_plants_from_its_own_worshippers() {
        let mut world = World::new(12, 5).unwrap();
        world
            .place_player(
                Actor::new("you", Position::new(1, 2), 40).with_patron(Patron::Verdant),
            )
            .unwrap();
        let friend = plant(&mut world, Attitude::Friendly);
        let mut log = MessageLog::new();
        let mut bolt = magic_dart().target(Position::new(4, 2)).build();
        shoot(&mut world, &mut log, &mut AlwaysYes, &mut bolt);

        assert_eq!(world.actor(friend).unwrap().hp.current, 30);
        assert!(log.contains("Verdant protects your plant from harm."));
    }

    #[test]
    fn verdant_follows_the_caster_not_the_player() {
        let mut world = World::new(12, 5).unwrap();
        world
            .place_player(
                Actor::new("you", Position::new(1, 0), 40).with_patron(Patron::Verdant),
            )
            .unwrap();
        let weed = plant(&mut world, Attitude::Hostile);
        let orc = world.spawn(Actor::new("orc", Position::new(8, 2), 20)).unwrap();
        let mut log = MessageLog::new();
        let mut bolt = caster_bolt(orc);
        shoot(&mut world, &mut log, &mut AlwaysYes, &mut bolt);

        assert!(world.actor(weed).unwrap().hp.current < 30);
        assert!(!log.contains("Verdant protects a plant from harm."));

        let mut world = World::new(12, 5).unwrap();
        world
            .place_player(Actor::new("you", Position::new(1, 0), 40))
            .unwrap();
        let weed = plant(&mut world, Attitude::Hostile);
        let druid = world
            .spawn(Actor::new("druid", Position::new(8, 2), 20).with_patron(Patron::Verdant))
            .unwrap();
        let mut log = MessageLog::new();
        let mut bolt = caster_bolt(druid);
        shoot(&mut world, &mut log, &mut AlwaysYes, &mut bolt);

        assert_eq!(world.actor(weed).unwrap().hp.current, 30);
        assert!(log.contains("Verdant protects a plant from harm."));
    }

    fn chatty(_: &Bolt, _: &Actor, _: &mut i32, messages: &mut Vec<String>) -> bool {
        messages.push("The air crackles.".to_string());
        false
    }

    #[test]
    fn tracers_keep_damage_hook_text_to_themselves() {
        let mut world = world();
        let orc = world.spawn(Actor::new("orc", Position::new(4, 2), 30)).unwrap();
        world.spawn(Actor::new("goblin", Position::new(6, 2), 12)).unwrap();
        let before = world.clone();
        let mut log = MessageLog::new();

        let mut player_shot = magic_dart()
            .target(Position::new(8, 2))
            .beam()
            .hooks(crate::bolt::Hooks::default().on_damage(chatty))
            .tracer()
            .build();
        shoot(&mut world, &mut log, &mut AlwaysYes, &mut player_shot);
        assert_eq!(player_shot.foe_info.count, 2);

        let mut monster_shot = Bolt::builder()
            .name("magic dart")
            .flavour(Flavour::Magic)
            .damage(DiceDef::new(3, 6))
            .hit(ToHit::Automatic)
            .thrower(Thrower::MonsterSpell)
            .agent(orc)
            .source(Position::new(4, 2))
            .target(Position::new(1, 2))
            .hooks(crate::bolt::Hooks::default().on_damage(chatty))
            .tracer()
            .build();
        shoot(&mut world, &mut log, &mut AlwaysYes, &mut monster_shot);
        assert_eq!(monster_shot.foe_info.count + monster_shot.friend_info.count, 1);

        assert!(log.is_empty(), "tracer spoke: {:?}", log.entries());
        assert_eq!(world, before);

        let mut live = magic_dart()
            .target(Position::new(4, 2))
            .hooks(crate::bolt::Hooks::default().on_damage(chatty))
            .build();
        shoot(&mut world, &mut log, &mut AlwaysYes, &mut live);
        assert!(log.contains("The air crackles."));
    }

    #[test]
    fn reflection_after_a_bounce_returns_to_the_bounce_point() {
        let mut world = world();
        world.set_feature(Position::new(7, 2), Feature::RockWall).unwrap();
        let mut log = MessageLog::new();
        let mut bolt = magic_dart()
            .name("lightning bolt")
            .flavour(Flavour::Electricity)
            .target(Position::new(10, 2))
            .range(8)
            .beam()
            .build();
        shoot(&mut world, &mut log, &mut AlwaysYes, &mut bolt);
        assert_eq!(bolt.run.bounces, 1);
        let bounce_pos = bolt.run.bounce_pos.unwrap();
        let here = bolt.pos();

        let rng = ConstRng(0);
        let config = BeamConfig::default();
        let mut prompt = AlwaysYes;
        let env = BoltEnv::new(&mut world, Dice::new(&rng, 5, 6), &Omniscient, &mut log, &mut prompt, &config);
        bolt.reflect(&env);

        assert_eq!(bolt.run.reflections, 1);
        assert_eq!(bolt.run.target, bounce_pos);
        assert_eq!(bolt.run.source, here);
        assert_eq!(bolt.run.bounce_pos, None);
        assert_ne!(bolt.run.target, Position::new(1, 2));
    }
}
