//! Propagation: the per-cell loop, walls, bounces, ground, and endpoints.

use super::{Bolt, BoltError, Flavour, NeighborMask, Ray, Termination, a_noun, a_noun_cap};
use crate::config::BeamConfig;
use crate::env::{AttackTraits, BoltEnv, Channel, CloudSpec};
use crate::error::ErrorContext;
use crate::state::{
    Actor, ActorFlags, Attitude, CloudKind, Feature, Holiness, KillCategory, Position, World,
};

/// Name given to the creature a spore blast can seed.
pub const SPORE_FUNGUS: &str = "ballistomycete";
/// Name given to the creature a firestorm can summon.
pub const FIRE_VORTEX: &str = "fire vortex";

/// Whether nobody is around to hear, or the player stands in silence.
pub(crate) fn player_silenced(world: &World) -> bool {
    world.player().is_none_or(|p| world.is_silenced(p.position))
}

impl Bolt {
    /// Fires the bolt.
    ///
    /// In tracer mode the run state and the dice stream are restored
    /// afterwards, so the same bolt can be fired live next. A special
    /// explosion is fired in the same mode and its outcome merged in.
    pub fn fire(&mut self, env: &mut BoltEnv<'_>) -> Result<Termination, BoltError> {
        let span = tracing::debug_span!(
            "bolt.fire",
            name = %self.run.name,
            flavour = %self.run.flavour,
            tracer = self.is_tracer,
        );
        let _enter = span.enter();

        self.path_taken.clear();
        if let Some(special) = self.special_explosion.as_mut() {
            special.is_tracer = self.is_tracer;
        }

        let result = if self.is_tracer {
            let saved = self.run.clone();
            let saved_special = self.special_explosion.as_ref().map(|b| b.run.clone());
            let cursor = env.dice.cursor();

            let result = self.do_fire(env);

            env.dice.rewind(cursor);
            self.run = saved;
            if let (Some(special), Some(run)) = (self.special_explosion.as_mut(), saved_special) {
                special.run = run;
            }
            result
        } else {
            self.do_fire(env)
        };

        if let Some(special) = self.special_explosion.as_deref() {
            self.seen |= special.seen;
            self.heard |= special.heard;
            self.cancelled |= special.cancelled;
            self.foe_info += special.foe_info;
            self.friend_info += special.friend_info;
        }

        let termination = result?;
        self.termination = Some(termination);
        tracing::debug!(
            ?termination,
            cells = self.path_taken.len(),
            foes = self.foe_info.count,
            friends = self.friend_info.count,
            "bolt finished"
        );
        Ok(termination)
    }

    fn error_context(&self, env: &BoltEnv<'_>) -> ErrorContext {
        let context = ErrorContext::new(env.dice.shot()).with_position(self.pos());
        match self.killer() {
            Some(id) => context.with_actor(id),
            None => context,
        }
    }

    /// Resets per-run state and validates the configuration.
    pub(crate) fn initialise_fire(&mut self, env: &mut BoltEnv<'_>) -> Result<(), BoltError> {
        self.run.range_used = 0;
        self.run.stopped_by_wall = false;
        self.run.in_explosion_phase = false;
        self.run.use_target_as_pos = false;
        if let Some(special) = self.special_explosion.as_mut() {
            special.run.in_explosion_phase = false;
            special.run.use_target_as_pos = false;
        }

        if self.run.target == self.run.source {
            self.run.range = 0;
            self.run.aimed_at_feet = true;
            self.run.auto_hit = true;
            self.run.aimed_at_spot = true;
            self.run.use_target_as_pos = true;
        }
        if self.run.range == -1 {
            self.run.range = env.config.default_range;
        }

        if self.run.range < 0 {
            return Err(BoltError::NegativeRange {
                range: self.run.range,
                context: self.error_context(env),
            });
        }
        if !env.world.in_bounds(self.run.source) {
            return Err(BoltError::SourceOutOfBounds {
                context: self.error_context(env).with_position(self.run.source),
            });
        }
        if self.run.flavour.is_potion() && !self.is_explosion {
            return Err(BoltError::invalid_flavour(self.run.flavour, env.dice.shot()));
        }

        self.run.real_flavour = self.run.flavour;
        self.clear_message_cache();

        let source = self.run.source;
        if !self.seen && env.player_sees_cell(source) && self.run.range > 0 && !self.invisible() {
            self.seen = true;
            let hidden_caster = env
                .world
                .monster_at(source)
                .and_then(|id| env.world.actor(id))
                .is_none_or(|mon| !env.player_sees_actor(mon));
            if self.run.flavour != Flavour::Visual && !self.thrower.is_player() && hidden_caster {
                let text = format!("{} appears from out of thin air!", a_noun_cap(&self.run.name));
                self.say(env, Channel::Plain, &text);
            }
        }
        if env.player_sees_cell(source) && self.run.target == source && !self.invisible() {
            self.seen = true;
        }

        tracing::trace!(
            source = %self.run.source,
            target = %self.run.target,
            range = self.run.range,
            "initialised"
        );
        Ok(())
    }

    fn do_fire(&mut self, env: &mut BoltEnv<'_>) -> Result<Termination, BoltError> {
        self.initialise_fire(env)?;

        if self.run.range == 0 && !self.run.aimed_at_feet {
            tracing::debug!("no range to spend");
            return Ok(Termination::RangeExhausted);
        }

        let mut avoid_self =
            !self.run.aimed_at_feet && (!self.is_explosion || !self.run.in_explosion_phase);
        self.msg_generated = false;
        if !self.run.aimed_at_feet {
            self.run.ray = Ray::new(self.run.source, self.run.target);
        }

        let mut termination = Termination::MapEdge;
        while env.world.in_bounds(self.pos()) {
            self.path_taken.push(self.pos());

            let mut walled = false;
            if !self.affects_nothing {
                walled = self.affect_cell(env, avoid_self)?;
            }
            if !avoid_self {
                self.spend_range(1);
            }

            if self.cancelled {
                return Ok(Termination::Cancelled);
            }
            if self.run.is_finished() {
                termination = if walled || self.run.stopped_by_wall {
                    Termination::WallStop
                } else {
                    Termination::RangeExhausted
                };
                break;
            }

            if self.pos() == self.run.target {
                self.run.passed_target = true;
                if self.stop_at_target() {
                    termination = Termination::ReachedTarget;
                    break;
                }
            }

            let was_seen = self.seen;
            if !was_seen && !self.invisible() && env.player_sees_cell(self.pos()) {
                self.seen = true;
                if self.run.flavour != Flavour::Visual {
                    let text = format!(
                        "{} appears from out of your range of vision.",
                        a_noun_cap(&self.run.name)
                    );
                    self.say(env, Channel::Plain, &text);
                }
            }

            if self.run.real_flavour == Flavour::Chaos {
                self.run.flavour = self.run.real_flavour;
            }

            self.run.ray.advance();
            avoid_self = false;
        }

        if !env.world.in_bounds(self.pos()) {
            let mut tries = env.world.width().max(env.world.height());
            while !env.world.in_bounds(self.pos()) && tries > 0 && self.run.ray.regress() {
                tries -= 1;
            }
            if !env.world.in_bounds(self.pos()) {
                return Err(BoltError::UnrecoverableEndpoint {
                    context: self.error_context(env),
                });
            }
            tracing::debug!(pos = %self.pos(), "walked back onto the map");
        }

        if !self.affects_nothing {
            self.affect_endpoint(env)?;
        }

        if self.is_tracer || self.affects_nothing {
            return Ok(termination);
        }

        if !self.msg_generated
            && !self.obvious_effect
            && self.run.flavour.is_enchantment()
            && self.run.real_flavour != Flavour::Chaos
            && self.thrower.is_player()
        {
            self.say(env, Channel::Plain, "Nothing appears to happen.");
        }
        Ok(termination)
    }

    /// Explosions, big clouds, and spot-aimed bolts stop at their target.
    pub fn stop_at_target(&self) -> bool {
        self.is_explosion || self.is_big_cloud || self.run.aimed_at_spot
    }

    /// Rerolls random flavours for the current cell.
    pub(crate) fn fake_flavour(&mut self, env: &mut BoltEnv<'_>) {
        match self.run.real_flavour {
            Flavour::Random => self.run.flavour = Flavour::random_pick(&mut env.dice),
            Flavour::Chaos => self.run.flavour = Flavour::chaos_pick(&mut env.dice),
            _ => {}
        }
    }

    /// Resolves everything at the current cell.
    ///
    /// Returns true if a wall stopped the bolt here.
    pub(crate) fn affect_cell(
        &mut self,
        env: &mut BoltEnv<'_>,
        avoid_self: bool,
    ) -> Result<bool, BoltError> {
        if env.world.cloud_at(self.pos()).is_some() {
            self.run.hit = self.run.hit.reduced(BeamConfig::CLOUD_TOHIT_PENALTY);
        }
        self.fake_flavour(env);

        let old_pos = self.pos();
        let was_solid = env.world.is_solid(old_pos);
        let avoid_player = avoid_self && self.thrower.is_player();
        let avoid_monster = avoid_self && self.thrower.is_monster();

        if was_solid {
            if let Some(id) = env.world.monster_at(old_pos)
                && !avoid_monster
            {
                let feature = env.world.feature(old_pos);
                let shielded = env
                    .world
                    .actor(id)
                    .is_some_and(|mon| !self.can_affect_wall_monster(mon, feature));
                if shielded {
                    if let Some(mon) = env.world.actor(id)
                        && env.player_sees_actor(mon)
                    {
                        let text = format!(
                            "The {} protects {} from harm.",
                            feature.describe(),
                            mon.the_name()
                        );
                        self.say(env, Channel::Plain, &text);
                    }
                } else {
                    self.affect_monster(env, id)?;
                }
            }
            if self.hit_wall(env)? {
                return Ok(true);
            }
        }

        let still_wall = was_solid && old_pos == self.pos();

        let mut hit_player = false;
        if self.found_player(env) && !avoid_player {
            self.affect_player(env)?;
            hit_player = true;
        }

        if (!hit_player || self.is_beam || self.is_explosion) && !still_wall && !avoid_monster {
            if let Some(id) = env.world.monster_at(self.pos()) {
                self.affect_monster(env, id)?;
            }
        }

        if !env.world.is_solid(self.pos()) {
            self.affect_ground(env)?;
        }
        Ok(false)
    }

    /// Whether a creature inside solid terrain can be struck.
    pub fn can_affect_wall_monster(&self, mon: &Actor, feature: Feature) -> bool {
        if self.run.flavour.is_enchantment() {
            return true;
        }
        let grounded = feature == Feature::MetalWall && self.run.flavour == Flavour::Electricity;
        if mon.flags.contains(ActorFlags::WALL_SHIELDED) && !grounded {
            return false;
        }
        !self.is_explosion && !self.is_big_cloud
    }

    /// Whether the current flavour acts on `feature` rather than stopping.
    pub fn affects_wall(&self, feature: Feature) -> bool {
        match self.run.flavour {
            Flavour::Digging | Flavour::Nuke | Flavour::Frag => true,
            Flavour::Disintegration => self.run.damage.num >= 3,
            f if f.is_fiery() => matches!(feature, Feature::WaxWall | Feature::Trees),
            _ => false,
        }
    }

    /// Whether the bolt bounces off `feature`.
    pub fn is_bouncy(&self, feature: Feature) -> bool {
        if self.run.real_flavour == Flavour::Chaos && feature.is_solid() {
            return true;
        }
        if self.run.flavour.is_enchantment() {
            return false;
        }
        self.run.flavour.props().bounce.bounces_off(feature)
    }

    /// Handles the bolt entering solid terrain.
    ///
    /// Returns true if the bolt stopped here.
    fn hit_wall(&mut self, env: &mut BoltEnv<'_>) -> Result<bool, BoltError> {
        let pos = self.pos();
        let feature = env.world.feature(pos);
        let target = self.run.target;

        if self.is_tracer
            && self.thrower.is_player()
            && env.world.in_bounds(target)
            && !self.run.passed_target
            && pos != target
            && pos != self.run.source
            && self.foe_info.count == 0
            && self.run.flavour != Flavour::Digging
            && self.run.bounces == 0
            && self.run.reflections == 0
            && env.player_sees_cell(target)
            && !env.world.is_solid(target)
        {
            let aimed_at = match env.world.monster_at(target).and_then(|id| env.world.actor(id)) {
                Some(mon) if env.player_sees_actor(mon) => mon.the_name(),
                _ => format!("the targeted {}", env.world.feature(target).describe()),
            };
            let question = format!(
                "Your line of fire to {aimed_at} is blocked by {}. Continue anyway?",
                a_noun(feature.describe())
            );
            if !env.ask(&question) {
                self.cancelled = true;
                self.finish();
                return Ok(false);
            }
        }

        if self.affects_wall(feature) {
            self.affect_wall(env)?;
        } else if self.is_bouncy(feature) && !self.run.in_explosion_phase {
            self.bounce(env);
        } else {
            let source = self.run.source;
            if pos != source
                && ((self.is_explosion && !self.run.in_explosion_phase) || self.drop_item.is_some())
            {
                while self.run.ray.regress() {
                    let back = self.run.ray.pos();
                    if back == source || !env.world.is_solid(back) {
                        break;
                    }
                }
                if self.is_explosion && !self.is_tracer {
                    self.run.target = self.run.ray.pos();
                }
            }
            self.finish();
            return Ok(true);
        }
        Ok(false)
    }

    fn affect_wall(&mut self, env: &mut BoltEnv<'_>) -> Result<(), BoltError> {
        if self.is_tracer {
            return Ok(());
        }
        match self.run.flavour {
            Flavour::Digging => self.digging_wall_effect(env)?,
            f if f.is_fiery() => self.fire_wall_effect(env)?,
            Flavour::Disintegration | Flavour::Nuke => self.nuke_wall_effect(env)?,
            _ => {}
        }
        if env.world.is_solid(self.pos()) {
            self.finish();
        }
        if self.run.is_finished() {
            self.run.stopped_by_wall = true;
        }
        Ok(())
    }

    fn digging_wall_effect(&mut self, env: &mut BoltEnv<'_>) -> Result<(), BoltError> {
        let pos = self.pos();
        let feature = env.world.feature(pos);
        if feature.is_diggable() {
            env.world.set_feature(pos, Feature::Floor)?;
            tracing::debug!(%pos, "dug through");
            if !self.msg_generated {
                if !player_silenced(env.world) {
                    self.say(env, Channel::Sound, "You hear a grinding noise.");
                    self.obvious_effect = true;
                }
                self.msg_generated = true;
            }
        } else if feature.is_wall() {
            self.finish();
        }
        Ok(())
    }

    fn fire_wall_effect(&mut self, env: &mut BoltEnv<'_>) -> Result<(), BoltError> {
        let pos = self.pos();
        let feature = env.world.feature(pos);
        if !feature.is_flammable() {
            self.finish();
            return Ok(());
        }

        let seen = env.player_sees_cell(pos);
        let can_smell = env.world.player().is_some();
        let owner = self.killer();

        if feature == Feature::WaxWall {
            if !self.is_superhot() {
                if self.run.flavour != Flavour::Hellfire {
                    if seen {
                        self.emit_message(env, Channel::Plain, "The wax appears to soften slightly.");
                    } else if can_smell {
                        self.emit_message(env, Channel::Plain, "You smell warm wax.");
                    }
                }
            } else {
                env.world.set_feature(pos, Feature::Floor)?;
                if seen {
                    self.emit_message(env, Channel::Plain, "The wax bubbles and burns!");
                } else if can_smell {
                    self.emit_message(env, Channel::Plain, "You smell burning wax.");
                }
                let duration = env.dice.random2(10) + 15;
                env.world.place_cloud(pos, CloudKind::Fire, duration, owner);
                self.obvious_effect = true;
            }
        } else if self.is_superhot() {
            env.world.set_feature(pos, Feature::Floor)?;
            if seen {
                self.emit_message(env, Channel::Plain, "The tree burns like a torch!");
            } else if can_smell {
                self.emit_message(env, Channel::Plain, "You smell burning wood.");
            }
            let duration = env.dice.random2(30) + 25;
            env.world.place_cloud(pos, CloudKind::ForestFire, duration, owner);
            self.obvious_effect = true;
        }

        self.finish();
        Ok(())
    }

    fn nuke_wall_effect(&mut self, env: &mut BoltEnv<'_>) -> Result<(), BoltError> {
        let pos = self.pos();
        let feature = env.world.feature(pos);
        let hear = env.world.player_can_hear(pos, BeamConfig::LOS_RADIUS);
        let seen = env.player_sees_cell(pos);

        if feature.is_disintegrable() {
            env.world.set_feature(pos, Feature::Floor)?;
            if hear {
                self.emit_message(env, Channel::Sound, "You hear a grinding noise.");
                self.obvious_effect = true;
            }
        } else if feature == Feature::OrcishIdol {
            env.world.set_feature(pos, Feature::Floor)?;
            if hear {
                let text = if seen {
                    "The idol screams as its substance crumbles away!"
                } else {
                    "You hear a hideous screaming!"
                };
                self.emit_message(env, Channel::Sound, text);
            } else if seen {
                self.emit_message(
                    env,
                    Channel::Plain,
                    "The idol twists and shakes as its substance crumbles away!",
                );
            }
            self.obvious_effect = true;
        }

        self.finish();
        Ok(())
    }

    /// Steps back out of the wall and turns the ray around.
    fn bounce(&mut self, env: &mut BoltEnv<'_>) {
        let old_ray = self.run.ray;
        let old_range_used = self.run.range_used;

        while self.run.ray.regress() {
            if !env.world.is_solid(self.run.ray.pos()) {
                break;
            }
        }
        let here = self.run.ray.pos();
        self.run.bounce_pos = Some(here);

        let mask = NeighborMask::from_fn(|offset| env.world.is_solid(here + offset));
        self.run.ray.bounce(mask);
        self.spend_range(BeamConfig::BOUNCE_RANGE_COST);
        self.run.bounces += 1;
        tracing::debug!(%here, bounces = self.run.bounces, "bounced");

        if self.run.real_flavour == Flavour::Chaos {
            self.perturb_chaos_bounce(env, old_ray, old_range_used);
        }
    }

    /// Chaos bounces head off at a random angle and cost no range.
    fn perturb_chaos_bounce(&mut self, env: &mut BoltEnv<'_>, old_ray: Ray, old_range_used: i32) {
        let old_deg = old_ray.degrees();
        let new_deg = self.run.ray.degrees();
        let mut angle = (old_deg - new_deg).abs();
        if angle >= 180.0 {
            angle -= 180.0;
        }
        let max = 90.0 + angle / 2.0;
        let min = -90.0 + angle / 2.0;

        let base = self.run.ray;
        let mut chosen = None;
        for _ in 0..BeamConfig::BOUNCE_PERTURB_RETRIES {
            let lo = (min * 10_000.0) as i32;
            let hi = (max * 10_000.0) as i32;
            let mut shift = f64::from(env.dice.random_range(lo, hi)) / 10_000.0;
            if new_deg < old_deg {
                shift = -shift;
            }
            let mut candidate = base;
            candidate.set_degrees(new_deg + shift);
            let next = candidate.peek();
            if env.world.in_bounds(next) && !env.world.is_solid(next) {
                chosen = Some(candidate);
                break;
            }
        }
        match chosen {
            Some(ray) => self.run.ray = ray,
            None => tracing::warn!(
                pos = %self.pos(),
                "chaos bounce found no open heading, keeping the plain bounce"
            ),
        }

        let spent = self.run.range_used - old_range_used;
        self.run.range += spent;
    }

    /// Whether the player counts as being on the current cell.
    ///
    /// A creature's tracer that cannot see an invisible player guesses within
    /// the fuzz radius.
    pub(crate) fn found_player(&self, env: &BoltEnv<'_>) -> bool {
        let Some(player) = env.world.player() else {
            return false;
        };
        let fuzzy = self.is_tracer
            && !self.can_see_invis
            && player.invisible()
            && !self.thrower.is_player();
        let radius = if fuzzy { env.config.invisible_fuzz_radius } else { 0 };
        self.pos().distance(player.position) <= radius
    }

    fn affect_ground(&mut self, env: &mut BoltEnv<'_>) -> Result<(), BoltError> {
        if self.is_explosion && !self.run.in_explosion_phase {
            return Ok(());
        }
        if self.is_tracer {
            return Ok(());
        }

        let pos = self.pos();
        let (x, y) = BeamConfig::SPORE_CHANCE;
        if self.is_explosion
            && self.run.flavour == Flavour::Spore
            && env.dice.x_chance_in_y(x as i32, y as i32)
        {
            let feature = env.world.feature(pos);
            let passable = !feature.is_solid() && !matches!(feature, Feature::DeepWater | Feature::Lava);
            if passable && !env.world.is_occupied(pos) {
                self.seed_fungus(env, pos)?;
            }
        }

        self.affect_place_clouds(env)
    }

    fn seed_fungus(&mut self, env: &mut BoltEnv<'_>, pos: Position) -> Result<(), BoltError> {
        let attitude = match self.attitude {
            Attitude::Neutral => Attitude::Neutral,
            Attitude::Friendly | Attitude::GoodNeutral => Attitude::GoodNeutral,
            Attitude::Hostile => Attitude::Hostile,
        };
        let fungus = Actor::new(SPORE_FUNGUS, pos, 10)
            .with_attitude(attitude)
            .with_holiness(Holiness::Plant)
            .with_power(4)
            .with_flags(ActorFlags::FUNGAL | ActorFlags::STATIONARY);
        let id = env.world.spawn(fungus)?;
        tracing::debug!(%pos, %id, "fungus seeded");
        if env.player_sees_cell(pos) {
            self.say(env, Channel::Plain, "A fungus suddenly grows.");
        }
        Ok(())
    }

    fn place_cloud_spec(&mut self, env: &mut BoltEnv<'_>, spec: CloudSpec, pos: Position) {
        let duration = env.dice.random_range(spec.min_duration, spec.max_duration);
        let owner = self.killer();
        if spec.size > 1 {
            env.world.place_big_cloud(pos, spec.kind, duration, spec.size, owner);
        } else {
            env.world.place_cloud(pos, spec.kind, duration, owner);
        }
    }

    fn affect_place_clouds(&mut self, env: &mut BoltEnv<'_>) -> Result<(), BoltError> {
        if self.run.in_explosion_phase {
            self.affect_place_explosion_clouds(env)?;
        }

        let pos = self.pos();
        let owner = self.killer();
        let flavour = self.run.flavour;

        if let Some(cloud) = env.world.cloud_at(pos).copied() {
            if flavour == Flavour::Polymorph {
                let new_kind = cloud.kind.polymorphed();
                if let Some(existing) = env.world.cloud_mut(pos) {
                    existing.kind = new_kind;
                }
                if env.world.player_at(pos) {
                    let text = format!(
                        "The {} you are in turns into {}!",
                        cloud.kind.describe(),
                        new_kind.describe()
                    );
                    self.say(env, Channel::Plain, &text);
                    self.obvious_effect = true;
                } else if env.player_sees_cell(pos) {
                    let text = format!(
                        "A cloud of {} turns into {}.",
                        cloud.kind.describe(),
                        new_kind.describe()
                    );
                    self.say(env, Channel::Plain, &text);
                    self.obvious_effect = true;
                }
                return Ok(());
            }

            let cancels = (cloud.kind.is_cold() && matches!(flavour, Flavour::Fire | Flavour::Lava))
                || (cloud.kind == CloudKind::Fire && flavour == Flavour::Cold);
            if cancels {
                if env.world.player_can_hear(pos, BeamConfig::LOS_RADIUS) {
                    self.say(env, Channel::Sound, "You hear a sizzling sound!");
                }
                env.world.remove_cloud(pos);
                self.spend_range(BeamConfig::CLOUD_CANCEL_RANGE_COST);
            }
            return Ok(());
        }

        let feature = env.world.feature(pos);
        if (feature == Feature::Lava && flavour == Flavour::Cold)
            || (feature.is_watery() && flavour.is_fiery())
        {
            let duration = 2 + env.dice.random2(5);
            env.world.place_cloud(pos, CloudKind::Steam, duration, owner);
        }

        let weight = self.run.damage.num * self.run.damage.size;
        if feature.is_watery() && flavour == Flavour::Cold && weight > 35 {
            env.world.place_cloud(pos, CloudKind::Cold, weight / 30 + 1, owner);
        }

        if let Some(spec) = self.trail_cloud {
            self.place_cloud_spec(env, spec, pos);
        }

        if flavour == Flavour::Miasma {
            let duration = 2 + env.dice.random2(5);
            env.world.place_cloud(pos, CloudKind::Miasma, duration, owner);
        }
        Ok(())
    }

    fn affect_place_explosion_clouds(&mut self, env: &mut BoltEnv<'_>) -> Result<(), BoltError> {
        let pos = self.pos();
        let owner = self.killer();
        let feature = env.world.feature(pos);
        let flavour = self.run.flavour;

        if (feature == Feature::Lava && flavour == Flavour::Cold)
            || (feature.is_watery() && flavour.is_fiery())
        {
            let duration = 2 + env.dice.random2(5);
            env.world.place_cloud(pos, CloudKind::Steam, duration, owner);
            return Ok(());
        }

        if let Some(kind) = flavour.potion_cloud() {
            let duration = env.dice.roll_dice(2, 3 + self.ench_power / 20);
            env.world.place_cloud(pos, kind, duration, owner);
        }

        if let Some(spec) = self.explosion_cloud {
            let mut duration = env.dice.random_range(spec.min_duration, spec.max_duration);
            if spec.kind.is_fiery() && duration > 20 {
                duration = 20 + env.dice.random2(4);
            }
            env.world.place_cloud(pos, spec.kind, duration, owner);
        }

        if self.traits.contains(AttackTraits::SUMMONS_VORTEX)
            && feature == Feature::Floor
            && env.world.monster_at(pos).is_none()
            && env.dice.one_chance_in(4)
        {
            let attitude = match self.whose_kill(env.world) {
                KillCategory::Other => Attitude::Hostile,
                _ => Attitude::Friendly,
            };
            let vortex = Actor::new(FIRE_VORTEX, pos, 12)
                .with_attitude(attitude)
                .with_holiness(Holiness::Nonliving)
                .with_power(3)
                .with_flags(ActorFlags::SUMMONED);
            let id = env.world.spawn(vortex)?;
            tracing::debug!(%pos, %id, "vortex summoned");
        }
        Ok(())
    }

    /// Endpoint effects: special explosions, dropped items, explosions, and
    /// endpoint clouds.
    fn affect_endpoint(&mut self, env: &mut BoltEnv<'_>) -> Result<(), BoltError> {
        let pos = self.pos();

        if let Some(mut special) = self.special_explosion.take() {
            special.run.target = pos;
            special.refine_for_explosion(env);
            let exploded = special.explode(env);
            self.special_explosion = Some(special);
            exploded?;
        }

        if let Some(item) = self.drop_item.clone()
            && !self.is_tracer
            && self.thrower.is_missile()
            && !env.world.is_solid(pos)
        {
            env.world.drop_item(pos, item)?;
        }

        if self.is_explosion {
            self.run.target = pos;
            self.refine_for_explosion(env);
            self.explode(env)?;
            return Ok(());
        }

        if self.is_tracer {
            return Ok(());
        }

        if self.traits.contains(AttackTraits::SECRETLY_EXPLOSIVE) {
            self.run.target = pos;
            self.refine_for_explosion(env);
            self.explode(env)?;
        }

        if let Some(spec) = self.endpoint_cloud {
            self.place_cloud_spec(env, spec, pos);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{DiceDef, ToHit};
    use crate::env::{AlwaysNo, AlwaysYes, ConstRng, Dice, MessageLog, Omniscient, Prompter};
    use crate::bolt::Thrower;

    struct Rig {
        world: World,
        log: MessageLog,
        config: BeamConfig,
    }

    impl Rig {
        fn new(width: i32, height: i32) -> Self {
            let mut world = World::new(width, height).unwrap();
            world
                .place_player(Actor::new("you", Position::new(0, 0), 30))
                .unwrap();
            Self {
                world,
                log: MessageLog::new(),
                config: BeamConfig::default(),
            }
        }

        fn fire(&mut self, bolt: &mut Bolt, prompt: &mut dyn Prompter) -> Termination {
            let rng = ConstRng(0);
            let mut env = BoltEnv::new(
                &mut self.world,
                Dice::new(&rng, 1, 1),
                &Omniscient,
                &mut self.log,
                prompt,
                &self.config,
            );
            bolt.fire(&mut env).unwrap()
        }
    }

    fn line(from: Position, to: Position) -> crate::bolt::BoltBuilder {
        Bolt::builder()
            .name("bolt of magic")
            .flavour(Flavour::Magic)
            .damage(DiceDef::new(1, 1))
            .hit(ToHit::Automatic)
            .source(from)
            .target(to)
    }

    #[test]
    fn path_runs_until_range_is_spent() {
        let mut rig = Rig::new(12, 3);
        let mut bolt = line(Position::new(1, 1), Position::new(5, 1)).range(4).build();
        let stop = rig.fire(&mut bolt, &mut AlwaysYes);
        assert_eq!(stop, Termination::RangeExhausted);
        assert_eq!(bolt.path_taken.first(), Some(&Position::new(1, 1)));
        assert_eq!(bolt.path_taken.last(), Some(&Position::new(5, 1)));
        assert_eq!(bolt.run.range_used, 4);
    }

    #[test]
    fn plain_walls_stop_the_bolt() {
        let mut rig = Rig::new(12, 3);
        rig.world.set_feature(Position::new(4, 1), Feature::RockWall).unwrap();
        let mut bolt = line(Position::new(1, 1), Position::new(9, 1)).build();
        let stop = rig.fire(&mut bolt, &mut AlwaysYes);
        assert_eq!(stop, Termination::WallStop);
        assert_eq!(bolt.path_taken.last(), Some(&Position::new(4, 1)));
    }

    #[test]
    fn lightning_bounces_off_rock() {
        let mut rig = Rig::new(12, 3);
        rig.world.set_feature(Position::new(5, 1), Feature::RockWall).unwrap();
        let mut bolt = line(Position::new(1, 1), Position::new(9, 1))
            .flavour(Flavour::Electricity)
            .range(8)
            .beam()
            .build();
        rig.fire(&mut bolt, &mut AlwaysYes);
        assert_eq!(bolt.run.bounces, 1);
        assert_eq!(bolt.run.bounce_pos, Some(Position::new(4, 1)));
        assert!(bolt.path_taken.iter().skip(5).all(|p| p.x < 5));
    }

    #[test]
    fn digging_opens_rock_and_is_heard() {
        let mut rig = Rig::new(12, 3);
        rig.world.add_silence(Position::new(0, 0));
        rig.world.set_feature(Position::new(3, 1), Feature::RockWall).unwrap();
        let mut bolt = line(Position::new(1, 1), Position::new(6, 1))
            .flavour(Flavour::Digging)
            .thrower(Thrower::PlayerSpell)
            .range(5)
            .build();
        rig.fire(&mut bolt, &mut AlwaysYes);
        assert_eq!(rig.world.feature(Position::new(3, 1)), Feature::Floor);
        assert!(!rig.log.contains("You hear a grinding noise."));
    }

    #[test]
    fn superhot_fire_burns_trees_once_per_message() {
        let mut rig = Rig::new(12, 3);
        for x in 3..5 {
            rig.world.set_feature(Position::new(x, 1), Feature::Trees).unwrap();
        }
        let mut bolt = line(Position::new(1, 1), Position::new(8, 1))
            .flavour(Flavour::Fire)
            .traits(AttackTraits::SUPERHOT)
            .build();
        let stop = rig.fire(&mut bolt, &mut AlwaysYes);
        assert_eq!(stop, Termination::WallStop);
        assert_eq!(rig.world.feature(Position::new(3, 1)), Feature::Floor);
        assert_eq!(rig.world.feature(Position::new(4, 1)), Feature::Trees);
        assert_eq!(
            rig.world.cloud_at(Position::new(3, 1)).map(|c| c.kind),
            Some(CloudKind::ForestFire)
        );
        assert!(bolt.obvious_effect);
    }

    #[test]
    fn wax_stops_ordinary_fire() {
        let mut rig = Rig::new(12, 3);
        rig.world.set_feature(Position::new(4, 1), Feature::WaxWall).unwrap();
        let mut bolt = line(Position::new(1, 1), Position::new(8, 1))
            .name("bolt of fire")
            .flavour(Flavour::Fire)
            .build();
        let stop = rig.fire(&mut bolt, &mut AlwaysYes);
        assert_eq!(stop, Termination::WallStop);
        assert_eq!(rig.world.feature(Position::new(4, 1)), Feature::WaxWall);
        assert_eq!(bolt.path_taken.last(), Some(&Position::new(4, 1)));
        assert_eq!(rig.log.count("The wax appears to soften slightly."), 1);
    }

    #[test]
    fn declining_the_wall_prompt_cancels() {
        let mut rig = Rig::new(12, 3);
        rig.world.set_feature(Position::new(3, 1), Feature::RockWall).unwrap();
        let mut bolt = line(Position::new(1, 1), Position::new(6, 1))
            .thrower(Thrower::PlayerSpell)
            .tracer()
            .build();
        let stop = rig.fire(&mut bolt, &mut AlwaysNo);
        assert_eq!(stop, Termination::Cancelled);
        assert!(bolt.cancelled);
        assert!(rig.log.is_empty());
    }

    #[test]
    fn aimed_at_feet_affects_only_its_own_cell() {
        let mut rig = Rig::new(5, 5);
        let mut bolt = line(Position::new(2, 2), Position::new(2, 2)).range(6).build();
        rig.fire(&mut bolt, &mut AlwaysYes);
        assert_eq!(bolt.path_taken, vec![Position::new(2, 2)]);
        assert!(bolt.run.aimed_at_feet);
        assert_eq!(bolt.run.range, 0);
    }

    #[test]
    fn potion_flavours_need_an_explosion() {
        let mut world = World::new(5, 5).unwrap();
        let rng = ConstRng(0);
        let mut log = MessageLog::new();
        let config = BeamConfig::default();
        let mut yes = AlwaysYes;
        let mut env = BoltEnv::new(
            &mut world,
            Dice::new(&rng, 0, 0),
            &Omniscient,
            &mut log,
            &mut yes,
            &config,
        );
        let mut bolt = line(Position::new(1, 1), Position::new(3, 1))
            .flavour(Flavour::PotionFire)
            .build();
        assert!(matches!(bolt.fire(&mut env), Err(BoltError::InvalidFlavour { .. })));
        let mut outside = line(Position::new(-1, 1), Position::new(3, 1)).build();
        assert!(matches!(
            outside.fire(&mut env),
            Err(BoltError::SourceOutOfBounds { .. })
        ));
    }

    #[test]
    fn fire_and_cold_clouds_cancel() {
        let mut rig = Rig::new(12, 3);
        rig.world
            .place_cloud(Position::new(3, 1), CloudKind::Cold, 10, None);
        let mut bolt = line(Position::new(1, 1), Position::new(8, 1))
            .flavour(Flavour::Fire)
            .range(8)
            .beam()
            .build();
        rig.fire(&mut bolt, &mut AlwaysYes);
        assert!(rig.world.cloud_at(Position::new(3, 1)).is_none());
        assert!(bolt.path_taken.len() < 8);
    }
}
