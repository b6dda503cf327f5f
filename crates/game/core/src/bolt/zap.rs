//! Entry points: bolts from catalog templates, and the tracers run before them.

use super::{Bolt, BoltBuilder, BoltError, Flavour, Thrower};
use crate::env::{AttackCatalog, AttackId, AttackTemplate, AttackTraits, BoltEnv, Channel};
use crate::state::{Attitude, EntityId, Status, WorldError};

impl BoltBuilder {
    /// A bolt configured from `template` at `power`.
    pub fn from_template(template: &AttackTemplate, power: i32) -> Self {
        let mut builder = Bolt::builder();
        builder.bolt.apply_template(template, power);
        builder
    }
}

impl Bolt {
    /// Loads a template into the bolt. Aim, thrower, and allegiance are kept.
    pub fn apply_template(&mut self, template: &AttackTemplate, power: i32) {
        let power = template.capped_power(power);
        self.run.name = template.name.clone();
        self.run.colour = template.colour;
        self.run.flavour = template.flavour;
        self.run.real_flavour = template.flavour;
        self.run.damage = template.damage.dice(power);
        self.run.hit = template.to_hit.to_hit(power);
        self.glyph = Some(template.glyph);
        self.ench_power = power;
        self.is_beam = template.can_beam;
        self.is_explosion = template.is_explosion;
        self.is_big_cloud = template.traits.contains(AttackTraits::BIG_CLOUD);
        self.obvious_effect = template.obvious;
        self.loudness = template.loudness;
        self.traits = template.traits;
        self.trail_cloud = template.trail_cloud;
        self.endpoint_cloud = template.endpoint_cloud;
        self.explosion_cloud = template.explosion_cloud;
        self.refinement = template.refinement.clone();
    }

    /// Whether a creature should go ahead after its tracer.
    ///
    /// Helpful bolts need a friend in the path and no foe. Harmful ones need
    /// foes to make up at least `foe_ratio` percent of the power hit.
    pub fn should_fire(&self) -> bool {
        if is_beneficial(self.run.flavour) {
            return self.friend_info.count > 0 && self.foe_info.count == 0;
        }
        if self.foe_info.count == 0 {
            return false;
        }
        let foe = self.foe_info.power;
        let total = foe + self.friend_info.power;
        foe * 100 >= self.foe_ratio * total
    }

    fn reset_tracer_stats(&mut self) {
        self.foe_info.reset();
        self.friend_info.reset();
        self.run.reflections = 0;
        self.run.bounces = 0;
    }
}

fn is_beneficial(flavour: Flavour) -> bool {
    matches!(
        flavour,
        Flavour::Haste | Flavour::Might | Flavour::Berserk | Flavour::Healing | Flavour::Invisibility
    )
}

/// Fires a catalog attack on behalf of the player.
///
/// A player tracer runs first. Returns `Ok(false)` if the player called
/// the shot off, in which case nothing was fired.
pub fn zapping(
    catalog: &dyn AttackCatalog,
    id: &AttackId,
    power: i32,
    bolt: &mut Bolt,
    env: &mut BoltEnv<'_>,
) -> Result<bool, BoltError> {
    if bolt.thrower == Thrower::Misc {
        bolt.thrower = Thrower::PlayerSpell;
    }
    let range = bolt.run.range;
    if bolt.thrower.is_player() && !player_tracer(catalog, id, power, bolt, range, env)? {
        return Ok(false);
    }

    let template = catalog.require(id)?;
    template.validate(id)?;
    bolt.apply_template(template, power);
    bolt.is_tracer = false;
    if bolt.run.flavour == Flavour::Digging {
        bolt.run.aimed_at_spot = false;
    }

    let termination = bolt.fire(env)?;
    tracing::info!(attack = %id, power, ?termination, "zapped");
    Ok(true)
}

/// Dry-runs a catalog attack from the player's position.
///
/// Any prompt the player declines cancels the shot: "Okay, then." is shown
/// and `Ok(false)` returned. `range` overrides the bolt's range for the
/// dry run only; `-1` keeps it.
pub fn player_tracer(
    catalog: &dyn AttackCatalog,
    id: &AttackId,
    power: i32,
    bolt: &mut Bolt,
    range: i32,
    env: &mut BoltEnv<'_>,
) -> Result<bool, BoltError> {
    let Some(player) = env.world.player().cloned() else {
        return Err(WorldError::UnknownActor(EntityId::PLAYER).into());
    };
    // A confused player shoots wherever anyway.
    if player.has_status(Status::Confusion) {
        return Ok(true);
    }

    let template = catalog.require(id)?;
    bolt.apply_template(template, power);
    bolt.is_tracer = true;
    bolt.run.source = player.position;
    bolt.can_see_invis = env.view.actor_sees_invisible(&player);
    bolt.attitude = Attitude::Friendly;
    if !bolt.thrower.is_player() {
        bolt.thrower = Thrower::PlayerMissile;
    }
    bolt.reset_tracer_stats();
    bolt.foe_ratio = env.config.player_foe_ratio;
    bolt.cancelled = false;
    bolt.dont_stop_player = false;
    bolt.seen = false;
    bolt.heard = false;

    let old_range = bolt.run.range;
    if range >= 0 {
        bolt.run.range = range;
    }
    let result = bolt.fire(env);
    bolt.run.range = old_range;
    bolt.is_tracer = false;
    result?;

    if bolt.cancelled {
        tracing::debug!(attack = %id, "player called the shot off");
        env.emit(Channel::Plain, "Okay, then.");
        return Ok(false);
    }
    Ok(true)
}

/// Dry-runs `bolt` from `monster` and reports whether it is worth firing.
///
/// An unset `foe_ratio` takes the configured default, or the lower
/// summoned ratio when the caster fights against its own nature.
/// `explode_only` skips the flight and checks the blast at the target.
pub fn fire_tracer(
    monster: EntityId,
    bolt: &mut Bolt,
    explode_only: bool,
    env: &mut BoltEnv<'_>,
) -> Result<bool, BoltError> {
    let Some(mon) = env.world.actor(monster).cloned() else {
        return Err(WorldError::UnknownActor(monster).into());
    };

    bolt.is_tracer = true;
    bolt.run.source = mon.position;
    bolt.agent = Some(monster);
    bolt.can_see_invis = env.view.actor_sees_invisible(&mon);
    bolt.attitude = mon.effective_attitude();
    bolt.reset_tracer_stats();

    if bolt.foe_ratio == 0 {
        bolt.foe_ratio = if bolt.attitude.wont_attack() && !mon.attitude.wont_attack() {
            env.config.summoned_foe_ratio
        } else {
            env.config.default_foe_ratio
        };
    }
    bolt.run.in_explosion_phase = false;

    let result = if explode_only {
        let saved = bolt.run.clone();
        let cursor = env.dice.cursor();
        bolt.refine_for_explosion(env);
        let result = bolt.explode(env).map(|_| ());
        env.dice.rewind(cursor);
        bolt.run = saved;
        result
    } else {
        bolt.fire(env).map(|_| ())
    };
    bolt.is_tracer = false;
    result?;

    let fire = bolt.should_fire();
    tracing::debug!(
        %monster,
        foes = bolt.foe_info.count,
        foe_power = bolt.foe_info.power,
        friends = bolt.friend_info.count,
        friend_power = bolt.friend_info.power,
        fire,
        "monster tracer"
    );
    Ok(fire)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::combat::ToHit;
    use crate::config::BeamConfig;
    use crate::env::{
        AlwaysNo, AlwaysYes, ConstRng, DamageFormula, Dice, MessageLog, Omniscient, Prompter,
        ScriptedPrompter,
    };
    use crate::state::{Actor, Position, World};

    fn catalog() -> BTreeMap<AttackId, AttackTemplate> {
        let mut catalog = BTreeMap::new();
        catalog.insert(
            AttackId::new("magic_dart"),
            AttackTemplate::new("magic dart", Flavour::Magic)
                .with_power_cap(25)
                .with_damage(DamageFormula::Fixed { num: 3, size: 4 }),
        );
        catalog.insert(
            AttackId::new("bolt_of_fire"),
            AttackTemplate::new("bolt of fire", Flavour::Fire)
                .with_damage(DamageFormula::Fixed { num: 6, size: 6 })
                .beam(),
        );
        catalog
    }

    fn world() -> World {
        let mut world = World::new(12, 5).unwrap();
        world
            .place_player(Actor::new("you", Position::new(1, 2), 30))
            .unwrap();
        world
    }

    fn with_env<T>(
        world: &mut World,
        log: &mut MessageLog,
        prompt: &mut dyn Prompter,
        f: impl FnOnce(&mut BoltEnv<'_>) -> T,
    ) -> T {
        let rng = ConstRng(0);
        let config = BeamConfig::default();
        let mut env = BoltEnv::new(world, Dice::new(&rng, 9, 9), &Omniscient, log, prompt, &config);
        f(&mut env)
    }

    #[test]
    fn templates_cap_power() {
        let catalog = catalog();
        let template = catalog.require(&AttackId::new("magic_dart")).unwrap();
        let bolt = BoltBuilder::from_template(template, 200).build();
        assert_eq!(bolt.ench_power, 25);
        assert_eq!(bolt.name(), "magic dart");
        assert_eq!(bolt.run.hit, ToHit::Automatic);
        assert!(!bolt.is_beam);
    }

    #[test]
    fn zapping_fires_after_a_clear_tracer() {
        let mut world = world();
        let orc = world.spawn(Actor::new("orc", Position::new(5, 2), 40)).unwrap();
        let mut log = MessageLog::new();
        let mut bolt = Bolt::builder()
            .source(Position::new(1, 2))
            .target(Position::new(5, 2))
            .build();
        let fired = with_env(&mut world, &mut log, &mut AlwaysNo, |env| {
            zapping(&catalog(), &AttackId::new("magic_dart"), 10, &mut bolt, env)
        })
        .unwrap();
        assert!(fired);
        assert!(world.actor(orc).unwrap().hp.current < 40);
        assert_eq!(bolt.foe_info.count, 1);
    }

    #[test]
    fn declined_prompt_cancels_the_zap() {
        let mut world = world();
        let ally = world
            .spawn(Actor::new("ally", Position::new(4, 2), 40).with_attitude(Attitude::Friendly))
            .unwrap();
        let mut log = MessageLog::new();
        let mut prompt = ScriptedPrompter::new([false]);
        let mut bolt = Bolt::builder()
            .source(Position::new(1, 2))
            .target(Position::new(8, 2))
            .build();
        let fired = with_env(&mut world, &mut log, &mut prompt, |env| {
            zapping(&catalog(), &AttackId::new("bolt_of_fire"), 50, &mut bolt, env)
        })
        .unwrap();
        assert!(!fired);
        assert!(bolt.cancelled);
        assert_eq!(world.actor(ally).unwrap().hp.current, 40);
        assert_eq!(log.texts().collect::<Vec<_>>(), ["Okay, then."]);
        assert_eq!(prompt.asked(), ["Really fire at the ally?"]);
    }

    #[test]
    fn monsters_hold_fire_when_friends_are_in_the_way() {
        let mut world = world();
        let caster = world.spawn(Actor::new("orc wizard", Position::new(9, 2), 20)).unwrap();
        world
            .spawn(Actor::new("orc", Position::new(5, 2), 20).with_power(50))
            .unwrap();
        let mut log = MessageLog::new();
        let template = catalog()[&AttackId::new("bolt_of_fire")].clone();
        let mut bolt = BoltBuilder::from_template(&template, 50)
            .thrower(Thrower::MonsterSpell)
            .target(Position::new(1, 2))
            .build();
        let fire = with_env(&mut world, &mut log, &mut AlwaysYes, |env| {
            fire_tracer(caster, &mut bolt, false, env)
        })
        .unwrap();
        assert!(!fire);
        assert_eq!(bolt.foe_ratio, BeamConfig::DEFAULT_FOE_RATIO);
        assert_eq!(bolt.friend_info.count, 1);
        assert_eq!(bolt.foe_info.count, 1);
        assert!(log.is_empty());
        assert!(!bolt.is_tracer);
    }

    #[test]
    fn should_fire_weighs_power() {
        let mut bolt = Bolt::builder().foe_ratio(80).build();
        assert!(!bolt.should_fire());
        bolt.foe_info.count = 1;
        bolt.foe_info.power = 80;
        bolt.friend_info.power = 20;
        assert!(bolt.should_fire());
        bolt.friend_info.power = 21;
        assert!(!bolt.should_fire());

        let mut haste = Bolt::builder().flavour(Flavour::Haste).build();
        haste.friend_info.count = 1;
        assert!(haste.should_fire());
    }

    #[test]
    fn missing_monster_is_an_error() {
        let mut world = world();
        let mut log = MessageLog::new();
        let mut bolt = Bolt::builder().build();
        let err = with_env(&mut world, &mut log, &mut AlwaysYes, |env| {
            fire_tracer(EntityId(77), &mut bolt, false, env)
        })
        .unwrap_err();
        assert!(matches!(err, BoltError::World(WorldError::UnknownActor(_))));
    }
}
