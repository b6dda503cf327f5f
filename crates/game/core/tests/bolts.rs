//! Whole-shot properties checked through the public API.

use beam_core::env::{AlwaysYes, ConstRng, Dice, MessageLog, Omniscient, PcgRng, RngOracle};
use beam_core::state::{Actor, EntityId};
use beam_core::{
    BeamConfig, Bolt, BoltBuilder, BoltEnv, DiceDef, Feature, Flavour, FloodRules, Hooks,
    Position, Termination, Thrower, ToHit, TracerInfo, World,
};

const SOURCE: Position = Position::new(1, 2);

fn arena() -> World {
    let mut world = World::new(16, 5).unwrap();
    for x in 0..16 {
        for y in 0..5 {
            world.set_feature(Position::new(x, y), Feature::Floor).unwrap();
        }
    }
    world.set_feature(Position::new(12, 2), Feature::RockWall).unwrap();
    world.place_player(Actor::new("you", SOURCE, 40)).unwrap();
    world
        .spawn(Actor::new("goblin", Position::new(5, 2), 12).with_defences(2, 10))
        .unwrap();
    world
        .spawn(Actor::new("orc", Position::new(8, 2), 20).with_defences(4, 6).with_power(5))
        .unwrap();
    world
}

fn shoot(
    world: &mut World,
    log: &mut MessageLog,
    rng: &dyn RngOracle,
    seed: u64,
    bolt: &mut Bolt,
) -> Termination {
    let config = BeamConfig::default();
    let mut prompt = AlwaysYes;
    let dice = Dice::new(rng, seed, 1);
    let mut env = BoltEnv::new(world, dice, &Omniscient, log, &mut prompt, &config);
    bolt.fire(&mut env).unwrap()
}

fn shot(flavour: Flavour) -> BoltBuilder {
    Bolt::builder()
        .flavour(flavour)
        .damage(DiceDef::new(2, 6))
        .hit(ToHit::Value(20))
        .thrower(Thrower::PlayerSpell)
        .source(SOURCE)
        .target(Position::new(10, 2))
}

#[test]
fn range_is_never_overspent() {
    let flavours = [Flavour::Magic, Flavour::Fire, Flavour::Electricity, Flavour::Digging];
    for flavour in flavours {
        for range in 0..10 {
            for beam in [false, true] {
                for seed in 1..4 {
                    let mut world = arena();
                    let mut log = MessageLog::new();
                    let builder = shot(flavour).range(range);
                    let mut bolt = if beam { builder.beam().build() } else { builder.build() };
                    shoot(&mut world, &mut log, &PcgRng, seed, &mut bolt);
                    assert!(
                        bolt.run.range_used <= bolt.run.range,
                        "{flavour} range {range} beam {beam}: used {} of {}",
                        bolt.run.range_used,
                        bolt.run.range
                    );
                }
            }
        }
    }
}

#[test]
fn zero_range_goes_nowhere() {
    let mut world = arena();
    let before = world.clone();
    let mut log = MessageLog::new();
    let mut bolt = shot(Flavour::Fire).range(0).build();

    let termination = shoot(&mut world, &mut log, &ConstRng(0), 1, &mut bolt);

    assert_eq!(termination, Termination::RangeExhausted);
    assert!(bolt.path_taken.is_empty());
    assert_eq!(world, before);
}

#[test]
fn tracers_are_repeatable_and_leave_no_trace() {
    let mut world = arena();
    let before = world.clone();
    let mut log = MessageLog::new();
    let config = BeamConfig::default();
    let mut prompt = AlwaysYes;
    let dice = Dice::new(&PcgRng, 99, 3);
    let mut env = BoltEnv::new(&mut world, dice, &Omniscient, &mut log, &mut prompt, &config);

    let mut first = shot(Flavour::Fire).range(10).beam().tracer().build();
    let mut second = first.clone();
    first.fire(&mut env).unwrap();
    second.fire(&mut env).unwrap();
    let cursor = env.dice.cursor();
    drop(env);

    assert_eq!(first.foe_info, second.foe_info);
    assert_eq!(first.friend_info, second.friend_info);
    assert_eq!(first.path_taken, second.path_taken);
    assert_eq!(first.foe_info.count, 2);
    assert_eq!(cursor, 0);
    assert_eq!(world, before);
    assert!(log.is_empty());
}

#[test]
fn tracer_sides_merge_in_any_order() {
    let a = TracerInfo { count: 1, power: 4, hurt: 1, helped: 0, dont_stop: false };
    let b = TracerInfo { count: 2, power: 9, hurt: 0, helped: 1, dont_stop: true };
    let c = TracerInfo { count: 3, power: 1, hurt: 2, helped: 2, dont_stop: false };

    assert_eq!(a.merge(b).merge(c), a.merge(b.merge(c)));
    assert_eq!(a.merge(b), b.merge(a));
    assert!(a.merge(b).dont_stop);
    assert!(!a.merge(c).dont_stop);
    assert_eq!(a.merge(TracerInfo::new()), a);
}

#[test]
fn shared_cell_is_resolved_once_per_creature() {
    let mut world = World::new(10, 3).unwrap();
    for x in 0..10 {
        world.set_feature(Position::new(x, 1), Feature::Floor).unwrap();
    }
    let player_at = Position::new(4, 1);
    world.place_player(Actor::new("you", player_at, 30)).unwrap();
    let imp = world.spawn(Actor::new("imp", player_at, 30)).unwrap();
    let caster = world.spawn(Actor::new("caster", Position::new(8, 1), 30)).unwrap();

    let mut log = MessageLog::new();
    let mut bolt = Bolt::builder()
        .name("spark")
        .flavour(Flavour::Magic)
        .damage(DiceDef::new(1, 1))
        .hit(ToHit::Automatic)
        .thrower(Thrower::MonsterSpell)
        .agent(caster)
        .source(Position::new(8, 1))
        .target(Position::new(1, 1))
        .range(7)
        .beam()
        .build();
    shoot(&mut world, &mut log, &ConstRng(0), 1, &mut bolt);

    let hits = |id: EntityId| world.damage_log().iter().filter(|r| r.victim == id).count();
    assert_eq!(hits(EntityId::PLAYER), 1);
    assert_eq!(hits(imp), 1);
    assert_eq!(world.player().unwrap().hp.current, 29);
    assert_eq!(world.actor(imp).unwrap().hp.current, 29);
    assert_eq!(bolt.path_taken.iter().filter(|p| **p == player_at).count(), 1);
}

#[test]
fn preview_damage_is_the_mean() {
    let dice = DiceDef::new(3, 6);
    let rng = PcgRng;
    for seed in 0..50 {
        let mut roller = Dice::new(&rng, seed, 1);
        assert_eq!(dice.resolve(false, &mut roller), 10);
        let live = dice.resolve(true, &mut roller);
        assert!((3..=18).contains(&live), "seed {seed} rolled {live}");
    }
}

#[test]
fn digging_through_three_walls_is_heard_once() {
    let mut world = World::new(12, 3).unwrap();
    for x in 0..12 {
        world.set_feature(Position::new(x, 1), Feature::Floor).unwrap();
    }
    for x in 3..6 {
        world.set_feature(Position::new(x, 1), Feature::RockWall).unwrap();
    }
    world.place_player(Actor::new("you", Position::new(1, 1), 20)).unwrap();

    let mut log = MessageLog::new();
    let mut bolt = Bolt::builder()
        .flavour(Flavour::Digging)
        .thrower(Thrower::PlayerSpell)
        .source(Position::new(1, 1))
        .target(Position::new(9, 1))
        .range(8)
        .build();
    shoot(&mut world, &mut log, &ConstRng(0), 1, &mut bolt);

    for x in 3..6 {
        assert_eq!(world.feature(Position::new(x, 1)), Feature::Floor);
    }
    assert_eq!(log.count("You hear a grinding noise."), 1);
    assert!(bolt.obvious_effect);
}

#[test]
fn blast_centre_is_free_and_walls_enclose_it() {
    let mut world = World::new(9, 9).unwrap();
    let centre = Position::new(4, 4);
    for x in 0..9 {
        for y in 0..9 {
            let pos = Position::new(x, y);
            let ring = pos.distance(centre) == 1;
            let feature = if ring { Feature::RockWall } else { Feature::Floor };
            world.set_feature(pos, feature).unwrap();
        }
    }
    let bolt = Bolt::builder().target(centre).explosion(3).build();

    let enclosed = bolt.explosion_map(&world, FloodRules::new(3));
    assert!(enclosed.is_reached(Position::ORIGIN));
    assert_eq!(enclosed.get(Position::ORIGIN), 0);
    assert_eq!(enclosed.reached().count(), 1);

    let open = bolt.explosion_map(&world, FloodRules::new(3).through_walls());
    assert!(open.reached().count() > 9);
    assert!(open.reached().all(|(offset, cost)| offset.distance(Position::ORIGIN) <= 3 && cost >= 0));
}

fn chatty(_: &Bolt, _: &Actor, _: &mut i32, messages: &mut Vec<String>) -> bool {
    messages.push("Sparks dance in the air.".to_string());
    false
}

fn scorch(bolt: &Bolt, victim: EntityId, _: i32, world: &mut World) -> bool {
    if bolt.is_tracer {
        return false;
    }
    let Some(at) = world.actor(victim).map(|a| a.position) else {
        return false;
    };
    world.set_feature(at, Feature::Trees).is_ok()
}

fn noisy_hooks() -> Hooks {
    Hooks::default().on_damage(chatty).on_hit(scorch)
}

#[test]
fn tracers_of_every_shape_are_silent_and_pure() {
    let fireball = || shot(Flavour::Fire).hooks(noisy_hooks()).explosion(2);
    let shapes: Vec<(&str, Bolt)> = vec![
        ("beam", shot(Flavour::Electricity).range(10).beam().hooks(noisy_hooks()).tracer().build()),
        ("bolt", shot(Flavour::Magic).hooks(noisy_hooks()).tracer().build()),
        ("explosion", fireball().tracer().build()),
        (
            "special explosion",
            shot(Flavour::Magic)
                .hooks(noisy_hooks())
                .special_explosion(fireball().build())
                .tracer()
                .build(),
        ),
    ];

    for (shape, template) in shapes {
        for seed in [1, 7, 42] {
            let mut world = arena();
            let before = world.clone();
            let mut log = MessageLog::new();
            let config = BeamConfig::default();
            let mut prompt = AlwaysYes;
            let mut env = BoltEnv::new(
                &mut world,
                Dice::new(&PcgRng, seed, 2),
                &Omniscient,
                &mut log,
                &mut prompt,
                &config,
            );
            let mut bolt = template.clone();
            bolt.fire(&mut env).unwrap();
            let cursor = env.dice.cursor();
            drop(env);

            assert!(bolt.foe_info.count > 0, "{shape} seed {seed} saw no foes");
            assert_eq!(cursor, 0, "{shape} seed {seed} spent dice");
            assert_eq!(world, before, "{shape} seed {seed} changed the world");
            assert!(log.is_empty(), "{shape} seed {seed} spoke: {:?}", log.entries());
        }
    }
}

#[test]
fn live_shots_do_run_the_hooks() {
    let mut world = arena();
    let mut log = MessageLog::new();
    let mut bolt = shot(Flavour::Magic).hit(ToHit::Automatic).hooks(noisy_hooks()).build();
    shoot(&mut world, &mut log, &ConstRng(0), 1, &mut bolt);

    assert!(log.contains("Sparks dance in the air."));
    assert_eq!(world.feature(Position::new(5, 2)), Feature::Trees);
}
