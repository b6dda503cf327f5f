//! Bundled content loads and drives the core end to end.

use std::fs;

use beam_content::{AttackRegistry, ConfigLoader, ContentFactory};
use beam_core::env::{AlwaysYes, Dice, MessageLog, Omniscient, PcgRng};
use beam_core::{AttackId, BeamConfig, Bolt, BoltEnv, Position, Thrower, player_tracer};

#[test]
fn bundled_scenarios_load_with_a_player() {
    let factory = ContentFactory::bundled();
    let names = factory.scenario_names().unwrap();
    assert!(names.contains(&"corridor".to_string()));
    assert!(names.contains(&"mine".to_string()));

    for name in names {
        let world = factory
            .load_scenario(&name)
            .unwrap_or_else(|e| panic!("scenario {name} failed: {e}"));
        assert!(world.player().is_some(), "{name} has no player");
    }
}

#[test]
fn bundled_config_is_default() {
    let config = ContentFactory::bundled().load_config().unwrap();
    assert_eq!(config, BeamConfig::default());
}

#[test]
fn config_round_trip_through_a_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("config.toml"),
        "default_range = 6\ndefault_foe_ratio = 50\n",
    )
    .unwrap();

    let config = ContentFactory::new(dir.path()).load_config().unwrap();
    assert_eq!(config.default_range, 6);
    assert_eq!(config.default_foe_ratio, 50);
    assert_eq!(config.player_foe_ratio, BeamConfig::DEFAULT_PLAYER_FOE_RATIO);

    let direct = ConfigLoader::load(&dir.path().join("config.toml")).unwrap();
    assert_eq!(direct, config);
}

#[test]
fn missing_config_is_reported_with_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let err = ContentFactory::new(dir.path()).load_config().unwrap_err();
    assert!(err.to_string().contains("config.toml"));
}

#[test]
fn data_dir_catalog_overrides_embedded() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("attacks.ron"),
        r#"{ "spark": (name: "spark", power_cap: 10, flavour: electricity) }"#,
    )
    .unwrap();

    let attacks = ContentFactory::new(dir.path()).attacks().unwrap();
    assert_eq!(attacks.len(), 1);
    assert!(attacks.get(&AttackId::from("spark")).is_some());
}

#[test]
fn scenario_from_a_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("scenarios")).unwrap();
    fs::write(
        dir.path().join("scenarios/tiny.ron"),
        r#"(dimensions: (3, 1), rows: [".S."], actors: [(name: "you", at: (0, 0), hp: 9, player: true)])"#,
    )
    .unwrap();

    let factory = ContentFactory::new(dir.path());
    assert_eq!(factory.scenario_names().unwrap(), vec!["tiny".to_string()]);
    let world = factory.load_scenario("tiny").unwrap();
    assert!(world.is_solid(Position::new(1, 0)));
    assert!(factory.load_scenario("absent").is_err());
}

#[test]
fn catalog_tracer_counts_the_goblins_and_touches_nothing() {
    let factory = ContentFactory::bundled();
    let attacks = AttackRegistry::load().unwrap();
    let config = factory.load_config().unwrap();
    let mut world = factory.load_scenario("corridor").unwrap();
    let before = world.clone();

    let rng = PcgRng;
    let mut log = MessageLog::new();
    let mut prompt = AlwaysYes;
    let mut env = BoltEnv::new(
        &mut world,
        Dice::new(&rng, 7, 1),
        &Omniscient,
        &mut log,
        &mut prompt,
        &config,
    );

    let mut bolt = Bolt::builder()
        .thrower(Thrower::PlayerSpell)
        .source(Position::new(2, 3))
        .target(Position::new(7, 3))
        .build();
    let go = player_tracer(
        &attacks,
        &AttackId::from("bolt_of_fire"),
        50,
        &mut bolt,
        -1,
        &mut env,
    )
    .unwrap();
    let cursor = env.dice.cursor();
    drop(env);

    assert!(go);
    assert_eq!(cursor, 0);
    assert!(bolt.foe_info.count >= 1, "beam should reach the goblin");
    assert_eq!(bolt.friend_info.count, 0);
    assert_eq!(world, before);
    assert!(log.is_empty());
}
