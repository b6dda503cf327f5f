//! Fire one catalog attack into a scenario
//!
//! Loads a scenario and the attack catalog, resolves a single shot (live or as
//! a tracer), and reports what happened: the path, friend/foe statistics,
//! outcome flags, in-game messages, hit point changes, and terrain changes.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use serde::Serialize;

use beam_core::env::{AttackCatalog, Channel, Message, MessageLog, Omniscient, PcgRng, ScriptedPrompter};
use beam_core::{
    AttackId, BeamConfig, Bolt, BoltEnv, Dice, EntityId, Feature, Position, Termination, Thrower,
    TracerInfo, World, fire_tracer, player_tracer, zapping,
};

use crate::utils;

/// Fire a catalog attack into a scenario, live or as a tracer
#[derive(Parser)]
pub struct Fire {
    /// Scenario name (file stem under `scenarios/`)
    #[arg(value_name = "SCENARIO")]
    scenario: String,

    /// Attack id from the catalog (see `cargo xtask catalog`)
    #[arg(value_name = "ATTACK")]
    attack: String,

    /// Cell the shot leaves from; the shooter is whoever stands there
    #[arg(long, value_name = "X,Y", value_parser = utils::parse_position)]
    from: Position,

    /// Cell the shot is aimed at
    #[arg(long, value_name = "X,Y", value_parser = utils::parse_position)]
    to: Position,

    /// Spell power before the catalog cap is applied
    #[arg(short, long, default_value = "50")]
    power: i32,

    /// Range override; `-1` uses the configured default
    #[arg(short, long, default_value = "-1", allow_hyphen_values = true)]
    range: i32,

    /// Dry-run the shot instead of firing it
    #[arg(long)]
    tracer: bool,

    /// Game seed for the dice stream
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Answer "no" to every confirmation prompt
    #[arg(long)]
    decline: bool,

    /// Custom data directory (defaults to the bundled content)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Emit JSON instead of a coloured summary
    #[arg(long)]
    json: bool,
}

/// Who pulled the trigger.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum Shooter {
    Player,
    Monster(EntityId),
    Nobody,
}

impl Shooter {
    fn at(world: &World, pos: Position) -> Self {
        if world.player_at(pos) {
            Self::Player
        } else if let Some(id) = world.monster_at(pos) {
            Self::Monster(id)
        } else {
            Self::Nobody
        }
    }

    fn thrower(self) -> Thrower {
        match self {
            Self::Player => Thrower::PlayerSpell,
            Self::Monster(_) => Thrower::MonsterSpell,
            Self::Nobody => Thrower::Misc,
        }
    }
}

#[derive(Serialize)]
struct Flags {
    fired: bool,
    seen: bool,
    heard: bool,
    obvious: bool,
    cancelled: bool,
}

#[derive(Serialize)]
struct HpChange {
    id: EntityId,
    name: String,
    before: i32,
    after: Option<i32>,
}

#[derive(Serialize)]
struct TerrainChange {
    at: Position,
    before: Feature,
    after: Feature,
}

#[derive(Serialize)]
struct ShotReport {
    scenario: String,
    attack: String,
    name: String,
    tracer: bool,
    shooter: Shooter,
    termination: Option<Termination>,
    path: Vec<Position>,
    range_used: i32,
    foes: TracerInfo,
    friends: TracerInfo,
    flags: Flags,
    prompts: Vec<String>,
    messages: Vec<Message>,
    hp_changes: Vec<HpChange>,
    terrain_changes: Vec<TerrainChange>,
    clouds: usize,
}

impl Fire {
    pub fn execute(self) -> Result<()> {
        let factory = utils::factory(self.data_dir.clone());
        let config = factory.load_config().unwrap_or_else(|e| {
            tracing::warn!("using default config: {}", e);
            BeamConfig::default()
        });
        let attacks = factory.attacks()?;
        let mut world = factory
            .load_scenario(&self.scenario)
            .with_context(|| format!("Failed to load scenario '{}'", self.scenario))?;

        let id = AttackId::new(self.attack.as_str());
        let template = attacks.require(&id)?.clone();
        let before = world.clone();
        let shooter = Shooter::at(&world, self.from);

        let mut builder = Bolt::builder()
            .thrower(shooter.thrower())
            .source(self.from)
            .target(self.to)
            .range(self.range);
        if let Shooter::Monster(monster) = shooter
            && let Some(actor) = world.actor(monster)
        {
            builder = builder.agent(monster).attitude(actor.effective_attitude());
        }
        let mut bolt = builder.build();

        let rng = PcgRng;
        let mut log = MessageLog::new();
        let mut prompt = ScriptedPrompter::new(Vec::<bool>::new()).with_fallback(!self.decline);
        let fired = {
            let dice = Dice::new(&rng, self.seed, 1).for_actor(match shooter {
                Shooter::Monster(id) => id.0,
                _ => EntityId::PLAYER.0,
            });
            let mut env = BoltEnv::new(&mut world, dice, &Omniscient, &mut log, &mut prompt, &config);
            let _span = tracing::info_span!("xtask.fire", attack = %id, tracer = self.tracer).entered();

            match (shooter, self.tracer) {
                (Shooter::Player, true) => {
                    player_tracer(&attacks, &id, self.power, &mut bolt, self.range, &mut env)?
                }
                (Shooter::Player, false) => {
                    zapping(&attacks, &id, self.power, &mut bolt, &mut env)?
                }
                (Shooter::Monster(monster), true) => {
                    bolt.apply_template(&template, self.power);
                    fire_tracer(monster, &mut bolt, false, &mut env)?
                }
                (_, tracer) => {
                    bolt.apply_template(&template, self.power);
                    bolt.is_tracer = tracer;
                    bolt.fire(&mut env)?;
                    true
                }
            }
        };

        let report = ShotReport {
            scenario: self.scenario.clone(),
            attack: self.attack.clone(),
            name: bolt.name().to_string(),
            tracer: self.tracer,
            shooter,
            termination: bolt.termination,
            path: bolt.path_taken.clone(),
            range_used: bolt.run.range_used,
            foes: bolt.foe_info,
            friends: bolt.friend_info,
            flags: Flags {
                fired,
                seen: bolt.seen,
                heard: bolt.heard,
                obvious: bolt.obvious_effect,
                cancelled: bolt.cancelled,
            },
            prompts: prompt.asked().to_vec(),
            messages: log.entries().to_vec(),
            hp_changes: hp_changes(&before, &world),
            terrain_changes: terrain_changes(&before, &world),
            clouds: world.clouds().count(),
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report, &world);
        }
        Ok(())
    }
}

fn hp_changes(before: &World, after: &World) -> Vec<HpChange> {
    before
        .actors()
        .filter_map(|old| {
            let now = after.actor(old.id).map(|a| a.hp.current);
            (now != Some(old.hp.current)).then(|| HpChange {
                id: old.id,
                name: old.name.clone(),
                before: old.hp.current,
                after: now,
            })
        })
        .collect()
}

fn terrain_changes(before: &World, after: &World) -> Vec<TerrainChange> {
    let mut changes = Vec::new();
    for y in 0..before.height() {
        for x in 0..before.width() {
            let at = Position::new(x, y);
            let (old, new) = (before.feature(at), after.feature(at));
            if old != new {
                changes.push(TerrainChange {
                    at,
                    before: old,
                    after: new,
                });
            }
        }
    }
    changes
}

fn channel_style(channel: Channel, text: &str) -> console::StyledObject<&str> {
    match channel {
        Channel::Plain => style(text),
        Channel::Sound => style(text).italic(),
        Channel::God => style(text).yellow(),
        Channel::Warning => style(text).red(),
        Channel::Diagnostics => style(text).dim(),
    }
}

fn print_report(report: &ShotReport, world: &World) {
    let mode = if report.tracer { "tracer" } else { "live" };
    println!(
        "{} {} {}",
        style("=== Shot:").bold().green(),
        style(&report.name).bold().cyan(),
        style(format!("({mode}) ===")).bold().green()
    );
    println!();

    println!("{}", style("Outcome:").bold().yellow());
    println!("  Shooter: {:?}", report.shooter);
    println!("  Fired: {}", report.flags.fired);
    println!("  Termination: {:?}", report.termination);
    println!("  Range used: {}", report.range_used);
    println!(
        "  Seen: {}  Heard: {}  Obvious: {}  Cancelled: {}",
        report.flags.seen, report.flags.heard, report.flags.obvious, report.flags.cancelled
    );
    println!();

    println!("{}", style("Tracer statistics:").bold().yellow());
    for (label, info) in [("Foes", &report.foes), ("Friends", &report.friends)] {
        println!(
            "  {:<8} count {:>2}  power {:>4}  hurt {:>2}  helped {:>2}",
            label, info.count, info.power, info.hurt, info.helped
        );
    }
    println!();

    println!("{}", style("Path:").bold().yellow());
    print_path(report, world);
    println!();

    if !report.prompts.is_empty() {
        println!("{}", style("Prompts:").bold().yellow());
        for question in &report.prompts {
            println!("  ? {}", question);
        }
        println!();
    }

    if !report.messages.is_empty() {
        println!("{}", style("Messages:").bold().yellow());
        for message in &report.messages {
            println!("  {}", channel_style(message.channel, &message.text));
        }
        println!();
    }

    if !report.hp_changes.is_empty() {
        println!("{}", style("Hit points:").bold().yellow());
        for change in &report.hp_changes {
            let after = match change.after {
                Some(hp) => style(hp.to_string()).red(),
                None => style("dead".to_string()).red().bold(),
            };
            println!(
                "  {} (ID: {}) {} -> {}",
                change.name, change.id.0, change.before, after
            );
        }
        println!();
    }

    if !report.terrain_changes.is_empty() {
        println!("{}", style("Terrain:").bold().yellow());
        for change in &report.terrain_changes {
            println!("  {} {} -> {}", change.at, change.before, change.after);
        }
        println!();
    }

    if report.clouds > 0 {
        println!("{} {}", style("Clouds on map:").bold().yellow(), report.clouds);
    }
}

/// Draws the map with the path marked.
fn print_path(report: &ShotReport, world: &World) {
    for y in 0..world.height() {
        let mut line = String::from("  ");
        for x in 0..world.width() {
            let at = Position::new(x, y);
            let cell = if world.player_at(at) {
                style("@".to_string()).bold()
            } else if world.monster_at(at).is_some() {
                style("m".to_string()).red()
            } else if report.path.contains(&at) {
                style("*".to_string()).yellow()
            } else if world.cloud_at(at).is_some() {
                style("§".to_string()).dim()
            } else {
                style(terrain_char(world.feature(at)).to_string()).dim()
            };
            line.push_str(&cell.to_string());
        }
        println!("{}", line);
    }
}

fn terrain_char(feature: Feature) -> char {
    match feature {
        Feature::Floor => '.',
        Feature::ShallowWater => 'w',
        Feature::DeepWater => '~',
        Feature::Lava => 'L',
        Feature::RockWall => '#',
        Feature::ClearRockWall => 'c',
        Feature::StoneWall => '%',
        Feature::MetalWall => 'M',
        Feature::GreenCrystalWall => 'G',
        Feature::WaxWall => 'W',
        Feature::PermaRockWall => 'X',
        Feature::Trees => 'T',
        Feature::ClosedDoor => '+',
        Feature::SecretDoor => '=',
        Feature::OpenDoor => '\'',
        Feature::GraniteStatue => 'S',
        Feature::OrcishIdol => 'I',
    }
}
