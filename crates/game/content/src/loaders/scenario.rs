//! Scenario loader.
//!
//! A scenario is a hand-drawn map plus the actors standing on it. Terrain is
//! written as ASCII rows so maps stay readable in the data files; actors,
//! sanctuary and silence are ordinary RON entries.

use std::path::Path;

use beam_core::state::{ActorFlags, Holiness, Patron, Resists, Shield};
use beam_core::{Actor, Attitude, Feature, Position, World};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Scenario file layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRon {
    pub dimensions: (i32, i32),
    pub rows: Vec<String>,
    #[serde(default)]
    pub actors: Vec<ActorSpec>,
    #[serde(default)]
    pub sanctuary: Vec<(i32, i32)>,
    #[serde(default)]
    pub silence: Vec<(i32, i32)>,
}

/// One actor entry in a scenario file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorSpec {
    pub name: String,
    pub at: (i32, i32),
    pub hp: i32,
    #[serde(default)]
    pub player: bool,
    #[serde(default)]
    pub armour: i32,
    #[serde(default)]
    pub evasion: i32,
    #[serde(default)]
    pub attitude: Attitude,
    #[serde(default)]
    pub holiness: Holiness,
    #[serde(default)]
    pub resists: Resists,
    #[serde(default)]
    pub shield: Option<Shield>,
    #[serde(default)]
    pub magic_resistance: i32,
    #[serde(default = "ActorSpec::default_power")]
    pub power: i32,
    #[serde(default)]
    pub flags: ActorFlags,
    #[serde(default)]
    pub patron: Option<Patron>,
}

impl ActorSpec {
    const fn default_power() -> i32 {
        1
    }

    fn position(&self) -> Position {
        Position::new(self.at.0, self.at.1)
    }

    /// Builds the core actor this entry describes.
    pub fn to_actor(&self) -> Actor {
        let mut actor = Actor::new(self.name.clone(), self.position(), self.hp)
            .with_defences(self.armour, self.evasion)
            .with_attitude(self.attitude)
            .with_holiness(self.holiness)
            .with_resists(self.resists)
            .with_magic_resistance(self.magic_resistance)
            .with_power(self.power)
            .with_flags(self.flags);
        if let Some(shield) = self.shield {
            actor = actor.with_shield(shield);
        }
        if let Some(patron) = self.patron {
            actor = actor.with_patron(patron);
        }
        actor
    }
}

/// Maps one legend character to its terrain.
///
/// | char | feature          | char | feature        |
/// |------|------------------|------|----------------|
/// | `.`  | floor            | `~`  | deep water     |
/// | `#`  | rock wall        | `w`  | shallow water  |
/// | `c`  | clear rock wall  | `L`  | lava           |
/// | `%`  | stone wall       | `+`  | closed door    |
/// | `M`  | metal wall       | `'`  | open door      |
/// | `G`  | green crystal    | `=`  | secret door    |
/// | `W`  | wax wall         | `S`  | granite statue |
/// | `X`  | permanent rock   | `I`  | orcish idol    |
/// | `T`  | trees            |      |                |
pub fn legend(ch: char) -> Option<Feature> {
    let feature = match ch {
        '.' => Feature::Floor,
        '#' => Feature::RockWall,
        'c' => Feature::ClearRockWall,
        '%' => Feature::StoneWall,
        'M' => Feature::MetalWall,
        'G' => Feature::GreenCrystalWall,
        'W' => Feature::WaxWall,
        'X' => Feature::PermaRockWall,
        'T' => Feature::Trees,
        '~' => Feature::DeepWater,
        'w' => Feature::ShallowWater,
        'L' => Feature::Lava,
        '+' => Feature::ClosedDoor,
        '\'' => Feature::OpenDoor,
        '=' => Feature::SecretDoor,
        'S' => Feature::GraniteStatue,
        'I' => Feature::OrcishIdol,
        _ => return None,
    };
    Some(feature)
}

/// Loader for scenario maps from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    /// Load a scenario from a RON file and build its world.
    pub fn load(path: &Path) -> LoadResult<World> {
        let content = read_file(path)?;
        Self::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load scenario {}: {}", path.display(), e))
    }

    /// Parse a scenario from RON text.
    pub fn from_str(content: &str) -> LoadResult<World> {
        let data: ScenarioRon = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {}", e))?;
        Self::build(&data)
    }

    /// Build a world from already parsed scenario data.
    pub fn build(data: &ScenarioRon) -> LoadResult<World> {
        let (width, height) = data.dimensions;
        let mut world = World::new(width, height)?;

        if data.rows.len() != height as usize {
            anyhow::bail!(
                "Scenario has {} rows but declares height {}",
                data.rows.len(),
                height
            );
        }

        for (y, row) in data.rows.iter().enumerate() {
            let cells = row.chars().count();
            if cells != width as usize {
                anyhow::bail!("Row {} has {} cells but declares width {}", y, cells, width);
            }
            for (x, ch) in row.chars().enumerate() {
                let feature = legend(ch).ok_or_else(|| {
                    anyhow::anyhow!("Unknown terrain '{}' at ({}, {})", ch, x, y)
                })?;
                world.set_feature(Position::new(x as i32, y as i32), feature)?;
            }
        }

        for spec in &data.actors {
            let actor = spec.to_actor();
            let id = if spec.player {
                world.place_player(actor)?
            } else {
                world.spawn(actor)?
            };
            tracing::trace!(%id, name = %spec.name, "scenario actor placed");
        }

        for &(x, y) in &data.sanctuary {
            world.add_sanctuary(Position::new(x, y));
        }
        for &(x, y) in &data.silence {
            world.add_silence(Position::new(x, y));
        }

        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r######"(
        dimensions: (5, 3),
        rows: [
            "#####",
            "#.W~#",
            "#####",
        ],
        actors: [
            (name: "you", at: (1, 1), hp: 20, player: true),
            (name: "eel", at: (3, 1), hp: 9, flags: "SUBMERGED", attitude: neutral),
        ],
        sanctuary: [(2, 1)],
    )"######;

    #[test]
    fn builds_terrain_and_actors() {
        let world = ScenarioLoader::from_str(SMALL).expect("scenario should parse");

        assert_eq!(world.width(), 5);
        assert_eq!(world.feature(Position::new(0, 0)), Feature::RockWall);
        assert_eq!(world.feature(Position::new(2, 1)), Feature::WaxWall);
        assert_eq!(world.feature(Position::new(3, 1)), Feature::DeepWater);
        assert!(world.is_sanctuary(Position::new(2, 1)));

        let player = world.player().expect("player placed");
        assert_eq!(player.position, Position::new(1, 1));

        let eel = world
            .monster_at(Position::new(3, 1))
            .and_then(|id| world.actor(id))
            .expect("eel spawned");
        assert!(eel.flags.contains(ActorFlags::SUBMERGED));
        assert_eq!(eel.attitude, Attitude::Neutral);
        assert_eq!(eel.power, 1);
    }

    #[test]
    fn rejects_ragged_rows() {
        let ragged = r#"(dimensions: (3, 2), rows: ["...", ".."])"#;
        let err = ScenarioLoader::from_str(ragged).unwrap_err();
        assert!(err.to_string().contains("Row 1"));
    }

    #[test]
    fn rejects_unknown_legend() {
        let odd = r#"(dimensions: (2, 1), rows: [".?"])"#;
        let err = ScenarioLoader::from_str(odd).unwrap_err();
        assert!(err.to_string().contains("Unknown terrain '?'"));
    }

    #[test]
    fn rejects_two_players() {
        let twice = r#"(
            dimensions: (3, 1),
            rows: ["..."],
            actors: [
                (name: "you", at: (0, 0), hp: 5, player: true),
                (name: "you again", at: (2, 0), hp: 5, player: true),
            ],
        )"#;
        assert!(ScenarioLoader::from_str(twice).is_err());
    }

    #[test]
    fn legend_covers_every_feature() {
        use strum::IntoEnumIterator;
        let chars = ".#c%MGWXT~wL+'=SI";
        let mapped: Vec<Feature> = chars.chars().filter_map(legend).collect();
        for feature in Feature::iter() {
            assert!(mapped.contains(&feature), "{feature} has no legend char");
        }
    }
}
