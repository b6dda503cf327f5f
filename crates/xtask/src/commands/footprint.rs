//! Print an explosion's flood-fill cost map
//!
//! Shows which cells a blast of the given radius would reach from a point in a
//! scenario, and how much of the fill budget each cell cost.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use beam_core::{Bolt, FloodRules, Position, radial_sweep};

use crate::utils;

/// Print the flood-fill cost map of an explosion
#[derive(Parser)]
pub struct Footprint {
    /// Scenario name (file stem under `scenarios/`)
    #[arg(value_name = "SCENARIO")]
    scenario: String,

    /// Blast radius (0-9)
    #[arg(short, long, default_value = "1")]
    radius: i32,

    /// Centre of the blast
    #[arg(long, value_name = "X,Y", value_parser = utils::parse_position)]
    at: Position,

    /// Let the fill pass statues and other solid non-walls
    #[arg(long)]
    through_statues: bool,

    /// Let the fill pass walls and closed doors
    #[arg(long)]
    through_walls: bool,

    /// Custom data directory (defaults to the bundled content)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,
}

impl Footprint {
    pub fn execute(self) -> Result<()> {
        let world = utils::factory(self.data_dir)
            .load_scenario(&self.scenario)
            .with_context(|| format!("Failed to load scenario '{}'", self.scenario))?;
        if !world.in_bounds(self.at) {
            anyhow::bail!("Centre {} is outside the {}x{} map", self.at, world.width(), world.height());
        }

        let mut rules = FloodRules::new(self.radius);
        if self.through_statues {
            rules = rules.through_statues();
        }
        if self.through_walls {
            rules = rules.through_walls();
        }

        let bolt = Bolt::builder().target(self.at).explosion(rules.radius).build();
        let map = bolt.explosion_map(&world, rules);
        let reached = map.reached().count();

        println!(
            "{} radius {} at {} in {}",
            style("=== Footprint:").bold().green(),
            rules.radius,
            self.at,
            style(&self.scenario).cyan()
        );
        println!();

        // One row per map row, costs right-aligned; unreached cells show terrain.
        let r = rules.radius;
        for dy in -r..=r {
            let mut line = String::from("  ");
            for dx in -r..=r {
                let offset = Position::new(dx, dy);
                let at = self.at + offset;
                let cell = if !world.in_bounds(at) {
                    style("   ".to_string())
                } else if map.is_reached(offset) {
                    let cost = map.get(offset);
                    let text = format!("{:>3}", cost);
                    if cost == 0 {
                        style(text).bold().green()
                    } else {
                        style(text).yellow()
                    }
                } else if world.is_solid(at) {
                    style("  #".to_string()).dim()
                } else {
                    style("  .".to_string()).dim()
                };
                line.push_str(&cell.to_string());
            }
            println!("{}", line);
        }
        println!();

        let order: Vec<String> = radial_sweep(r)
            .iter()
            .filter(|offset| map.is_reached(**offset))
            .map(|offset| (self.at + *offset).to_string())
            .collect();
        println!("{} {}", style("Cells reached:").bold().yellow(), reached);
        println!("{} {}", style("Sweep order:").bold().yellow(), order.join(" "));

        Ok(())
    }
}
