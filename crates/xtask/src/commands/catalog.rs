//! List attack catalog entries
//!
//! Shows each template's flavour, power cap, and damage at that cap.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use console::style;
use serde::Serialize;

use beam_core::env::AttackTraits;
use beam_core::{AttackId, AttackTemplate};

use crate::utils;

/// List the attack catalog
#[derive(Parser)]
pub struct Catalog {
    /// Only show attacks whose id, name, or flavour contains this text
    #[arg(short, long, value_name = "TEXT")]
    filter: Option<String>,

    /// Custom data directory (defaults to the bundled content)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Emit JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct CatalogRow {
    id: String,
    name: String,
    flavour: String,
    power_cap: i32,
    damage_at_cap: String,
    tags: Vec<&'static str>,
}

impl CatalogRow {
    fn new(id: &AttackId, template: &AttackTemplate) -> Self {
        let dice = template.damage.dice(template.power_cap);
        let damage_at_cap = if dice.num > 0 && dice.size > 0 {
            format!("{}d{}", dice.num, dice.size)
        } else {
            "-".to_string()
        };
        Self {
            id: id.to_string(),
            name: template.name.clone(),
            flavour: template.flavour.to_string(),
            power_cap: template.power_cap,
            damage_at_cap,
            tags: tags(template),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.id.contains(needle) || self.name.contains(needle) || self.flavour.contains(needle)
    }
}

fn tags(template: &AttackTemplate) -> Vec<&'static str> {
    let mut tags = Vec::new();
    if template.is_enchantment() {
        tags.push("enchantment");
    }
    if template.can_beam {
        tags.push("beam");
    }
    if template.is_explosion {
        tags.push("explosion");
    }
    if template.traits.contains(AttackTraits::SECRETLY_EXPLOSIVE) {
        tags.push("bursts");
    }
    if template.traits.contains(AttackTraits::BIG_CLOUD) {
        tags.push("cloud");
    }
    if template.traits.contains(AttackTraits::SUPERHOT) {
        tags.push("superhot");
    }
    tags
}

impl Catalog {
    pub fn execute(self) -> Result<()> {
        let attacks = utils::factory(self.data_dir).attacks()?;

        let rows: Vec<CatalogRow> = attacks
            .iter()
            .map(|(id, template)| CatalogRow::new(id, template))
            .filter(|row| self.filter.as_deref().is_none_or(|f| row.matches(f)))
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        println!(
            "{}",
            style(format!("=== Attack Catalog ({} of {}) ===", rows.len(), attacks.len()))
                .bold()
                .green()
        );
        println!();
        println!(
            "  {:<24} {:<26} {:<16} {:>5}  {:<7} {}",
            style("ID").bold(),
            style("Name").bold(),
            style("Flavour").bold(),
            style("Cap").bold(),
            style("Damage").bold(),
            style("Tags").bold()
        );
        for row in &rows {
            println!(
                "  {:<24} {:<26} {:<16} {:>5}  {:<7} {}",
                style(&row.id).cyan(),
                row.name,
                style(&row.flavour).yellow(),
                row.power_cap,
                row.damage_at_cap,
                style(row.tags.join(", ")).dim()
            );
        }

        Ok(())
    }
}
