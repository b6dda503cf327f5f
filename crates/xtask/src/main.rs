//! Development tasks for the beam simulator
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;
mod utils;

use anyhow::Result;
use clap::Parser;
use commands::{Catalog, Fire, Footprint};

/// Development tasks for the beam simulator
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for beam", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Fire a catalog attack into a scenario, live or as a tracer
    Fire(Fire),

    /// List the attack catalog
    Catalog(Catalog),

    /// Print the flood-fill cost map of an explosion
    Footprint(Footprint),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Fire(cmd) => cmd.execute(),
        Command::Catalog(cmd) => cmd.execute(),
        Command::Footprint(cmd) => cmd.execute(),
    }
}
