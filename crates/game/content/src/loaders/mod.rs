//! Content loaders for reading beam data from files.
//!
//! Each loader turns a RON or TOML file into a `beam-core` value or oracle.

pub mod attacks;
pub mod config;
pub mod factory;
pub mod scenario;

pub use attacks::AttackRegistry;
pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use scenario::{ActorSpec, ScenarioLoader, ScenarioRon};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
