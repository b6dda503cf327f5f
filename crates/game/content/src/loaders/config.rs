//! Beam configuration loader.

use std::path::Path;

use beam_core::BeamConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for beam tunables from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Keys left out of the file keep their [`BeamConfig::default`] values.
    pub fn load(path: &Path) -> LoadResult<BeamConfig> {
        let content = read_file(path)?;
        Self::from_str(&content)
    }

    /// Parse config data from TOML text.
    pub fn from_str(content: &str) -> LoadResult<BeamConfig> {
        let config: BeamConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.default_range < 0 {
            anyhow::bail!("default_range must not be negative (got {})", config.default_range);
        }
        for (key, ratio) in [
            ("default_foe_ratio", config.default_foe_ratio),
            ("summoned_foe_ratio", config.summoned_foe_ratio),
            ("player_foe_ratio", config.player_foe_ratio),
        ] {
            if !(0..=100).contains(&ratio) {
                anyhow::bail!("{} must be a percentage (got {})", key, ratio);
            }
        }

        Ok(config)
    }
}
