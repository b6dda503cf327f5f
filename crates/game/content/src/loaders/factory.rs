//! Content factory for building oracles from data files.

use std::path::{Path, PathBuf};

use beam_core::{BeamConfig, World};

use crate::loaders::{AttackRegistry, ConfigLoader, LoadResult, ScenarioLoader};

/// Content factory that loads all beam content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── attacks.ron        (optional, overrides the embedded catalog)
/// └── scenarios/
///     ├── corridor.ron
///     └── mine.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Path to the directory containing data files
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Factory over the data directory shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
    }

    /// Load beam tunables from `config.toml`.
    pub fn load_config(&self) -> LoadResult<BeamConfig> {
        let path = self.data_dir.join("config.toml");
        ConfigLoader::load(&path)
    }

    /// Load a scenario from `scenarios/{name}.ron`.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the scenario file (without `.ron` extension)
    pub fn load_scenario(&self, name: &str) -> LoadResult<World> {
        let path = self.scenario_path(name);
        ScenarioLoader::load(&path)
    }

    /// Attack catalog: `attacks.ron` from the data directory when present,
    /// the embedded catalog otherwise.
    pub fn attacks(&self) -> LoadResult<AttackRegistry> {
        let path = self.data_dir.join("attacks.ron");
        if path.is_file() {
            AttackRegistry::load_file(&path)
        } else {
            AttackRegistry::load()
        }
    }

    /// Names of every scenario in `scenarios/`, sorted.
    pub fn scenario_names(&self) -> LoadResult<Vec<String>> {
        let dir = self.data_dir.join("scenarios");
        let entries = std::fs::read_dir(&dir)
            .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "ron")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn scenario_path(&self, name: &str) -> PathBuf {
        self.data_dir.join("scenarios").join(format!("{}.ron", name))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
