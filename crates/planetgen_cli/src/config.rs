//! Command-line run configuration. Loaded from `planetgen.ron` in the current
//! directory, or from the path given as the first argument.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use planetgen::{BodyKind, PlanetConfig, SurfaceSettings, DEFAULT_BATCH_SIZE};
use serde::{Deserialize, Serialize};

/// Which tile to carve a surface patch for, and where to write it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfacePreview {
    pub tile: usize,
    #[serde(default)]
    pub settings: SurfaceSettings,
    pub out: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Planet, Moon or GasGiant.
    #[serde(default = "default_body")]
    pub body: BodyKind,
    #[serde(default)]
    pub planet: PlanetConfig,
    /// RON biome table merged over the built-in profiles.
    #[serde(default)]
    pub biome_table: Option<PathBuf>,
    /// Tiles per generator step.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Write every tile record here as RON.
    #[serde(default)]
    pub tiles_out: Option<PathBuf>,
    #[serde(default)]
    pub surface: Option<SurfacePreview>,
}

fn default_body() -> BodyKind {
    BodyKind::Planet
}
fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            body: default_body(),
            planet: PlanetConfig::default(),
            biome_table: None,
            batch_size: default_batch_size(),
            tiles_out: None,
            surface: None,
        }
    }
}

impl CliConfig {
    /// Load from `path`, or `planetgen.ron` when none is given. A missing
    /// default file means defaults; a missing explicit file or bad RON is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_config_path(), false),
        };
        if !explicit && !path.exists() {
            log::info!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path).with_context(|| format!("reading config {:?}", path))?;
        Self::from_ron_str(&data).with_context(|| format!("parsing config {:?}", path))
    }

    pub fn from_ron_str(data: &str) -> Result<Self> {
        Ok(ron::from_str(data)?)
    }
}

fn default_config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("planetgen.ron")
}
