//! Generation parameters for one celestial body. Loaded from RON; every field
//! has a default so partial files work.

use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::biome::{BiomeThresholds, WorldFlags};
use crate::caves::CaveSettings;
use crate::climate::ClimateSettings;
use crate::error::{GenError, Result};
use crate::grid::MAX_SUBDIVISION_LEVEL;

/// Closed range `[min, max]` a generator draws sizes from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeRange {
    pub min: f32,
    pub max: f32,
}

impl SizeRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Uniform draw. A collapsed range returns `min` without consuming the rng.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max <= self.min {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }

    pub fn lerp(&self, t: f32) -> f32 {
        self.min + (self.max - self.min) * t.clamp(0.0, 1.0)
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min < 0.0 {
            return Err(GenError::config(format!("{} must be finite and non-negative ({} .. {})", name, self.min, self.max)));
        }
        if self.min > self.max {
            return Err(GenError::config(format!("{} has min {} above max {}", name, self.min, self.max)));
        }
        Ok(())
    }
}

/// Grid rivers and lava flows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiverSettings {
    pub min_count: u32,
    pub max_count: u32,
    /// Tiles a river may cross before it is cut off.
    pub max_length: usize,
    /// Sources must be at least this high...
    pub source_elevation: f32,
    /// ...and at least this wet.
    pub source_moisture: f32,
    /// Elevation removed from every tile a river crosses.
    pub incision: f32,
    /// Channel width on surface patches, fraction of the patch size.
    pub width: SizeRange,
    /// Lava flows traced from volcanic tiles on hot worlds.
    pub lava_flows: u32,
}

impl Default for RiverSettings {
    fn default() -> Self {
        Self {
            min_count: 4,
            max_count: 10,
            max_length: 64,
            source_elevation: 0.6,
            source_moisture: 0.45,
            incision: 0.02,
            width: SizeRange::new(0.04, 0.08),
            lava_flows: 3,
        }
    }
}

impl RiverSettings {
    pub fn validate(&self) -> Result<()> {
        if self.min_count > self.max_count {
            return Err(GenError::config(format!(
                "river count range is inverted ({} .. {})",
                self.min_count, self.max_count
            )));
        }
        if self.max_count == 0 {
            log::warn!("river count range is empty, planets will have no rivers");
        }
        if !(0.0..=1.0).contains(&self.incision) {
            return Err(GenError::config(format!("river incision must lie in [0, 1], got {}", self.incision)));
        }
        self.width.validate("river width")
    }
}

/// Impact craters on moon tiles and on surface patches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CraterSettings {
    pub min_count: u32,
    pub max_count: u32,
    /// Angular radius on the sphere, radians.
    pub radius: SizeRange,
    /// Elevation removed at the crater floor.
    pub depth: SizeRange,
    /// Crater radius on surface patches, fraction of the patch size.
    pub patch_radius: SizeRange,
}

impl Default for CraterSettings {
    fn default() -> Self {
        Self {
            min_count: 6,
            max_count: 14,
            radius: SizeRange::new(0.08, 0.25),
            depth: SizeRange::new(0.05, 0.15),
            patch_radius: SizeRange::new(0.08, 0.2),
        }
    }
}

impl CraterSettings {
    pub fn validate(&self) -> Result<()> {
        if self.min_count > self.max_count {
            return Err(GenError::config(format!(
                "crater count range is inverted ({} .. {})",
                self.min_count, self.max_count
            )));
        }
        self.radius.validate("crater radius")?;
        if self.radius.min <= 0.0 {
            return Err(GenError::config("crater radius must be positive"));
        }
        self.depth.validate("crater depth")?;
        self.patch_radius.validate("crater patch radius")
    }
}

/// Everything needed to generate one planet, moon or gas giant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Signed so a negative level is rejected rather than unrepresentable.
    #[serde(default = "default_subdivision_level")]
    pub subdivision_level: i32,
    #[serde(default = "default_radius")]
    pub radius: f32,
    #[serde(default)]
    pub world: WorldFlags,
    #[serde(default)]
    pub climate: ClimateSettings,
    #[serde(default)]
    pub thresholds: BiomeThresholds,
    /// Frequency range of the continent noise; lower means larger landmasses.
    #[serde(default = "default_continents")]
    pub continents: SizeRange,
    /// Frequency range of the island bumps.
    #[serde(default = "default_islands")]
    pub islands: SizeRange,
    /// Lake radius on surface patches, fraction of the patch size.
    #[serde(default = "default_lakes")]
    pub lakes: SizeRange,
    #[serde(default)]
    pub rivers: RiverSettings,
    #[serde(default)]
    pub caves: CaveSettings,
    #[serde(default)]
    pub craters: CraterSettings,
}

fn default_seed() -> u64 {
    98765
}
fn default_subdivision_level() -> i32 {
    4
}
fn default_radius() -> f32 {
    100.0
}
fn default_continents() -> SizeRange {
    SizeRange::new(0.9, 1.6)
}
fn default_islands() -> SizeRange {
    SizeRange::new(5.0, 8.0)
}
fn default_lakes() -> SizeRange {
    SizeRange::new(0.12, 0.25)
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            subdivision_level: default_subdivision_level(),
            radius: default_radius(),
            world: WorldFlags::default(),
            climate: ClimateSettings::default(),
            thresholds: BiomeThresholds::default(),
            continents: default_continents(),
            islands: default_islands(),
            lakes: default_lakes(),
            rivers: RiverSettings::default(),
            caves: CaveSettings::default(),
            craters: CraterSettings::default(),
        }
    }
}

impl PlanetConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Reject malformed values before any tile work happens.
    pub fn validate(&self) -> Result<()> {
        if !(0..=MAX_SUBDIVISION_LEVEL).contains(&self.subdivision_level) {
            return Err(GenError::InvalidSubdivision {
                level: self.subdivision_level,
                max: MAX_SUBDIVISION_LEVEL,
            });
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(GenError::InvalidRadius(self.radius));
        }
        self.climate.validate()?;
        self.thresholds.validate()?;
        self.continents.validate("continent frequency")?;
        if self.continents.min <= 0.0 {
            return Err(GenError::config("continent frequency must be positive"));
        }
        self.islands.validate("island frequency")?;
        self.lakes.validate("lake radius")?;
        self.rivers.validate()?;
        self.caves.validate()?;
        self.craters.validate()
    }

    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| GenError::Parse {
            what: "planet config",
            message: e.to_string(),
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| GenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()).map_err(|e| GenError::Parse {
            what: "planet config",
            message: e.to_string(),
        })
    }
}
