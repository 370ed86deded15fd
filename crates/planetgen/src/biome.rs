//! Biome identifiers, per-biome profiles and the climate → biome classifier.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::climate::ClimateSample;
use crate::error::{GenError, Result};
use crate::sampler::FractalSettings;

/// Terrain/climate category of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Biome {
    Ocean,
    Coast,
    Lake,
    Plains,
    Grassland,
    Forest,
    Rainforest,
    Marsh,
    Floodplain,
    Savannah,
    Desert,
    Taiga,
    Tundra,
    Snow,
    Glacier,
    Mountains,
    /// Active volcanic highland.
    Volcanic,
    /// Ash-covered lowland around volcanic regions.
    Ashlands,
    /// Sulphur/magma sea on infernal worlds.
    Brimstone,
    Hellscape,
    Demonic,
    /// Sun-baked barren land on scorched worlds.
    Scorched,
    MoonMaria,
    MoonHighlands,
    MoonDunes,
    MoonCraters,
    MoonCaves,
    GasGiant,
}

/// Every biome, for iteration and table validation.
pub const ALL_BIOMES: [Biome; 28] = [
    Biome::Ocean,
    Biome::Coast,
    Biome::Lake,
    Biome::Plains,
    Biome::Grassland,
    Biome::Forest,
    Biome::Rainforest,
    Biome::Marsh,
    Biome::Floodplain,
    Biome::Savannah,
    Biome::Desert,
    Biome::Taiga,
    Biome::Tundra,
    Biome::Snow,
    Biome::Glacier,
    Biome::Mountains,
    Biome::Volcanic,
    Biome::Ashlands,
    Biome::Brimstone,
    Biome::Hellscape,
    Biome::Demonic,
    Biome::Scorched,
    Biome::MoonMaria,
    Biome::MoonHighlands,
    Biome::MoonDunes,
    Biome::MoonCraters,
    Biome::MoonCaves,
    Biome::GasGiant,
];

/// Biomes a planet classifier can produce.
pub const PLANET_BIOMES: [Biome; 22] = [
    Biome::Ocean,
    Biome::Coast,
    Biome::Lake,
    Biome::Plains,
    Biome::Grassland,
    Biome::Forest,
    Biome::Rainforest,
    Biome::Marsh,
    Biome::Floodplain,
    Biome::Savannah,
    Biome::Desert,
    Biome::Taiga,
    Biome::Tundra,
    Biome::Snow,
    Biome::Glacier,
    Biome::Mountains,
    Biome::Volcanic,
    Biome::Ashlands,
    Biome::Brimstone,
    Biome::Hellscape,
    Biome::Demonic,
    Biome::Scorched,
];

/// Biomes a moon can end up with after crater and cave carving.
pub const MOON_BIOMES: [Biome; 5] = [
    Biome::MoonMaria,
    Biome::MoonHighlands,
    Biome::MoonDunes,
    Biome::MoonCraters,
    Biome::MoonCaves,
];

impl Biome {
    /// Open or frozen water surface.
    pub fn is_water(self) -> bool {
        matches!(self, Biome::Ocean | Biome::Coast | Biome::Lake | Biome::Brimstone)
    }

    pub fn is_moon(self) -> bool {
        MOON_BIOMES.contains(&self)
    }

    /// Biomes hot enough to feed lava flows.
    pub fn is_volcanic(self) -> bool {
        matches!(
            self,
            Biome::Volcanic | Biome::Ashlands | Biome::Hellscape | Biome::Demonic | Biome::Brimstone
        )
    }
}

/// Per-turn tile output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Yields {
    pub food: i32,
    pub production: i32,
    pub gold: i32,
    pub science: i32,
    pub culture: i32,
}

impl Yields {
    pub const fn new(food: i32, production: i32, gold: i32, science: i32, culture: i32) -> Self {
        Self {
            food,
            production,
            gold,
            science,
            culture,
        }
    }

    pub fn total(&self) -> i32 {
        self.food + self.production + self.gold + self.science + self.culture
    }
}

/// Static data shared by every tile of one biome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomeProfile {
    pub yields: Yields,
    pub is_land: bool,
    pub is_passable: bool,
    /// Base height of local surface patches, `[0, 1]`.
    pub base_height: f32,
    /// Amplitude of surface noise on top of `base_height`.
    pub roughness: f32,
    pub octaves: u32,
    pub lacunarity: f64,
    pub persistence: f64,
    /// Tile elevation above which the tile counts as hilly.
    pub hill_threshold: f32,
    /// Tile elevation above which the tile is too steep for hills (mountain range).
    pub mountain_threshold: f32,
}

impl BiomeProfile {
    /// Fractal settings for surface patches of this biome.
    pub fn fractal(&self, frequency: f64) -> FractalSettings {
        FractalSettings {
            frequency,
            octaves: self.octaves,
            lacunarity: self.lacunarity,
            persistence: self.persistence,
        }
    }

    /// Whether a tile at `elevation` carries the hill flag.
    pub fn is_hill(&self, elevation: f32) -> bool {
        self.is_land && elevation >= self.hill_threshold && elevation < self.mountain_threshold
    }

    /// Built-in profile for a biome.
    pub fn builtin(biome: Biome) -> Self {
        let (yields, land, passable, base_height, roughness, octaves) = match biome {
            Biome::Ocean => (Yields::new(1, 0, 1, 0, 0), false, false, 0.05, 0.05, 3),
            Biome::Coast => (Yields::new(1, 0, 2, 0, 0), false, false, 0.15, 0.05, 3),
            Biome::Lake => (Yields::new(2, 0, 1, 0, 0), false, false, 0.12, 0.03, 3),
            Biome::Plains => (Yields::new(1, 1, 0, 0, 0), true, true, 0.35, 0.10, 4),
            Biome::Grassland => (Yields::new(2, 0, 0, 0, 0), true, true, 0.33, 0.08, 4),
            Biome::Forest => (Yields::new(1, 2, 0, 0, 0), true, true, 0.38, 0.15, 5),
            Biome::Rainforest => (Yields::new(2, 1, 0, 1, 0), true, true, 0.36, 0.18, 5),
            Biome::Marsh => (Yields::new(1, 0, 0, 0, 1), true, true, 0.24, 0.05, 3),
            Biome::Floodplain => (Yields::new(3, 0, 0, 0, 0), true, true, 0.26, 0.04, 3),
            Biome::Savannah => (Yields::new(1, 1, 1, 0, 0), true, true, 0.34, 0.08, 4),
            Biome::Desert => (Yields::new(0, 0, 1, 0, 0), true, true, 0.32, 0.12, 4),
            Biome::Taiga => (Yields::new(0, 2, 0, 0, 0), true, true, 0.40, 0.16, 5),
            Biome::Tundra => (Yields::new(1, 0, 0, 0, 0), true, true, 0.36, 0.10, 4),
            Biome::Snow => (Yields::new(0, 0, 0, 1, 0), true, true, 0.42, 0.10, 4),
            Biome::Glacier => (Yields::new(0, 0, 0, 1, 0), true, false, 0.50, 0.12, 5),
            Biome::Mountains => (Yields::new(0, 1, 0, 0, 1), true, false, 0.70, 0.35, 6),
            Biome::Volcanic => (Yields::new(0, 3, 0, 1, 0), true, false, 0.65, 0.30, 6),
            Biome::Ashlands => (Yields::new(0, 2, 0, 0, 0), true, true, 0.34, 0.12, 4),
            Biome::Brimstone => (Yields::new(0, 1, 2, 0, 0), false, false, 0.10, 0.06, 3),
            Biome::Hellscape => (Yields::new(0, 2, 1, 0, 0), true, true, 0.40, 0.25, 5),
            Biome::Demonic => (Yields::new(0, 1, 1, 0, 2), true, true, 0.42, 0.22, 5),
            Biome::Scorched => (Yields::new(0, 1, 1, 0, 0), true, true, 0.36, 0.14, 4),
            Biome::MoonMaria => (Yields::new(0, 1, 0, 1, 0), true, true, 0.30, 0.06, 3),
            Biome::MoonHighlands => (Yields::new(0, 2, 0, 1, 0), true, true, 0.55, 0.20, 5),
            Biome::MoonDunes => (Yields::new(0, 0, 1, 1, 0), true, true, 0.38, 0.10, 4),
            Biome::MoonCraters => (Yields::new(0, 1, 1, 2, 0), true, true, 0.28, 0.25, 5),
            Biome::MoonCaves => (Yields::new(0, 2, 2, 2, 0), true, true, 0.35, 0.18, 4),
            Biome::GasGiant => (Yields::new(0, 0, 0, 2, 0), false, false, 0.50, 0.00, 1),
        };

        Self {
            yields,
            is_land: land,
            is_passable: passable,
            base_height,
            roughness,
            octaves,
            lacunarity: 2.0,
            persistence: 0.5,
            hill_threshold: 0.62,
            mountain_threshold: 0.78,
        }
    }
}

/// Lookup from biome to profile. Missing entries are a hard error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BiomeTable {
    profiles: HashMap<Biome, BiomeProfile>,
}

impl BiomeTable {
    /// An empty table; populate it with [`BiomeTable::insert`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding the built-in profile of every biome.
    pub fn builtin() -> Self {
        Self {
            profiles: ALL_BIOMES
                .iter()
                .map(|&b| (b, BiomeProfile::builtin(b)))
                .collect(),
        }
    }

    /// Parse a table from RON (a map of biome → profile).
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| GenError::Parse {
            what: "biome table",
            message: e.to_string(),
        })
    }

    /// Load a RON table from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| GenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    pub fn insert(&mut self, biome: Biome, profile: BiomeProfile) -> Option<BiomeProfile> {
        self.profiles.insert(biome, profile)
    }

    pub fn remove(&mut self, biome: Biome) -> Option<BiomeProfile> {
        self.profiles.remove(&biome)
    }

    /// Overlay every entry of `other` on top of this table.
    pub fn merge(&mut self, other: BiomeTable) {
        self.profiles.extend(other.profiles);
    }

    pub fn contains(&self, biome: Biome) -> bool {
        self.profiles.contains_key(&biome)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn get(&self, biome: Biome) -> Result<&BiomeProfile> {
        self.profiles.get(&biome).ok_or(GenError::MissingBiome(biome))
    }

    /// Fail on the first biome of `required` that has no profile.
    pub fn ensure(&self, required: &[Biome]) -> Result<()> {
        match required.iter().find(|b| !self.contains(**b)) {
            Some(&missing) => Err(GenError::MissingBiome(missing)),
            None => Ok(()),
        }
    }
}

/// World-type overrides that force specific biome families.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldFlags {
    pub infernal: bool,
    pub demonic: bool,
    pub scorched: bool,
    pub ice: bool,
    pub rainforest: bool,
    pub monsoon: bool,
    pub volcanic: bool,
}

/// Threshold bands used by the classifier. Values are on the `[0, 1]` climate scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeThresholds {
    /// Below this elevation a tile is open ocean.
    pub ocean: f32,
    /// Below this elevation (and above `ocean`) a tile is coast.
    pub coast: f32,
    /// Above this elevation a tile is mountains.
    pub mountain: f32,
    /// Below this temperature land is snow.
    pub frozen: f32,
    /// Below this temperature land is tundra/taiga.
    pub cold: f32,
    /// Above this temperature land is tropical.
    pub hot: f32,
    /// Below this moisture land is arid.
    pub dry: f32,
    /// Above this moisture land is wet.
    pub wet: f32,
}

impl Default for BiomeThresholds {
    fn default() -> Self {
        Self {
            ocean: 0.40,
            coast: 0.46,
            mountain: 0.80,
            frozen: 0.12,
            cold: 0.25,
            hot: 0.68,
            dry: 0.22,
            wet: 0.72,
        }
    }
}

impl BiomeThresholds {
    pub fn validate(&self) -> Result<()> {
        let in_unit = [
            self.ocean,
            self.coast,
            self.mountain,
            self.frozen,
            self.cold,
            self.hot,
            self.dry,
            self.wet,
        ]
        .iter()
        .all(|v| (0.0..=1.0).contains(v));
        if !in_unit {
            return Err(GenError::config("biome thresholds must lie in [0, 1]"));
        }
        if !(self.ocean < self.coast && self.coast < self.mountain) {
            return Err(GenError::config(format!(
                "elevation thresholds must satisfy ocean < coast < mountain ({} / {} / {})",
                self.ocean, self.coast, self.mountain
            )));
        }
        if !(self.frozen < self.cold && self.cold < self.hot) {
            return Err(GenError::config("temperature thresholds must satisfy frozen < cold < hot"));
        }
        if self.dry >= self.wet {
            return Err(GenError::config("moisture thresholds must satisfy dry < wet"));
        }
        Ok(())
    }
}

/// Classify a planet tile. Pure: the same inputs always give the same biome.
///
/// World-type overrides are checked first (demonic, infernal, scorched, ice,
/// then the rainforest/monsoon modifiers), then the standard ladder runs from
/// deep water up to mountains and from frozen to tropical.
pub fn classify(sample: &ClimateSample, world: &WorldFlags, t: &BiomeThresholds) -> Biome {
    let ClimateSample {
        elevation: e,
        moisture: m,
        temperature: temp,
    } = *sample;

    if world.demonic {
        return if e < t.ocean {
            Biome::Brimstone
        } else if e > t.mountain {
            Biome::Volcanic
        } else if m > 0.5 {
            Biome::Demonic
        } else {
            Biome::Hellscape
        };
    }

    if world.infernal {
        return if e < t.ocean {
            Biome::Brimstone
        } else if e > t.mountain {
            Biome::Volcanic
        } else if e < t.coast || m > t.wet {
            Biome::Ashlands
        } else {
            Biome::Hellscape
        };
    }

    if world.scorched {
        return if e < t.ocean * 0.75 {
            Biome::Ocean
        } else if e < t.ocean {
            Biome::Coast
        } else if e > t.mountain {
            Biome::Mountains
        } else if m > t.wet {
            Biome::Savannah
        } else if temp > t.hot {
            Biome::Scorched
        } else {
            Biome::Desert
        };
    }

    if world.ice {
        return if e < t.ocean {
            if temp > t.cold { Biome::Ocean } else { Biome::Glacier }
        } else if e > t.mountain {
            Biome::Mountains
        } else if temp > t.hot {
            Biome::Tundra
        } else if m > 0.5 {
            Biome::Snow
        } else {
            Biome::Glacier
        };
    }

    if e < t.ocean {
        return Biome::Ocean;
    }
    if e < t.coast {
        return Biome::Coast;
    }
    if world.volcanic && e > t.mountain - 0.05 && temp > t.cold {
        return Biome::Volcanic;
    }
    if e > t.mountain {
        return Biome::Mountains;
    }

    if world.rainforest && temp > t.cold && m > t.dry {
        return Biome::Rainforest;
    }
    if world.monsoon && e < t.coast + 0.08 && m > 0.5 {
        return Biome::Floodplain;
    }

    if temp < t.frozen {
        return Biome::Snow;
    }
    if temp < t.cold {
        return if m > 0.5 { Biome::Taiga } else { Biome::Tundra };
    }
    if temp > t.hot {
        return if m > t.wet {
            Biome::Rainforest
        } else if m > t.dry + 0.15 {
            Biome::Savannah
        } else {
            Biome::Desert
        };
    }
    if m < t.dry {
        return Biome::Plains;
    }
    if m > t.wet + 0.1 {
        return Biome::Marsh;
    }
    if m > 0.5 {
        Biome::Forest
    } else {
        Biome::Grassland
    }
}

/// Classify a moon tile. Moisture stands in for regolith looseness.
pub fn classify_moon(sample: &ClimateSample) -> Biome {
    if sample.elevation < 0.35 {
        Biome::MoonMaria
    } else if sample.elevation > 0.68 {
        Biome::MoonHighlands
    } else if sample.moisture > 0.55 {
        Biome::MoonDunes
    } else if sample.elevation < 0.5 {
        Biome::MoonMaria
    } else {
        Biome::MoonHighlands
    }
}
