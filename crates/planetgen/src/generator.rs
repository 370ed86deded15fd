//! Staged, resumable generation of one celestial body.
//!
//! A [`Generator`] walks `Uninitialized → GridBuilt → ClimateSampled →
//! BiomesAssigned → FeaturesCarved → Finalized`. Per-tile stages advance in
//! batches so a host can interleave other work between [`Generator::step`]
//! calls; the result does not depend on the batch size.

use std::collections::BTreeMap;
use std::ops::Range;

use glam::Vec3;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::biome::{classify, classify_moon, Biome, BiomeTable, Yields, MOON_BIOMES, PLANET_BIOMES};
use crate::caves::grow_cave_clusters;
use crate::climate::{ClimateSample, ClimateSampler, ElevationShape};
use crate::config::PlanetConfig;
use crate::error::{GenError, Result};
use crate::features::{carve_craters, carve_rivers, trace_lava, FlowPath};
use crate::grid::SphereGrid;
use crate::layers::{Heightmap, LayerContext};
use crate::progress::{LogProgress, Progress, ProgressSink};
use crate::sampler::NoiseChannels;
use crate::surface::{generate_surface, SurfaceSettings};

/// Tiles per [`Generator::step`] when the context does not say otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 500;

const SHAPE_SALT: u64 = 0x5ba9_e000;
const PATCH_SEED_MIX: u64 = 0x9e37_79b9_7f4a_7c15;

/// Generation stages in the order they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Constructed and validated, nothing built.
    Uninitialized,
    /// Tile positions and adjacency exist.
    GridBuilt,
    /// Every tile has elevation, moisture and temperature.
    ClimateSampled,
    /// Every tile has a classified biome.
    BiomesAssigned,
    /// Rivers, lava, craters and caves have been applied.
    FeaturesCarved,
    /// Tile records are built and readable.
    Finalized,
}

impl Stage {
    /// The stage after this one, `None` once finalized.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Uninitialized => Some(Stage::GridBuilt),
            Stage::GridBuilt => Some(Stage::ClimateSampled),
            Stage::ClimateSampled => Some(Stage::BiomesAssigned),
            Stage::BiomesAssigned => Some(Stage::FeaturesCarved),
            Stage::FeaturesCarved => Some(Stage::Finalized),
            Stage::Finalized => None,
        }
    }
}

/// What sort of body a generator produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyKind {
    /// Climate-driven biomes with rivers and lava.
    Planet,
    /// Lunar biomes with impact craters and caves.
    Moon,
    /// One impassable biome over the whole sphere.
    GasGiant,
}

impl BodyKind {
    /// Biomes the classifier and feature passes can produce for this body.
    pub fn required_biomes(self) -> &'static [Biome] {
        match self {
            BodyKind::Planet => &PLANET_BIOMES,
            BodyKind::Moon => &MOON_BIOMES,
            BodyKind::GasGiant => &[Biome::GasGiant],
        }
    }
}

/// Collaborators handed to a generator instead of living in globals.
pub struct GenerationContext {
    /// Profiles looked up for every assigned biome.
    pub biomes: BiomeTable,
    /// Receives a report after every step.
    pub progress: Box<dyn ProgressSink>,
    /// Tiles processed per [`Generator::step`] in per-tile stages.
    pub batch_size: usize,
}

impl Default for GenerationContext {
    fn default() -> Self {
        Self {
            biomes: BiomeTable::builtin(),
            progress: Box::new(LogProgress),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl GenerationContext {
    pub fn new(biomes: BiomeTable) -> Self {
        Self {
            biomes,
            ..Self::default()
        }
    }

    pub fn with_progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Box::new(sink);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

/// The persisted result for one tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileRecord {
    pub biome: Biome,
    /// Final elevation in `[0, 1]`, after feature carving.
    pub elevation: f32,
    /// From the biome profile.
    pub is_land: bool,
    /// From the biome profile.
    pub is_passable: bool,
    /// Elevation is above the profile's hill threshold.
    pub is_hill: bool,
    pub yields: Yields,
    /// Generated as part of a moon.
    pub is_moon_tile: bool,
    /// Reserved for tiles between bodies; never set on generated surfaces.
    pub is_space: bool,
    /// Generated as part of a gas giant.
    pub is_gas_giant: bool,
    /// Lies on a traced river.
    pub has_river: bool,
    /// Lies on a traced lava flow.
    pub has_lava: bool,
}

impl TileRecord {
    fn new(kind: BodyKind, table: &BiomeTable, biome: Biome, elevation: f32) -> Result<Self> {
        let profile = table.get(biome)?;
        Ok(Self {
            biome,
            elevation,
            is_land: profile.is_land,
            is_passable: profile.is_passable,
            is_hill: profile.is_hill(elevation),
            yields: profile.yields,
            is_moon_tile: kind == BodyKind::Moon,
            is_space: false,
            is_gas_giant: kind == BodyKind::GasGiant,
            has_river: false,
            has_lava: false,
        })
    }
}

/// Result of one [`Generator::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// More work remains; `Progress` describes the batch just done.
    Pending(Progress),
    /// The generator is finalized; further steps do nothing.
    Finished,
}

/// Builds one body's tiles stage by stage. Owns its grid, climate and
/// records; nothing is shared between generators.
pub struct Generator {
    kind: BodyKind,
    config: PlanetConfig,
    biomes: BiomeTable,
    progress: Box<dyn ProgressSink>,
    batch_size: usize,
    sampler: ClimateSampler,

    stage: Stage,
    cursor: usize,
    grid: Option<SphereGrid>,
    climate: Vec<ClimateSample>,
    elevation: Vec<f32>,
    assigned: Vec<Biome>,
    has_river: Vec<bool>,
    has_lava: Vec<bool>,

    rivers: Vec<FlowPath>,
    lava_flows: Vec<FlowPath>,
    caves: Vec<Vec<usize>>,
    crater_count: usize,
    tiles: Vec<TileRecord>,
}

impl Generator {
    /// Validate everything up front. Nothing is built until the first [`Generator::step`].
    pub fn new(kind: BodyKind, config: PlanetConfig, ctx: GenerationContext) -> Result<Self> {
        config.validate()?;
        if ctx.batch_size == 0 {
            return Err(GenError::config("batch size must be at least 1"));
        }
        ctx.biomes.ensure(kind.required_biomes())?;

        let mut rng = StdRng::seed_from_u64(config.seed ^ SHAPE_SALT);
        let shape = ElevationShape {
            continent_frequency: config.continents.sample(&mut rng) as f64,
            island_frequency: config.islands.sample(&mut rng) as f64,
            sea_level: config.thresholds.ocean,
        };
        let sampler = ClimateSampler::new(NoiseChannels::new(config.seed), config.climate, shape);
        log::info!(
            "{:?} generator: seed {}, subdivision {}, radius {}",
            kind,
            config.seed,
            config.subdivision_level,
            config.radius
        );

        Ok(Self {
            kind,
            config,
            biomes: ctx.biomes,
            progress: ctx.progress,
            batch_size: ctx.batch_size,
            sampler,
            stage: Stage::Uninitialized,
            cursor: 0,
            grid: None,
            climate: Vec::new(),
            elevation: Vec::new(),
            assigned: Vec::new(),
            has_river: Vec::new(),
            has_lava: Vec::new(),
            rivers: Vec::new(),
            lava_flows: Vec::new(),
            caves: Vec::new(),
            crater_count: 0,
            tiles: Vec::new(),
        })
    }

    pub fn planet(config: PlanetConfig, ctx: GenerationContext) -> Result<Self> {
        Self::new(BodyKind::Planet, config, ctx)
    }

    pub fn moon(config: PlanetConfig, ctx: GenerationContext) -> Result<Self> {
        Self::new(BodyKind::Moon, config, ctx)
    }

    pub fn gas_giant(config: PlanetConfig, ctx: GenerationContext) -> Result<Self> {
        Self::new(BodyKind::GasGiant, config, ctx)
    }

    /// Do one batch of work towards the next stage.
    pub fn step(&mut self) -> Result<StepOutcome> {
        let Some(target) = self.stage.next() else {
            return Ok(StepOutcome::Finished);
        };

        let (processed, total) = match target {
            Stage::GridBuilt => {
                let n = self.build_grid()?;
                (n, n)
            }
            Stage::FeaturesCarved => {
                self.carve_features()?;
                let n = self.tile_count();
                (n, n)
            }
            _ => {
                let n = self.tile_count();
                let end = (self.cursor + self.batch_size).min(n);
                self.run_batch(target, self.cursor..end)?;
                self.cursor = end;
                (end, n)
            }
        };

        let progress = Progress {
            stage: target,
            processed,
            total,
        };
        self.progress.report(&progress);

        if processed < total {
            return Ok(StepOutcome::Pending(progress));
        }
        self.stage = target;
        self.cursor = 0;
        log::info!("{:?} reached {:?}", self.kind, target);
        if target == Stage::Finalized {
            // Climate samples do not outlive generation.
            self.climate = Vec::new();
            return Ok(StepOutcome::Finished);
        }
        Ok(StepOutcome::Pending(progress))
    }

    /// Step until finalized.
    pub fn run(&mut self) -> Result<()> {
        while let StepOutcome::Pending(_) = self.step()? {}
        Ok(())
    }

    fn build_grid(&mut self) -> Result<usize> {
        let grid = SphereGrid::build(self.config.subdivision_level, self.config.radius)?;
        let n = grid.tile_count();
        self.climate = vec![ClimateSample::default(); n];
        self.elevation = vec![0.0; n];
        self.assigned = vec![Biome::Ocean; n];
        self.has_river = vec![false; n];
        self.has_lava = vec![false; n];
        self.tiles = Vec::with_capacity(n);
        self.grid = Some(grid);
        Ok(n)
    }

    fn run_batch(&mut self, target: Stage, range: Range<usize>) -> Result<()> {
        let grid = self.grid.as_ref().ok_or(GenError::NotReady {
            what: "sphere grid",
            needed: Stage::GridBuilt,
            current: self.stage,
        })?;
        match target {
            Stage::ClimateSampled => {
                for i in range {
                    self.climate[i] = self.sampler.sample(grid.directions()[i]);
                }
            }
            Stage::BiomesAssigned => {
                for i in range {
                    let sample = &self.climate[i];
                    self.assigned[i] = match self.kind {
                        BodyKind::Planet => classify(sample, &self.config.world, &self.config.thresholds),
                        BodyKind::Moon => classify_moon(sample),
                        BodyKind::GasGiant => Biome::GasGiant,
                    };
                    self.elevation[i] = sample.elevation;
                }
            }
            Stage::Finalized => {
                for i in range {
                    let mut record = TileRecord::new(self.kind, &self.biomes, self.assigned[i], self.elevation[i])?;
                    record.has_river = self.has_river[i];
                    record.has_lava = self.has_lava[i];
                    self.tiles.push(record);
                }
            }
            Stage::Uninitialized | Stage::GridBuilt | Stage::FeaturesCarved => {}
        }
        Ok(())
    }

    fn carve_features(&mut self) -> Result<()> {
        let grid = self.grid.as_ref().ok_or(GenError::NotReady {
            what: "sphere grid",
            needed: Stage::GridBuilt,
            current: self.stage,
        })?;
        let seed = self.config.seed;
        match self.kind {
            BodyKind::Planet => {
                let world = &self.config.world;
                if !(world.infernal || world.demonic) {
                    let moisture: Vec<f32> = self.climate.iter().map(|c| c.moisture).collect();
                    self.rivers = carve_rivers(
                        grid,
                        seed,
                        &self.config.rivers,
                        &mut self.elevation,
                        &moisture,
                        &mut self.assigned,
                        &mut self.has_river,
                    );
                }
                self.lava_flows = trace_lava(
                    grid,
                    seed,
                    &self.config.rivers,
                    &self.elevation,
                    &self.assigned,
                    &mut self.has_lava,
                );
            }
            BodyKind::Moon => {
                self.crater_count = carve_craters(grid, seed, &self.config.craters, &mut self.elevation, &mut self.assigned);
                let caves = &self.config.caves;
                let feature = &self.sampler.channels().feature;
                let qualifies: Vec<bool> = grid
                    .directions()
                    .iter()
                    .map(|&d| feature.sample_scaled(d, caves.noise_frequency) > caves.noise_threshold)
                    .collect();
                self.caves = grow_cave_clusters(grid, &qualifies, caves);
                for &tile in self.caves.iter().flatten() {
                    self.assigned[tile] = Biome::MoonCaves;
                }
            }
            BodyKind::GasGiant => {}
        }
        log::debug!(
            "features: {} rivers, {} lava flows, {} craters, {} cave clusters",
            self.rivers.len(),
            self.lava_flows.len(),
            self.crater_count,
            self.caves.len()
        );
        Ok(())
    }

    fn require(&self, needed: Stage, what: &'static str) -> Result<()> {
        if self.stage < needed {
            return Err(GenError::NotReady {
                what,
                needed,
                current: self.stage,
            });
        }
        Ok(())
    }

    fn out_of_range(&self, index: usize) -> GenError {
        GenError::TileOutOfRange {
            index,
            count: self.tile_count(),
        }
    }

    fn patch_seed(&self, index: usize) -> u64 {
        self.config.seed ^ (index as u64 + 1).wrapping_mul(PATCH_SEED_MIX)
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    pub fn config(&self) -> &PlanetConfig {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_finished(&self) -> bool {
        self.stage == Stage::Finalized
    }

    /// Zero until the grid is built.
    pub fn tile_count(&self) -> usize {
        self.grid.as_ref().map_or(0, SphereGrid::tile_count)
    }

    pub fn grid(&self) -> Option<&SphereGrid> {
        self.grid.as_ref()
    }

    pub fn tile(&self, index: usize) -> Result<&TileRecord> {
        self.require(Stage::Finalized, "tile records")?;
        self.tiles.get(index).ok_or_else(|| self.out_of_range(index))
    }

    pub fn tiles(&self) -> Result<&[TileRecord]> {
        self.require(Stage::Finalized, "tile records")?;
        Ok(&self.tiles)
    }

    pub fn neighbors(&self, index: usize) -> Result<&[usize]> {
        self.require(Stage::GridBuilt, "neighbors")?;
        self.grid
            .as_ref()
            .and_then(|g| g.neighbors(index))
            .ok_or_else(|| self.out_of_range(index))
    }

    /// Unit direction from the body center.
    pub fn tile_direction(&self, index: usize) -> Result<Vec3> {
        self.require(Stage::GridBuilt, "tile positions")?;
        self.grid
            .as_ref()
            .and_then(|g| g.direction(index))
            .ok_or_else(|| self.out_of_range(index))
    }

    /// Center scaled to the body radius.
    pub fn tile_center(&self, index: usize) -> Result<Vec3> {
        self.require(Stage::GridBuilt, "tile positions")?;
        self.grid
            .as_ref()
            .and_then(|g| g.center(index))
            .ok_or_else(|| self.out_of_range(index))
    }

    /// Replace a tile's biome after generation. Yields and flags follow the
    /// new profile; elevation, river and lava flags are kept.
    pub fn set_tile_biome(&mut self, index: usize, biome: Biome) -> Result<()> {
        let old = self.tile(index)?;
        let mut record = TileRecord::new(self.kind, &self.biomes, biome, old.elevation)?;
        record.has_river = old.has_river;
        record.has_lava = old.has_lava;
        self.tiles[index] = record;
        Ok(())
    }

    /// Tile count per biome. Empty until finalized.
    pub fn biome_census(&self) -> BTreeMap<Biome, usize> {
        let mut census = BTreeMap::new();
        if !self.is_finished() {
            return census;
        }
        for tile in &self.tiles {
            *census.entry(tile.biome).or_insert(0) += 1;
        }
        census
    }

    /// Tile indices of each accepted cave cluster. Moons only.
    pub fn cave_clusters(&self) -> &[Vec<usize>] {
        &self.caves
    }

    pub fn rivers(&self) -> &[FlowPath] {
        &self.rivers
    }

    pub fn lava_flows(&self) -> &[FlowPath] {
        &self.lava_flows
    }

    pub fn crater_count(&self) -> usize {
        self.crater_count
    }

    /// Carve a local heightmap for one tile from its biome and recomputed climate.
    pub fn surface_heightmap(&self, index: usize, settings: &SurfaceSettings) -> Result<Heightmap> {
        let record = self.tile(index)?;
        if self.kind == BodyKind::GasGiant {
            return Err(GenError::config("gas giants have no surface to carve"));
        }
        let climate = self.sampler.sample(self.tile_direction(index)?);
        let ctx = LayerContext {
            biome: record.biome,
            profile: self.biomes.get(record.biome)?.clone(),
            climate: ClimateSample {
                elevation: record.elevation,
                ..climate
            },
            seed: self.patch_seed(index),
        };
        generate_surface(&ctx, &self.config, settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::{BiomeProfile, WorldFlags};
    use crate::progress::NullProgress;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn quiet() -> GenerationContext {
        GenerationContext::default().with_progress(NullProgress)
    }

    fn level(subdivision_level: i32) -> PlanetConfig {
        PlanetConfig {
            subdivision_level,
            ..Default::default()
        }
    }

    fn finished_planet(config: PlanetConfig) -> Generator {
        let mut gen = Generator::planet(config, quiet()).unwrap();
        gen.run().unwrap();
        gen
    }

    #[test]
    fn level_four_planet_matches_the_icosphere() {
        let gen = finished_planet(PlanetConfig::default());
        assert_eq!(gen.tile_count(), 642);
        let mut pentagons = 0;
        for i in 0..gen.tile_count() {
            match gen.neighbors(i).unwrap().len() {
                5 => pentagons += 1,
                6 => {}
                n => panic!("tile {} has {} neighbors", i, n),
            }
            assert!((gen.tile_center(i).unwrap().length() - 100.0).abs() < 1e-3);
        }
        assert_eq!(pentagons, 12);
    }

    #[test]
    fn generation_is_deterministic() {
        let a = finished_planet(PlanetConfig::default());
        let b = finished_planet(PlanetConfig::default());
        let ra = ron::to_string(a.tiles().unwrap()).unwrap();
        let rb = ron::to_string(b.tiles().unwrap()).unwrap();
        assert_eq!(ra, rb);
        assert_eq!(a.rivers(), b.rivers());

        let c = finished_planet(PlanetConfig::default().with_seed(1));
        assert_ne!(a.tiles().unwrap(), c.tiles().unwrap());
    }

    #[test]
    fn every_tile_gets_exactly_one_record() {
        let gen = finished_planet(level(3));
        assert_eq!(gen.tiles().unwrap().len(), gen.tile_count());
        assert_eq!(gen.biome_census().values().sum::<usize>(), gen.tile_count());
    }

    #[test]
    fn census_waits_for_the_last_batch() {
        let mut gen = Generator::planet(level(3), quiet().with_batch_size(100)).unwrap();
        while gen.stage() < Stage::FeaturesCarved {
            gen.step().unwrap();
        }
        // 162 tiles: the first finalize batch leaves 62 records unbuilt.
        assert!(matches!(gen.step().unwrap(), StepOutcome::Pending(p) if p.stage == Stage::Finalized && p.processed == 100));
        assert!(gen.biome_census().is_empty());

        gen.run().unwrap();
        assert_eq!(gen.biome_census().values().sum::<usize>(), 162);
    }

    #[test]
    fn batch_size_does_not_change_the_result() {
        let mut small = Generator::planet(level(3), quiet().with_batch_size(7)).unwrap();
        let mut large = Generator::planet(level(3), quiet().with_batch_size(100_000)).unwrap();
        small.run().unwrap();
        large.run().unwrap();
        assert_eq!(small.tiles().unwrap(), large.tiles().unwrap());
    }

    #[test]
    fn stages_advance_in_order_and_report_progress() {
        let reports = Rc::new(RefCell::new(Vec::new()));
        let sink = {
            let reports = Rc::clone(&reports);
            move |p: &Progress| reports.borrow_mut().push(*p)
        };
        let ctx = quiet().with_progress(sink).with_batch_size(100);
        let mut gen = Generator::planet(level(3), ctx).unwrap();
        assert_eq!(gen.stage(), Stage::Uninitialized);

        let mut last = gen.stage();
        let mut steps = 0;
        while let StepOutcome::Pending(p) = gen.step().unwrap() {
            assert!(p.processed <= p.total);
            assert!(gen.stage() >= last);
            last = gen.stage();
            steps += 1;
        }
        assert!(gen.is_finished());
        assert_eq!(gen.step().unwrap(), StepOutcome::Finished);

        // 162 tiles in batches of 100: two batches for each of three per-tile stages.
        let reports = reports.borrow();
        assert_eq!(reports.len(), 1 + 2 + 2 + 1 + 2);
        assert_eq!(steps, reports.len() - 1);
        assert_eq!(reports.last().map(|p| p.stage), Some(Stage::Finalized));
        assert!(reports.windows(2).all(|w| w[0].stage <= w[1].stage));
    }

    #[test]
    fn accessors_distinguish_not_ready_from_out_of_range() {
        let mut gen = Generator::planet(level(2), quiet()).unwrap();
        assert!(matches!(gen.tile(0), Err(GenError::NotReady { .. })));
        assert!(matches!(gen.neighbors(0), Err(GenError::NotReady { .. })));
        gen.step().unwrap();
        assert!(gen.neighbors(0).is_ok());
        assert!(matches!(gen.tile(0), Err(GenError::NotReady { .. })));

        gen.run().unwrap();
        let count = gen.tile_count();
        assert!(gen.tile(count - 1).is_ok());
        assert!(matches!(
            gen.tile(count),
            Err(GenError::TileOutOfRange { index, count: c }) if index == count && c == count
        ));
        assert!(matches!(gen.tile_center(count), Err(GenError::TileOutOfRange { .. })));
    }

    #[test]
    fn missing_biome_is_fatal_at_construction() {
        let mut table = BiomeTable::builtin();
        table.remove(Biome::Desert);
        let err = Generator::planet(PlanetConfig::default(), GenerationContext::new(table.clone()).with_progress(NullProgress));
        assert!(matches!(err, Err(GenError::MissingBiome(Biome::Desert))));
        // Moons never produce deserts.
        assert!(Generator::moon(PlanetConfig::default(), GenerationContext::new(table).with_progress(NullProgress)).is_ok());
    }

    #[test]
    fn invalid_config_is_rejected_before_any_work() {
        assert!(matches!(
            Generator::planet(level(-1), quiet()),
            Err(GenError::InvalidSubdivision { level: -1, .. })
        ));
        let flat = PlanetConfig {
            radius: 0.0,
            ..Default::default()
        };
        assert!(matches!(Generator::planet(flat, quiet()), Err(GenError::InvalidRadius(_))));
        assert!(matches!(
            Generator::planet(PlanetConfig::default(), quiet().with_batch_size(0)),
            Err(GenError::InvalidConfig(_))
        ));
    }

    #[test]
    fn set_tile_biome_updates_yields() {
        let mut table = BiomeTable::builtin();
        table.remove(Biome::GasGiant);
        let mut gen = Generator::planet(level(2), GenerationContext::new(table).with_progress(NullProgress)).unwrap();
        gen.run().unwrap();

        gen.set_tile_biome(3, Biome::Desert).unwrap();
        let tile = gen.tile(3).unwrap();
        assert_eq!(tile.biome, Biome::Desert);
        assert_eq!(tile.yields, BiomeProfile::builtin(Biome::Desert).yields);
        assert!(tile.is_land);

        assert!(matches!(gen.set_tile_biome(3, Biome::GasGiant), Err(GenError::MissingBiome(Biome::GasGiant))));
        assert_eq!(gen.tile(3).unwrap().biome, Biome::Desert);
        assert!(gen.set_tile_biome(9999, Biome::Plains).is_err());
    }

    #[test]
    fn rivers_are_flagged_on_their_tiles() {
        let gen = finished_planet(PlanetConfig::default());
        let tiles = gen.tiles().unwrap();
        for river in gen.rivers() {
            for &t in &river.tiles {
                assert!(tiles[t].has_river);
            }
        }
        let flagged = tiles.iter().filter(|t| t.has_river).count();
        assert_eq!(flagged, gen.rivers().iter().map(|r| r.tiles.len()).sum::<usize>());
    }

    #[test]
    fn ice_worlds_have_no_temperate_biomes() {
        let config = PlanetConfig {
            world: WorldFlags {
                ice: true,
                ..Default::default()
            },
            ..level(3)
        };
        let census = finished_planet(config).biome_census();
        for biome in [Biome::Forest, Biome::Grassland, Biome::Desert, Biome::Rainforest] {
            assert!(!census.contains_key(&biome), "{:?} on an ice world", biome);
        }
    }

    #[test]
    fn moons_have_lunar_tiles_craters_and_bounded_caves() {
        let mut gen = Generator::moon(PlanetConfig::default(), quiet()).unwrap();
        gen.run().unwrap();
        assert!(gen.crater_count() > 0);
        let tiles = gen.tiles().unwrap();
        assert!(tiles.iter().all(|t| t.is_moon_tile && !t.is_gas_giant && t.biome.is_moon()));
        let caves = &gen.config().caves;
        for cluster in gen.cave_clusters() {
            assert!(cluster.len() >= caves.min_cluster_size && cluster.len() <= caves.max_cluster_size);
            assert!(cluster.iter().all(|&t| tiles[t].biome == Biome::MoonCaves));
        }
        assert!(gen.biome_census().contains_key(&Biome::MoonCraters));
    }

    #[test]
    fn moon_generation_is_deterministic() {
        let run = |seed| {
            let mut gen = Generator::moon(PlanetConfig::default().with_seed(seed), quiet()).unwrap();
            gen.run().unwrap();
            gen
        };
        let a = run(321);
        let b = run(321);
        assert_eq!(a.tiles().unwrap(), b.tiles().unwrap());
        assert_eq!(a.cave_clusters(), b.cave_clusters());
        assert_eq!(a.crater_count(), b.crater_count());

        let c = run(322);
        assert_ne!(a.tiles().unwrap(), c.tiles().unwrap());
    }

    #[test]
    fn gas_giants_are_impassable() {
        let mut gen = Generator::gas_giant(level(2), quiet()).unwrap();
        gen.run().unwrap();
        assert!(gen
            .tiles()
            .unwrap()
            .iter()
            .all(|t| t.biome == Biome::GasGiant && t.is_gas_giant && !t.is_land && !t.is_passable));
        assert!(gen.surface_heightmap(0, &SurfaceSettings::default()).is_err());
    }

    #[test]
    fn surface_heightmaps_are_deterministic_per_tile() {
        let gen = finished_planet(level(3));
        let settings = SurfaceSettings {
            resolution: 33,
            map_size: 64.0,
            ..Default::default()
        };
        let a = gen.surface_heightmap(10, &settings).unwrap();
        let b = gen.surface_heightmap(10, &settings).unwrap();
        assert_eq!(a, b);
        assert!(a.heights().iter().all(|h| (0.0..=1.0).contains(h)));
        assert!(matches!(
            gen.surface_heightmap(gen.tile_count(), &settings),
            Err(GenError::TileOutOfRange { .. })
        ));
    }
}
