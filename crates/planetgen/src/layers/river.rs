use glam::Vec2;
use rand::prelude::*;

use crate::config::SizeRange;

use super::shape::{polyline_distance, smoothstep};
use super::{water_ceiling, Heightmap, LayerContext, TerrainLayer, RIVER_PRIORITY, WATER_LEVEL};

pub const RIVER_MOISTURE_THRESHOLD: f32 = 0.3;
/// Frozen patches get no running water.
pub const RIVER_MIN_TEMPERATURE: f32 = 0.1;
/// Chance a qualifying patch actually gets a river.
pub const RIVER_CHANCE: f64 = 0.75;

const RIVER_SALT: u64 = 0x71ae_0002;

/// Fraction of the half-width that is flat channel bottom.
pub(super) const CHANNEL_FLOOR: f32 = 0.3;

/// A meandering centerline across the patch in `[0, 1]²` patch fractions.
/// Starts and ends just outside the patch so the channel runs off both edges.
pub(super) fn meander(rng: &mut StdRng, points: usize) -> Vec<Vec2> {
    let points = points.max(2);
    let mut v: f32 = rng.gen_range(0.2..0.8);
    let vertical = rng.gen_bool(0.5);
    (0..points)
        .map(|i| {
            let u = -0.05 + 1.1 * i as f32 / (points - 1) as f32;
            if i > 0 {
                v = (v + rng.gen_range(-0.15..0.15)).clamp(0.1, 0.9);
            }
            if vertical {
                Vec2::new(v, u)
            } else {
                Vec2::new(u, v)
            }
        })
        .collect()
}

/// Carve a channel of `half_width` around `line` down to `bed`.
pub(super) fn carve_channel(map: &mut Heightmap, line: &[Vec2], half_width: f32, bed: f32) {
    let world: Vec<Vec2> = line.iter().map(|p| map.at_fraction(p.x, p.y)).collect();
    let half_width = half_width * map.map_size();
    map.update(|p, h| {
        let falloff = 1.0 - smoothstep(CHANNEL_FLOOR, 1.0, polyline_distance(p, &world) / half_width);
        h.min(water_ceiling(bed, falloff))
    });
}

/// A river channel crossing the patch.
#[derive(Debug, Clone)]
pub struct RiverTerrainLayer {
    enabled: bool,
    line: Vec<Vec2>,
    half_width: f32,
    depth: f32,
}

impl RiverTerrainLayer {
    pub fn new(ctx: &LayerContext, width: SizeRange) -> Self {
        let mut rng = StdRng::seed_from_u64(ctx.seed ^ RIVER_SALT);
        let drawn = rng.gen_bool(RIVER_CHANCE);
        let line = meander(&mut rng, 5);
        let half_width = width.sample(&mut rng) * 0.5;
        let depth = rng.gen_range(0.04..0.09);
        Self {
            enabled: drawn
                && ctx.climate.moisture > RIVER_MOISTURE_THRESHOLD
                && ctx.climate.temperature > RIVER_MIN_TEMPERATURE
                && !ctx.biome.is_water(),
            line,
            half_width,
            depth,
        }
    }

    pub fn bed(&self) -> f32 {
        WATER_LEVEL - self.depth
    }

    pub fn centerline(&self) -> &[Vec2] {
        &self.line
    }
}

impl TerrainLayer for RiverTerrainLayer {
    fn name(&self) -> &'static str {
        "river"
    }

    fn priority(&self) -> i32 {
        RIVER_PRIORITY
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn apply(&self, map: &mut Heightmap) {
        carve_channel(map, &self.line, self.half_width, self.bed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::Biome;
    use crate::layers::test_support::{context, rolling_map};

    #[test]
    fn dry_or_frozen_patches_have_no_river() {
        let width = SizeRange::new(0.04, 0.06);
        for seed in 0..16 {
            assert!(!RiverTerrainLayer::new(&context(Biome::Desert, 0.1, 0.8, seed), width).is_enabled());
            assert!(!RiverTerrainLayer::new(&context(Biome::Tundra, 0.9, 0.05, seed), width).is_enabled());
        }
        let wet = (0..16)
            .filter(|&seed| RiverTerrainLayer::new(&context(Biome::Forest, 0.8, 0.5, seed), width).is_enabled())
            .count();
        assert!(wet > 0);
    }

    #[test]
    fn channel_only_lowers_and_runs_edge_to_edge() {
        let river = RiverTerrainLayer::new(&context(Biome::Forest, 0.8, 0.5, 4242), SizeRange::new(0.1, 0.1));
        let line = river.centerline();
        assert!(line.first().unwrap().min_element() < 0.0);
        assert!(line.last().unwrap().max_element() > 1.0);

        let before = rolling_map();
        let mut after = before.clone();
        river.apply(&mut after);
        for (a, b) in after.heights().iter().zip(before.heights()) {
            assert!(a <= b);
        }
        assert!(after.coverage_below(WATER_LEVEL) > 0.0);
    }

    #[test]
    fn meander_stays_inside_the_cross_axis() {
        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            let line = meander(&mut rng, 12);
            assert_eq!(line.len(), 12);
            // The run axis starts just outside the patch at -0.05.
            let vertical = line[0].y < 0.0;
            for p in &line {
                let cross = if vertical { p.x } else { p.y };
                assert!((0.1..=0.9).contains(&cross), "seed {} drifted to {}", seed, cross);
            }
        }
    }
}
