use glam::Vec2;
use rand::prelude::*;

use crate::config::SizeRange;

use super::river::{carve_channel, meander};
use super::{Heightmap, LayerContext, TerrainLayer, LAVA_PRIORITY, WATER_LEVEL};

pub const LAVA_TEMPERATURE_THRESHOLD: f32 = 0.7;
/// Chance of lava on a hot patch that is not volcanic.
pub const STRAY_LAVA_CHANCE: f64 = 0.2;

const LAVA_SALT: u64 = 0x1a7a_0003;

/// A narrow lava channel. Same carving as a river, hotter trigger.
#[derive(Debug, Clone)]
pub struct LavaFlowTerrainLayer {
    enabled: bool,
    line: Vec<Vec2>,
    half_width: f32,
    depth: f32,
}

impl LavaFlowTerrainLayer {
    pub fn new(ctx: &LayerContext, width: SizeRange) -> Self {
        let mut rng = StdRng::seed_from_u64(ctx.seed ^ LAVA_SALT);
        let stray = rng.gen_bool(STRAY_LAVA_CHANCE);
        let line = meander(&mut rng, 4);
        let half_width = width.sample(&mut rng) * 0.35;
        let depth = rng.gen_range(0.02..0.06);
        Self {
            enabled: ctx.climate.temperature > LAVA_TEMPERATURE_THRESHOLD && (ctx.biome.is_volcanic() || stray),
            line,
            half_width,
            depth,
        }
    }

    pub fn bed(&self) -> f32 {
        WATER_LEVEL - self.depth
    }
}

impl TerrainLayer for LavaFlowTerrainLayer {
    fn name(&self) -> &'static str {
        "lava"
    }

    fn priority(&self) -> i32 {
        LAVA_PRIORITY
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
    fn volcanic_heat_enables_lava() {
        let width = SizeRange::new(0.04, 0.06);
        assert!(LavaFlowTerrainLayer::new(&context(Biome::Volcanic, 0.2, 0.9, 8), width).is_enabled());
        assert!(!LavaFlowTerrainLayer::new(&context(Biome::Volcanic, 0.2, 0.5, 8), width).is_enabled());
        assert!(!LavaFlowTerrainLayer::new(&context(Biome::Snow, 0.2, 0.05, 8), width).is_enabled());
    }

    #[test]
    fn lava_only_lowers() {
        let lava = LavaFlowTerrainLayer::new(&context(Biome::Hellscape, 0.2, 0.95, 31), SizeRange::new(0.08, 0.1));
        let before = rolling_map();
        let mut after = before.clone();
        lava.apply(&mut after);
        assert!(after.heights().iter().zip(before.heights()).all(|(a, b)| a <= b));
        assert!(after.min_height() < before.min_height());
    }
}
