use glam::Vec2;
use rand::prelude::*;

use crate::config::SizeRange;

use super::shape::radial_falloff;
use super::{water_ceiling, Heightmap, LayerContext, TerrainLayer, LAKE_PRIORITY, WATER_LEVEL};

/// Lakes only form on patches wetter than this.
pub const LAKE_MOISTURE_THRESHOLD: f32 = 0.4;

/// Fraction of the lake radius that sits at full depth before the shore ramps up.
const LAKE_FLOOR: f32 = 0.55;

const LAKE_SALT: u64 = 0x1a4e_0001;

/// A round basin carved below the water level.
#[derive(Debug, Clone)]
pub struct LakeTerrainLayer {
    enabled: bool,
    /// Center as a fraction of the patch.
    center: Vec2,
    /// Radius as a fraction of the patch size.
    radius: f32,
    depth: f32,
}

impl LakeTerrainLayer {
    pub fn new(ctx: &LayerContext, radius: SizeRange) -> Self {
        let mut rng = StdRng::seed_from_u64(ctx.seed ^ LAKE_SALT);
        let center = Vec2::new(rng.gen_range(0.25..0.75), rng.gen_range(0.25..0.75));
        let radius = radius.sample(&mut rng);
        let depth = rng.gen_range(0.05..0.12);
        Self {
            enabled: ctx.climate.moisture > LAKE_MOISTURE_THRESHOLD,
            center,
            radius,
            depth,
        }
    }

    pub fn bed(&self) -> f32 {
        WATER_LEVEL - self.depth
    }
}

impl TerrainLayer for LakeTerrainLayer {
    fn name(&self) -> &'static str {
        "lake"
    }

    fn priority(&self) -> i32 {
        LAKE_PRIORITY
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn apply(&self, map: &mut Heightmap) {
        let center = map.at_fraction(self.center.x, self.center.y);
        let radius = self.radius * map.map_size();
        let bed = self.bed();
        map.update(|p, h| h.min(water_ceiling(bed, radial_falloff(p, center, radius, LAKE_FLOOR))));
    }
}
