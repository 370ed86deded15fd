use crate::biome::BiomeProfile;
use crate::sampler::NoiseSampler;

use super::{Heightmap, LayerContext, TerrainLayer, BASE_PRIORITY};

/// Fills the patch with the biome's base height plus fractal relief.
#[derive(Debug, Clone)]
pub struct BaseTerrainLayer {
    noise: NoiseSampler,
    base_height: f32,
    profile: BiomeProfile,
}

impl BaseTerrainLayer {
    pub fn new(ctx: &LayerContext) -> Self {
        // Tiles higher up the globe sit higher on their patch too.
        let base_height = (ctx.profile.base_height * 0.7 + ctx.climate.elevation * 0.3).clamp(0.0, 1.0);
        Self {
            noise: NoiseSampler::new(ctx.seed),
            base_height,
            profile: ctx.profile.clone(),
        }
    }
}

impl TerrainLayer for BaseTerrainLayer {
    fn name(&self) -> &'static str {
        "base"
    }

    fn priority(&self) -> i32 {
        BASE_PRIORITY
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn apply(&self, map: &mut Heightmap) {
        // About four noise wavelengths across the patch regardless of its size.
        let settings = self.profile.fractal(4.0 / map.map_size() as f64);
        map.update(|p, _| {
            let n = self.noise.fractal_2d(p.x as f64, p.y as f64, &settings);
            (self.base_height + (n - 0.5) * 2.0 * self.profile.roughness).clamp(0.0, 1.0)
        });
    }
}
