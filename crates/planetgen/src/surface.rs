//! Local surface patches (battle maps) for a single tile.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::PlanetConfig;
use crate::error::{GenError, Result};
use crate::layers::{
    BaseTerrainLayer, CraterTerrainLayer, ErosionSettings, Heightmap, LakeTerrainLayer, LavaFlowTerrainLayer,
    LayerContext, LayerStack, RiverTerrainLayer,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceSettings {
    /// Cells per side.
    pub resolution: usize,
    /// World size of the patch, centered on the origin.
    pub map_size: f32,
    /// Relaxation run after crater carving.
    pub erosion: ErosionSettings,
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            resolution: 129,
            map_size: 256.0,
            erosion: ErosionSettings::default(),
        }
    }
}

impl SurfaceSettings {
    pub fn validate(&self) -> Result<()> {
        if self.resolution < 2 {
            return Err(GenError::config(format!("surface resolution must be at least 2, got {}", self.resolution)));
        }
        if !self.map_size.is_finite() || self.map_size <= 0.0 {
            return Err(GenError::config(format!("surface size must be positive, got {}", self.map_size)));
        }
        self.erosion.validate()
    }
}

/// Every terrain layer a patch can carry. Each one decides from `ctx` whether it is enabled.
pub fn build_layers(ctx: &LayerContext, config: &PlanetConfig, surface: &SurfaceSettings) -> LayerStack {
    let mut stack = LayerStack::new();
    stack
        .push(BaseTerrainLayer::new(ctx))
        .push(CraterTerrainLayer::new(ctx, config.craters.patch_radius, surface.erosion))
        .push(LakeTerrainLayer::new(ctx, config.lakes))
        .push(RiverTerrainLayer::new(ctx, config.rivers.width))
        .push(LavaFlowTerrainLayer::new(ctx, config.rivers.width));
    stack
}

/// Build and carve the heightmap of one patch.
pub fn generate_surface(ctx: &LayerContext, config: &PlanetConfig, surface: &SurfaceSettings) -> Result<Heightmap> {
    surface.validate()?;
    let half = surface.map_size * 0.5;
    let mut map = Heightmap::new(surface.resolution, surface.map_size, Vec2::splat(-half))?;
    let stack = build_layers(ctx, config, surface);
    let applied = stack.apply(&mut map);
    log::debug!(
        "surface patch for {:?}: {} of {} layers ({:?})",
        ctx.biome,
        applied,
        stack.len(),
        stack.enabled()
    );
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::Biome;
    use crate::layers::test_support::context;

    fn small() -> SurfaceSettings {
        SurfaceSettings {
            resolution: 33,
            map_size: 64.0,
            ..Default::default()
        }
    }

    #[test]
    fn surface_is_deterministic_and_normalized() {
        let ctx = context(Biome::Forest, 0.8, 0.5, 98765);
        let config = PlanetConfig::default();
        let a = generate_surface(&ctx, &config, &small()).unwrap();
        let b = generate_surface(&ctx, &config, &small()).unwrap();
        assert_eq!(a, b);
        assert!(a.heights().iter().all(|h| (0.0..=1.0).contains(h)));
    }

    #[test]
    fn wet_patch_gets_a_lake_dry_patch_does_not() {
        let config = PlanetConfig::default();
        let wet = build_layers(&context(Biome::Marsh, 0.9, 0.5, 1), &config, &small());
        let dry = build_layers(&context(Biome::Desert, 0.05, 0.6, 1), &config, &small());
        assert_eq!(wet.len(), 5);
        assert!(wet.enabled().contains(&"lake"));
        assert!(!dry.enabled().contains(&"lake"));
        assert_eq!(dry.enabled()[0], "base");
    }

    #[test]
    fn rejects_degenerate_settings() {
        let ctx = context(Biome::Plains, 0.3, 0.5, 2);
        let bad = SurfaceSettings {
            resolution: 1,
            ..Default::default()
        };
        assert!(generate_surface(&ctx, &PlanetConfig::default(), &bad).is_err());
    }
}
