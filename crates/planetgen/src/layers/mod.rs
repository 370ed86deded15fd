//! Height-field mutators for local terrain patches (battle maps, surface detail).
//!
//! Layers run in ascending priority. Water bodies (lakes, rivers, lava) only
//! ever lower terrain towards a bed below [`WATER_LEVEL`] using `min`, so any
//! number of them at the same priority compose in any order with the same result.

mod base;
mod crater;
mod erosion;
mod heightmap;
mod lake;
mod lava;
mod river;
pub mod shape;

pub use base::BaseTerrainLayer;
pub use crater::CraterTerrainLayer;
pub use erosion::{thermal_erosion, ErosionSettings};
pub use heightmap::Heightmap;
pub use lake::LakeTerrainLayer;
pub use lava::LavaFlowTerrainLayer;
pub use river::RiverTerrainLayer;

use crate::biome::{Biome, BiomeProfile};
use crate::climate::ClimateSample;

/// Normalized height of standing water (and lava surfaces) on every patch.
pub const WATER_LEVEL: f32 = 0.2;

pub const BASE_PRIORITY: i32 = 0;
pub const CRATER_PRIORITY: i32 = 5;
pub const LAKE_PRIORITY: i32 = 10;
pub const RIVER_PRIORITY: i32 = 20;
pub const LAVA_PRIORITY: i32 = 20;

/// Inputs a layer reads once, at construction, to decide whether it is
/// enabled and where its features go.
#[derive(Debug, Clone)]
pub struct LayerContext {
    pub biome: Biome,
    pub profile: BiomeProfile,
    pub climate: ClimateSample,
    /// Seed of this patch; each layer salts it for its own draws.
    pub seed: u64,
}

/// One unit of height-field mutation.
pub trait TerrainLayer {
    fn name(&self) -> &'static str;

    /// Lower runs first.
    fn priority(&self) -> i32;

    /// Decided once when the layer is built.
    fn is_enabled(&self) -> bool;

    /// Mutate `map` in place.
    fn apply(&self, map: &mut Heightmap);
}

/// Carving ceiling of a water body: `bed` where `falloff` is 1, rising along
/// the falloff curve to the top of the height range where it is 0. Layers
/// apply it as `height.min(ceiling)`, which depends only on position.
#[inline]
pub fn water_ceiling(bed: f32, falloff: f32) -> f32 {
    let f = falloff.clamp(0.0, 1.0);
    bed + (1.0 - f) * (1.0 - bed)
}

/// Layers ordered by priority; insertion order breaks ties.
#[derive(Default)]
pub struct LayerStack {
    layers: Vec<Box<dyn TerrainLayer>>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, layer: impl TerrainLayer + 'static) -> &mut Self {
        self.layers.push(Box::new(layer));
        self.layers.sort_by_key(|l| l.priority());
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Names of the enabled layers in the order they will run.
    pub fn enabled(&self) -> Vec<&'static str> {
        self.layers
            .iter()
            .filter(|l| l.is_enabled())
            .map(|l| l.name())
            .collect()
    }

    /// Apply every enabled layer once. Returns how many ran.
    pub fn apply(&self, map: &mut Heightmap) -> usize {
        let mut applied = 0;
        for layer in self.layers.iter().filter(|l| l.is_enabled()) {
            layer.apply(map);
            applied += 1;
            log::debug!("applied terrain layer {} (priority {})", layer.name(), layer.priority());
        }
        applied
    }
}

impl std::fmt::Debug for LayerStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.layers.iter().map(|l| (l.name(), l.priority(), l.is_enabled())))
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::config::SizeRange;

    struct Fill(i32, f32);

    impl TerrainLayer for Fill {
        fn name(&self) -> &'static str {
            "fill"
        }
        fn priority(&self) -> i32 {
            self.0
        }
        fn is_enabled(&self) -> bool {
            true
        }
        fn apply(&self, map: &mut Heightmap) {
            map.heights_mut().fill(self.1);
        }
    }

    #[test]
    fn water_ceiling_spans_bed_to_top() {
        assert_eq!(water_ceiling(0.1, 1.0), 0.1);
        assert!((water_ceiling(0.1, 0.0) - 1.0).abs() < 1e-6);
        assert!((water_ceiling(0.1, 0.5) - 0.55).abs() < 1e-6);
        assert_eq!(0.05_f32.min(water_ceiling(0.1, 1.0)), 0.05);
    }

    #[test]
    fn stack_runs_in_priority_order() {
        let mut stack = LayerStack::new();
        stack.push(Fill(10, 0.9)).push(Fill(0, 0.1));
        let mut map = Heightmap::new(4, 1.0, glam::Vec2::ZERO).unwrap();
        assert_eq!(stack.apply(&mut map), 2);
        assert!(map.heights().iter().all(|&h| h == 0.9));
    }

    #[test]
    fn water_layers_commute() {
        let ctx = context(Biome::Volcanic, 0.9, 0.95, 77);
        let width = SizeRange::new(0.05, 0.08);
        let river = RiverTerrainLayer::new(&ctx, width);
        let lava = LavaFlowTerrainLayer::new(&ctx, width);
        let lake = LakeTerrainLayer::new(&ctx, SizeRange::new(0.15, 0.25));
        assert!(river.is_enabled() || lava.is_enabled());

        let mut a = rolling_map();
        river.apply(&mut a);
        lava.apply(&mut a);
        lake.apply(&mut a);

        let mut b = rolling_map();
        lake.apply(&mut b);
        lava.apply(&mut b);
        river.apply(&mut b);

        assert_eq!(a, b);
    }
}
