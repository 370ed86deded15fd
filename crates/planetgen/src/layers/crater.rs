use glam::Vec2;
use rand::prelude::*;

use crate::biome::Biome;
use crate::config::SizeRange;

use super::erosion::{thermal_erosion, ErosionSettings};
use super::shape::crater_profile;
use super::{Heightmap, LayerContext, TerrainLayer, CRATER_PRIORITY};

/// Chance of a stray impact on patches that are not lunar or scorched.
pub const STRAY_CRATER_CHANCE: f64 = 0.08;

const CRATER_SALT: u64 = 0xc4a7_0004;

#[derive(Debug, Clone, Copy)]
struct Impact {
    center: Vec2,
    radius: f32,
    depth: f32,
    rim: f32,
}

/// Impact craters (bowl, rim, shoulder) followed by a thermal relaxation pass.
/// Unlike the water layers this raises terrain along the rim.
#[derive(Debug, Clone)]
pub struct CraterTerrainLayer {
    enabled: bool,
    impacts: Vec<Impact>,
    erosion: ErosionSettings,
}

impl CraterTerrainLayer {
    pub fn new(ctx: &LayerContext, radius: SizeRange, erosion: ErosionSettings) -> Self {
        let mut rng = StdRng::seed_from_u64(ctx.seed ^ CRATER_SALT);
        let stray = rng.gen_bool(STRAY_CRATER_CHANCE);
        let cratered = ctx.biome.is_moon() || ctx.biome == Biome::Scorched;
        let count = if cratered { rng.gen_range(2..=4) } else { 1 };
        let impacts = (0..count)
            .map(|_| {
                let depth = rng.gen_range(0.08..0.2);
                Impact {
                    center: Vec2::new(rng.gen_range(0.15..0.85), rng.gen_range(0.15..0.85)),
                    radius: radius.sample(&mut rng),
                    depth,
                    rim: depth * 0.35,
                }
            })
            .collect();
        Self {
            enabled: cratered || stray,
            impacts,
            erosion,
        }
    }

    pub fn crater_count(&self) -> usize {
        self.impacts.len()
    }
}

impl TerrainLayer for CraterTerrainLayer {
    fn name(&self) -> &'static str {
        "crater"
    }

    fn priority(&self) -> i32 {
        CRATER_PRIORITY
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn apply(&self, map: &mut Heightmap) {
        for impact in &self.impacts {
            let center = map.at_fraction(impact.center.x, impact.center.y);
            let radius = impact.radius * map.map_size();
            map.update(|p, h| {
                let r = p.distance(center) / radius;
                (h + crater_profile(r, impact.depth, impact.rim)).clamp(0.0, 1.0)
            });
        }
        thermal_erosion(map, &self.erosion);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::test_support::context;

    #[test]
    fn moons_are_always_cratered() {
        let radius = SizeRange::new(0.1, 0.2);
        for seed in 0..8 {
            let layer = CraterTerrainLayer::new(&context(Biome::MoonMaria, 0.3, 0.1, seed), radius, ErosionSettings::default());
            assert!(layer.is_enabled());
            assert!((2..=4).contains(&layer.crater_count()));
        }
    }

    #[test]
    fn crater_digs_a_bowl_with_a_rim() {
        let layer = CraterTerrainLayer {
            enabled: true,
            impacts: vec![Impact {
                center: Vec2::new(0.5, 0.5),
                radius: 0.25,
                depth: 0.2,
                rim: 0.07,
            }],
            erosion: ErosionSettings {
                iterations: 0,
                ..Default::default()
            },
        };
        let mut map = Heightmap::filled(41, 40.0, Vec2::ZERO, 0.5).unwrap();
        layer.apply(&mut map);
        // Center cell (20, 20) sits at the impact point, edge cells 10 units out.
        assert!((map.get(20, 20).unwrap() - 0.3).abs() < 1e-6);
        assert!((map.get(30, 20).unwrap() - 0.57).abs() < 1e-5);
        assert_eq!(map.get(0, 0).unwrap(), 0.5);
    }
}
