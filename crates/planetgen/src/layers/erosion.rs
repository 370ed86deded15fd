//! Thermal erosion: material slides off slopes steeper than the talus angle.

use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};

use super::Heightmap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErosionSettings {
    /// Largest height step between neighboring cells that stays put.
    pub talus: f32,
    /// Share of the excess moved per violation, `[0, 1]`.
    pub strength: f32,
    pub iterations: u32,
}

impl Default for ErosionSettings {
    fn default() -> Self {
        Self {
            talus: 0.02,
            strength: 0.5,
            iterations: 3,
        }
    }
}

impl ErosionSettings {
    pub fn validate(&self) -> Result<()> {
        if !self.talus.is_finite() || self.talus < 0.0 {
            return Err(GenError::config(format!("erosion talus must be non-negative, got {}", self.talus)));
        }
        if !(0.0..=1.0).contains(&self.strength) {
            return Err(GenError::config(format!("erosion strength must lie in [0, 1], got {}", self.strength)));
        }
        Ok(())
    }
}

/// Relax slopes steeper than `talus`. Each iteration gathers every transfer
/// against the heights at the start of the pass, then applies them, so the
/// result does not depend on scan order. Mass is conserved.
pub fn thermal_erosion(map: &mut Heightmap, settings: &ErosionSettings) {
    let res = map.resolution();
    // Quarter share: a cell can shed to all four neighbors in one pass.
    let share = settings.strength.clamp(0.0, 1.0) * 0.25;
    let mut delta = vec![0.0f32; res * res];

    for _ in 0..settings.iterations {
        delta.fill(0.0);
        let heights = map.heights();
        for z in 0..res {
            for x in 0..res {
                let i = z * res + x;
                let h = heights[i];
                let neighbors = [
                    (x > 0).then(|| i - 1),
                    (x + 1 < res).then(|| i + 1),
                    (z > 0).then(|| i - res),
                    (z + 1 < res).then(|| i + res),
                ];
                for j in neighbors.into_iter().flatten() {
                    let diff = h - heights[j];
                    if diff > settings.talus {
                        let moved = (diff - settings.talus) * share;
                        delta[i] -= moved;
                        delta[j] += moved;
                    }
                }
            }
        }
        for (h, d) in map.heights_mut().iter_mut().zip(&delta) {
            *h += d;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn spike() -> Heightmap {
        let mut map = Heightmap::filled(9, 8.0, Vec2::ZERO, 0.2).unwrap();
        map.set(4, 4, 0.9);
        map
    }

    fn max_slope(map: &Heightmap) -> f32 {
        let res = map.resolution();
        let mut worst = 0.0f32;
        for z in 0..res {
            for x in 0..res - 1 {
                worst = worst.max((map.get(x, z).unwrap() - map.get(x + 1, z).unwrap()).abs());
                worst = worst.max((map.get(z, x).unwrap() - map.get(z, x + 1).unwrap()).abs());
            }
        }
        worst
    }

    #[test]
    fn erosion_flattens_and_conserves_mass() {
        let mut map = spike();
        let before_sum: f32 = map.heights().iter().sum();
        let before_slope = max_slope(&map);
        thermal_erosion(
            &mut map,
            &ErosionSettings {
                talus: 0.01,
                strength: 0.5,
                iterations: 10,
            },
        );
        let after_sum: f32 = map.heights().iter().sum();
        assert!((before_sum - after_sum).abs() < 1e-4);
        assert!(max_slope(&map) < before_slope);
        assert!(map.get(4, 4).unwrap() < 0.9);
    }

    #[test]
    fn gentle_slopes_are_left_alone() {
        let mut map = Heightmap::new(6, 5.0, Vec2::ZERO).unwrap();
        map.update(|p, _| 0.3 + p.x * 0.005);
        let before = map.clone();
        thermal_erosion(&mut map, &ErosionSettings::default());
        assert_eq!(map, before);
    }

    #[test]
    fn validation() {
        assert!(ErosionSettings::default().validate().is_ok());
        assert!(ErosionSettings { strength: 1.5, ..Default::default() }.validate().is_err());
        assert!(ErosionSettings { talus: -0.1, ..Default::default() }.validate().is_err());
    }
}
