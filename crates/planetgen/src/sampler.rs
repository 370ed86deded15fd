//! Seeded noise over points on (or near) the unit sphere.
//!
//! **Seed-based determinism:** every sampler is derived only from its seed, so the same
//! seed and point always give the same value no matter which tile asked first.

use glam::Vec3;
use noise::{NoiseFn, Perlin, Simplex};

/// Seed offsets for the independent noise channels of one body.
pub const DETAIL_SEED_OFFSET: u64 = 1000;
pub const FEATURE_SEED_OFFSET: u64 = 2000;
pub const MOISTURE_SEED_OFFSET: u64 = 3000;
pub const TEMPERATURE_SEED_OFFSET: u64 = 4000;

/// Derive a deterministic u32 noise seed from a world seed and an offset.
/// Same (seed, offset) always gives the same result so terrain is reproducible.
#[inline]
pub fn deterministic_noise_seed(seed: u64, offset: u64) -> u32 {
    ((seed.wrapping_add(offset))
        .wrapping_mul(0x9e3779b97f4a7c15_u64)
        .wrapping_add(offset.wrapping_mul(0x6c078965_u64))
        >> 32) as u32
}

/// Fractal (fBm) shaping parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractalSettings {
    /// Base frequency (lower = smoother).
    pub frequency: f64,
    /// Number of octaves.
    pub octaves: u32,
    /// Frequency multiplier per octave.
    pub lacunarity: f64,
    /// Amplitude multiplier per octave.
    pub persistence: f64,
}

impl Default for FractalSettings {
    fn default() -> Self {
        Self {
            frequency: 1.0,
            octaves: 4,
            lacunarity: 2.0,
            persistence: 0.5,
        }
    }
}

impl FractalSettings {
    pub fn with_frequency(self, frequency: f64) -> Self {
        Self { frequency, ..self }
    }
}

/// Deterministic scalar noise in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct NoiseSampler {
    seed: u64,
    perlin: Perlin,
    simplex: Simplex,
}

impl NoiseSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            perlin: Perlin::new(deterministic_noise_seed(seed, 0)),
            simplex: Simplex::new(deterministic_noise_seed(seed, 1)),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Single-octave sample at `point`.
    pub fn sample(&self, point: Vec3) -> f32 {
        self.sample_scaled(point, 1.0)
    }

    /// Single-octave sample at `point * frequency`.
    pub fn sample_scaled(&self, point: Vec3, frequency: f64) -> f32 {
        let p = [
            point.x as f64 * frequency,
            point.y as f64 * frequency,
            point.z as f64 * frequency,
        ];
        normalize(self.mixed(p))
    }

    /// Multi-octave sample at `point`.
    pub fn fractal(&self, point: Vec3, settings: &FractalSettings) -> f32 {
        let p = [point.x as f64, point.y as f64, point.z as f64];
        self.fractal_at(p, settings)
    }

    /// Multi-octave sample over a flat patch (y held at zero).
    pub fn fractal_2d(&self, x: f64, z: f64, settings: &FractalSettings) -> f32 {
        self.fractal_at([x, 0.0, z], settings)
    }

    fn fractal_at(&self, p: [f64; 3], settings: &FractalSettings) -> f32 {
        let mut value = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = settings.frequency;
        let mut max_value = 0.0;

        for _ in 0..settings.octaves.max(1) {
            value += self.mixed([p[0] * frequency, p[1] * frequency, p[2] * frequency]) * amplitude;
            max_value += amplitude;

            amplitude *= settings.persistence;
            frequency *= settings.lacunarity;
        }

        normalize(value / max_value)
    }

    // Mix Perlin and Simplex for variety
    fn mixed(&self, p: [f64; 3]) -> f64 {
        let perlin_sample = self.perlin.get(p);
        let simplex_sample = self.simplex.get([p[0] + 1000.0, p[1] + 1000.0, p[2] + 1000.0]);
        perlin_sample * 0.7 + simplex_sample * 0.3
    }
}

#[inline]
fn normalize(v: f64) -> f32 {
    ((v + 1.0) * 0.5).clamp(0.0, 1.0) as f32
}

/// The decorrelated noise channels one celestial body samples from.
#[derive(Debug, Clone)]
pub struct NoiseChannels {
    pub elevation: NoiseSampler,
    pub detail: NoiseSampler,
    pub feature: NoiseSampler,
    pub moisture: NoiseSampler,
    pub temperature: NoiseSampler,
}

impl NoiseChannels {
    pub fn new(seed: u64) -> Self {
        Self {
            elevation: NoiseSampler::new(seed),
            detail: NoiseSampler::new(seed.wrapping_add(DETAIL_SEED_OFFSET)),
            feature: NoiseSampler::new(seed.wrapping_add(FEATURE_SEED_OFFSET)),
            moisture: NoiseSampler::new(seed.wrapping_add(MOISTURE_SEED_OFFSET)),
            temperature: NoiseSampler::new(seed.wrapping_add(TEMPERATURE_SEED_OFFSET)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> Vec<Vec3> {
        (0..64)
            .map(|i| {
                let t = i as f32 * 0.37;
                Vec3::new(t.sin(), (t * 1.3).cos(), (t * 0.7).sin()).normalize()
            })
            .collect()
    }

    #[test]
    fn same_seed_same_values() {
        let a = NoiseSampler::new(98765);
        let b = NoiseSampler::new(98765);
        let settings = FractalSettings::default().with_frequency(2.5);
        for p in points() {
            assert_eq!(a.sample_scaled(p, 3.0), b.sample_scaled(p, 3.0));
            assert_eq!(a.fractal(p, &settings), b.fractal(p, &settings));
        }
    }

    #[test]
    fn output_is_normalized() {
        let n = NoiseSampler::new(7);
        let settings = FractalSettings {
            frequency: 4.0,
            octaves: 6,
            lacunarity: 2.2,
            persistence: 0.6,
        };
        for p in points() {
            for v in [n.sample(p * 5.0), n.fractal(p, &settings), n.fractal_2d(p.x as f64 * 9.0, p.z as f64, &settings)] {
                assert!((0.0..=1.0).contains(&v), "{} out of range", v);
            }
        }
    }

    #[test]
    fn channels_are_decorrelated() {
        let c = NoiseChannels::new(42);
        let differs = points()
            .into_iter()
            .filter(|&p| c.elevation.sample_scaled(p, 3.0) != c.feature.sample_scaled(p, 3.0))
            .count();
        assert!(differs > 48);
        assert_eq!(c.detail.seed(), 42 + DETAIL_SEED_OFFSET);
        assert_eq!(c.feature.seed(), 42 + FEATURE_SEED_OFFSET);
    }
}
