//! Per-tile climate sampling: elevation, moisture and temperature fields.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};
use crate::grid::latitude_of;
use crate::sampler::{FractalSettings, NoiseChannels};

/// Raw climate values of one tile, all in `[0, 1]`. Transient: only lives
/// for the duration of generation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClimateSample {
    pub elevation: f32,
    pub moisture: f32,
    pub temperature: f32,
}

/// Latitude bands and global biases.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateSettings {
    /// Latitude (0 equator .. 1 pole) below which the climate is equatorial.
    pub equator_latitude: f32,
    /// Latitude where the sub-polar band begins.
    pub sub_polar_latitude: f32,
    /// Latitude where the polar band begins.
    pub polar_latitude: f32,
    /// Added to every moisture value before clamping.
    pub moisture_bias: f32,
    /// Added to every temperature value before clamping.
    pub temperature_bias: f32,
    /// Temperature lost per unit of elevation above sea level.
    pub lapse_rate: f32,
}

impl Default for ClimateSettings {
    fn default() -> Self {
        Self {
            equator_latitude: 0.2,
            sub_polar_latitude: 0.6,
            polar_latitude: 0.8,
            moisture_bias: 0.0,
            temperature_bias: 0.0,
            lapse_rate: 0.6,
        }
    }
}

impl ClimateSettings {
    pub fn validate(&self) -> Result<()> {
        let bands = [self.equator_latitude, self.sub_polar_latitude, self.polar_latitude];
        if bands.iter().any(|v| !(0.0..=1.0).contains(v)) {
            return Err(GenError::config("latitude bands must lie in [0, 1]"));
        }
        if !(self.equator_latitude < self.sub_polar_latitude && self.sub_polar_latitude < self.polar_latitude) {
            return Err(GenError::config(format!(
                "latitude bands must satisfy equator < sub-polar < polar ({} / {} / {})",
                self.equator_latitude, self.sub_polar_latitude, self.polar_latitude
            )));
        }
        for (name, v) in [
            ("moisture_bias", self.moisture_bias),
            ("temperature_bias", self.temperature_bias),
            ("lapse_rate", self.lapse_rate),
        ] {
            if !v.is_finite() || v.abs() > 1.0 {
                return Err(GenError::config(format!("{} must be finite and within [-1, 1], got {}", name, v)));
            }
        }
        Ok(())
    }

    /// Baseline temperature from latitude alone: warm plateau across the
    /// equatorial band, linear falloff to the sub-polar edge, then a steeper
    /// drop through the polar cap.
    pub fn latitude_temperature(&self, latitude: f32) -> f32 {
        let lat = latitude.clamp(0.0, 1.0);
        if lat <= self.equator_latitude {
            0.9
        } else if lat <= self.sub_polar_latitude {
            let t = (lat - self.equator_latitude) / (self.sub_polar_latitude - self.equator_latitude);
            0.9 - t * 0.55
        } else if lat <= self.polar_latitude {
            let t = (lat - self.sub_polar_latitude) / (self.polar_latitude - self.sub_polar_latitude);
            0.35 - t * 0.2
        } else {
            let t = (lat - self.polar_latitude) / (1.0 - self.polar_latitude).max(f32::EPSILON);
            0.15 - t * 0.15
        }
    }
}

/// Noise wavelengths that shape the elevation field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationShape {
    /// Frequency of the continent-scale octave stack.
    pub continent_frequency: f64,
    /// Frequency of the island bumps.
    pub island_frequency: f64,
    /// Elevation used as the sea-level reference for lapse and island lift.
    pub sea_level: f32,
}

/// Turns a tile direction into a [`ClimateSample`]. Deterministic in the
/// channel seeds and the settings it was built with.
#[derive(Debug, Clone)]
pub struct ClimateSampler {
    channels: NoiseChannels,
    settings: ClimateSettings,
    shape: ElevationShape,
}

impl ClimateSampler {
    pub fn new(channels: NoiseChannels, settings: ClimateSettings, shape: ElevationShape) -> Self {
        Self {
            channels,
            settings,
            shape,
        }
    }

    pub fn channels(&self) -> &NoiseChannels {
        &self.channels
    }

    /// Sample the climate at a unit direction.
    pub fn sample(&self, dir: Vec3) -> ClimateSample {
        let elevation = self.elevation(dir);
        let latitude = latitude_of(dir);
        let moisture = self.moisture(dir, latitude, elevation);
        let temperature = self.temperature(dir, latitude, elevation);
        ClimateSample {
            elevation,
            moisture,
            temperature,
        }
    }

    fn elevation(&self, dir: Vec3) -> f32 {
        let continents = FractalSettings {
            frequency: self.shape.continent_frequency,
            octaves: 5,
            lacunarity: 2.0,
            persistence: 0.5,
        };
        let base = self.channels.elevation.fractal(dir, &continents);
        let detail = self
            .channels
            .detail
            .fractal(dir, &continents.with_frequency(self.shape.continent_frequency * 4.0));

        // Islands: isolated bumps where the feature channel peaks over open water.
        let island = self.channels.feature.sample_scaled(dir, self.shape.island_frequency);
        let lift = ((island - 0.72) / 0.28).clamp(0.0, 1.0);
        let lift = lift * lift * (3.0 - 2.0 * lift) * 0.18;

        let e = base * 0.78 + detail * 0.22;
        let e = if e < self.shape.sea_level { e + lift } else { e };
        // Stretch the mid-heavy fBm distribution so extremes are reachable.
        ((e - 0.5) * 1.6 + 0.5).clamp(0.0, 1.0)
    }

    fn moisture(&self, dir: Vec3, latitude: f32, elevation: f32) -> f32 {
        let raw = self.channels.moisture.fractal(dir, &FractalSettings::default().with_frequency(2.0));
        // Equatorial convergence is wet, subtropical highs dry, mid-latitudes in between.
        let belt = if latitude <= self.settings.equator_latitude {
            0.15
        } else if latitude <= self.settings.sub_polar_latitude * 0.6 {
            -0.1
        } else {
            0.0
        };
        let water = if elevation < self.shape.sea_level { 0.2 } else { 0.0 };
        ((raw - 0.5) * 1.6 + 0.5 + belt + water + self.settings.moisture_bias).clamp(0.0, 1.0)
    }

    fn temperature(&self, dir: Vec3, latitude: f32, elevation: f32) -> f32 {
        let base = self.settings.latitude_temperature(latitude);
        let jitter = (self.channels.temperature.sample_scaled(dir, 3.0) - 0.5) * 0.2;
        let altitude = (elevation - self.shape.sea_level).max(0.0) * self.settings.lapse_rate;
        (base + jitter - altitude + self.settings.temperature_bias).clamp(0.0, 1.0)
    }
}
