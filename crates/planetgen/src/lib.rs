//! Hex-sphere terrain and biome generation for planets, moons and gas giants.

pub mod biome;
pub mod caves;
pub mod climate;
pub mod config;
pub mod error;
pub mod features;
pub mod generator;
pub mod grid;
pub mod layers;
pub mod progress;
pub mod sampler;
pub mod surface;

pub use biome::*;
pub use caves::*;
pub use climate::*;
pub use config::*;
pub use error::{GenError, Result};
pub use features::*;
pub use generator::*;
pub use grid::*;
pub use progress::*;
pub use sampler::*;
pub use surface::*;
pub use layers::{Heightmap, LayerContext, LayerStack, TerrainLayer};
