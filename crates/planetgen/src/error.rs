//! Error type shared by every generation stage.

use std::path::PathBuf;

use thiserror::Error;

use crate::biome::Biome;
use crate::generator::Stage;

/// Everything that can go wrong while configuring or querying a generator.
///
/// Only malformed configuration and bad accessor input surface here; the
/// noise and geometry math itself never fails.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("subdivision level {level} is out of range (expected 0..={max})")]
    InvalidSubdivision { level: i32, max: i32 },
    #[error("sphere radius must be positive and finite, got {0}")]
    InvalidRadius(f32),
    #[error("no biome profile registered for {0:?}")]
    MissingBiome(Biome),
    #[error("tile index {index} out of range (tile count {count})")]
    TileOutOfRange { index: usize, count: usize },
    #[error("{what} is not available until {needed:?} (generator is at {current:?})")]
    NotReady {
        what: &'static str,
        needed: Stage,
        current: Stage,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to parse {what}: {message}")]
    Parse { what: &'static str, message: String },
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenError {
    /// Shorthand for [`GenError::InvalidConfig`].
    pub fn config(msg: impl Into<String>) -> Self {
        GenError::InvalidConfig(msg.into())
    }
}

pub type Result<T, E = GenError> = std::result::Result<T, E>;
