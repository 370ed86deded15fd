//! Cave clusters: bounded breadth-first flood fills over noise-qualifying tiles.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};
use crate::grid::SphereGrid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaveSettings {
    /// Frequency of the feature channel used to pick cave tiles.
    pub noise_frequency: f64,
    /// Tiles whose feature noise exceeds this may become caves.
    pub noise_threshold: f32,
    pub min_cluster_size: usize,
    pub max_cluster_size: usize,
    pub max_clusters: usize,
}

impl Default for CaveSettings {
    fn default() -> Self {
        Self {
            noise_frequency: 3.0,
            noise_threshold: 0.6,
            min_cluster_size: 3,
            max_cluster_size: 18,
            max_clusters: 12,
        }
    }
}

impl CaveSettings {
    pub fn validate(&self) -> Result<()> {
        if self.min_cluster_size == 0 {
            return Err(GenError::config("cave clusters need a minimum size of at least 1"));
        }
        if self.min_cluster_size > self.max_cluster_size {
            return Err(GenError::config(format!(
                "cave cluster size range is inverted ({} .. {})",
                self.min_cluster_size, self.max_cluster_size
            )));
        }
        if !self.noise_frequency.is_finite() || self.noise_frequency <= 0.0 {
            return Err(GenError::config("cave noise frequency must be positive"));
        }
        Ok(())
    }
}

/// Grow cave clusters over the tiles marked in `qualifies`.
///
/// Tiles are visited in index order; every unprocessed qualifying tile seeds a
/// breadth-first fill through qualifying neighbors that stops at
/// `max_cluster_size`. A fill that ends below `min_cluster_size` is rejected
/// and its tiles go back to the unprocessed pool, so a later seed in the same
/// pocket evaluates them again. Tiles queued but not taken when a fill hits the
/// cap are released the same way. Every returned cluster has a size within
/// `[min_cluster_size, max_cluster_size]`.
pub fn grow_cave_clusters(grid: &SphereGrid, qualifies: &[bool], settings: &CaveSettings) -> Vec<Vec<usize>> {
    let count = grid.tile_count().min(qualifies.len());
    let mut processed = vec![false; count];
    let mut clusters = Vec::new();
    let mut queue = VecDeque::new();
    let mut rejected = 0usize;

    for seed in 0..count {
        if clusters.len() >= settings.max_clusters {
            break;
        }
        if !qualifies[seed] || processed[seed] {
            continue;
        }

        let mut cluster = Vec::new();
        queue.clear();
        queue.push_back(seed);
        processed[seed] = true;

        while let Some(tile) = queue.pop_front() {
            cluster.push(tile);
            if cluster.len() >= settings.max_cluster_size {
                break;
            }
            for &n in grid.neighbors(tile).unwrap_or_default() {
                if n < count && qualifies[n] && !processed[n] {
                    processed[n] = true;
                    queue.push_back(n);
                }
            }
        }
        // A capped fill leaves its frontier queued; those tiles belong to no cluster yet.
        for tile in queue.drain(..) {
            processed[tile] = false;
        }

        if cluster.len() >= settings.min_cluster_size {
            clusters.push(cluster);
        } else {
            rejected += 1;
            for &tile in &cluster {
                processed[tile] = false;
            }
        }
    }

    log::debug!(
        "cave clusters: {} accepted, {} undersized fills rejected",
        clusters.len(),
        rejected
    );
    clusters
}
