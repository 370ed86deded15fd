//! Whole-sphere features carved into tile elevations: rivers and the lakes
//! they fill, lava flows and impact craters.

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::biome::Biome;
use crate::config::{CraterSettings, RiverSettings};
use crate::grid::SphereGrid;
use crate::layers::shape::{crater_profile, CRATER_SHOULDER};

const RIVER_SALT: u64 = 0x0517_3a11;
const LAVA_SALT: u64 = 0x1a7a_f10e;
const CRATER_SALT: u64 = 0xc4a7_e45e;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowKind {
    River,
    Lava,
}

/// Why a descent stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowEnd {
    /// Reached a tile the caller treats as a terminus (open water, another river).
    Sea,
    /// Every neighbor was at least as high.
    Sink,
    /// Hit the length cap.
    Capped,
}

/// Tiles crossed by one river or lava flow, source first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowPath {
    pub kind: FlowKind,
    pub tiles: Vec<usize>,
    pub end: FlowEnd,
}

/// Follow steepest descent from `start` until `is_sea` says stop, a local
/// minimum is reached, or `max_length` tiles have been visited. The sea tile
/// itself is not part of the path.
pub fn trace_descent(
    grid: &SphereGrid,
    elevation: &[f32],
    start: usize,
    max_length: usize,
    is_sea: impl Fn(usize) -> bool,
) -> (Vec<usize>, FlowEnd) {
    let mut path = vec![start];
    let mut current = start;
    loop {
        if path.len() >= max_length {
            return (path, FlowEnd::Capped);
        }
        let lowest = grid
            .neighbors(current)
            .unwrap_or_default()
            .iter()
            .copied()
            .min_by(|&a, &b| elevation[a].total_cmp(&elevation[b]).then(a.cmp(&b)));
        let Some(next) = lowest.filter(|&n| elevation[n] < elevation[current]) else {
            return (path, FlowEnd::Sink);
        };
        if is_sea(next) {
            return (path, FlowEnd::Sea);
        }
        path.push(next);
        current = next;
    }
}

/// Trace rivers from moist highland sources down to the sea.
///
/// Tiles on a river lose `incision` of elevation (never below the next tile
/// downstream's original height, never raised). A river that dies in a land
/// sink floods that sink into a [`Biome::Lake`]. Returns the traced paths;
/// `has_river` is set for every tile on one.
pub fn carve_rivers(
    grid: &SphereGrid,
    seed: u64,
    settings: &RiverSettings,
    elevation: &mut [f32],
    moisture: &[f32],
    biomes: &mut [Biome],
    has_river: &mut [bool],
) -> Vec<FlowPath> {
    let mut rng = StdRng::seed_from_u64(seed ^ RIVER_SALT);
    let count = rng.gen_range(settings.min_count..=settings.max_count) as usize;
    let mut sources: Vec<usize> = (0..biomes.len())
        .filter(|&i| {
            !biomes[i].is_water()
                && biomes[i] != Biome::Mountains
                && elevation[i] >= settings.source_elevation
                && moisture[i] >= settings.source_moisture
        })
        .collect();
    sources.shuffle(&mut rng);

    let mut rivers = Vec::new();
    for source in sources {
        if rivers.len() >= count {
            break;
        }
        if has_river[source] {
            continue;
        }
        let (tiles, end) = trace_descent(grid, elevation, source, settings.max_length.max(1), |t| {
            biomes[t].is_water() || has_river[t]
        });
        if tiles.len() < 2 && end != FlowEnd::Sea {
            continue;
        }

        for (k, &t) in tiles.iter().enumerate() {
            has_river[t] = true;
            let floor = tiles.get(k + 1).map_or(0.0, |&next| elevation[next]);
            elevation[t] = elevation[t].min((elevation[t] - settings.incision).max(floor));
        }
        if end == FlowEnd::Sink {
            if let Some(&sink) = tiles.last() {
                biomes[sink] = Biome::Lake;
            }
        }
        rivers.push(FlowPath {
            kind: FlowKind::River,
            tiles,
            end,
        });
    }
    log::debug!("traced {} rivers ({} requested)", rivers.len(), count);
    rivers
}

/// Trace lava downhill from volcanic tiles. Flows stop at water and do not
/// change elevation.
pub fn trace_lava(
    grid: &SphereGrid,
    seed: u64,
    settings: &RiverSettings,
    elevation: &[f32],
    biomes: &[Biome],
    has_lava: &mut [bool],
) -> Vec<FlowPath> {
    let mut rng = StdRng::seed_from_u64(seed ^ LAVA_SALT);
    let mut vents: Vec<usize> = (0..biomes.len()).filter(|&i| biomes[i] == Biome::Volcanic).collect();
    vents.shuffle(&mut rng);

    let flows: Vec<FlowPath> = vents
        .into_iter()
        .take(settings.lava_flows as usize)
        .map(|vent| {
            let (tiles, end) = trace_descent(grid, elevation, vent, settings.max_length.max(1), |t| biomes[t].is_water());
            for &t in &tiles {
                has_lava[t] = true;
            }
            FlowPath {
                kind: FlowKind::Lava,
                tiles,
                end,
            }
        })
        .collect();
    log::debug!("traced {} lava flows", flows.len());
    flows
}

/// Punch impact craters into tile elevations. Tiles inside a crater bowl
/// become [`Biome::MoonCraters`]. Returns how many craters were placed.
pub fn carve_craters(
    grid: &SphereGrid,
    seed: u64,
    settings: &CraterSettings,
    elevation: &mut [f32],
    biomes: &mut [Biome],
) -> usize {
    let tile_count = grid.tile_count();
    if tile_count == 0 {
        return 0;
    }
    let mut rng = StdRng::seed_from_u64(seed ^ CRATER_SALT);
    let count = rng.gen_range(settings.min_count..=settings.max_count) as usize;

    for _ in 0..count {
        let center = rng.gen_range(0..tile_count);
        let radius = settings.radius.sample(&mut rng);
        let depth = settings.depth.sample(&mut rng);
        let rim = depth * 0.35;
        for tile in 0..tile_count {
            let Some(d) = grid.angular_distance(center, tile) else {
                continue;
            };
            let r = d / radius;
            if r >= CRATER_SHOULDER {
                continue;
            }
            elevation[tile] = (elevation[tile] + crater_profile(r, depth, rim)).clamp(0.0, 1.0);
            if r < 1.0 {
                biomes[tile] = Biome::MoonCraters;
            }
        }
    }
    log::debug!("carved {} craters", count);
    count
}
