//! Geodesic hex/pentagon grid over a sphere.
//!
//! Tiles are the vertices of a subdivided icosphere: the 12 original
//! icosahedron vertices become pentagons, every vertex introduced by
//! midpoint subdivision becomes a hexagon. Two tiles are neighbors when
//! they share an icosphere edge, so adjacency is symmetric by construction.

use std::collections::HashMap;

use glam::Vec3;

use crate::error::{GenError, Result};

/// Highest accepted subdivision level (655 362 tiles).
pub const MAX_SUBDIVISION_LEVEL: i32 = 9;

/// Number of five-neighbor tiles on every grid.
pub const PENTAGON_COUNT: usize = 12;

/// Number of midpoint passes applied for a subdivision level.
/// Levels 0 and 1 both keep the bare icosahedron.
#[inline]
pub fn subdivision_passes(level: u32) -> u32 {
    level.saturating_sub(1)
}

/// Tile count a grid of the given level will have: `10 * 4^passes + 2`.
pub fn expected_tile_count(level: u32) -> usize {
    10 * 4usize.pow(subdivision_passes(level)) + 2
}

/// Immutable tile centers and adjacency for one celestial body.
#[derive(Debug, Clone)]
pub struct SphereGrid {
    level: u32,
    radius: f32,
    /// Unit directions; centers are these scaled by `radius`.
    directions: Vec<Vec3>,
    neighbors: Vec<Vec<usize>>,
}

impl SphereGrid {
    /// Build the grid. Rejects negative or oversized levels and
    /// non-positive radii before doing any work.
    pub fn build(level: i32, radius: f32) -> Result<Self> {
        if !(0..=MAX_SUBDIVISION_LEVEL).contains(&level) {
            return Err(GenError::InvalidSubdivision {
                level,
                max: MAX_SUBDIVISION_LEVEL,
            });
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(GenError::InvalidRadius(radius));
        }

        let level = level as u32;
        let (directions, faces) = icosphere(subdivision_passes(level));
        let neighbors = edge_adjacency(&directions, &faces);

        log::debug!(
            "built sphere grid: level {}, {} tiles, {} faces",
            level,
            directions.len(),
            faces.len()
        );

        Ok(Self {
            level,
            radius,
            directions,
            neighbors,
        })
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn tile_count(&self) -> usize {
        self.directions.len()
    }

    /// Unit direction from the sphere center to the tile.
    pub fn direction(&self, index: usize) -> Option<Vec3> {
        self.directions.get(index).copied()
    }

    /// Tile center scaled to the grid radius.
    pub fn center(&self, index: usize) -> Option<Vec3> {
        self.direction(index).map(|d| d * self.radius)
    }

    pub fn directions(&self) -> &[Vec3] {
        &self.directions
    }

    /// Neighbor indices, ordered counter-clockwise around the tile normal.
    pub fn neighbors(&self, index: usize) -> Option<&[usize]> {
        self.neighbors.get(index).map(Vec::as_slice)
    }

    pub fn is_pentagon(&self, index: usize) -> bool {
        self.neighbors.get(index).is_some_and(|n| n.len() == 5)
    }

    /// Latitude in `[0, 1]`: 0 on the equator, 1 at either pole.
    pub fn latitude(&self, index: usize) -> Option<f32> {
        self.direction(index).map(latitude_of)
    }

    /// Index of the tile whose center is closest to `dir` (need not be normalized).
    pub fn nearest_tile(&self, dir: Vec3) -> usize {
        let dir = dir.normalize_or_zero();
        let mut best = 0;
        let mut best_dot = f32::NEG_INFINITY;
        for (i, d) in self.directions.iter().enumerate() {
            let dot = d.dot(dir);
            if dot > best_dot {
                best_dot = dot;
                best = i;
            }
        }
        best
    }

    /// Great-circle angle between two tiles in radians.
    pub fn angular_distance(&self, a: usize, b: usize) -> Option<f32> {
        let (da, db) = (self.direction(a)?, self.direction(b)?);
        Some(da.dot(db).clamp(-1.0, 1.0).acos())
    }
}

/// Latitude of a unit direction, `|sin(lat)|` mapped through asin to `[0, 1]`.
#[inline]
pub fn latitude_of(dir: Vec3) -> f32 {
    dir.y.clamp(-1.0, 1.0).asin().abs() / std::f32::consts::FRAC_PI_2
}

fn icosphere(passes: u32) -> (Vec<Vec3>, Vec<[usize; 3]>) {
    let phi = (1.0 + 5.0_f32.sqrt()) / 2.0;

    let mut verts: Vec<Vec3> = [
        Vec3::new(-1.0, phi, 0.0),
        Vec3::new(1.0, phi, 0.0),
        Vec3::new(-1.0, -phi, 0.0),
        Vec3::new(1.0, -phi, 0.0),
        Vec3::new(0.0, -1.0, phi),
        Vec3::new(0.0, 1.0, phi),
        Vec3::new(0.0, -1.0, -phi),
        Vec3::new(0.0, 1.0, -phi),
        Vec3::new(phi, 0.0, -1.0),
        Vec3::new(phi, 0.0, 1.0),
        Vec3::new(-phi, 0.0, -1.0),
        Vec3::new(-phi, 0.0, 1.0),
    ]
    .iter()
    .map(|v| v.normalize())
    .collect();

    let mut faces: Vec<[usize; 3]> = vec![
        [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
        [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
        [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
        [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
    ];

    for _ in 0..passes {
        let mut split = Vec::with_capacity(faces.len() * 4);
        let mut midpoints: HashMap<(usize, usize), usize> = HashMap::new();

        for &[a, b, c] in &faces {
            let ab = midpoint(&mut verts, &mut midpoints, a, b);
            let bc = midpoint(&mut verts, &mut midpoints, b, c);
            let ca = midpoint(&mut verts, &mut midpoints, c, a);

            split.push([a, ab, ca]);
            split.push([b, bc, ab]);
            split.push([c, ca, bc]);
            split.push([ab, bc, ca]);
        }
        faces = split;
    }

    (verts, faces)
}

fn midpoint(
    verts: &mut Vec<Vec3>,
    cache: &mut HashMap<(usize, usize), usize>,
    a: usize,
    b: usize,
) -> usize {
    let key = if a < b { (a, b) } else { (b, a) };
    if let Some(&idx) = cache.get(&key) {
        return idx;
    }
    let mid = ((verts[a] + verts[b]) * 0.5).normalize();
    let idx = verts.len();
    verts.push(mid);
    cache.insert(key, idx);
    idx
}

fn edge_adjacency(verts: &[Vec3], faces: &[[usize; 3]]) -> Vec<Vec<usize>> {
    let mut adj: Vec<Vec<usize>> = vec![Vec::with_capacity(6); verts.len()];
    for &[a, b, c] in faces {
        for (u, v) in [(a, b), (b, c), (c, a)] {
            if !adj[u].contains(&v) {
                adj[u].push(v);
            }
            if !adj[v].contains(&u) {
                adj[v].push(u);
            }
        }
    }
    for (i, list) in adj.iter_mut().enumerate() {
        sort_around(list, verts, verts[i]);
    }
    adj
}

/// Order neighbor indices by angle around `center` so lists are stable
/// and walk the tile outline.
fn sort_around(list: &mut [usize], verts: &[Vec3], center: Vec3) {
    let Some(&first) = list.first() else { return };
    let reference = (verts[first] - center * verts[first].dot(center)).normalize_or_zero();
    let bitangent = center.cross(reference);
    let angle = |i: usize| {
        let v = verts[i] - center * verts[i].dot(center);
        v.dot(bitangent).atan2(v.dot(reference))
    };
    list.sort_by(|&a, &b| angle(a).total_cmp(&angle(b)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_four_has_642_tiles_and_12_pentagons() {
        let grid = SphereGrid::build(4, 100.0).unwrap();
        assert_eq!(grid.tile_count(), 642);
        assert_eq!(grid.tile_count(), expected_tile_count(4));

        let pentagons = (0..grid.tile_count()).filter(|&i| grid.is_pentagon(i)).count();
        assert_eq!(pentagons, PENTAGON_COUNT);
        for i in 0..grid.tile_count() {
            let n = grid.neighbors(i).unwrap().len();
            assert!(n == 5 || n == 6, "tile {} has {} neighbors", i, n);
        }
    }

    #[test]
    fn adjacency_is_symmetric() {
        let grid = SphereGrid::build(3, 1.0).unwrap();
        for i in 0..grid.tile_count() {
            for &j in grid.neighbors(i).unwrap() {
                assert!(grid.neighbors(j).unwrap().contains(&i), "{} -> {} not mirrored", i, j);
                assert_ne!(i, j);
            }
        }
    }

    #[test]
    fn centers_sit_on_the_radius() {
        let grid = SphereGrid::build(2, 37.5).unwrap();
        for i in 0..grid.tile_count() {
            let len = grid.center(i).unwrap().length();
            assert!((len - 37.5).abs() < 1e-3);
        }
    }

    #[test]
    fn low_levels_are_the_icosahedron() {
        assert_eq!(SphereGrid::build(0, 1.0).unwrap().tile_count(), 12);
        assert_eq!(SphereGrid::build(1, 1.0).unwrap().tile_count(), 12);
        assert_eq!(SphereGrid::build(2, 1.0).unwrap().tile_count(), 42);
        assert_eq!(expected_tile_count(3), 162);
    }

    #[test]
    fn rejects_bad_level_and_radius() {
        assert!(matches!(
            SphereGrid::build(-1, 1.0),
            Err(GenError::InvalidSubdivision { level: -1, .. })
        ));
        assert!(matches!(
            SphereGrid::build(MAX_SUBDIVISION_LEVEL + 1, 1.0),
            Err(GenError::InvalidSubdivision { .. })
        ));
        assert!(matches!(SphereGrid::build(3, 0.0), Err(GenError::InvalidRadius(_))));
        assert!(matches!(SphereGrid::build(3, -5.0), Err(GenError::InvalidRadius(_))));
        assert!(matches!(SphereGrid::build(3, f32::NAN), Err(GenError::InvalidRadius(_))));
    }

    #[test]
    fn out_of_range_lookups_are_none() {
        let grid = SphereGrid::build(2, 1.0).unwrap();
        assert!(grid.neighbors(grid.tile_count()).is_none());
        assert!(grid.center(usize::MAX).is_none());
    }

    #[test]
    fn nearest_tile_finds_itself() {
        let grid = SphereGrid::build(3, 10.0).unwrap();
        for i in [0, 11, 57, 161] {
            assert_eq!(grid.nearest_tile(grid.center(i).unwrap()), i);
        }
    }
}
