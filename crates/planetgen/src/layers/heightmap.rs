//! Square grid of normalized heights for a local terrain patch.

use glam::Vec2;

use crate::error::{GenError, Result};

/// `resolution × resolution` heights in `[0, 1]`, row-major (z rows of x).
/// Cell `(0, 0)` sits at `origin`, cell `(res-1, res-1)` at `origin + map_size`.
#[derive(Debug, Clone, PartialEq)]
pub struct Heightmap {
    resolution: usize,
    map_size: f32,
    origin: Vec2,
    heights: Vec<f32>,
}

impl Heightmap {
    pub fn new(resolution: usize, map_size: f32, origin: Vec2) -> Result<Self> {
        if resolution < 2 {
            return Err(GenError::config(format!("heightmap resolution must be at least 2, got {}", resolution)));
        }
        if !map_size.is_finite() || map_size <= 0.0 {
            return Err(GenError::config(format!("heightmap size must be positive, got {}", map_size)));
        }
        Ok(Self {
            resolution,
            map_size,
            origin,
            heights: vec![0.0; resolution * resolution],
        })
    }

    /// Same as [`Heightmap::new`] with every cell set to `height`.
    pub fn filled(resolution: usize, map_size: f32, origin: Vec2, height: f32) -> Result<Self> {
        let mut map = Self::new(resolution, map_size, origin)?;
        map.heights.fill(height);
        Ok(map)
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn map_size(&self) -> f32 {
        self.map_size
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// World distance between adjacent cells.
    pub fn step(&self) -> f32 {
        self.map_size / (self.resolution - 1) as f32
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn heights_mut(&mut self) -> &mut [f32] {
        &mut self.heights
    }

    #[inline]
    pub fn index(&self, x: usize, z: usize) -> usize {
        z * self.resolution + x
    }

    pub fn get(&self, x: usize, z: usize) -> Option<f32> {
        (x < self.resolution && z < self.resolution).then(|| self.heights[self.index(x, z)])
    }

    pub fn set(&mut self, x: usize, z: usize, height: f32) {
        if x < self.resolution && z < self.resolution {
            let i = self.index(x, z);
            self.heights[i] = height;
        }
    }

    /// World-space position of a cell.
    #[inline]
    pub fn position(&self, x: usize, z: usize) -> Vec2 {
        self.origin + Vec2::new(x as f32, z as f32) * self.step()
    }

    /// Map a `[0, 1]²` fraction of the patch to world space.
    #[inline]
    pub fn at_fraction(&self, u: f32, v: f32) -> Vec2 {
        self.origin + Vec2::new(u, v) * self.map_size
    }

    /// Run `f(position, height)` for every cell and store the result.
    pub fn update(&mut self, mut f: impl FnMut(Vec2, f32) -> f32) {
        let res = self.resolution;
        let step = self.step();
        for z in 0..res {
            for x in 0..res {
                let i = z * res + x;
                let p = self.origin + Vec2::new(x as f32, z as f32) * step;
                self.heights[i] = f(p, self.heights[i]);
            }
        }
    }

    pub fn min_height(&self) -> f32 {
        self.heights.iter().copied().fold(f32::INFINITY, f32::min)
    }

    pub fn max_height(&self) -> f32 {
        self.heights.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    pub fn mean_height(&self) -> f32 {
        self.heights.iter().sum::<f32>() / self.heights.len() as f32
    }

    /// Fraction of cells strictly below `level`.
    pub fn coverage_below(&self, level: f32) -> f32 {
        self.heights.iter().filter(|&&h| h < level).count() as f32 / self.heights.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_span_the_patch() {
        let map = Heightmap::new(5, 40.0, Vec2::new(-20.0, 10.0)).unwrap();
        assert_eq!(map.step(), 10.0);
        assert_eq!(map.position(0, 0), Vec2::new(-20.0, 10.0));
        assert_eq!(map.position(4, 4), Vec2::new(20.0, 50.0));
        assert_eq!(map.at_fraction(0.5, 0.5), Vec2::new(0.0, 30.0));
    }

    #[test]
    fn rejects_degenerate_maps() {
        assert!(Heightmap::new(1, 10.0, Vec2::ZERO).is_err());
        assert!(Heightmap::new(8, 0.0, Vec2::ZERO).is_err());
    }

    #[test]
    fn get_and_set_are_bounds_checked() {
        let mut map = Heightmap::filled(4, 1.0, Vec2::ZERO, 0.5).unwrap();
        map.set(1, 2, 0.25);
        map.set(9, 9, 1.0);
        assert_eq!(map.get(1, 2), Some(0.25));
        assert_eq!(map.get(4, 0), None);
        assert_eq!(map.min_height(), 0.25);
        assert_eq!(map.max_height(), 0.5);
    }
}
