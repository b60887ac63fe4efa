//! Per-pixel depth storage.
//!
//! Larger values are nearer to the viewer. A fragment passes the test when
//! its depth is greater than or equal to the stored one, so later polygons
//! win ties.

use super::surface::PixelRect;

/// Depth of a pixel nothing has been drawn to.
pub const FAR: f32 = f32::MIN;

#[derive(Debug, Clone)]
pub struct DepthBuffer {
    depth: Vec<f32>,
    width: u32,
    height: u32,
}

impl DepthBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            depth: vec![FAR; (width * height) as usize],
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            Some((y as u32 * self.width + x as u32) as usize)
        } else {
            None
        }
    }

    /// Depth test and write in one step. Out-of-bounds pixels fail.
    #[inline]
    pub fn test_and_set(&mut self, x: i32, y: i32, z: f32) -> bool {
        let Some(idx) = self.index(x, y) else {
            return false;
        };
        if z >= self.depth[idx] {
            self.depth[idx] = z;
            true
        } else {
            false
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Option<f32> {
        self.index(x, y).map(|idx| self.depth[idx])
    }

    /// Reset every pixel inside `rect` to [`FAR`].
    pub fn reset_region(&mut self, rect: PixelRect) {
        let x_end = rect.right().min(self.width) as usize;
        for y in rect.y..rect.bottom().min(self.height) {
            let row = (y * self.width) as usize;
            if let Some(span) = self.depth.get_mut(row + rect.x as usize..row + x_end) {
                span.fill(FAR);
            }
        }
    }

    /// Smallest and largest written depth inside `rect`, ignoring [`FAR`].
    pub fn range(&self, rect: PixelRect) -> Option<(f32, f32)> {
        let mut range: Option<(f32, f32)> = None;
        for y in rect.y..rect.bottom().min(self.height) {
            for x in rect.x..rect.right().min(self.width) {
                let z = self.depth[(y * self.width + x) as usize];
                if z == FAR {
                    continue;
                }
                range = Some(match range {
                    None => (z, z),
                    Some((lo, hi)) => (lo.min(z), hi.max(z)),
                });
            }
        }
        range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearer_and_equal_depths_pass() {
        let mut depth = DepthBuffer::new(4, 4);
        assert!(depth.test_and_set(1, 1, -50.0));
        assert!(depth.test_and_set(1, 1, 10.0));
        assert!(depth.test_and_set(1, 1, 10.0));
        assert!(!depth.test_and_set(1, 1, 9.0));
        assert_eq!(depth.get(1, 1), Some(10.0));
    }

    #[test]
    fn test_out_of_bounds_fails() {
        let mut depth = DepthBuffer::new(4, 4);
        assert!(!depth.test_and_set(-1, 0, 0.0));
        assert!(!depth.test_and_set(0, 4, 0.0));
        assert_eq!(depth.get(4, 0), None);
    }

    #[test]
    fn test_reset_region_only_touches_region() {
        let mut depth = DepthBuffer::new(4, 4);
        depth.test_and_set(0, 0, 1.0);
        depth.test_and_set(2, 2, 1.0);
        depth.reset_region(PixelRect::new(2, 2, 2, 2));
        assert_eq!(depth.get(0, 0), Some(1.0));
        assert_eq!(depth.get(2, 2), Some(FAR));
    }

    #[test]
    fn test_range_skips_sentinel() {
        let mut depth = DepthBuffer::new(4, 4);
        assert_eq!(depth.range(PixelRect::new(0, 0, 4, 4)), None);
        depth.test_and_set(0, 0, -3.0);
        depth.test_and_set(3, 3, 7.0);
        assert_eq!(depth.range(PixelRect::new(0, 0, 4, 4)), Some((-3.0, 7.0)));
    }
}
