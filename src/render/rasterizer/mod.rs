//! Polygon and line rasterization.
//!
//! - [`ScanlineRasterizer`]: edge-table fill of arbitrary (also concave) polygons
//! - [`draw_line`] / [`stroke_polygon`]: Bresenham outlines

mod line;
mod scanline;

pub use line::{draw_line, stroke_polygon};
pub use scanline::ScanlineRasterizer;

use crate::math::Vec3;

/// A polygon corner in pixel space with the attributes interpolated across it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterVertex {
    pub position: Vec3,
    pub intensity: f32,
    pub normal: Vec3,
}

impl RasterVertex {
    pub fn new(position: Vec3, intensity: f32, normal: Vec3) -> Self {
        Self {
            position,
            intensity,
            normal,
        }
    }

    fn lerp(&self, other: &RasterVertex, t: f32) -> RasterVertex {
        RasterVertex {
            position: self.position.lerp(other.position, t),
            intensity: self.intensity + (other.intensity - self.intensity) * t,
            normal: self.normal.lerp(other.normal, t),
        }
    }
}

/// One covered pixel with its interpolated attributes.
///
/// `normal` is interpolated linearly and is not renormalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub x: i32,
    pub y: i32,
    pub z: f32,
    pub intensity: f32,
    pub normal: Vec3,
}

impl Fragment {
    /// Position of the pixel in the space polygons are rasterized in.
    pub fn point(&self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z)
    }
}
