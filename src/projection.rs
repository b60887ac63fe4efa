//! Scene-level projection and viewport matrices.
//!
//! The [`Projection`] struct is the single source of truth for the matrices
//! shared by every node in a frame. They only depend on the surface size and
//! are recomputed on resize, then combined once into the projection-viewport
//! matrix the render loop reuses for every node.

use crate::math::{Mat4, Vec3};

/// Projection, viewport and their product for one surface size.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    width: u32,
    height: u32,
    projection: Mat4,
    viewport: Mat4,
    projection_viewport: Mat4,
    custom_projection: bool,
}

impl Projection {
    /// Creates the default matrices for a surface of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        let projection = Self::default_projection(width, height);
        let viewport = Self::viewport_matrix(width, height);
        Self {
            width,
            height,
            projection,
            viewport,
            projection_viewport: viewport * projection,
            custom_projection: false,
        }
    }

    /// Orthographic default: x and y scaled by the reciprocal of half the
    /// surface extents, z left untouched (no near/far clipping).
    pub fn default_projection(width: u32, height: u32) -> Mat4 {
        let half_w = (width.max(1) as f32) / 2.0;
        let half_h = (height.max(1) as f32) / 2.0;
        Mat4::scaling(Vec3::new(1.0 / half_w, 1.0 / half_h, 1.0))
    }

    /// Maps [-1, 1] to pixel coordinates, centered on the surface.
    pub fn viewport_matrix(width: u32, height: u32) -> Mat4 {
        let half_w = width as f32 / 2.0;
        let half_h = height as f32 / 2.0;
        Mat4::translation(Vec3::new(half_w, half_h, 0.0))
            * Mat4::scaling(Vec3::new(half_w, half_h, 1.0))
    }

    /// Recompute everything for a new surface size.
    ///
    /// A custom projection set with [`Projection::set_projection`] is kept.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        if !self.custom_projection {
            self.projection = Self::default_projection(width, height);
        }
        self.viewport = Self::viewport_matrix(width, height);
        self.update_combined();
    }

    /// Override the projection matrix; `None` restores the default.
    pub fn set_projection(&mut self, matrix: Option<Mat4>) {
        match matrix {
            Some(m) => {
                self.projection = m;
                self.custom_projection = true;
            }
            None => {
                self.projection = Self::default_projection(self.width, self.height);
                self.custom_projection = false;
            }
        }
        self.update_combined();
    }

    fn update_combined(&mut self) {
        self.projection_viewport = self.viewport * self.projection;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    pub fn viewport(&self) -> &Mat4 {
        &self.viewport
    }

    /// `viewport * projection`, applied after the world matrix.
    pub fn projection_viewport(&self) -> &Mat4 {
        &self.projection_viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_origin_maps_to_surface_center() {
        let p = Projection::new(800, 600);
        let c = p.projection_viewport().transform_point(Vec3::ZERO);
        assert_relative_eq!(c.x, 400.0);
        assert_relative_eq!(c.y, 300.0);
    }

    #[test]
    fn test_default_keeps_one_unit_per_pixel_and_depth() {
        let p = Projection::new(800, 600);
        let v = p.projection_viewport().transform_point(Vec3::new(10.0, -20.0, 7.5));
        assert_relative_eq!(v.x, 410.0, epsilon = 1e-4);
        assert_relative_eq!(v.y, 280.0, epsilon = 1e-4);
        assert_relative_eq!(v.z, 7.5);
    }

    #[test]
    fn test_resize_recomputes_viewport() {
        let mut p = Projection::new(800, 600);
        p.resize(200, 100);
        let c = p.projection_viewport().transform_point(Vec3::ZERO);
        assert_relative_eq!(c.x, 100.0);
        assert_relative_eq!(c.y, 50.0);
    }

    #[test]
    fn test_custom_projection_survives_resize() {
        let mut p = Projection::new(800, 600);
        p.set_projection(Some(Mat4::identity()));
        p.resize(400, 400);
        assert_eq!(*p.projection(), Mat4::identity());
        p.set_projection(None);
        assert_eq!(*p.projection(), Projection::default_projection(400, 400));
    }
}
