//! Scanline polygon fill with an active edge table.
//!
//! # Algorithm Overview
//!
//! 1. **Build** one edge record per non-horizontal polygon edge, oriented
//!    top to bottom, and sort the table by first covered scanline
//! 2. **Walk** the scanlines: edges enter the active list when their first
//!    row is reached and leave it after their last row
//! 3. **Intersect** every active edge with the current row, sort the
//!    crossings by x, and fill between consecutive pairs (even-odd rule)
//!
//! Because crossings are paired, concave and self-touching outlines fill
//! correctly without splitting the polygon into triangles first.
//!
//! # Coverage rule
//!
//! A row `y` belongs to an edge when `ceil(top.y) <= y < ceil(bottom.y)`, and
//! a pixel `x` belongs to a span when `ceil(left) <= x < ceil(right)`. Top
//! and left boundaries are inclusive, bottom and right exclusive, so two
//! polygons sharing an edge never both write the pixels along it.
//!
//! ```text
//!   y=0   +-------+           rows 0..3 are covered,
//!         |#######|           row 4 (the bottom edge) is not;
//!         |#######|           columns 0..3 likewise, column 4
//!         |#######|           belongs to the neighbour on the right
//!   y=4   +-------+
//!        x=0     x=4
//! ```
//!
//! # Interpolation
//!
//! Depth, intensity and normal are interpolated linearly, first along the
//! edges at the row, then across the span.

use super::{Fragment, RasterVertex};
use crate::render::framebuffer::FrameBuffer;

#[derive(Debug, Clone, Copy)]
struct Edge {
    y_start: i32,
    y_end: i32, // exclusive
    top: RasterVertex,
    bottom: RasterVertex,
    inv_height: f32,
}

impl Edge {
    fn new(a: &RasterVertex, b: &RasterVertex) -> Option<Self> {
        let (top, bottom) = if a.position.y <= b.position.y {
            (*a, *b)
        } else {
            (*b, *a)
        };
        let y_start = top.position.y.ceil() as i32;
        let y_end = bottom.position.y.ceil() as i32;
        // Horizontal edges and edges between two rows cross no scanline.
        if y_start >= y_end {
            return None;
        }
        Some(Self {
            y_start,
            y_end,
            top,
            bottom,
            inv_height: 1.0 / (bottom.position.y - top.position.y),
        })
    }

    /// Attributes where this edge crosses row `y`.
    #[inline]
    fn at(&self, y: i32) -> RasterVertex {
        let t = (y as f32 - self.top.position.y) * self.inv_height;
        self.top.lerp(&self.bottom, t)
    }
}

/// Reusable scanline rasterizer.
///
/// Keeps its edge table and scratch lists between calls so filling many
/// polygons per frame does not allocate.
#[derive(Debug, Default)]
pub struct ScanlineRasterizer {
    edges: Vec<Edge>,
    active: Vec<usize>,
    crossings: Vec<RasterVertex>,
}

impl ScanlineRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill a polygon given in pixel space.
    ///
    /// Every covered pixel inside the buffer becomes a [`Fragment`]; `shade`
    /// turns it into a color and is only called for fragments that pass the
    /// depth test. Returns the number of pixels written.
    pub fn fill_polygon(
        &mut self,
        vertices: &[RasterVertex],
        buffer: &mut FrameBuffer,
        mut shade: impl FnMut(&Fragment) -> u32,
    ) -> usize {
        if vertices.len() < 3 {
            return 0;
        }

        self.build_edge_table(vertices);
        let Some(y_max) = self.edges.iter().map(|e| e.y_end).max() else {
            return 0;
        };
        let y_first = self.edges[0].y_start.max(0);
        let y_last = y_max.min(buffer.height() as i32);
        let width = buffer.width() as i32;

        let mut written = 0;
        let mut next = 0;
        self.active.clear();

        for y in y_first..y_last {
            // Enter edges whose first row has been reached (including those
            // that started above the buffer).
            while next < self.edges.len() && self.edges[next].y_start <= y {
                self.active.push(next);
                next += 1;
            }
            let edges = &self.edges;
            self.active.retain(|&e| edges[e].y_end > y);

            self.crossings.clear();
            self.crossings.extend(self.active.iter().map(|&e| edges[e].at(y)));
            self.crossings
                .sort_by(|a, b| a.position.x.total_cmp(&b.position.x));

            for pair in self.crossings.chunks_exact(2) {
                written += fill_span(y, &pair[0], &pair[1], width, buffer, &mut shade);
            }
        }

        written
    }

    fn build_edge_table(&mut self, vertices: &[RasterVertex]) {
        self.edges.clear();
        for (i, a) in vertices.iter().enumerate() {
            let b = &vertices[(i + 1) % vertices.len()];
            if let Some(edge) = Edge::new(a, b) {
                self.edges.push(edge);
            }
        }
        self.edges.sort_by_key(|e| e.y_start);
    }
}

fn fill_span(
    y: i32,
    left: &RasterVertex,
    right: &RasterVertex,
    width: i32,
    buffer: &mut FrameBuffer,
    shade: &mut impl FnMut(&Fragment) -> u32,
) -> usize {
    let x_start = (left.position.x.ceil() as i32).max(0);
    let x_end = (right.position.x.ceil() as i32).min(width);
    let span = right.position.x - left.position.x;

    let mut written = 0;
    for x in x_start..x_end {
        let t = if span > f32::EPSILON {
            (x as f32 - left.position.x) / span
        } else {
            0.0
        };
        let v = left.lerp(right, t);
        let fragment = Fragment {
            x,
            y,
            z: v.position.z,
            intensity: v.intensity,
            normal: v.normal,
        };
        if buffer.set_pixel_with_depth(x, y, fragment.z, || shade(&fragment)) {
            written += 1;
        }
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors;
    use crate::math::Vec3;
    use approx::assert_relative_eq;
    use std::collections::HashSet;

    fn poly(points: &[(f32, f32)]) -> Vec<RasterVertex> {
        points
            .iter()
            .map(|&(x, y)| RasterVertex::new(Vec3::new(x, y, 0.0), 1.0, Vec3::Z))
            .collect()
    }

    fn covered(
        rasterizer: &mut ScanlineRasterizer,
        vertices: &[RasterVertex],
        buffer: &mut FrameBuffer,
    ) -> HashSet<(i32, i32)> {
        let mut pixels = HashSet::new();
        rasterizer.fill_polygon(vertices, buffer, |f| {
            assert!(pixels.insert((f.x, f.y)), "pixel ({}, {}) shaded twice", f.x, f.y);
            colors::RED
        });
        pixels
    }

    #[test]
    fn test_square_is_top_left_inclusive() {
        let mut fb = FrameBuffer::new(16, 16, colors::BLACK);
        let mut r = ScanlineRasterizer::new();
        let square = poly(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        let pixels = covered(&mut r, &square, &mut fb);
        assert_eq!(pixels.len(), 16);
        assert!(pixels.contains(&(0, 0)));
        assert!(pixels.contains(&(3, 3)));
        assert!(!pixels.contains(&(4, 0)));
        assert!(!pixels.contains(&(0, 4)));
    }

    #[test]
    fn test_shared_edge_is_written_once() {
        let mut fb = FrameBuffer::new(16, 16, colors::BLACK);
        let mut r = ScanlineRasterizer::new();
        let left = poly(&[(0.5, 0.5), (4.5, 0.5), (4.5, 6.5), (0.5, 6.5)]);
        let right = poly(&[(4.5, 0.5), (8.5, 0.5), (8.5, 6.5), (4.5, 6.5)]);
        let a = covered(&mut r, &left, &mut fb);
        let b = covered(&mut r, &right, &mut fb);
        assert!(a.is_disjoint(&b));
        assert_eq!(a.len() + b.len(), 8 * 6);
    }

    #[test]
    fn test_shared_diagonal_is_written_once() {
        let mut fb = FrameBuffer::new(16, 16, colors::BLACK);
        let mut r = ScanlineRasterizer::new();
        let upper = poly(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        let lower = poly(&[(0.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let a = covered(&mut r, &upper, &mut fb);
        let b = covered(&mut r, &lower, &mut fb);
        assert!(a.is_disjoint(&b));
        assert_eq!(a.len() + b.len(), 100);
    }

    #[test]
    fn test_concave_notch_stays_empty() {
        let mut fb = FrameBuffer::new(16, 16, colors::BLACK);
        let mut r = ScanlineRasterizer::new();
        let u_shape = poly(&[
            (0.0, 0.0),
            (9.0, 0.0),
            (9.0, 9.0),
            (6.0, 9.0),
            (6.0, 3.0),
            (3.0, 3.0),
            (3.0, 9.0),
            (0.0, 9.0),
        ]);
        let pixels = covered(&mut r, &u_shape, &mut fb);
        assert!(pixels.contains(&(1, 6)));
        assert!(pixels.contains(&(7, 6)));
        assert!(pixels.contains(&(4, 1)));
        assert!(!pixels.contains(&(4, 6)));
        assert_eq!(pixels.len(), 81 - 18);
    }

    #[test]
    fn test_attributes_are_interpolated() {
        let mut fb = FrameBuffer::new(16, 16, colors::BLACK);
        let mut r = ScanlineRasterizer::new();
        let quad = [
            RasterVertex::new(Vec3::new(0.0, 0.0, 0.0), 0.0, Vec3::X),
            RasterVertex::new(Vec3::new(8.0, 0.0, 8.0), 1.0, Vec3::Y),
            RasterVertex::new(Vec3::new(8.0, 4.0, 8.0), 1.0, Vec3::Y),
            RasterVertex::new(Vec3::new(0.0, 4.0, 0.0), 0.0, Vec3::X),
        ];
        let mut seen = None;
        r.fill_polygon(&quad, &mut fb, |f| {
            if (f.x, f.y) == (4, 2) {
                seen = Some(*f);
            }
            colors::RED
        });
        let f = seen.unwrap();
        assert_relative_eq!(f.z, 4.0, epsilon = 1e-5);
        assert_relative_eq!(f.intensity, 0.5, epsilon = 1e-5);
        assert_relative_eq!(f.normal.x, 0.5, epsilon = 1e-5);
        assert_relative_eq!(f.normal.y, 0.5, epsilon = 1e-5);
        assert_relative_eq!(fb.depth_at(4, 2).unwrap(), 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_partially_offscreen_polygon_is_clipped() {
        let mut fb = FrameBuffer::new(8, 8, colors::BLACK);
        let mut r = ScanlineRasterizer::new();
        let big = poly(&[(-10.0, -10.0), (4.0, -10.0), (4.0, 4.0), (-10.0, 4.0)]);
        let written = r.fill_polygon(&big, &mut fb, |_| colors::RED);
        assert_eq!(written, 16);
    }

    #[test]
    fn test_flat_and_short_polygons_draw_nothing() {
        let mut fb = FrameBuffer::new(8, 8, colors::BLACK);
        let mut r = ScanlineRasterizer::new();
        let flat = poly(&[(0.0, 2.0), (5.0, 2.0), (3.0, 2.0)]);
        assert_eq!(r.fill_polygon(&flat, &mut fb, |_| colors::RED), 0);
        let line = poly(&[(0.0, 0.0), (5.0, 5.0)]);
        assert_eq!(r.fill_polygon(&line, &mut fb, |_| colors::RED), 0);
    }
}
