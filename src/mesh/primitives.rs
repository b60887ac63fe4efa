//! Built-in meshes available without touching the filesystem.

use super::MeshRecord;
use crate::math::Vec3;

/// Half edge length of the built-in cube.
pub const CUBE_HALF_EXTENT: f32 = 200.0;

/// Axis-aligned cube centered on the origin, one quad per face.
///
/// Faces are wound counter-clockwise when seen from outside, and each face
/// takes its color from the default palette in order.
pub fn cube(half_extent: f32) -> MeshRecord {
    let a = half_extent;
    let vertices = vec![
        Vec3::new(-a, -a, -a),
        Vec3::new(a, -a, -a),
        Vec3::new(a, -a, a),
        Vec3::new(-a, -a, a),
        Vec3::new(-a, a, -a),
        Vec3::new(a, a, -a),
        Vec3::new(a, a, a),
        Vec3::new(-a, a, a),
    ];
    let polygons = vec![
        vec![0, 1, 2, 3], // -y
        vec![4, 7, 6, 5], // +y
        vec![0, 4, 5, 1], // -z
        vec![1, 5, 6, 2], // +x
        vec![2, 6, 7, 3], // +z
        vec![3, 7, 4, 0], // -x
    ];

    MeshRecord {
        vertices,
        polygon_colors: (0..polygons.len()).collect(),
        polygons,
        ..Default::default()
    }
}

/// A single concave, flat decagon in the z = 0 plane facing +z.
///
/// Useful for checking that the scanline fill handles concave outlines.
pub fn inside_out_poly() -> MeshRecord {
    let outline = [
        (-300.0, 0.0),
        (400.0, 0.0),
        (400.0, 200.0),
        (300.0, 200.0),
        (200.0, 100.0),
        (100.0, 200.0),
        (0.0, 200.0),
        (-100.0, 300.0),
        (-200.0, 200.0),
        (-300.0, 200.0),
    ];
    MeshRecord {
        vertices: outline.iter().map(|&(x, y)| Vec3::new(x, y, 0.0)).collect(),
        polygons: vec![(0..outline.len()).collect()],
        polygon_colors: vec![3],
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{MeshData, PolygonLayout};
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_normals_point_outward() {
        let mesh = MeshData::new(cube(1.0)).unwrap();
        let view = mesh.view(PolygonLayout::Original);
        for (polygon, n) in view.polygons().iter().zip(view.polygon_normals()) {
            let center = polygon
                .iter()
                .fold(Vec3::ZERO, |acc, &i| acc + mesh.vertices()[i])
                / polygon.len() as f32;
            assert_relative_eq!(center.dot(*n), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_cube_vertex_normals_are_diagonals() {
        let mesh = MeshData::new(cube(CUBE_HALF_EXTENT)).unwrap();
        let n = mesh.view(PolygonLayout::Original).vertex_normals()[6];
        let d = 1.0 / 3.0f32.sqrt();
        assert_relative_eq!(n.x, d, epsilon = 1e-5);
        assert_relative_eq!(n.y, d, epsilon = 1e-5);
        assert_relative_eq!(n.z, d, epsilon = 1e-5);
    }

    #[test]
    fn test_triangulated_cube_has_two_triangles_per_face() {
        let mesh = MeshData::new(cube(1.0)).unwrap();
        let original = mesh.view(PolygonLayout::Original);
        let tri = mesh.view(PolygonLayout::Triangulated);
        assert_eq!(tri.len(), 12);
        assert!(tri.polygons().iter().all(|t| t.len() == 3));

        let mut used: Vec<usize> = tri.polygons().iter().flatten().copied().collect();
        used.sort_unstable();
        used.dedup();
        assert_eq!(used, (0..8).collect::<Vec<_>>());

        for (face, pair) in original.polygons().iter().zip(tri.polygons().chunks(2)) {
            for triangle in pair {
                assert!(triangle.iter().all(|i| face.contains(i)));
            }
        }
        // switching views leaves the original list untouched
        assert_eq!(original.polygons(), cube(1.0).polygons.as_slice());
    }

    #[test]
    fn test_inside_out_poly_faces_viewer() {
        let mesh = MeshData::new(inside_out_poly()).unwrap();
        let view = mesh.view(PolygonLayout::Original);
        assert_eq!(view.polygons()[0].len(), 10);
        assert_relative_eq!(view.polygon_normals()[0].z, 1.0);
        assert_eq!(mesh.view(PolygonLayout::Triangulated).len(), 8);
    }
}
