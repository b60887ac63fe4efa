//! Immutable mesh data shared by every model instance that displays it.
//!
//! A [`MeshRecord`] is the loose input form (what a loader produces). It is
//! validated once by [`MeshData::new`], which also derives polygon and vertex
//! normals and a fan-triangulated copy of the polygon list. After that the
//! data never changes and is shared behind an `Arc`.

mod obj;
pub mod primitives;
mod registry;

pub use obj::load_obj;
pub use registry::{LoadHandle, LoadPoll, MeshRegistry, MeshSource};

use crate::colors::DEFAULT_PALETTE;
use crate::error::MeshError;
use crate::math::Vec3;

/// Raw mesh description as delivered by a loader.
///
/// Optional lists may be left empty: missing colors cycle through the palette,
/// missing normals are computed, and an empty palette means the default one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshRecord {
    pub vertices: Vec<Vec3>,
    pub polygons: Vec<Vec<usize>>,
    pub polygon_colors: Vec<usize>,
    pub polygon_normals: Vec<Vec3>,
    pub vertex_normals: Vec<Vec3>,
    pub palette: Vec<u32>,
}

/// Which polygon list of a mesh is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolygonLayout {
    #[default]
    Original,
    Triangulated,
}

impl PolygonLayout {
    pub fn toggled(self) -> Self {
        match self {
            PolygonLayout::Original => PolygonLayout::Triangulated,
            PolygonLayout::Triangulated => PolygonLayout::Original,
        }
    }
}

/// One polygon list together with everything derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonView {
    polygons: Vec<Vec<usize>>,
    polygon_colors: Vec<usize>,
    polygon_normals: Vec<Vec3>,
    vertex_normals: Vec<Vec3>,
}

impl PolygonView {
    pub fn polygons(&self) -> &[Vec<usize>] {
        &self.polygons
    }

    pub fn polygon_colors(&self) -> &[usize] {
        &self.polygon_colors
    }

    /// Unit normals in model space; degenerate polygons get [`Vec3::ZERO`].
    pub fn polygon_normals(&self) -> &[Vec3] {
        &self.polygon_normals
    }

    pub fn vertex_normals(&self) -> &[Vec3] {
        &self.vertex_normals
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}

/// Validated, immutable mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    vertices: Vec<Vec3>,
    palette: Vec<u32>,
    original: PolygonView,
    triangulated: PolygonView,
}

impl MeshData {
    /// Validate a record and derive normals and the triangulated view.
    ///
    /// Polygons with fewer than three vertices are dropped with a warning.
    /// Index errors are reported as [`MeshError`].
    pub fn new(record: MeshRecord) -> Result<Self, MeshError> {
        let MeshRecord {
            vertices,
            polygons,
            polygon_colors,
            polygon_normals,
            vertex_normals,
            palette,
        } = record;

        let palette = if palette.is_empty() {
            DEFAULT_PALETTE.to_vec()
        } else {
            palette
        };

        if !polygon_colors.is_empty() && polygon_colors.len() != polygons.len() {
            return Err(MeshError::ColorCountMismatch {
                expected: polygons.len(),
                found: polygon_colors.len(),
            });
        }
        if !polygon_normals.is_empty() && polygon_normals.len() != polygons.len() {
            return Err(MeshError::NormalCountMismatch {
                kind: "polygon",
                expected: polygons.len(),
                found: polygon_normals.len(),
            });
        }
        if !vertex_normals.is_empty() && vertex_normals.len() != vertices.len() {
            return Err(MeshError::NormalCountMismatch {
                kind: "vertex",
                expected: vertices.len(),
                found: vertex_normals.len(),
            });
        }

        let mut kept_polygons = Vec::with_capacity(polygons.len());
        let mut kept_colors = Vec::with_capacity(polygons.len());
        let mut kept_normals = Vec::with_capacity(polygon_normals.len());
        for (p, polygon) in polygons.into_iter().enumerate() {
            if polygon.len() < 3 {
                log::warn!("dropping polygon {p}: only {} vertices", polygon.len());
                continue;
            }
            if let Some(&index) = polygon.iter().find(|&&i| i >= vertices.len()) {
                return Err(MeshError::VertexIndexOutOfRange {
                    polygon: p,
                    index,
                    count: vertices.len(),
                });
            }
            let color = match polygon_colors.get(p) {
                Some(&c) if c >= palette.len() => {
                    return Err(MeshError::ColorIndexOutOfRange {
                        polygon: p,
                        index: c,
                        count: palette.len(),
                    })
                }
                Some(&c) => c,
                None => p % palette.len(),
            };
            kept_polygons.push(polygon);
            kept_colors.push(color);
            if let Some(&n) = polygon_normals.get(p) {
                kept_normals.push(n.try_normalize().unwrap_or(Vec3::ZERO));
            }
        }

        let original = {
            let polygon_normals = if kept_normals.is_empty() {
                kept_polygons
                    .iter()
                    .map(|poly| polygon_normal(&vertices, poly))
                    .collect()
            } else {
                kept_normals
            };
            let vertex_normals = if vertex_normals.is_empty() {
                accumulate_vertex_normals(vertices.len(), &kept_polygons, &polygon_normals)
            } else {
                vertex_normals
                    .iter()
                    .map(|n| n.try_normalize().unwrap_or(Vec3::ZERO))
                    .collect()
            };
            PolygonView {
                polygons: kept_polygons,
                polygon_colors: kept_colors,
                polygon_normals,
                vertex_normals,
            }
        };

        let triangulated = triangulate(&vertices, &original);

        let degenerate = original
            .polygon_normals
            .iter()
            .filter(|n| **n == Vec3::ZERO)
            .count();
        if degenerate > 0 {
            log::warn!("{degenerate} degenerate polygon(s) will never be drawn");
        }

        Ok(Self {
            vertices,
            palette,
            original,
            triangulated,
        })
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn palette(&self) -> &[u32] {
        &self.palette
    }

    pub fn view(&self, layout: PolygonLayout) -> &PolygonView {
        match layout {
            PolygonLayout::Original => &self.original,
            PolygonLayout::Triangulated => &self.triangulated,
        }
    }

    /// Color of polygon `p` in the given layout.
    pub fn polygon_color(&self, layout: PolygonLayout, p: usize) -> Option<u32> {
        let index = *self.view(layout).polygon_colors.get(p)?;
        self.palette.get(index).copied()
    }
}

/// Newell's method; robust for non-planar and concave polygons.
/// Returns [`Vec3::ZERO`] when the polygon has no area.
pub fn polygon_normal(vertices: &[Vec3], polygon: &[usize]) -> Vec3 {
    let mut n = Vec3::ZERO;
    for (k, &i) in polygon.iter().enumerate() {
        let a = vertices[i];
        let b = vertices[polygon[(k + 1) % polygon.len()]];
        n.x += (a.y - b.y) * (a.z + b.z);
        n.y += (a.z - b.z) * (a.x + b.x);
        n.z += (a.x - b.x) * (a.y + b.y);
    }
    n.try_normalize().unwrap_or(Vec3::ZERO)
}

fn accumulate_vertex_normals(count: usize, polygons: &[Vec<usize>], normals: &[Vec3]) -> Vec<Vec3> {
    let mut sums = vec![Vec3::ZERO; count];
    for (polygon, &n) in polygons.iter().zip(normals) {
        for &i in polygon {
            sums[i] += n;
        }
    }
    sums.into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::ZERO))
        .collect()
}

// Fan triangulation around the first vertex of each polygon.
fn triangulate(vertices: &[Vec3], original: &PolygonView) -> PolygonView {
    let mut polygons = Vec::new();
    let mut polygon_colors = Vec::new();
    let mut polygon_normals = Vec::new();

    for (polygon, &color) in original.polygons.iter().zip(&original.polygon_colors) {
        for k in 1..polygon.len() - 1 {
            let triangle = vec![polygon[0], polygon[k], polygon[k + 1]];
            polygon_normals.push(polygon_normal(vertices, &triangle));
            polygons.push(triangle);
            polygon_colors.push(color);
        }
    }

    let vertex_normals = accumulate_vertex_normals(vertices.len(), &polygons, &polygon_normals);
    PolygonView {
        polygons,
        polygon_colors,
        polygon_normals,
        vertex_normals,
    }
}
