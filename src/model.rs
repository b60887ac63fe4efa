//! Per-node renderable state.
//!
//! A [`ModelInstance`] pairs a shared [`MeshData`] with the working buffers
//! one node needs each frame: transformed vertices and rotated normals. The
//! mesh arrives asynchronously, so an instance starts out not ready and
//! becomes ready once [`ModelInstance::set_mesh`] has been called.

use std::sync::Arc;

use crate::math::{Mat4, Vec3};
use crate::mesh::{MeshData, PolygonLayout, PolygonView};

/// A mesh reference plus the per-instance transformed copies of its data.
#[derive(Debug, Clone, Default)]
pub struct ModelInstance {
    mesh: Option<Arc<MeshData>>,
    layout: PolygonLayout,
    vertices: Vec<Vec3>,
    vertex_normals: Vec<Vec3>,
    polygon_normals: Vec<Vec3>,
    failure: Option<String>,
}

impl ModelInstance {
    /// An empty instance waiting for its mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty instance that will display the given polygon list once loaded.
    pub fn with_layout(layout: PolygonLayout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    /// Ready instance for an already available mesh.
    pub fn from_mesh(mesh: Arc<MeshData>) -> Self {
        let mut instance = Self::new();
        instance.set_mesh(mesh);
        instance
    }

    /// Bind mesh data and size the working buffers for it.
    ///
    /// The buffers hold zeros until the first transform is applied.
    pub fn set_mesh(&mut self, mesh: Arc<MeshData>) {
        self.vertices = vec![Vec3::ZERO; mesh.vertex_count()];
        self.vertex_normals = vec![Vec3::ZERO; mesh.vertex_count()];
        self.polygon_normals = vec![Vec3::ZERO; mesh.view(self.layout).len()];
        self.mesh = Some(mesh);
        self.failure = None;
    }

    /// Record that the mesh could not be loaded. Ignored once ready.
    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        if !self.is_ready() {
            self.failure = Some(reason.into());
        }
    }

    /// True once mesh data is bound. Never reverts.
    pub fn is_ready(&self) -> bool {
        self.mesh.is_some()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn mesh(&self) -> Option<&Arc<MeshData>> {
        self.mesh.as_ref()
    }

    pub fn layout(&self) -> PolygonLayout {
        self.layout
    }

    pub fn is_triangulated(&self) -> bool {
        self.layout == PolygonLayout::Triangulated
    }

    /// The active polygon list, if ready.
    pub fn view(&self) -> Option<&PolygonView> {
        self.mesh.as_ref().map(|m| m.view(self.layout))
    }

    pub fn polygon_count(&self) -> usize {
        self.view().map_or(0, PolygonView::len)
    }

    pub fn polygon(&self, p: usize) -> Option<&[usize]> {
        self.view()?.polygons().get(p).map(Vec::as_slice)
    }

    pub fn polygon_color(&self, p: usize) -> Option<u32> {
        self.mesh.as_ref()?.polygon_color(self.layout, p)
    }

    /// Polygons whose source normal has zero length are never drawn.
    pub fn is_degenerate(&self, p: usize) -> bool {
        self.view()
            .and_then(|v| v.polygon_normals().get(p))
            .map_or(true, |n| *n == Vec3::ZERO)
    }

    /// Switch between the original and the triangulated polygon list.
    ///
    /// The polygon normal buffer is resized for the new list and every
    /// working normal is reloaded from the mesh, so the next rotation pass
    /// starts from consistent data.
    pub fn toggle_triangulation(&mut self) {
        self.layout = self.layout.toggled();
        let Some(mesh) = &self.mesh else {
            return;
        };
        let view = mesh.view(self.layout);
        self.polygon_normals.clear();
        self.polygon_normals.extend_from_slice(view.polygon_normals());
        self.vertex_normals.clear();
        self.vertex_normals.extend_from_slice(view.vertex_normals());
        log::debug!("instance now uses {:?} polygons ({})", self.layout, view.len());
    }

    /// Source vertices to the working buffer: `working = m * source`.
    pub fn apply_transform_to_vertices(&mut self, m: &Mat4) {
        let Some(mesh) = &self.mesh else {
            return;
        };
        for (dst, src) in self.vertices.iter_mut().zip(mesh.vertices()) {
            *dst = m.transform_point(*src);
        }
    }

    /// Transform the working buffer in place: `working = m * working`.
    pub fn apply_transform_to_working_vertices(&mut self, m: &Mat4) {
        for v in &mut self.vertices {
            *v = m.transform_point(*v);
        }
    }

    /// Rotate the source normals of the active layout into the working buffers.
    pub fn apply_rotation_to_normals(&mut self, rotation: &Mat4) {
        let Some(mesh) = &self.mesh else {
            return;
        };
        let view = mesh.view(self.layout);
        for (dst, src) in self.vertex_normals.iter_mut().zip(view.vertex_normals()) {
            *dst = rotation.transform_direction(*src);
        }
        for (dst, src) in self.polygon_normals.iter_mut().zip(view.polygon_normals()) {
            *dst = rotation.transform_direction(*src);
        }
    }

    pub fn transformed_vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn transformed_vertex_normals(&self) -> &[Vec3] {
        &self.vertex_normals
    }

    pub fn transformed_polygon_normals(&self) -> &[Vec3] {
        &self.polygon_normals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{primitives, MeshData};
    use approx::assert_relative_eq;

    fn cube_instance() -> ModelInstance {
        let mesh = MeshData::new(primitives::cube(1.0)).unwrap();
        ModelInstance::from_mesh(Arc::new(mesh))
    }

    #[test]
    fn test_readiness() {
        let mut instance = ModelInstance::new();
        assert!(!instance.is_ready());
        instance.mark_failed("no such file");
        assert_eq!(instance.failure(), Some("no such file"));

        let ready = cube_instance();
        assert!(ready.is_ready());
        assert_eq!(ready.transformed_vertices().len(), 8);
        assert!(ready.transformed_vertices().iter().all(|v| *v == Vec3::ZERO));
    }

    #[test]
    fn test_transforms_on_unready_instance_are_no_ops() {
        let mut instance = ModelInstance::new();
        let m = Mat4::translation(Vec3::new(1.0, 2.0, 3.0));
        instance.apply_transform_to_vertices(&m);
        instance.apply_transform_to_working_vertices(&m);
        instance.apply_rotation_to_normals(&Mat4::rotation_x(0.5));
        assert!(!instance.is_ready());
        assert!(instance.transformed_vertices().is_empty());
        assert!(instance.transformed_vertex_normals().is_empty());
        assert!(instance.transformed_polygon_normals().is_empty());
        assert_eq!(instance.polygon_count(), 0);
    }

    #[test]
    fn test_failure_ignored_once_ready() {
        let mut instance = cube_instance();
        instance.mark_failed("late error");
        assert!(instance.is_ready());
        assert_eq!(instance.failure(), None);
    }

    #[test]
    fn test_transform_chain() {
        let mut instance = cube_instance();
        instance.apply_transform_to_vertices(&Mat4::translation(Vec3::new(10.0, 0.0, 0.0)));
        instance.apply_transform_to_working_vertices(&Mat4::scaling(Vec3::splat(2.0)));
        // source vertex 0 is (-1, -1, -1)
        let v = instance.transformed_vertices()[0];
        assert_relative_eq!(v.x, 18.0);
        assert_relative_eq!(v.y, -2.0);
        assert_relative_eq!(v.z, -2.0);
    }

    #[test]
    fn test_rotation_reads_source_normals() {
        let mut instance = cube_instance();
        let quarter = Mat4::rotation_y(std::f32::consts::FRAC_PI_2);
        instance.apply_rotation_to_normals(&quarter);
        instance.apply_rotation_to_normals(&quarter);
        // +z face (index 4) turned once, not twice, onto +x
        let n = instance.transformed_polygon_normals()[4];
        assert_relative_eq!(n.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(n.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_toggle_triangulation_resizes_normals() {
        let mut instance = cube_instance();
        assert_eq!(instance.transformed_polygon_normals().len(), 6);
        instance.toggle_triangulation();
        assert!(instance.is_triangulated());
        assert_eq!(instance.polygon_count(), 12);
        assert_eq!(instance.transformed_polygon_normals().len(), 12);
        instance.toggle_triangulation();
        assert_eq!(instance.polygon_count(), 6);
        assert_eq!(instance.transformed_polygon_normals().len(), 6);
    }

    #[test]
    fn test_double_toggle_restores_vertex_normals() {
        let mut instance = cube_instance();
        instance.apply_rotation_to_normals(&Mat4::identity());
        let before = instance.transformed_vertex_normals().to_vec();
        instance.toggle_triangulation();
        instance.toggle_triangulation();
        instance.apply_rotation_to_normals(&Mat4::identity());
        for (a, b) in before.iter().zip(instance.transformed_vertex_normals()) {
            assert_relative_eq!(a.x, b.x, epsilon = 1e-6);
            assert_relative_eq!(a.y, b.y, epsilon = 1e-6);
            assert_relative_eq!(a.z, b.z, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_layout_chosen_before_loading() {
        let mut instance = ModelInstance::with_layout(PolygonLayout::Triangulated);
        instance.set_mesh(Arc::new(MeshData::new(primitives::cube(1.0)).unwrap()));
        assert_eq!(instance.polygon_count(), 12);
    }
}
