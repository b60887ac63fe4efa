//! Core rendering engine.
//!
//! The [`Engine`] owns the scene, the framebuffer and everything in between.
//! A driver calls [`Engine::render`] once per tick; the return value tells it
//! whether the picture has settled (nothing loading, nothing changed since
//! the last frame) so it can stop scheduling frames.
//!
//! Per frame, for every ready node in creation order:
//!
//! 1. source vertices are taken to world space with the node's world matrix
//! 2. the shared projection-viewport matrix takes them to pixel space
//! 3. normals are rotated with the rotation-only world matrix
//! 4. each polygon is bound to the shader, culled or filled and/or outlined

use std::sync::Arc;

use crate::colors;
use crate::config::EngineConfig;
use crate::error::{SceneError, ShadingModeError};
use crate::light::Light;
use crate::math::{Mat4, Vec3};
use crate::mesh::{LoadHandle, LoadPoll, MeshData, MeshRegistry, PolygonLayout};
use crate::model::ModelInstance;
use crate::projection::Projection;
use crate::render::{
    draw_line, stroke_polygon, FrameBuffer, RasterVertex, ScanlineRasterizer, Shader,
    ShadingMode, Surface,
};
use crate::scene::{NodeId, SceneGraph};

/// How polygons are put on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Shaded fill only
    #[default]
    Filled,
    /// Outlines in the polygon color
    Wireframe,
    /// Shaded fill with light outlines on top
    FilledWireframe,
}

impl RenderMode {
    pub fn fills(self) -> bool {
        matches!(self, RenderMode::Filled | RenderMode::FilledWireframe)
    }

    pub fn strokes(self) -> bool {
        matches!(self, RenderMode::Wireframe | RenderMode::FilledWireframe)
    }

    /// Fill/wireframe toggle.
    pub fn toggled(self) -> Self {
        match self {
            RenderMode::Filled => RenderMode::Wireframe,
            RenderMode::Wireframe | RenderMode::FilledWireframe => RenderMode::Filled,
        }
    }
}

/// Counters for the most recently drawn frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub nodes_drawn: usize,
    pub nodes_waiting: usize,
    pub polygons_drawn: usize,
    pub polygons_culled: usize,
    pub pixels_written: usize,
}

#[derive(Debug)]
struct PendingLoad {
    node: NodeId,
    handle: LoadHandle,
}

pub struct Engine {
    config: EngineConfig,
    scene: SceneGraph,
    projection: Projection,
    framebuffer: FrameBuffer,
    rasterizer: ScanlineRasterizer,
    registry: MeshRegistry,
    pending: Vec<PendingLoad>,
    corners: Vec<RasterVertex>,
    outline: Vec<Vec3>,
    stats: FrameStats,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let mut framebuffer = FrameBuffer::new(config.width, config.height, config.background);
        framebuffer.set_depth_view(config.depth_view);
        log::debug!(
            "engine {}x{}, {} shading",
            config.width,
            config.height,
            config.shading
        );
        Self {
            projection: Projection::new(config.width, config.height),
            framebuffer,
            scene: SceneGraph::new(),
            rasterizer: ScanlineRasterizer::new(),
            registry: MeshRegistry::new(),
            pending: Vec::new(),
            corners: Vec::new(),
            outline: Vec::new(),
            stats: FrameStats::default(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    // ============ Scene ============

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    pub fn registry(&self) -> &MeshRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut MeshRegistry {
        &mut self.registry
    }

    /// Add a top-level node with an optional, already built model.
    pub fn create_node(
        &mut self,
        name: impl Into<String>,
        model: Option<ModelInstance>,
    ) -> Result<NodeId, SceneError> {
        self.scene.create_node(name, model)
    }

    /// Add a top-level node and start loading its mesh by name.
    ///
    /// The node renders once the load completes. A failed load is logged and
    /// leaves the node permanently blank.
    pub fn create_mesh_node(
        &mut self,
        name: impl Into<String>,
        mesh: &str,
    ) -> Result<NodeId, SceneError> {
        let model = ModelInstance::with_layout(self.initial_layout());
        let node = self.scene.create_node(name, Some(model))?;
        self.pending.push(PendingLoad {
            node,
            handle: self.registry.load(mesh),
        });
        Ok(node)
    }

    /// Node with a model built from mesh data the caller already has.
    pub fn create_node_with_mesh(
        &mut self,
        name: impl Into<String>,
        mesh: Arc<MeshData>,
    ) -> Result<NodeId, SceneError> {
        let mut model = ModelInstance::with_layout(self.initial_layout());
        model.set_mesh(mesh);
        self.scene.create_node(name, Some(model))
    }

    fn initial_layout(&self) -> PolygonLayout {
        if self.config.triangulate_on_load {
            PolygonLayout::Triangulated
        } else {
            PolygonLayout::Original
        }
    }

    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.scene.add_child(parent, child)
    }

    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.scene.find(name)
    }

    pub fn root_node(&self) -> Option<NodeId> {
        self.scene.root()
    }

    // ============ Input bindings ============

    pub fn translate(&mut self, node: NodeId, delta: Vec3) -> Result<(), SceneError> {
        self.scene.translate(node, delta)
    }

    pub fn rotate(&mut self, node: NodeId, delta: Vec3) -> Result<(), SceneError> {
        self.scene.rotate(node, delta)
    }

    pub fn scale(&mut self, node: NodeId, delta: Vec3) -> Result<(), SceneError> {
        self.scene.scale(node, delta)
    }

    pub fn toggle_triangulation(&mut self) {
        self.scene.toggle_triangulation();
    }

    pub fn toggle_fill(&mut self) {
        self.set_render_mode(self.config.render_mode.toggled());
    }

    pub fn render_mode(&self) -> RenderMode {
        self.config.render_mode
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.config.render_mode = mode;
        self.scene.request_redraw();
    }

    pub fn toggle_depth_view(&mut self) {
        self.framebuffer.toggle_depth_view();
        self.config.depth_view = self.framebuffer.depth_view();
        self.scene.request_redraw();
    }

    pub fn toggle_normals(&mut self) {
        self.config.show_normals = !self.config.show_normals;
        self.scene.request_redraw();
    }

    pub fn toggle_point_light(&mut self) {
        self.config.light.toggle_point_light();
        self.scene.request_redraw();
    }

    pub fn light(&self) -> &Light {
        &self.config.light
    }

    pub fn set_light(&mut self, light: Light) {
        self.config.light = light;
        self.scene.request_redraw();
    }

    pub fn shading_mode(&self) -> ShadingMode {
        self.config.shading
    }

    pub fn set_shading_mode(&mut self, mode: ShadingMode) {
        self.config.shading = mode;
        self.scene.request_redraw();
    }

    /// Select the shading strategy by name (`none`, `flat`, `gouraud`, `phong`).
    pub fn set_shading_by_name(&mut self, name: &str) -> Result<(), ShadingModeError> {
        self.set_shading_mode(name.parse()?);
        Ok(())
    }

    pub fn set_backface_culling(&mut self, enabled: bool) {
        self.config.backface_culling = enabled;
        self.scene.request_redraw();
    }

    /// Force a redraw on the next [`Engine::render`].
    pub fn mark_dirty(&mut self) {
        self.scene.request_redraw();
    }

    // ============ Surface and projection ============

    /// Recompute the matrices and reallocate the buffers for a new size.
    pub fn resize(&mut self, width: u32, height: u32) {
        log::debug!("resize to {width}x{height}");
        self.config.width = width;
        self.config.height = height;
        self.projection.resize(width, height);
        self.framebuffer.resize(width, height);
        self.scene.request_redraw();
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Replace the default orthographic projection; `None` restores it.
    pub fn set_projection(&mut self, matrix: Option<Mat4>) {
        self.projection.set_projection(matrix);
        self.scene.request_redraw();
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    pub fn last_frame(&self) -> FrameStats {
        self.stats
    }

    pub fn pending_loads(&self) -> usize {
        self.pending.len()
    }

    // ============ Frame loop ============

    /// Hand finished mesh loads to their nodes. Returns the number still pending.
    pub fn poll_loads(&mut self) -> usize {
        let scene = &mut self.scene;
        let registry = &mut self.registry;
        self.pending.retain(|load| {
            match load.handle.poll() {
                LoadPoll::Pending => return true,
                LoadPoll::Ready(mesh) => {
                    log::debug!("mesh '{}' ready for node {}", load.handle.name(), load.node);
                    registry.insert_cached(load.handle.name(), Arc::clone(&mesh));
                    if let Some(model) = scene.model_mut(load.node) {
                        model.set_mesh(mesh);
                    }
                }
                LoadPoll::Failed(err) => {
                    log::error!(
                        "mesh '{}' for node {} failed to load: {err}",
                        load.handle.name(),
                        load.node
                    );
                    if let Some(model) = scene.model_mut(load.node) {
                        model.mark_failed(err.to_string());
                    }
                }
            }
            false
        });
        self.pending.len()
    }

    /// Draw a frame if anything changed and show it on `surface`.
    ///
    /// Returns `true` once everything is settled: no mesh is still loading
    /// and nothing changed since the last drawn frame.
    ///
    /// A node whose mesh failed to load counts as settled even though it is
    /// never ready; only nodes still waiting for a mesh keep requesting
    /// frames.
    pub fn render(&mut self, surface: &mut impl Surface) -> bool {
        self.poll_loads();
        if !self.scene.take_redraw() && self.pending.is_empty() {
            return true;
        }

        self.framebuffer.reset();
        let mut stats = FrameStats::default();

        let Self {
            config,
            scene,
            projection,
            framebuffer,
            rasterizer,
            corners,
            outline,
            ..
        } = self;

        for id in scene.ids().collect::<Vec<_>>() {
            let Some(model) = scene.model(id) else {
                continue;
            };
            if !model.is_ready() {
                if model.failure().is_none() {
                    stats.nodes_waiting += 1;
                }
                continue;
            }
            let (Ok(world), Ok(rotation)) = (scene.world_matrix(id), scene.world_rotation(id))
            else {
                continue;
            };
            let Some(model) = scene.model_for_frame(id) else {
                continue;
            };
            model.apply_transform_to_vertices(&world);
            model.apply_transform_to_working_vertices(projection.projection_viewport());
            model.apply_rotation_to_normals(&rotation);

            draw_model(
                model,
                config,
                framebuffer,
                rasterizer,
                corners,
                outline,
                &mut stats,
            );
            stats.nodes_drawn += 1;
        }

        self.framebuffer.display(surface);

        if stats.nodes_waiting > 0 || !self.pending.is_empty() {
            self.scene.request_redraw();
        }
        self.stats = stats;
        let settled = !self.scene.needs_redraw();
        log::trace!("frame drawn: {stats:?}, settled: {settled}");
        settled
    }
}

fn draw_model(
    model: &ModelInstance,
    config: &EngineConfig,
    framebuffer: &mut FrameBuffer,
    rasterizer: &mut ScanlineRasterizer,
    corners: &mut Vec<RasterVertex>,
    outline: &mut Vec<Vec3>,
    stats: &mut FrameStats,
) {
    let mut shader = Shader::new(config.shading, config.light);
    shader.set_model(model);

    for p in 0..model.polygon_count() {
        if model.is_degenerate(p) {
            log::trace!("skipping degenerate polygon {p}");
            continue;
        }
        let front_facing = shader.set_polygon(p);
        if !front_facing && config.backface_culling {
            stats.polygons_culled += 1;
            continue;
        }
        let Some(color) = model.polygon_color(p) else {
            continue;
        };

        shader.raster_vertices(corners);
        if config.render_mode.fills() {
            stats.pixels_written +=
                rasterizer.fill_polygon(corners, framebuffer, |f| shader.shade(f, color));
        }
        if config.render_mode.strokes() {
            let outline_color = if config.render_mode.fills() {
                colors::WIREFRAME
            } else {
                color
            };
            outline.clear();
            outline.extend(corners.iter().map(|c| c.position));
            stroke_polygon(framebuffer, outline, outline_color);
        }
        stats.polygons_drawn += 1;
    }

    if config.show_normals {
        let normals = model.transformed_vertex_normals();
        for (&v, &n) in model.transformed_vertices().iter().zip(normals) {
            if n != Vec3::ZERO {
                draw_line(framebuffer, v, v + n * config.normal_length, colors::NORMAL);
            }
        }
    }
}
