//! Engine settings.

use crate::colors;
use crate::engine::RenderMode;
use crate::light::Light;
use crate::render::ShadingMode;

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;
pub const DEFAULT_NORMAL_LENGTH: f32 = 30.0;

/// Everything [`Engine::new`](crate::Engine::new) needs to know up front.
///
/// ```ignore
/// let config = EngineConfig::default()
///     .with_size(1024, 768)
///     .with_shading(ShadingMode::Gouraud);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub width: u32,
    pub height: u32,
    pub background: u32,
    pub shading: ShadingMode,
    pub light: Light,
    pub render_mode: RenderMode,
    pub backface_culling: bool,
    pub depth_view: bool,
    /// New model instances start with their triangulated polygon list.
    pub triangulate_on_load: bool,
    /// Draw vertex normals as short lines on top of the frame.
    pub show_normals: bool,
    /// Overlay line length in pixels.
    pub normal_length: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            background: colors::BACKGROUND,
            shading: ShadingMode::Flat,
            light: Light::default(),
            render_mode: RenderMode::default(),
            backface_culling: true,
            depth_view: false,
            triangulate_on_load: false,
            show_normals: false,
            normal_length: DEFAULT_NORMAL_LENGTH,
        }
    }
}

impl EngineConfig {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_background(mut self, background: u32) -> Self {
        self.background = background;
        self
    }

    pub fn with_shading(mut self, shading: ShadingMode) -> Self {
        self.shading = shading;
        self
    }

    pub fn with_light(mut self, light: Light) -> Self {
        self.light = light;
        self
    }

    pub fn with_render_mode(mut self, render_mode: RenderMode) -> Self {
        self.render_mode = render_mode;
        self
    }

    pub fn with_backface_culling(mut self, enabled: bool) -> Self {
        self.backface_culling = enabled;
        self
    }

    pub fn with_depth_view(mut self, enabled: bool) -> Self {
        self.depth_view = enabled;
        self
    }

    pub fn with_triangulate_on_load(mut self, enabled: bool) -> Self {
        self.triangulate_on_load = enabled;
        self
    }

    pub fn with_show_normals(mut self, enabled: bool) -> Self {
        self.show_normals = enabled;
        self
    }
}
