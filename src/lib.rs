//! A CPU scanline renderer for small scene graphs.
//!
//! Meshes are loaded in the background and shared between the nodes that
//! display them. Every frame, each ready node's vertices are taken through
//! its world matrix and the projection-viewport matrix, lit by one of four
//! shading strategies and filled with a scanline rasterizer into a color and
//! depth buffer. Only the region that changed is handed to the display
//! surface.
//!
//! # Quick Start
//!
//! ```ignore
//! use rasterscene::prelude::*;
//!
//! let mut engine = Engine::new(EngineConfig::default().with_size(320, 240));
//! let cube = engine.create_mesh_node("cube", "cube")?;
//! engine.rotate(cube, Vec3::new(0.3, 0.5, 0.0))?;
//!
//! let mut surface = ImageSurface::new(320, 240);
//! while !engine.render(&mut surface) {}
//! surface.save_png("cube.png")?;
//! ```

// Public API - exposed to library consumers
pub mod colors;
pub mod config;
pub mod engine;
pub mod error;
pub mod light;
pub mod math;
pub mod mesh;
pub mod model;
pub mod projection;
pub mod render;
pub mod scene;
pub mod transform;
#[cfg(feature = "window")]
pub mod window;

// Re-export commonly needed types at crate root for convenience
pub use config::EngineConfig;
pub use engine::{Engine, FrameStats, RenderMode};
pub use error::{LoadError, MeshError, SceneError, ShadingModeError};
pub use light::Light;
pub use mesh::{MeshData, MeshRecord, MeshRegistry, MeshSource};
pub use model::ModelInstance;
pub use projection::Projection;
pub use render::{ImageSurface, ShadingMode, Surface};
pub use scene::{NodeId, SceneGraph};
pub use transform::Transform;

/// Install the `env_logger` backend, configured through `RUST_LOG`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logger() {
    if env_logger::try_init().is_err() {
        log::debug!("logger already initialized");
    }
}

/// Prelude module for convenient imports.
///
/// # Example
/// ```ignore
/// use rasterscene::prelude::*;
/// ```
pub mod prelude {
    // Engine
    pub use crate::config::EngineConfig;
    pub use crate::engine::{Engine, FrameStats, RenderMode};

    // Scene
    pub use crate::light::Light;
    pub use crate::mesh::{MeshRecord, MeshRegistry, MeshSource};
    pub use crate::model::ModelInstance;
    pub use crate::scene::{NodeId, SceneGraph};
    pub use crate::transform::Transform;

    // Math
    pub use crate::math::mat4::Mat4;
    pub use crate::math::vec3::Vec3;
    pub use crate::math::vec4::Vec4;

    // Rendering
    pub use crate::render::{ImageSurface, ShadingMode, Surface};

    // Window & Input
    #[cfg(feature = "window")]
    pub use crate::window::{FrameLimiter, Window, WindowEvent};
}

/// Module exposing internals for benchmarking. Not part of the stable API.
pub mod bench {
    pub use crate::render::{FrameBuffer, RasterVertex, ScanlineRasterizer};
}
