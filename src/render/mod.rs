//! Everything between transformed polygons and pixels on a surface.

pub mod depth;
pub mod framebuffer;
pub mod rasterizer;
pub mod shader;
pub mod surface;

pub use depth::DepthBuffer;
pub use framebuffer::{DirtyRect, FrameBuffer};
pub use rasterizer::{draw_line, stroke_polygon, Fragment, RasterVertex, ScanlineRasterizer};
pub use shader::{Shader, ShadingMode};
pub use surface::{ImageSurface, PixelRect, Surface};
