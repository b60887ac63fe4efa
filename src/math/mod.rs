//! Small linear algebra kit used by the pipeline.
//!
//! All matrices follow the column-vector convention (`Mat4 * v`), so products
//! are read right-to-left.

pub mod mat4;
pub mod vec3;
pub mod vec4;

pub use mat4::Mat4;
pub use vec3::Vec3;
pub use vec4::Vec4;
