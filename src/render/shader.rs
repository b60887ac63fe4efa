//! Per-fragment lighting strategies.
//!
//! The rasterizer only interpolates; the [`Shader`] decides what gets
//! interpolated and how a fragment turns into a color. Every strategy
//! answers the same three calls:
//!
//! 1. [`Shader::set_model`] binds the transformed buffers of one model
//! 2. [`Shader::set_polygon`] does the once-per-polygon work and reports
//!    whether the polygon faces the viewer
//! 3. [`Shader::shade`] computes the final color of one fragment

use std::fmt;
use std::str::FromStr;

use super::rasterizer::{Fragment, RasterVertex};
use crate::colors;
use crate::error::ShadingModeError;
use crate::light::Light;
use crate::math::Vec3;
use crate::model::ModelInstance;

/// Granularity at which lighting is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadingMode {
    /// Polygon colors pass through unchanged.
    #[default]
    None,
    /// One intensity per polygon, from its centroid and face normal.
    Flat,
    /// One intensity per vertex, interpolated across the polygon.
    Gouraud,
    /// Normals interpolated, lighting evaluated per fragment.
    Phong,
}

impl ShadingMode {
    pub const ALL: [ShadingMode; 4] = [
        ShadingMode::None,
        ShadingMode::Flat,
        ShadingMode::Gouraud,
        ShadingMode::Phong,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShadingMode::None => "none",
            ShadingMode::Flat => "flat",
            ShadingMode::Gouraud => "gouraud",
            ShadingMode::Phong => "phong",
        }
    }

    /// The following mode, wrapping around.
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|&m| m == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for ShadingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShadingMode {
    type Err = ShadingModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "noshading" => Ok(ShadingMode::None),
            "flat" => Ok(ShadingMode::Flat),
            "gouraud" => Ok(ShadingMode::Gouraud),
            "phong" => Ok(ShadingMode::Phong),
            _ => Err(ShadingModeError(s.to_string())),
        }
    }
}

/// Lighting state for one model at a time.
#[derive(Debug, Clone)]
pub struct Shader<'m> {
    mode: ShadingMode,
    light: Light,
    model: Option<&'m ModelInstance>,
    polygon: Option<usize>,
    face_normal: Vec3,
    flat_intensity: f32,
    corner_intensities: Vec<f32>,
}

impl<'m> Shader<'m> {
    pub fn new(mode: ShadingMode, light: Light) -> Self {
        Self {
            mode,
            light,
            model: None,
            polygon: None,
            face_normal: Vec3::ZERO,
            flat_intensity: 1.0,
            corner_intensities: Vec::new(),
        }
    }

    pub fn mode(&self) -> ShadingMode {
        self.mode
    }

    pub fn light(&self) -> &Light {
        &self.light
    }

    /// Bind a ready model whose working buffers hold pixel-space vertices
    /// and rotated normals. Clears any polygon binding.
    pub fn set_model(&mut self, model: &'m ModelInstance) {
        debug_assert!(model.is_ready(), "shader bound to a model without mesh data");
        self.model = Some(model);
        self.polygon = None;
    }

    /// Prepare polygon `index` of the bound model.
    ///
    /// Returns `true` when the rotated face normal points towards the viewer
    /// (positive z). Edge-on and degenerate polygons report `false`.
    pub fn set_polygon(&mut self, index: usize) -> bool {
        let Some(model) = self.model else {
            debug_assert!(false, "set_polygon called before set_model");
            return false;
        };
        let (Some(polygon), Some(&normal)) = (
            model.polygon(index),
            model.transformed_polygon_normals().get(index),
        ) else {
            debug_assert!(false, "polygon {index} out of range");
            return false;
        };

        self.polygon = Some(index);
        self.face_normal = normal;
        let vertices = model.transformed_vertices();

        match self.mode {
            ShadingMode::Flat => {
                let centroid = polygon
                    .iter()
                    .fold(Vec3::ZERO, |acc, &i| acc + vertices[i])
                    / polygon.len() as f32;
                self.flat_intensity = self.light.intensity(centroid, normal);
            }
            ShadingMode::Gouraud => {
                let normals = model.transformed_vertex_normals();
                self.corner_intensities.clear();
                self.corner_intensities.extend(
                    polygon
                        .iter()
                        .map(|&i| self.light.intensity(vertices[i], normals[i])),
                );
            }
            ShadingMode::None | ShadingMode::Phong => {}
        }

        normal.z > 0.0
    }

    /// Corners of the bound polygon with the attributes this strategy needs.
    pub fn raster_vertices(&self, out: &mut Vec<RasterVertex>) {
        out.clear();
        let (Some(model), Some(index)) = (self.model, self.polygon) else {
            debug_assert!(false, "raster_vertices called before set_polygon");
            return;
        };
        let Some(polygon) = model.polygon(index) else {
            return;
        };
        let vertices = model.transformed_vertices();
        let normals = model.transformed_vertex_normals();
        out.extend(polygon.iter().enumerate().map(|(k, &i)| {
            let intensity = match self.mode {
                ShadingMode::Gouraud => self.corner_intensities[k],
                ShadingMode::Flat => self.flat_intensity,
                ShadingMode::None | ShadingMode::Phong => 1.0,
            };
            RasterVertex::new(vertices[i], intensity, normals[i])
        }));
    }

    /// Final color of a fragment of the bound polygon.
    ///
    /// Only R, G and B are scaled; the result is clamped per channel.
    #[inline]
    pub fn shade(&self, fragment: &Fragment, color: u32) -> u32 {
        debug_assert!(self.polygon.is_some(), "shade called before set_polygon");
        let intensity = match self.mode {
            ShadingMode::None => return color,
            ShadingMode::Flat => self.flat_intensity,
            ShadingMode::Gouraud => fragment.intensity,
            ShadingMode::Phong => {
                let normal = fragment.normal.try_normalize().unwrap_or(self.face_normal);
                self.light.intensity(fragment.point(), normal)
            }
        };
        colors::modulate(color, intensity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Mat4;
    use crate::mesh::{MeshData, MeshRecord};
    use approx::assert_relative_eq;
    use std::sync::Arc;

    const GREY: u32 = 0xFF646464; // 100, 100, 100

    fn square(rotation: Mat4) -> ModelInstance {
        let record = MeshRecord {
            vertices: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(10.0, 0.0, 0.0),
                Vec3::new(10.0, 10.0, 0.0),
                Vec3::new(0.0, 10.0, 0.0),
            ],
            polygons: vec![vec![0, 1, 2, 3]],
            ..Default::default()
        };
        let mut model = ModelInstance::from_mesh(Arc::new(MeshData::new(record).unwrap()));
        model.apply_transform_to_vertices(&rotation);
        model.apply_rotation_to_normals(&rotation);
        model
    }

    fn light_above_center() -> Light {
        Light::new(0.2, 1.0, Vec3::new(5.0, 5.0, 300.0))
    }

    fn fragment_at(x: i32, y: i32) -> Fragment {
        Fragment {
            x,
            y,
            z: 0.0,
            intensity: 0.5,
            normal: Vec3::Z,
        }
    }

    #[test]
    fn test_mode_names() {
        assert_eq!("Phong".parse::<ShadingMode>(), Ok(ShadingMode::Phong));
        assert_eq!("noShading".parse::<ShadingMode>(), Ok(ShadingMode::None));
        assert_eq!(
            "toon".parse::<ShadingMode>(),
            Err(ShadingModeError("toon".to_string()))
        );
        assert_eq!(ShadingMode::Phong.next(), ShadingMode::None);
        assert_eq!(ShadingMode::Gouraud.to_string(), "gouraud");
    }

    #[test]
    fn test_flat_facing_light_saturates() {
        let model = square(Mat4::identity());
        let mut shader = Shader::new(ShadingMode::Flat, light_above_center());
        shader.set_model(&model);
        assert!(shader.set_polygon(0));
        assert_eq!(shader.shade(&fragment_at(1, 1), GREY), GREY);
        assert_eq!(shader.shade(&fragment_at(9, 9), GREY), GREY);
    }

    #[test]
    fn test_back_facing_polygon_reported() {
        let model = square(Mat4::rotation_y(std::f32::consts::PI));
        let mut shader = Shader::new(ShadingMode::None, Light::default());
        shader.set_model(&model);
        assert!(!shader.set_polygon(0));
    }

    #[test]
    fn test_none_passes_color_through() {
        let model = square(Mat4::identity());
        let mut light = light_above_center();
        light.toggle_point_light();
        let mut shader = Shader::new(ShadingMode::None, light);
        shader.set_model(&model);
        shader.set_polygon(0);
        assert_eq!(shader.shade(&fragment_at(1, 1), GREY), GREY);
    }

    #[test]
    fn test_gouraud_corners_carry_intensity() {
        let model = square(Mat4::identity());
        let mut light = light_above_center();
        light.toggle_point_light();
        let mut shader = Shader::new(ShadingMode::Gouraud, light);
        shader.set_model(&model);
        shader.set_polygon(0);

        let mut corners = Vec::new();
        shader.raster_vertices(&mut corners);
        assert_eq!(corners.len(), 4);
        for corner in &corners {
            assert_relative_eq!(corner.intensity, 0.2);
        }
        // the fragment's own interpolated intensity is used
        assert_eq!(shader.shade(&fragment_at(1, 1), GREY), 0xFF323232);
    }

    #[test]
    fn test_phong_evaluates_per_fragment() {
        let model = square(Mat4::identity());
        let light = Light::new(0.0, 1.0, Vec3::new(0.0, 0.0, 10.0));
        let mut shader = Shader::new(ShadingMode::Phong, light);
        shader.set_model(&model);
        shader.set_polygon(0);

        let below = shader.shade(&fragment_at(0, 0), GREY);
        let aside = shader.shade(&fragment_at(10, 0), GREY);
        assert_eq!(below, GREY);
        // cos 45 degrees
        assert_eq!(colors::channels(aside)[0], 71);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "shade called before set_polygon")]
    fn test_shading_without_binding_panics_in_debug() {
        let shader = Shader::new(ShadingMode::Flat, Light::default());
        shader.shade(&fragment_at(0, 0), GREY);
    }
}
