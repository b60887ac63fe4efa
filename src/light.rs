//! Lighting model: one ambient term plus one point light.

use crate::math::Vec3;

pub const DEFAULT_AMBIENT: f32 = 0.2;
pub const DEFAULT_POINT_INTENSITY: f32 = 1.0;
pub const DEFAULT_POSITION: Vec3 = Vec3::new(0.0, 0.0, 300.0);

/// Ambient light plus a point light that can be switched off.
///
/// Positions and normals passed to [`Light::intensity`] must live in the same
/// space. The renderer uses pixel space for points, which the default
/// projection keeps aligned with world axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub ambient: f32,
    pub point_intensity: f32,
    pub position: Vec3,
    point_enabled: bool,
}

impl Default for Light {
    fn default() -> Self {
        Self::new(DEFAULT_AMBIENT, DEFAULT_POINT_INTENSITY, DEFAULT_POSITION)
    }
}

impl Light {
    pub fn new(ambient: f32, point_intensity: f32, position: Vec3) -> Self {
        Self {
            ambient,
            point_intensity,
            position,
            point_enabled: true,
        }
    }

    pub fn point_enabled(&self) -> bool {
        self.point_enabled
    }

    pub fn set_point_enabled(&mut self, enabled: bool) {
        self.point_enabled = enabled;
    }

    /// Switch the point light on or off; the ambient term is unaffected.
    pub fn toggle_point_light(&mut self) {
        self.point_enabled = !self.point_enabled;
    }

    /// Lambert term for a surface point, clamped to [0, 1].
    ///
    /// `clamp(dot(normalize(position - point), normal), 0, 1) * point + ambient`.
    /// A point that coincides with the light gets ambient only.
    pub fn intensity(&self, point: Vec3, normal: Vec3) -> f32 {
        let diffuse = if self.point_enabled {
            (self.position - point)
                .try_normalize()
                .map_or(0.0, |to_light| to_light.dot(normal).clamp(0.0, 1.0))
                * self.point_intensity
        } else {
            0.0
        };
        (diffuse + self.ambient).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_facing_light_is_saturated() {
        let light = Light::default();
        // 1.0 * 1.0 + 0.2 clamps to 1
        assert_relative_eq!(light.intensity(Vec3::ZERO, Vec3::Z), 1.0);
    }

    #[test]
    fn test_facing_away_gets_ambient_only() {
        let light = Light::default();
        assert_relative_eq!(light.intensity(Vec3::ZERO, -Vec3::Z), DEFAULT_AMBIENT);
    }

    #[test]
    fn test_angled_surface() {
        let light = Light::new(0.0, 1.0, Vec3::new(0.0, 100.0, 0.0));
        let normal = Vec3::new(0.0, 1.0, 1.0).normalize();
        assert_relative_eq!(light.intensity(Vec3::ZERO, normal), 0.70710677, epsilon = 1e-5);
    }

    #[test]
    fn test_point_light_toggle() {
        let mut light = Light::default();
        light.toggle_point_light();
        assert!(!light.point_enabled());
        assert_relative_eq!(light.intensity(Vec3::ZERO, Vec3::Z), DEFAULT_AMBIENT);
        light.toggle_point_light();
        assert_relative_eq!(light.intensity(Vec3::ZERO, Vec3::Z), 1.0);
    }

    #[test]
    fn test_point_at_light_position() {
        let light = Light::default();
        assert_relative_eq!(light.intensity(DEFAULT_POSITION, Vec3::Z), DEFAULT_AMBIENT);
    }
}
