//! Local transform of a scene node.
//!
//! Provides a [`Transform`] struct with a fluent API for managing translation,
//! rotation (Euler angles) and scale. Every mutator adds a delta to the current
//! value; absolute setters exist for building scenes.

use crate::math::{Mat4, Vec3};

/// A 3D transform with translation, rotation (Euler angles) and scale.
///
/// Provides a fluent API where mutating methods return `&mut Self` for chaining:
///
/// ```ignore
/// transform
///     .translate(Vec3::new(5.0, 2.0, 0.0))
///     .rotate(Vec3::new(0.0, 0.1, 0.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    translation: Vec3,
    rotation: Vec3, // Euler angles in radians around x, y, z
    scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform with default values (translation=0, rotation=0, scale=1).
    pub fn new() -> Self {
        Self::default()
    }

    // ============ Translation ============

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn set_translation(&mut self, translation: Vec3) -> &mut Self {
        self.translation = translation;
        self
    }

    /// Add a delta to the translation.
    pub fn translate(&mut self, delta: Vec3) -> &mut Self {
        self.translation += delta;
        self
    }

    // ============ Rotation ============

    /// Get the rotation (Euler angles in radians).
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Vec3) -> &mut Self {
        self.rotation = rotation;
        self
    }

    /// Add a delta rotation (Euler angles in radians).
    pub fn rotate(&mut self, delta: Vec3) -> &mut Self {
        self.rotation += delta;
        self
    }

    // ============ Scale ============

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec3) -> &mut Self {
        self.scale = scale;
        self
    }

    /// Add a delta to the scale (additive, like the other components).
    pub fn scale_by(&mut self, delta: Vec3) -> &mut Self {
        self.scale += delta;
        self
    }

    // ============ Matrix Generation ============

    /// Generate the local transformation matrix.
    ///
    /// Order: Translation * RotationX * RotationY * RotationZ * Scale
    /// (Scale applied first, then rotations, then translation)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::translation(self.translation) * self.rotation_matrix() * Mat4::scaling(self.scale)
    }

    /// Rotation part only, without translation or scale.
    ///
    /// Used for normals so that non-uniform scale cannot skew them.
    pub fn rotation_matrix(&self) -> Mat4 {
        Mat4::rotation_xyz(self.rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default() {
        let t = Transform::default();
        assert_eq!(t.translation(), Vec3::ZERO);
        assert_eq!(t.rotation(), Vec3::ZERO);
        assert_eq!(t.scale(), Vec3::ONE);
    }

    #[test]
    fn test_deltas_accumulate() {
        let mut t = Transform::new();
        t.translate(Vec3::new(1.0, 0.0, 0.0))
            .translate(Vec3::new(2.0, 1.0, 0.0))
            .rotate(Vec3::new(0.0, 0.5, 0.0))
            .scale_by(Vec3::new(0.5, 0.0, 0.0));

        assert_eq!(t.translation(), Vec3::new(3.0, 1.0, 0.0));
        assert_relative_eq!(t.rotation().y, 0.5);
        assert_eq!(t.scale(), Vec3::new(1.5, 1.0, 1.0));
    }

    #[test]
    fn test_to_matrix_identity() {
        let t = Transform::default();
        // Default transform should produce identity matrix
        assert_eq!(t.to_matrix(), Mat4::identity());
    }

    #[test]
    fn test_translation_is_applied_last() {
        let mut t = Transform::new();
        t.set_translation(Vec3::new(10.0, 0.0, 0.0))
            .set_rotation(Vec3::new(0.0, 0.0, std::f32::consts::FRAC_PI_2))
            .set_scale(Vec3::new(2.0, 1.0, 1.0));

        // Scale x by 2, rotate onto +y, then offset in world space.
        let p = t.to_matrix().transform_point(Vec3::X);
        assert_relative_eq!(p.x, 10.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_rotation_matrix_ignores_translation_and_scale() {
        let mut t = Transform::new();
        t.set_translation(Vec3::new(5.0, 5.0, 5.0))
            .set_scale(Vec3::new(3.0, 1.0, 1.0));
        assert_eq!(t.rotation_matrix(), Mat4::identity());
    }
}
