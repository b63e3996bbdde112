use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Model matrix parameters: translation, Y-axis rotation, scale.
///
/// These are the values the debug panel edits directly. Rotation is a single
/// angle in degrees about +Y, which is all the viewer exposes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelTransform {
    pub translation: Vec3,
    pub rotation_deg: f32,
    pub scale: Vec3,
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation_deg: 0.0,
            scale: Vec3::ONE,
        }
    }
}

impl ModelTransform {
    /// Compose the model matrix: translate, then rotate about +Y, then scale.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(self.translation)
            * Mat4::from_rotation_y(self.rotation_deg.to_radians())
            * Mat4::from_scale(self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn default_is_identity() {
        let t = ModelTransform::default();
        assert_eq!(t.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn translation_moves_origin() {
        let t = ModelTransform {
            translation: Vec3::new(1.0, 2.0, 3.0),
            ..ModelTransform::default()
        };
        let p = t.matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(p, Vec4::new(1.0, 2.0, 3.0, 1.0));
    }

    #[test]
    fn rotation_is_about_y() {
        let t = ModelTransform {
            rotation_deg: 90.0,
            ..ModelTransform::default()
        };
        // +X rotates to -Z under a 90 degree Y rotation.
        let p = t.matrix() * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert!((p.x - 0.0).abs() < 1e-6);
        assert!((p.z - -1.0).abs() < 1e-6);
    }

    #[test]
    fn scale_applies_before_translation() {
        let t = ModelTransform {
            translation: Vec3::new(10.0, 0.0, 0.0),
            rotation_deg: 0.0,
            scale: Vec3::splat(2.0),
        };
        let p = t.matrix() * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert_eq!(p.x, 12.0);
    }
}
