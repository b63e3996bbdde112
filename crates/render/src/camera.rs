use glam::{Mat4, Vec3};

/// Look-at camera with explicit position, target, and projection parameters.
///
/// All fields are edited live by the debug panel.
pub struct OrbitCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view, degrees. The panel clamps to 0..=180.
    pub fov_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_deg: 45.0,
            aspect: 800.0 / 600.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl OrbitCamera {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn default_camera() {
        let cam = OrbitCamera::default();
        assert!(cam.position.z > 0.0);
        let vp = cam.view_projection();
        // Should produce a valid matrix (no NaN)
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn origin_projects_in_front_of_default_camera() {
        let cam = OrbitCamera::default();
        let clip = cam.view_projection() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc_z = clip.z / clip.w;
        assert!(clip.w > 0.0);
        assert!((0.0..=1.0).contains(&ndc_z));
    }

    #[test]
    fn view_moves_world_opposite_to_camera() {
        let cam = OrbitCamera {
            position: Vec3::new(0.0, 0.0, 5.0),
            ..OrbitCamera::default()
        };
        let eye_space = cam.view_matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        // Camera looks down -Z; the origin sits 5 units ahead.
        assert!((eye_space.z - -5.0).abs() < 1e-6);
    }

    #[test]
    fn fov_changes_projection() {
        let narrow = OrbitCamera {
            fov_deg: 30.0,
            ..OrbitCamera::default()
        };
        let wide = OrbitCamera {
            fov_deg: 90.0,
            ..OrbitCamera::default()
        };
        // Narrower FOV magnifies: larger focal term in the projection.
        assert!(
            narrow.projection_matrix().col(1).y > wide.projection_matrix().col(1).y
        );
    }
}
