//! Fly camera producing view and projection matrices

use glam::{Mat4, Vec3};

use super::config::CameraConfig;

const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Camera state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Radians, 0 looks down -Z
    pub yaw: f32,
    /// Radians, clamped just short of straight up/down
    pub pitch: f32,
    /// Vertical field of view, radians
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(position: Vec3, aspect: f32) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            fov_y: 60f32.to_radians(),
            aspect,
            near: 0.1,
            far: 100.0,
        }
    }

    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let mut cam = Self {
            position: config.position,
            yaw: config.yaw.to_radians(),
            pitch: 0.0,
            fov_y: config.fov_deg.to_radians(),
            aspect,
            near: config.near,
            far: config.far,
        };
        cam.rotate(config.pitch.to_radians(), 0.0);
        cam
    }

    pub fn forward(&self) -> Vec3 {
        crate::rasterizer::direction_from_angles(self.yaw, self.pitch)
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    /// Pitch by `dx`, yaw by `dy` (radians)
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dy;
        self.pitch = (self.pitch + dx).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Move along the camera's forward, right and world up axes
    pub fn move_local(&mut self, forward: f32, right: f32, up: f32) {
        self.position += self.forward() * forward + self.right() * right + Vec3::Y * up;
    }

    /// Ignored for degenerate viewports
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn view(&self) -> Mat4 {
        crate::rasterizer::look_at(self.position, self.position + self.forward(), Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        crate::rasterizer::perspective(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 5.0), 4.0 / 3.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_default_looks_down_negative_z() {
        let cam = Camera::default();
        assert!((cam.forward() - Vec3::NEG_Z).length() < 1e-5);
        assert!((cam.right() - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut cam = Camera::default();
        cam.rotate(10.0, 0.0);
        assert!(cam.pitch < std::f32::consts::FRAC_PI_2);
        cam.rotate(-20.0, 0.0);
        assert!(cam.pitch > -std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn test_origin_projects_to_centre() {
        let cam = Camera::default();
        let clip = cam.view_projection() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
        assert!(clip.w > 0.0);
    }

    #[test]
    fn test_behind_camera_has_negative_w() {
        let cam = Camera::default();
        let clip = cam.view_projection() * Vec4::new(0.0, 0.0, 10.0, 1.0);
        assert!(clip.w < 0.0);
    }

    #[test]
    fn test_move_local_follows_yaw() {
        let mut cam = Camera::new(Vec3::ZERO, 1.0);
        cam.rotate(0.0, std::f32::consts::FRAC_PI_2);
        cam.move_local(1.0, 0.0, 0.0);
        assert!((cam.position - Vec3::X).length() < 1e-5);
        cam.move_local(0.0, 0.0, 2.0);
        assert!((cam.position.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_set_aspect_ignores_zero() {
        let mut cam = Camera::default();
        cam.set_aspect(800.0, 400.0);
        assert_eq!(cam.aspect, 2.0);
        cam.set_aspect(800.0, 0.0);
        assert_eq!(cam.aspect, 2.0);
    }
}
