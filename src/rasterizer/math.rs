//! Vector math for 3D rendering
//! Thin helpers over glam's value types

pub use glam::{Mat4, Vec2, Vec3, Vec4};

/// Scalar linear interpolation (t outside [0, 1] extrapolates)
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Map normalized device coordinates to raster space.
/// x: [-1, 1] -> [0, width], y: [-1, 1] -> [height, 0] (row 0 is the top).
/// z passes through unchanged.
#[inline]
pub fn ndc_to_viewport(ndc: Vec3, width: usize, height: usize) -> Vec3 {
    Vec3::new(
        (ndc.x + 1.0) * 0.5 * width as f32,
        (1.0 - ndc.y) * 0.5 * height as f32,
        ndc.z,
    )
}

/// Unnormalized face normal of three points (right-handed cross product)
#[inline]
pub fn face_normal(p0: Vec3, p1: Vec3, p2: Vec3) -> Vec3 {
    (p1 - p0).cross(p2 - p0)
}

/// Twice the signed area of a triangle projected on the XY plane
#[inline]
pub fn signed_area(p0: Vec3, p1: Vec3, p2: Vec3) -> f32 {
    (p1.x - p0.x) * (p2.y - p0.y) - (p1.y - p0.y) * (p2.x - p0.x)
}

/// Right-handed perspective projection, depth mapped to [-1, 1] so the
/// near and far planes land on the `-w <= z <= w` clip cube.
/// `fov_y` is in radians.
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh_gl(fov_y, aspect, near, far)
}

/// Right-handed look-at view matrix
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    Mat4::look_at_rh(eye, target, up)
}

/// Forward direction from yaw and pitch (radians). Yaw 0 looks down -Z.
pub fn direction_from_angles(yaw: f32, pitch: f32) -> Vec3 {
    let (sy, cy) = yaw.sin_cos();
    let (sp, cp) = pitch.sin_cos();
    Vec3::new(sy * cp, sp, -cy * cp).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints_and_extrapolation() {
        assert_eq!(lerp(2.0, 6.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 6.0, 1.0), 6.0);
        assert!((lerp(2.0, 6.0, 1.5) - 8.0).abs() < 0.001);
        assert!((lerp(2.0, 6.0, -0.5) - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_viewport_flips_y() {
        let top_left = ndc_to_viewport(Vec3::new(-1.0, 1.0, 0.25), 800, 600);
        assert!((top_left.x - 0.0).abs() < 0.001);
        assert!((top_left.y - 0.0).abs() < 0.001);
        assert!((top_left.z - 0.25).abs() < 0.001);

        let bottom_right = ndc_to_viewport(Vec3::new(1.0, -1.0, 0.0), 800, 600);
        assert!((bottom_right.x - 800.0).abs() < 0.001);
        assert!((bottom_right.y - 600.0).abs() < 0.001);
    }

    #[test]
    fn test_signed_area_sign() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(1.0, 0.0, 0.0);
        let c = Vec3::new(0.0, 1.0, 0.0);
        assert!((signed_area(a, b, c) - 1.0).abs() < 0.001);
        assert!((signed_area(a, c, b) + 1.0).abs() < 0.001);
        assert!((face_normal(a, b, c).z - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_perspective_maps_near_and_far() {
        let proj = perspective(60f32.to_radians(), 1.0, 0.1, 100.0);
        let near = proj * Vec4::new(0.0, 0.0, -0.1, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, -100.0, 1.0);
        assert!((near.z / near.w + 1.0).abs() < 0.001);
        assert!((far.z / far.w - 1.0).abs() < 0.001);

        // Halfway to the near plane is outside the cube
        let too_near = proj * Vec4::new(0.0, 0.0, -0.05, 1.0);
        assert!(too_near.z < -too_near.w);
    }

    #[test]
    fn test_direction_default_looks_down_negative_z() {
        let d = direction_from_angles(0.0, 0.0);
        assert!((d.z + 1.0).abs() < 0.001);
    }
}
