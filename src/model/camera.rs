use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

/// Desktop preview camera. Orientation is kept as yaw/pitch; `forward()` derives the view direction.
pub struct FreeCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl FreeCamera {
    pub fn new(config: &CameraConfig, width: u32, height: u32) -> Self {
        let mut camera = Self {
            position: config.position,
            yaw: 0.0,
            pitch: 0.0,
            up: Vec3::Y,
            fov_y: config.fov_y,
            aspect: 1.0,
            z_near: config.z_near,
            z_far: config.z_far,
        };
        camera.set_aspect(width, height);
        camera.set_target(config.target);
        camera
    }

    pub fn forward(&self) -> Vec3 {
        let cy = self.yaw;
        let cp = self.pitch.clamp(-1.5533, 1.5533); // Slightly less than π/2 to avoid gimbal lock
        Vec3::new(cy.cos() * cp.cos(), cp.sin(), cy.sin() * cp.cos()).normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize()
    }

    pub fn target(&self) -> Vec3 {
        self.position + self.forward()
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    /// Point the camera at `target`. No-op when `target` equals the position.
    pub fn set_target(&mut self, target: Vec3) {
        let Some(dir) = (target - self.position).try_normalize() else {
            return;
        };
        self.yaw = dir.z.atan2(dir.x);
        self.pitch = dir.y.asin().clamp(-1.4, 1.4);
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target(), self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        let proj = Mat4::perspective_rh_gl(self.fov_y, self.aspect, self.z_near, self.z_far);
        proj * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4Swizzles;

    #[test]
    fn test_default_camera_looks_at_origin() {
        let config = CameraConfig::default();
        let cam = FreeCamera::new(&config, 800, 600);

        let expected = (Vec3::ZERO - config.position).normalize();
        assert!(cam.forward().abs_diff_eq(expected, 1e-5), "forward {:?}", cam.forward());
        assert!((cam.aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_target_projects_to_center() {
        let cam = FreeCamera::new(&CameraConfig::default(), 640, 480);
        let clip = cam.view_proj() * Vec3::ZERO.extend(1.0);
        let ndc = clip.xyz() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4, "ndc {ndc:?}");
        assert!(ndc.z > -1.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_zero_height_does_not_divide_by_zero() {
        let mut cam = FreeCamera::new(&CameraConfig::default(), 640, 480);
        cam.set_aspect(640, 0);
        assert!(cam.aspect.is_finite());

        let before = (cam.yaw, cam.pitch);
        cam.set_target(cam.position);
        assert_eq!((cam.yaw, cam.pitch), before);
    }
}
