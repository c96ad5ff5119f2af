use glam::Vec3;

use crate::config::CameraConfig;
use crate::controller::input::{InputProcessor, InputState};
use crate::model::FreeCamera;

/// Handles preview camera movement and orientation
pub struct CameraController {
    pub move_speed: f32,
    pub mouse_sensitivity: f32,
    processor: InputProcessor,
}

impl CameraController {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            move_speed: config.move_speed,
            mouse_sensitivity: config.look_sensitivity,
            processor: InputProcessor::default(),
        }
    }

    pub fn processor(&self) -> &InputProcessor {
        &self.processor
    }

    /// Apply mouse look delta to camera
    pub fn apply_look(&self, camera: &mut FreeCamera, dx: f32, dy: f32) {
        camera.yaw += dx * self.mouse_sensitivity;
        let pi_half = std::f32::consts::PI / 2.0;
        camera.pitch = (camera.pitch - dy * self.mouse_sensitivity).clamp(-pi_half, pi_half);
    }

    /// Update camera position based on pressed keys
    pub fn update_movement(&self, camera: &mut FreeCamera, input: &InputState, dt: f32) {
        let p = &self.processor;
        let mut cam_move = Vec3::ZERO;

        if p.is_moving_forward(input) {
            cam_move += camera.forward();
        }
        if p.is_moving_backward(input) {
            cam_move -= camera.forward();
        }
        if p.is_moving_left(input) {
            cam_move -= camera.right();
        }
        if p.is_moving_right(input) {
            cam_move += camera.right();
        }
        if p.is_moving_up(input) {
            cam_move += Vec3::Y;
        }
        if p.is_moving_down(input) {
            cam_move -= Vec3::Y;
        }

        if cam_move.length_squared() > 0.0 {
            camera.position += cam_move.normalize() * self.move_speed * dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::input::InputEvent;

    #[test]
    fn test_forward_movement() {
        let config = CameraConfig::default();
        let controller = CameraController::new(&config);
        let mut cam = FreeCamera::new(&config, 800, 600);
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown("w".to_string()));

        let start = cam.position;
        controller.update_movement(&mut cam, &input, 0.5);

        let moved = cam.position - start;
        assert!((moved.length() - config.move_speed * 0.5).abs() < 1e-5);
        assert!(moved.normalize().abs_diff_eq(cam.forward(), 1e-5));
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let config = CameraConfig::default();
        let controller = CameraController::new(&config);
        let mut cam = FreeCamera::new(&config, 800, 600);
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown("a".to_string()));
        input.process_event(&InputEvent::KeyDown("d".to_string()));

        let start = cam.position;
        controller.update_movement(&mut cam, &input, 1.0);
        assert_eq!(cam.position, start);
    }

    #[test]
    fn test_look_clamps_pitch() {
        let config = CameraConfig::default();
        let controller = CameraController::new(&config);
        let mut cam = FreeCamera::new(&config, 800, 600);

        controller.apply_look(&mut cam, 0.0, -100_000.0);
        assert!(cam.pitch <= std::f32::consts::FRAC_PI_2);
        assert!(cam.forward().is_finite());
    }
}
