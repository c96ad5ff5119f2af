//! Static scene and session parameters. There is no runtime configuration source;
//! everything the demo needs is fixed here.

use glam::Vec3;

use crate::controller::SessionMode;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub session_mode: SessionMode,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub clear_color: [f32; 4],
    pub scene: SceneConfig,
    pub camera: CameraConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session_mode: SessionMode::ImmersiveVr,
            canvas_width: 800,
            canvas_height: 600,
            clear_color: [0.2, 0.2, 0.3, 1.0],
            scene: SceneConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

/// The grabbable box and the light.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub box_name: String,
    pub box_size: f32,
    pub box_position: Vec3,
    pub unselected_color: String,
    pub selected_color: String,
    pub light: LightConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            box_name: "box".to_string(),
            box_size: 0.5,
            box_position: Vec3::ZERO,
            unselected_color: "#5853e6".to_string(),
            selected_color: "#f0520a".to_string(),
            light: LightConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LightConfig {
    pub name: String,
    pub direction: Vec3,
    pub diffuse: String,
    pub ground_color: String,
    pub intensity: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            name: "light".to_string(),
            direction: Vec3::new(-0.5, -1.0, -0.25),
            diffuse: "#ffffff".to_string(),
            ground_color: "#bbbbff".to_string(),
            intensity: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CameraConfig {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub move_speed: f32,
    pub look_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 3.0, -3.0),
            target: Vec3::ZERO,
            fov_y: 0.8,
            z_near: 0.1,
            z_far: 1000.0,
            move_speed: 2.0,
            look_sensitivity: 0.004,
        }
    }
}
