use crate::config::AppConfig;
use crate::controller::camera_controller::CameraController;
use crate::controller::input::{InputEvent, InputState};
use crate::controller::interaction::{ControllerPose, HighlightColors, InteractionContext, InteractionOutcome};
use crate::controller::session::SessionMode;
use crate::controller::xr_input::{ControllerId, ControllerRegistry, XrInputEvent};
use crate::error::{AppError, AppResult};
use crate::model::{FreeCamera, Scene};

/// Everything the per-frame logic touches, owned in one place so it can run without a browser.
pub struct FrameLoopContext {
    pub scene: Scene,
    pub camera: FreeCamera,
    pub input_state: InputState,
    pub camera_controller: CameraController,
    pub interaction: InteractionContext,
    /// `None` until the session mode is known to be supported; the controller loop never runs without it.
    pub controllers: Option<ControllerRegistry>,
    pub xr_active: bool,
    last_time: Option<f64>,
}

impl FrameLoopContext {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let scene = Scene::bootstrap(&config.scene)?;
        let colors = HighlightColors::from_config(&config.scene)?;

        Ok(Self {
            scene,
            camera: FreeCamera::new(&config.camera, config.canvas_width, config.canvas_height),
            input_state: InputState::new(),
            camera_controller: CameraController::new(&config.camera),
            interaction: InteractionContext::new(colors),
            controllers: None,
            xr_active: false,
            last_time: None,
        })
    }

    /// Apply the answer to the session support query. An unsupported mode fires `notify` once and
    /// leaves controller tracking disabled.
    pub fn on_session_support(
        &mut self,
        mode: SessionMode,
        supported: bool,
        notify: impl FnOnce(&str),
    ) -> AppResult<()> {
        if !supported {
            tracing::warn!(%mode, "session mode unsupported, controller interaction disabled");
            self.controllers = None;
            notify("WebXR is not supported");
            return Err(AppError::SessionUnsupported(mode));
        }

        tracing::info!(%mode, "session mode supported");
        self.controllers.get_or_insert_with(ControllerRegistry::new);
        Ok(())
    }

    pub fn tracking_enabled(&self) -> bool {
        self.controllers.is_some()
    }

    pub fn on_session_started(&mut self) {
        tracing::info!("XR session started");
        self.xr_active = true;
        self.input_state.clear_keys();
    }

    /// Drop all controllers and any selection.
    pub fn on_session_ended(&mut self) {
        tracing::info!("XR session ended");
        self.xr_active = false;
        self.interaction.clear(&mut self.scene);
        if let Some(registry) = self.controllers.as_mut() {
            registry.clear();
        }
        self.last_time = None;
    }

    pub fn handle_input(&mut self, event: &InputEvent) {
        self.input_state.process_event(event);
    }

    pub fn handle_xr_input(&mut self, event: &XrInputEvent) {
        let Some(registry) = self.controllers.as_mut() else {
            return;
        };
        if let Some(id) = registry.process_event(event) {
            self.interaction.forget_controller(&mut self.scene, id);
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }

    /// Desktop preview step: move the free camera. `now` is in milliseconds.
    pub fn update_preview(&mut self, now: f64) {
        let dt = match self.last_time {
            Some(last) => ((now - last) / 1000.0).clamp(0.0, 0.1) as f32,
            None => 0.0,
        };
        self.last_time = Some(now);

        let (dx, dy) = self.input_state.consume_look();
        self.camera_controller.apply_look(&mut self.camera, dx, dy);
        self.camera_controller
            .update_movement(&mut self.camera, &self.input_state, dt);
    }

    /// Run the interaction loop once for every connected controller.
    ///
    /// `pose_of` supplies the current target-ray pose; a controller without one is
    /// skipped but still has its trigger latched.
    pub fn update_controllers<F>(&mut self, mut pose_of: F) -> Vec<(ControllerId, InteractionOutcome)>
    where
        F: FnMut(ControllerId) -> Option<ControllerPose>,
    {
        let Some(registry) = self.controllers.as_mut() else {
            return Vec::new();
        };

        let mut outcomes = Vec::with_capacity(registry.len());
        for controller in registry.iter_mut() {
            match pose_of(controller.id) {
                Some(pose) => {
                    let outcome = self
                        .interaction
                        .handle_controller(&mut self.scene, controller, &pose);
                    outcomes.push((controller.id, outcome));
                }
                None => controller.trigger.latch(),
            }
        }
        outcomes
    }
}
