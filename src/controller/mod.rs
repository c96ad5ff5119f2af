// CONTROLLER: Input, interaction logic, and update loop
pub mod input;
pub mod camera_controller;
pub mod xr_input;
pub mod interaction;
pub mod session;
pub mod frame_loop;

pub use input::{InputEvent, InputState, InputProcessor};
pub use camera_controller::CameraController;
pub use xr_input::{ButtonEdge, ButtonState, ControllerId, ControllerInput, ControllerRegistry, Handedness, XrInputEvent};
pub use interaction::{ControllerPose, HighlightColors, InteractionContext, InteractionOutcome, Selection};
pub use session::SessionMode;
pub use frame_loop::FrameLoopContext;
