//! Platform-agnostic desktop input handling for the preview camera
use std::collections::HashSet;

/// Platform-independent input events
#[derive(Debug, Clone)]
pub enum InputEvent {
    // Keyboard events
    KeyDown(String),
    KeyUp(String),

    // Mouse events
    MouseMove { dx: f32, dy: f32 },
    MouseButton { button: MouseButton, is_down: bool },

    // Window events
    FocusLost,
    VisibilityChanged { visible: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn from_web_button(button: i16) -> Self {
        match button {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            _ => MouseButton::Left,
        }
    }
}

/// Keyboard and mouse state accumulated between frames
#[derive(Debug, Default)]
pub struct InputState {
    pub pressed_keys: HashSet<String>,
    pub look_delta: (f32, f32),
    pub dragging: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                self.pressed_keys.insert(key.clone());
            }
            InputEvent::KeyUp(key) => {
                self.pressed_keys.remove(key.as_str());
            }
            InputEvent::MouseMove { dx, dy } => {
                // Look only while dragging, like a free camera attached to the canvas
                if self.dragging {
                    self.look_delta.0 += dx;
                    self.look_delta.1 += dy;
                }
            }
            InputEvent::MouseButton { button: MouseButton::Left, is_down } => {
                self.dragging = *is_down;
            }
            InputEvent::MouseButton { .. } => {}
            InputEvent::FocusLost | InputEvent::VisibilityChanged { visible: false } => {
                self.clear_keys();
                self.dragging = false;
            }
            InputEvent::VisibilityChanged { visible: true } => {}
        }
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    pub fn clear_keys(&mut self) {
        self.pressed_keys.clear();
    }

    pub fn consume_look(&mut self) -> (f32, f32) {
        let result = self.look_delta;
        self.look_delta = (0.0, 0.0);
        result
    }
}

/// Key mapping configuration
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
    pub up: String,
    pub down: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "w".to_string(),
            backward: "s".to_string(),
            left: "a".to_string(),
            right: "d".to_string(),
            up: "e".to_string(),
            down: "q".to_string(),
        }
    }
}

/// Maps raw key state to camera intents. Arrow keys always work alongside the bindings.
#[derive(Debug, Clone, Default)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    fn bound(&self, input: &InputState, key: &str, arrow: Option<&str>) -> bool {
        input.is_key_pressed(key)
            || input.is_key_pressed(&key.to_ascii_uppercase())
            || arrow.is_some_and(|a| input.is_key_pressed(a))
    }

    pub fn is_moving_forward(&self, input: &InputState) -> bool {
        self.bound(input, &self.bindings.forward, Some("ArrowUp"))
    }

    pub fn is_moving_backward(&self, input: &InputState) -> bool {
        self.bound(input, &self.bindings.backward, Some("ArrowDown"))
    }

    pub fn is_moving_left(&self, input: &InputState) -> bool {
        self.bound(input, &self.bindings.left, Some("ArrowLeft"))
    }

    pub fn is_moving_right(&self, input: &InputState) -> bool {
        self.bound(input, &self.bindings.right, Some("ArrowRight"))
    }

    pub fn is_moving_up(&self, input: &InputState) -> bool {
        self.bound(input, &self.bindings.up, None)
    }

    pub fn is_moving_down(&self, input: &InputState) -> bool {
        self.bound(input, &self.bindings.down, None)
    }

    /// Keys whose browser default (scrolling) should be suppressed.
    pub fn is_navigation_key(&self, key: &str) -> bool {
        matches!(key, "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight")
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use web_sys::{KeyboardEvent, MouseEvent};

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let key = e.key();
        if is_down {
            InputEvent::KeyDown(key)
        } else {
            InputEvent::KeyUp(key)
        }
    }

    pub fn mouse_move_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::MouseMove {
            dx: e.movement_x() as f32,
            dy: e.movement_y() as f32,
        }
    }

    pub fn mouse_button_to_input(e: &MouseEvent, is_down: bool) -> InputEvent {
        InputEvent::MouseButton {
            button: MouseButton::from_web_button(e.button()),
            is_down,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_look_only_while_dragging() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::MouseMove { dx: 5.0, dy: 1.0 });
        assert_eq!(input.consume_look(), (0.0, 0.0));

        input.process_event(&InputEvent::MouseButton { button: MouseButton::Left, is_down: true });
        input.process_event(&InputEvent::MouseMove { dx: 5.0, dy: 1.0 });
        input.process_event(&InputEvent::MouseMove { dx: 1.0, dy: -3.0 });
        assert_eq!(input.consume_look(), (6.0, -2.0));
        assert_eq!(input.consume_look(), (0.0, 0.0), "look delta is consumed");

        input.process_event(&InputEvent::MouseButton { button: MouseButton::Right, is_down: false });
        assert!(input.dragging, "right button does not end a drag");
    }

    #[test]
    fn test_focus_loss_clears_keys() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown("w".to_string()));
        input.process_event(&InputEvent::MouseButton { button: MouseButton::Left, is_down: true });
        assert!(input.is_key_pressed("w"));

        input.process_event(&InputEvent::FocusLost);
        assert!(!input.is_key_pressed("w"));
        assert!(!input.dragging);
    }

    #[test]
    fn test_only_hiding_the_page_clears_keys() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown("w".to_string()));
        input.process_event(&InputEvent::MouseButton { button: MouseButton::Left, is_down: true });

        input.process_event(&InputEvent::VisibilityChanged { visible: true });
        assert!(input.is_key_pressed("w"), "becoming visible keeps held keys");
        assert!(input.dragging);

        input.process_event(&InputEvent::VisibilityChanged { visible: false });
        assert!(!input.is_key_pressed("w"));
        assert!(!input.dragging);
    }

    #[test]
    fn test_processor_bindings() {
        let processor = InputProcessor::default();
        let mut input = InputState::new();

        input.process_event(&InputEvent::KeyDown("ArrowUp".to_string()));
        assert!(processor.is_moving_forward(&input));
        input.process_event(&InputEvent::KeyUp("ArrowUp".to_string()));
        assert!(!processor.is_moving_forward(&input));

        input.process_event(&InputEvent::KeyDown("D".to_string()));
        assert!(processor.is_moving_right(&input), "uppercase counts too");
        assert!(!processor.is_moving_left(&input));
        assert!(processor.is_navigation_key("ArrowLeft"));
        assert!(!processor.is_navigation_key("w"));
    }
}
