//! Tracked XR controller input, independent of any browser binding.

/// Stable id handed out when a controller connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControllerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handedness {
    None,
    Left,
    Right,
}

/// Platform-independent controller notifications
#[derive(Debug, Clone, PartialEq)]
pub enum XrInputEvent {
    ControllerAdded { id: ControllerId, handedness: Handedness },
    ControllerRemoved { id: ControllerId },
    PrimaryButtonChanged { id: ControllerId, pressed: bool },
}

/// Transition between two consecutive samples of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEdge {
    Pressed,
    Held,
    Released,
    Idle,
}

/// `pressed` follows the device; `pressed_prev` is what `pressed` was when the last frame was handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonState {
    pub pressed: bool,
    pub pressed_prev: bool,
}

impl ButtonState {
    pub fn edge(&self) -> ButtonEdge {
        match (self.pressed, self.pressed_prev) {
            (true, false) => ButtonEdge::Pressed,
            (true, true) => ButtonEdge::Held,
            (false, true) => ButtonEdge::Released,
            (false, false) => ButtonEdge::Idle,
        }
    }

    /// End-of-frame bookkeeping.
    pub fn latch(&mut self) {
        self.pressed_prev = self.pressed;
    }
}

#[derive(Debug, Clone)]
pub struct ControllerInput {
    pub id: ControllerId,
    pub handedness: Handedness,
    pub trigger: ButtonState,
}

impl ControllerInput {
    pub fn new(id: ControllerId, handedness: Handedness) -> Self {
        Self {
            id,
            handedness,
            trigger: ButtonState::default(),
        }
    }
}

/// Connected controllers in connection order.
#[derive(Debug, Default)]
pub struct ControllerRegistry {
    controllers: Vec<ControllerInput>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a notification. Returns the id of a controller that disconnected.
    pub fn process_event(&mut self, event: &XrInputEvent) -> Option<ControllerId> {
        match *event {
            XrInputEvent::ControllerAdded { id, handedness } => {
                if self.get(id).is_none() {
                    tracing::info!(?id, ?handedness, "controller connected");
                    self.controllers.push(ControllerInput::new(id, handedness));
                }
                None
            }
            XrInputEvent::ControllerRemoved { id } => {
                let index = self.controllers.iter().position(|c| c.id == id)?;
                let removed = self.controllers.remove(index);
                tracing::info!(?id, handedness = ?removed.handedness, "controller disconnected");
                Some(id)
            }
            XrInputEvent::PrimaryButtonChanged { id, pressed } => {
                if let Some(controller) = self.get_mut(id) {
                    controller.trigger.pressed = pressed;
                }
                None
            }
        }
    }

    pub fn get(&self, id: ControllerId) -> Option<&ControllerInput> {
        self.controllers.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: ControllerId) -> Option<&mut ControllerInput> {
        self.controllers.iter_mut().find(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ControllerInput> {
        self.controllers.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ControllerInput> {
        self.controllers.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    pub fn clear(&mut self) {
        self.controllers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_table() {
        let cases = [
            (true, false, ButtonEdge::Pressed),
            (true, true, ButtonEdge::Held),
            (false, true, ButtonEdge::Released),
            (false, false, ButtonEdge::Idle),
        ];
        for (pressed, pressed_prev, expected) in cases {
            let state = ButtonState { pressed, pressed_prev };
            assert_eq!(state.edge(), expected, "({pressed}, {pressed_prev})");
        }
    }

    #[test]
    fn test_latch_copies_pressed() {
        let mut state = ButtonState { pressed: true, pressed_prev: false };
        state.latch();
        assert_eq!(state.edge(), ButtonEdge::Held);

        state.pressed = false;
        state.latch();
        assert_eq!(state, ButtonState::default());
    }

    #[test]
    fn test_registry_lifecycle() {
        let mut registry = ControllerRegistry::new();
        let id = ControllerId(1);

        registry.process_event(&XrInputEvent::ControllerAdded { id, handedness: Handedness::Right });
        registry.process_event(&XrInputEvent::ControllerAdded { id, handedness: Handedness::Right });
        assert_eq!(registry.len(), 1, "duplicate connect must not add a second record");
        assert_eq!(registry.get(id).unwrap().handedness, Handedness::Right);

        registry.process_event(&XrInputEvent::PrimaryButtonChanged { id, pressed: true });
        let trigger = registry.get(id).unwrap().trigger;
        assert!(trigger.pressed);
        assert!(!trigger.pressed_prev, "notifications never touch pressed_prev");

        assert_eq!(registry.process_event(&XrInputEvent::ControllerRemoved { id }), Some(id));
        assert!(registry.is_empty());
        assert_eq!(registry.process_event(&XrInputEvent::ControllerRemoved { id }), None);
    }

    #[test]
    fn test_button_for_unknown_controller_is_ignored() {
        let mut registry = ControllerRegistry::new();
        registry.process_event(&XrInputEvent::PrimaryButtonChanged { id: ControllerId(7), pressed: true });
        assert!(registry.is_empty());
    }
}
