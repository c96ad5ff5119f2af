use glam::{Quat, Vec3};
use web_sys::{XrFrame, XrHandedness, XrInputSource, XrReferenceSpace, XrTargetRayMode};

use crate::controller::{ControllerId, ControllerPose, Handedness, XrInputEvent};

/// Maps browser input sources to stable controller ids.
///
/// `XRInputSource` objects have identity but no id, so lookups compare references.
#[derive(Default)]
pub struct TrackedSources {
    sources: Vec<(ControllerId, XrInputSource)>,
    next_id: u32,
}

impl TrackedSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `source` if it is a hand-held pointer. Gaze and screen inputs are ignored.
    pub fn add(&mut self, source: &XrInputSource) -> Option<XrInputEvent> {
        if source.target_ray_mode() != XrTargetRayMode::TrackedPointer || self.id_of(source).is_some() {
            return None;
        }
        let id = ControllerId(self.next_id);
        self.next_id += 1;
        self.sources.push((id, source.clone()));
        Some(XrInputEvent::ControllerAdded {
            id,
            handedness: handedness(source.handedness()),
        })
    }

    pub fn remove(&mut self, source: &XrInputSource) -> Option<XrInputEvent> {
        let id = self.id_of(source)?;
        self.sources.retain(|(tracked, _)| *tracked != id);
        Some(XrInputEvent::ControllerRemoved { id })
    }

    pub fn button_changed(&self, source: &XrInputSource, pressed: bool) -> Option<XrInputEvent> {
        let id = self.id_of(source)?;
        Some(XrInputEvent::PrimaryButtonChanged { id, pressed })
    }

    pub fn id_of(&self, source: &XrInputSource) -> Option<ControllerId> {
        self.sources
            .iter()
            .find(|(_, tracked)| js_sys::Object::is(tracked.as_ref(), source.as_ref()))
            .map(|(id, _)| *id)
    }

    /// Target-ray pose of controller `id` in `space` for this frame.
    pub fn pose(&self, frame: &XrFrame, space: &XrReferenceSpace, id: ControllerId) -> Option<ControllerPose> {
        let (_, source) = self.sources.iter().find(|(tracked, _)| *tracked == id)?;
        let pose = frame.get_pose(&source.target_ray_space(), space)?;
        let transform = pose.transform();

        let p = transform.position();
        let o = transform.orientation();
        let position = Vec3::new(p.x() as f32, p.y() as f32, p.z() as f32);
        let orientation = Quat::from_xyzw(o.x() as f32, o.y() as f32, o.z() as f32, o.w() as f32).normalize();
        Some(ControllerPose::new(position, orientation))
    }

    pub fn clear(&mut self) {
        self.sources.clear();
    }
}

fn handedness(h: XrHandedness) -> Handedness {
    match h {
        XrHandedness::Left => Handedness::Left,
        XrHandedness::Right => Handedness::Right,
        _ => Handedness::None,
    }
}
