//! Ray-pick grab and drag.
//!
//! Each frame, every tracked controller's trigger is reduced to a [`ButtonEdge`]:
//! a press picks the nearest mesh along the pointer ray, holding keeps the picked
//! mesh at a fixed distance along the ray, and releasing drops it. There is a
//! single selection slot for the whole session, owned by the controller that made it.

use glam::{Quat, Vec3};

use crate::config::SceneConfig;
use crate::controller::xr_input::{ButtonEdge, ControllerId, ControllerInput};
use crate::error::AppResult;
use crate::model::{Color3, MeshId, Ray, Scene};

/// World-space target-ray transform of a controller for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerPose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl ControllerPose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self { position, orientation }
    }

    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let dir = (target - position).try_normalize().unwrap_or(Vec3::NEG_Z);
        Self::new(position, Quat::from_rotation_arc(Vec3::NEG_Z, dir))
    }

    /// Pointer ray; WebXR target rays point down local -Z.
    pub fn ray(&self) -> Ray {
        Ray::new(self.position, self.orientation * Vec3::NEG_Z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightColors {
    pub unselected: Color3,
    pub selected: Color3,
}

impl HighlightColors {
    pub fn from_config(config: &SceneConfig) -> AppResult<Self> {
        Ok(Self {
            unselected: Color3::from_hex(&config.unselected_color)?,
            selected: Color3::from_hex(&config.selected_color)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub mesh: MeshId,
    pub owner: ControllerId,
    pub hold_distance: f32,
}

/// What a single controller frame did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionOutcome {
    Idle,
    Missed,
    Selected { mesh: MeshId, hold_distance: f32 },
    Moved { mesh: MeshId, position: Vec3 },
    Released { mesh: MeshId },
}

pub struct InteractionContext {
    colors: HighlightColors,
    selection: Option<Selection>,
}

impl InteractionContext {
    pub fn new(colors: HighlightColors) -> Self {
        Self { colors, selection: None }
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Run one frame for `controller`, then latch its trigger.
    pub fn handle_controller(
        &mut self,
        scene: &mut Scene,
        controller: &mut ControllerInput,
        pose: &ControllerPose,
    ) -> InteractionOutcome {
        let outcome = match controller.trigger.edge() {
            ButtonEdge::Pressed => self.press(scene, controller.id, pose),
            ButtonEdge::Held => self.hold(scene, controller.id, pose),
            ButtonEdge::Released => self.release(scene, controller.id),
            ButtonEdge::Idle => InteractionOutcome::Idle,
        };
        controller.trigger.latch();
        outcome
    }

    /// Drop the selection if `id` owns it, e.g. when that controller disconnects.
    pub fn forget_controller(&mut self, scene: &mut Scene, id: ControllerId) -> InteractionOutcome {
        self.release(scene, id)
    }

    /// Drop any selection regardless of owner.
    pub fn clear(&mut self, scene: &mut Scene) -> InteractionOutcome {
        match self.selection.take() {
            Some(selection) => {
                self.set_color(scene, selection.mesh, self.colors.unselected);
                InteractionOutcome::Released { mesh: selection.mesh }
            }
            None => InteractionOutcome::Idle,
        }
    }

    fn press(&mut self, scene: &mut Scene, id: ControllerId, pose: &ControllerPose) -> InteractionOutcome {
        let Some(hit) = scene.pick_with_ray(&pose.ray()) else {
            return InteractionOutcome::Missed;
        };
        let Some(position) = scene.mesh(hit.mesh).map(|m| m.position) else {
            return InteractionOutcome::Missed;
        };

        // Another controller may still hold something; hand it back before taking over.
        if let Some(previous) = self.selection.take() {
            if previous.mesh != hit.mesh {
                self.set_color(scene, previous.mesh, self.colors.unselected);
            }
            tracing::debug!(from = ?previous.owner, to = ?id, "selection taken over");
        }

        let hold_distance = position.distance(pose.position);
        self.set_color(scene, hit.mesh, self.colors.selected);
        self.selection = Some(Selection {
            mesh: hit.mesh,
            owner: id,
            hold_distance,
        });

        tracing::debug!(?id, mesh = ?hit.mesh, hold_distance, "mesh selected");
        InteractionOutcome::Selected { mesh: hit.mesh, hold_distance }
    }

    fn hold(&mut self, scene: &mut Scene, id: ControllerId, pose: &ControllerPose) -> InteractionOutcome {
        let Some(selection) = self.selection.filter(|s| s.owner == id) else {
            return InteractionOutcome::Idle;
        };
        let Some(mesh) = scene.mesh_mut(selection.mesh) else {
            return InteractionOutcome::Idle;
        };

        let ray = pose.ray();
        let position = ray.at(selection.hold_distance);
        mesh.position = position;

        tracing::trace!(?id, ?position, "mesh moved");
        InteractionOutcome::Moved { mesh: selection.mesh, position }
    }

    fn release(&mut self, scene: &mut Scene, id: ControllerId) -> InteractionOutcome {
        if !self.selection.is_some_and(|s| s.owner == id) {
            return InteractionOutcome::Idle;
        }
        let outcome = self.clear(scene);
        tracing::debug!(?id, ?outcome, "selection released");
        outcome
    }

    fn set_color(&self, scene: &mut Scene, id: MeshId, color: Color3) {
        if let Some(mesh) = scene.mesh_mut(id) {
            mesh.material.diffuse_color = color;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::xr_input::{ButtonState, Handedness};

    struct Fixture {
        scene: Scene,
        ctx: InteractionContext,
        colors: HighlightColors,
        box_id: MeshId,
    }

    fn fixture() -> Fixture {
        let config = SceneConfig::default();
        let scene = Scene::bootstrap(&config).unwrap();
        let colors = HighlightColors::from_config(&config).unwrap();
        let box_id = scene.mesh_by_name("box").unwrap();
        Fixture {
            scene,
            ctx: InteractionContext::new(colors),
            colors,
            box_id,
        }
    }

    fn controller(id: u32, pressed: bool, pressed_prev: bool) -> ControllerInput {
        let mut c = ControllerInput::new(ControllerId(id), Handedness::Right);
        c.trigger = ButtonState { pressed, pressed_prev };
        c
    }

    fn pointing_at_box() -> ControllerPose {
        ControllerPose::new(Vec3::new(0.0, 0.0, 2.0), Quat::IDENTITY)
    }

    fn pointing_away() -> ControllerPose {
        ControllerPose::new(Vec3::new(0.0, 0.0, 2.0), Quat::from_rotation_y(std::f32::consts::PI))
    }

    #[test]
    fn test_pose_ray_points_down_negative_z() {
        let ray = pointing_at_box().ray();
        assert!(ray.direction.abs_diff_eq(Vec3::NEG_Z, 1e-6));

        let pose = ControllerPose::looking_at(Vec3::new(1.0, 1.0, 1.0), Vec3::ZERO);
        assert!(pose.ray().direction.abs_diff_eq(Vec3::splat(-1.0).normalize(), 1e-5));
    }

    #[test]
    fn test_press_with_hit_selects() {
        let mut f = fixture();
        let mut c = controller(1, true, false);

        let outcome = f.ctx.handle_controller(&mut f.scene, &mut c, &pointing_at_box());

        assert_eq!(outcome, InteractionOutcome::Selected { mesh: f.box_id, hold_distance: 2.0 });
        let selection = f.ctx.selection().expect("box should be selected");
        assert_eq!(selection.owner, ControllerId(1));
        assert!((selection.hold_distance - 2.0).abs() < 1e-6);
        assert_eq!(f.scene.mesh(f.box_id).unwrap().material.diffuse_color, f.colors.selected);
        assert!(c.trigger.pressed_prev);
    }

    #[test]
    fn test_hold_distance_uses_mesh_position_not_hit_point() {
        let mut f = fixture();
        let mut c = controller(1, true, false);
        let pose = ControllerPose::new(Vec3::new(0.1, 0.0, 3.0), Quat::IDENTITY);

        f.ctx.handle_controller(&mut f.scene, &mut c, &pose);

        let expected = Vec3::ZERO.distance(pose.position);
        assert!((f.ctx.selection().unwrap().hold_distance - expected).abs() < 1e-6);
    }

    #[test]
    fn test_press_without_hit_keeps_selection() {
        let mut f = fixture();
        let mut c = controller(1, true, false);

        let outcome = f.ctx.handle_controller(&mut f.scene, &mut c, &pointing_away());

        assert_eq!(outcome, InteractionOutcome::Missed);
        assert!(f.ctx.selection().is_none());
        assert_eq!(f.scene.mesh(f.box_id).unwrap().material.diffuse_color, f.colors.unselected);
        assert!(c.trigger.pressed_prev, "latch happens even on a miss");
    }

    #[test]
    fn test_hold_moves_along_ray() {
        let mut f = fixture();
        let mut c = controller(1, true, false);
        f.ctx.handle_controller(&mut f.scene, &mut c, &pointing_at_box());

        let pose = ControllerPose::new(Vec3::new(1.0, 0.5, 2.0), Quat::from_rotation_y(0.3));
        let outcome = f.ctx.handle_controller(&mut f.scene, &mut c, &pose);

        let expected = pose.position + pose.ray().direction * 2.0;
        let position = f.scene.mesh(f.box_id).unwrap().position;
        assert!(position.abs_diff_eq(expected, 1e-5), "{position:?} != {expected:?}");
        assert!((position.distance(pose.position) - 2.0).abs() < 1e-5);
        assert!(matches!(outcome, InteractionOutcome::Moved { mesh, .. } if mesh == f.box_id));
    }

    #[test]
    fn test_hold_without_selection_is_noop() {
        let mut f = fixture();
        let mut c = controller(1, true, true);

        let outcome = f.ctx.handle_controller(&mut f.scene, &mut c, &pointing_at_box());

        assert_eq!(outcome, InteractionOutcome::Idle);
        assert_eq!(f.scene.mesh(f.box_id).unwrap().position, Vec3::ZERO);
    }

    #[test]
    fn test_release_restores_color() {
        let mut f = fixture();
        let mut c = controller(1, true, false);
        f.ctx.handle_controller(&mut f.scene, &mut c, &pointing_at_box());

        c.trigger.pressed = false;
        let outcome = f.ctx.handle_controller(&mut f.scene, &mut c, &pointing_at_box());

        assert_eq!(outcome, InteractionOutcome::Released { mesh: f.box_id });
        assert!(f.ctx.selection().is_none());
        assert_eq!(f.scene.mesh(f.box_id).unwrap().material.diffuse_color, f.colors.unselected);
        assert!(!c.trigger.pressed_prev);
    }

    #[test]
    fn test_release_without_selection_is_noop() {
        let mut f = fixture();
        let mut c = controller(1, false, true);

        let outcome = f.ctx.handle_controller(&mut f.scene, &mut c, &pointing_at_box());

        assert_eq!(outcome, InteractionOutcome::Idle);
        assert!(!c.trigger.pressed_prev);
    }

    #[test]
    fn test_idle_does_nothing() {
        let mut f = fixture();
        let mut c = controller(1, false, false);
        assert_eq!(
            f.ctx.handle_controller(&mut f.scene, &mut c, &pointing_at_box()),
            InteractionOutcome::Idle
        );
    }

    #[test]
    fn test_other_controller_cannot_drag_or_release() {
        let mut f = fixture();
        let mut owner = controller(1, true, false);
        f.ctx.handle_controller(&mut f.scene, &mut owner, &pointing_at_box());

        let mut other = controller(2, true, true);
        let moved = f.ctx.handle_controller(&mut f.scene, &mut other, &pointing_away());
        assert_eq!(moved, InteractionOutcome::Idle);
        assert_eq!(f.scene.mesh(f.box_id).unwrap().position, Vec3::ZERO);

        other.trigger.pressed = false;
        let released = f.ctx.handle_controller(&mut f.scene, &mut other, &pointing_away());
        assert_eq!(released, InteractionOutcome::Idle);
        assert_eq!(f.ctx.selection().unwrap().owner, ControllerId(1));
    }

    #[test]
    fn test_second_press_takes_over_and_restores_previous() {
        let mut f = fixture();
        let mut second = crate::model::Mesh::new_box(
            "second",
            0.5,
            crate::model::StandardMaterial {
                name: "secondMaterial".to_string(),
                diffuse_color: f.colors.unselected,
            },
        );
        second.position = Vec3::new(3.0, 0.0, 0.0);
        let second_id = f.scene.add_mesh(second);

        let mut left = controller(1, true, false);
        f.ctx.handle_controller(&mut f.scene, &mut left, &pointing_at_box());

        let mut right = controller(2, true, false);
        let pose = ControllerPose::new(Vec3::new(3.0, 0.0, 2.0), Quat::IDENTITY);
        let outcome = f.ctx.handle_controller(&mut f.scene, &mut right, &pose);

        assert_eq!(outcome, InteractionOutcome::Selected { mesh: second_id, hold_distance: 2.0 });
        assert_eq!(f.scene.mesh(f.box_id).unwrap().material.diffuse_color, f.colors.unselected);
        assert_eq!(f.scene.mesh(second_id).unwrap().material.diffuse_color, f.colors.selected);

        // The first controller no longer owns anything
        let outcome = f.ctx.handle_controller(&mut f.scene, &mut left, &pointing_away());
        assert_eq!(outcome, InteractionOutcome::Idle);
        assert_eq!(f.scene.mesh(f.box_id).unwrap().position, Vec3::ZERO);
    }

    #[test]
    fn test_forget_controller_releases_only_owner() {
        let mut f = fixture();
        let mut c = controller(1, true, false);
        f.ctx.handle_controller(&mut f.scene, &mut c, &pointing_at_box());

        assert_eq!(f.ctx.forget_controller(&mut f.scene, ControllerId(2)), InteractionOutcome::Idle);
        assert!(f.ctx.selection().is_some());

        assert_eq!(
            f.ctx.forget_controller(&mut f.scene, ControllerId(1)),
            InteractionOutcome::Released { mesh: f.box_id }
        );
        assert_eq!(f.scene.mesh(f.box_id).unwrap().material.diffuse_color, f.colors.unselected);
    }
}
