//! The manipulator bound to the selected module.

use glam::Vec3;
use habitat_core::{EntityId, Transform, World};

use crate::gizmo::{GizmoAxis, GizmoMode, GizmoState};
use crate::picking::Ray;

/// Smallest scale a drag can produce on any axis
pub const MIN_SCALE: f32 = 0.01;

#[derive(Debug, Clone, Copy)]
struct Drag {
    axis: GizmoAxis,
    prev_ray: Ray,
}

/// Translate / rotate / scale handles attached to at most one module
#[derive(Debug, Clone, Default)]
pub struct TransformGizmo {
    target: Option<EntityId>,
    state: GizmoState,
    drag: Option<Drag>,
}

impl TransformGizmo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    pub fn state(&self) -> &GizmoState {
        &self.state
    }

    pub fn mode(&self) -> GizmoMode {
        self.state.mode
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Bind to `target`, replacing any previous binding.
    /// A dead target leaves the gizmo detached.
    pub fn attach(&mut self, world: &World, target: EntityId) -> bool {
        self.detach();
        let Some(transform) = world.get::<Transform>(target) else {
            return false;
        };
        self.target = Some(target);
        self.state.visible = true;
        self.state.position = transform.position;
        true
    }

    /// Unbind, abandoning any drag in progress
    pub fn detach(&mut self) {
        self.target = None;
        self.drag = None;
        self.state.visible = false;
        self.state.hovered_axis = GizmoAxis::None;
        self.state.active_axis = GizmoAxis::None;
    }

    /// Ignored mid-drag. Returns true if the mode changed.
    pub fn set_mode(&mut self, mode: GizmoMode) -> bool {
        if self.is_dragging() || self.state.mode == mode {
            return false;
        }
        self.state.mode = mode;
        self.state.hovered_axis = GizmoAxis::None;
        true
    }

    /// Follow the target's position; detaches if it died
    pub fn sync(&mut self, world: &World) {
        let Some(target) = self.target else {
            return;
        };
        match world.get::<Transform>(target) {
            Some(transform) => self.state.position = transform.position,
            None => self.detach(),
        }
    }

    /// Update the hover highlight, returning the handle under the ray
    pub fn hover(&mut self, ray: &Ray, camera_position: Vec3) -> GizmoAxis {
        if self.is_dragging() {
            return self.state.active_axis;
        }
        self.state.hovered_axis = self.state.hit_test(ray, camera_position);
        self.state.hovered_axis
    }

    /// Begin a drag if the ray hits a handle
    pub fn drag_start(&mut self, world: &World, ray: &Ray, camera_position: Vec3) -> bool {
        if self.is_dragging() {
            return false;
        }
        self.sync(world);
        if self.target.is_none() {
            return false;
        }
        let axis = self.state.hit_test(ray, camera_position);
        if axis == GizmoAxis::None {
            return false;
        }
        log::debug!("gizmo drag start: {} {}", self.state.mode.as_str(), axis.as_str());
        self.drag = Some(Drag {
            axis,
            prev_ray: *ray,
        });
        self.state.active_axis = axis;
        true
    }

    /// Apply pointer motion to the target. Returns true if the transform changed.
    pub fn drag_move(&mut self, world: &mut World, ray: &Ray, camera_position: Vec3) -> bool {
        let (Some(drag), Some(target)) = (self.drag, self.target) else {
            return false;
        };
        let Some(transform) = world.get_mut::<Transform>(target) else {
            self.detach();
            return false;
        };
        let before = *transform;

        match self.state.mode {
            GizmoMode::Translate => {
                transform.position +=
                    self.state
                        .calculate_translate_drag(drag.axis, ray, &drag.prev_ray, camera_position);
            }
            GizmoMode::Rotate => {
                let delta = self.state.calculate_rotate_drag(drag.axis, ray, &drag.prev_ray);
                transform.rotation = (delta * transform.rotation).normalize();
            }
            GizmoMode::Scale => {
                let delta =
                    self.state
                        .calculate_scale_drag(drag.axis, ray, &drag.prev_ray, camera_position);
                let delta = if drag.axis == GizmoAxis::All {
                    Vec3::splat((delta.x + delta.y + delta.z) / 3.0)
                } else {
                    delta
                };
                transform.scale = (transform.scale + delta).max(Vec3::splat(MIN_SCALE));
            }
        }

        self.state.position = transform.position;
        let changed = *transform != before;
        self.drag = Some(Drag {
            prev_ray: *ray,
            ..drag
        });
        changed
    }

    /// Finish the drag. Returns false if none was running.
    pub fn drag_end(&mut self) -> bool {
        self.state.active_axis = GizmoAxis::None;
        self.drag.take().is_some()
    }

    /// Neutral transform: origin, no rotation, unit scale
    pub fn reset_transform(&mut self, world: &mut World) -> bool {
        let Some(target) = self.target else {
            return false;
        };
        let Some(transform) = world.get_mut::<Transform>(target) else {
            self.detach();
            return false;
        };
        *transform = Transform::identity();
        self.state.position = Vec3::ZERO;
        true
    }
}
