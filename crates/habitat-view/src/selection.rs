//! Single-selection state machine driving the transform gizmo.

use habitat_core::{EntityId, World};

use crate::rig::CameraMode;
use crate::transform_gizmo::TransformGizmo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Unselected,
    Selected(EntityId),
}

impl Selection {
    pub fn entity(&self) -> Option<EntityId> {
        match self {
            Selection::Unselected => None,
            Selection::Selected(entity) => Some(*entity),
        }
    }
}

/// Holds at most one selected module and keeps the gizmo bound to it.
///
/// The gizmo target always equals the selection: every transition goes
/// through [`SelectionController::select`] or [`SelectionController::clear`].
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    selection: Selection,
    gizmo: TransformGizmo,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn selected(&self) -> Option<EntityId> {
        self.selection.entity()
    }

    pub fn gizmo(&self) -> &TransformGizmo {
        &self.gizmo
    }

    pub fn gizmo_mut(&mut self) -> &mut TransformGizmo {
        &mut self.gizmo
    }

    /// Apply a pick result. `None` (a miss) or a dead entity clears.
    /// Returns true if the selection changed.
    pub fn select(&mut self, world: &World, target: Option<EntityId>) -> bool {
        let next = match target {
            Some(entity) if world.is_alive(entity) => Selection::Selected(entity),
            _ => Selection::Unselected,
        };
        if next == self.selection {
            return false;
        }

        match next {
            Selection::Selected(entity) => {
                self.gizmo.attach(world, entity);
                log::debug!("selected {entity}");
            }
            Selection::Unselected => {
                self.gizmo.detach();
                log::debug!("selection cleared");
            }
        }
        self.selection = next;
        true
    }

    pub fn clear(&mut self) -> bool {
        if self.selection == Selection::Unselected {
            return false;
        }
        self.gizmo.detach();
        self.selection = Selection::Unselected;
        true
    }

    /// Clears if `entity` was the selection
    pub fn on_instance_destroyed(&mut self, entity: EntityId) -> bool {
        if self.selected() == Some(entity) {
            self.clear()
        } else {
            false
        }
    }

    /// Selection only lives in orbit mode
    pub fn on_camera_mode(&mut self, mode: CameraMode) -> bool {
        if mode == CameraMode::Orbit {
            false
        } else {
            self.clear()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use habitat_core::Transform;

    fn two_modules() -> (World, EntityId, EntityId) {
        let mut world = World::new();
        let a = world.spawn();
        world.insert(a, Transform::from_position(Vec3::new(-2.0, 0.0, 0.0)));
        let b = world.spawn();
        world.insert(b, Transform::from_position(Vec3::new(2.0, 0.0, 0.0)));
        (world, a, b)
    }

    #[test]
    fn test_select_binds_gizmo() {
        let (world, a, _) = two_modules();
        let mut selection = SelectionController::new();

        assert!(selection.select(&world, Some(a)));
        assert_eq!(selection.selection(), Selection::Selected(a));
        assert_eq!(selection.gizmo().target(), Some(a));
        assert_eq!(selection.gizmo().state().position, Vec3::new(-2.0, 0.0, 0.0));
    }

    #[test]
    fn test_retarget_is_single_step() {
        let (world, a, b) = two_modules();
        let mut selection = SelectionController::new();
        selection.select(&world, Some(a));

        assert!(selection.select(&world, Some(b)));
        assert_eq!(selection.selected(), Some(b));
        assert_eq!(selection.gizmo().target(), Some(b));
    }

    #[test]
    fn test_reselect_same_is_unchanged() {
        let (world, a, _) = two_modules();
        let mut selection = SelectionController::new();
        selection.select(&world, Some(a));
        assert!(!selection.select(&world, Some(a)));
    }

    #[test]
    fn test_miss_clears() {
        let (world, a, _) = two_modules();
        let mut selection = SelectionController::new();
        selection.select(&world, Some(a));

        assert!(selection.select(&world, None));
        assert_eq!(selection.selection(), Selection::Unselected);
        assert_eq!(selection.gizmo().target(), None);
        assert!(!selection.select(&world, None));
    }

    #[test]
    fn test_dead_entity_resolves_unselected() {
        let (mut world, a, _) = two_modules();
        world.despawn(a);
        let mut selection = SelectionController::new();
        assert!(!selection.select(&world, Some(a)));
        assert_eq!(selection.selected(), None);
    }

    #[test]
    fn test_destroying_other_instance_keeps_selection() {
        let (world, a, b) = two_modules();
        let mut selection = SelectionController::new();
        selection.select(&world, Some(a));

        assert!(!selection.on_instance_destroyed(b));
        assert!(selection.on_instance_destroyed(a));
        assert_eq!(selection.gizmo().target(), None);
    }

    #[test]
    fn test_leaving_orbit_clears() {
        let (world, a, _) = two_modules();
        let mut selection = SelectionController::new();
        selection.select(&world, Some(a));

        assert!(!selection.on_camera_mode(CameraMode::Orbit));
        assert!(selection.on_camera_mode(CameraMode::Fly));
        assert_eq!(selection.selected(), None);
    }
}
