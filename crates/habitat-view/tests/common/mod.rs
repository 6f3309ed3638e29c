#![allow(dead_code)]

use std::rc::Rc;

use habitat_core::assets::{AssetGeometry, AssetLoadError};
use habitat_core::math::{Vec2, Vec3, AABB};
use habitat_core::{EntityId, SceneConfig, Transform};
use habitat_view::Viewer;

/// Three unit modules on the X axis, seen head-on from +Z
pub const THREE_MODULES: &str = r#"{
    "id": "three",
    "name": "Three modules",
    "cameraPosition": [0, 0, 15],
    "cameraTarget": [0, 0, 0],
    "modules": [
        { "id": "m1", "name": "Module 1", "type": "Laboratory", "path": "/models/m1.glb",
          "position": [-4, 0, 0], "interactive": true },
        { "id": "m2", "name": "Module 2", "type": "Dormitory", "path": "/models/m2.glb",
          "position": [0, 0, 0], "interactive": true },
        { "id": "m3", "name": "Module 3", "type": "Storage", "path": "/models/m3.glb",
          "position": [4, 0, 0], "interactive": true }
    ]
}"#;

pub fn unit_box(_path: &str) -> Result<AssetGeometry, AssetLoadError> {
    Ok(AssetGeometry::single_box(
        "mesh",
        AABB::new(Vec3::splat(-0.5), Vec3::splat(0.5)),
    ))
}

pub fn viewer_with(document: &str) -> Viewer {
    let config = Rc::new(SceneConfig::from_json(document).expect("valid scene"));
    let mut viewer = Viewer::new(1.0);
    viewer.mount_with(config, &unit_box);
    viewer.drain_events();
    viewer
}

pub fn instance(viewer: &Viewer, id: &str) -> EntityId {
    viewer.instance(id).expect("module loaded")
}

pub fn position_of(viewer: &Viewer, entity: EntityId) -> Vec3 {
    viewer
        .world()
        .get::<Transform>(entity)
        .expect("live instance")
        .position
}

/// Screen point (NDC) over a world position
pub fn ndc_of(viewer: &Viewer, point: Vec3) -> Vec2 {
    viewer.rig().camera().world_to_ndc(point).truncate()
}

/// Gizmo target always mirrors the selection
pub fn assert_gizmo_bound(viewer: &Viewer) {
    assert_eq!(viewer.selection().gizmo().target(), viewer.selected());
    assert_eq!(
        viewer.selection().gizmo().state().visible,
        viewer.selected().is_some()
    );
}
