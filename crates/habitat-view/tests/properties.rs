mod common;

use std::rc::Rc;

use common::*;
use habitat_core::math::{Vec2, Vec3};
use habitat_core::scene::{MemoryConfigSource, SceneConfigStore, DEFAULT_CONFIG_ID};
use habitat_view::{CameraMode, PointerButton};

#[test]
fn at_most_one_selection_and_gizmo_follows_it() {
    let mut viewer = viewer_with(THREE_MODULES);
    let targets = [
        Vec3::new(-4.0, 0.0, 0.0),
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(0.0, 3.0, 0.0),
        Vec3::ZERO,
        Vec3::new(-4.0, 0.2, 0.0),
        Vec3::new(8.0, -3.0, 0.0),
    ];
    for point in targets {
        let ndc = ndc_of(&viewer, point);
        viewer.click(ndc);
        assert_gizmo_bound(&viewer);
    }
    assert_eq!(viewer.selected(), None);
}

#[test]
fn retarget_replaces_previous_selection() {
    let mut viewer = viewer_with(THREE_MODULES);
    let m1 = instance(&viewer, "m1");
    let m3 = instance(&viewer, "m3");

    assert_eq!(viewer.click(ndc_of(&viewer, Vec3::new(-4.0, 0.0, 0.0))), Some(m1));
    assert_eq!(viewer.click(ndc_of(&viewer, Vec3::new(4.0, 0.0, 0.0))), Some(m3));
    assert_eq!(viewer.selection().gizmo().target(), Some(m3));
}

#[test]
fn camera_mode_is_exclusive_and_non_orbit_drops_selection() {
    let mut viewer = viewer_with(THREE_MODULES);
    for mode in [CameraMode::FirstPerson, CameraMode::Fly] {
        viewer.set_camera_mode(CameraMode::Orbit);
        viewer.select_module("m2");
        assert!(viewer.selected().is_some());

        viewer.set_camera_mode(mode);
        assert_eq!(viewer.camera_mode(), mode);
        assert_eq!(viewer.selected(), None);
        assert!(!viewer.select_module("m2"));
    }
}

#[test]
fn camera_ignores_rotate_and_zoom_while_dragging() {
    let mut viewer = viewer_with(THREE_MODULES);
    viewer.select_module("m2");
    let eye = viewer.rig().camera().position;

    // centre handle of the gizmo on m2
    viewer.pointer_down(ndc_of(&viewer, Vec3::ZERO), PointerButton::Primary);
    assert!(viewer.rig().is_suspended());

    let before = viewer.rig().camera().clone();
    assert!(!viewer.wheel(-2.0));
    viewer.pointer_move(Vec2::new(0.4, 0.4));
    assert_eq!(viewer.rig().camera(), &before);
    assert_eq!(viewer.rig().camera().position, eye);

    viewer.pointer_up(Vec2::new(0.4, 0.4));
    assert!(!viewer.rig().is_suspended());
    assert!(viewer.wheel(-2.0));
}

#[test]
fn non_interactive_geometry_never_wins_a_pick() {
    // the shield sits between the camera and m2
    let document = r#"{
        "cameraPosition": [0, 0, 15],
        "cameraTarget": [0, 0, 0],
        "baseModel": { "id": "shell", "type": "Base", "path": "/models/shell.glb",
                       "position": [0, 0, 6], "scale": [4, 4, 1] },
        "modules": [
            { "id": "shield", "type": "Shield", "path": "/models/shield.glb",
              "position": [0, 0, 3], "interactive": false },
            { "id": "m2", "type": "Dormitory", "path": "/models/m2.glb", "interactive": true }
        ]
    }"#;
    let mut viewer = viewer_with(document);
    let m2 = instance(&viewer, "m2");

    assert_eq!(viewer.click(ndc_of(&viewer, Vec3::ZERO)), Some(m2));
    let candidates = viewer.index().candidates(viewer.world());
    assert!(candidates.iter().all(|c| c.owner == m2));
    assert!(!viewer.select_module("shield"));
}

#[test]
fn loading_a_config_twice_fetches_once() {
    let source = MemoryConfigSource::new().with(DEFAULT_CONFIG_ID, THREE_MODULES);
    let mut store = SceneConfigStore::new();

    let first = store.load(&source, DEFAULT_CONFIG_ID).expect("first load");
    let second = store.load(&source, DEFAULT_CONFIG_ID).expect("second load");

    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(source.fetch_count(), 1);
}

#[test]
fn remount_drops_selection_and_instances() {
    let mut viewer = viewer_with(THREE_MODULES);
    viewer.select_module("m1");
    let old = instance(&viewer, "m1");

    let config = Rc::new(habitat_core::SceneConfig::from_json(THREE_MODULES).expect("valid"));
    viewer.mount_with(config, &unit_box);

    assert_eq!(viewer.selected(), None);
    assert!(!viewer.world().is_alive(old));
    assert_eq!(viewer.instance_count(), 3);
}
