//! Notifications the viewer hands to its host (details panel, status bar).

use glam::Vec3;
use habitat_core::components::{ModuleInfo, Name, Transform};
use habitat_core::{EntityId, World};
use serde::Serialize;

use crate::rig::CameraMode;

/// What the details panel shows for the selected module
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionDetails {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub module_type: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub position: Vec3,
    /// XYZ Euler radians
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl SelectionDetails {
    /// Metadata plus live transform of a module owner, `None` if it is gone
    pub fn of(world: &World, owner: EntityId) -> Option<Self> {
        let info = world.get::<ModuleInfo>(owner)?;
        let transform = world.get::<Transform>(owner).copied().unwrap_or_default();
        Some(Self {
            id: info.descriptor_id.clone(),
            name: world
                .get::<Name>(owner)
                .map(|n| n.as_str().to_string())
                .unwrap_or_default(),
            module_type: info.module_type.clone(),
            description: info.description.clone(),
            image: info.image.clone(),
            price: info.price,
            currency: info.currency.clone(),
            position: transform.position,
            rotation: transform.euler(),
            scale: transform.scale,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ViewerEvent {
    /// `details: None` hides the panel
    SelectionChanged { details: Option<SelectionDetails> },
    /// The selected module's transform moved (drag or reset)
    TransformChanged { details: SelectionDetails },
    DragStateChanged { dragging: bool },
    CameraModeChanged { mode: CameraMode },
    SceneMounted { id: String },
    SceneUnmounted { id: String },
    ModuleLoaded { id: String },
    ModuleFailed { id: String, reason: String },
}

impl ViewerEvent {
    /// Serialized `kind` tag
    pub fn kind(&self) -> &'static str {
        match self {
            ViewerEvent::SelectionChanged { .. } => "selectionChanged",
            ViewerEvent::TransformChanged { .. } => "transformChanged",
            ViewerEvent::DragStateChanged { .. } => "dragStateChanged",
            ViewerEvent::CameraModeChanged { .. } => "cameraModeChanged",
            ViewerEvent::SceneMounted { .. } => "sceneMounted",
            ViewerEvent::SceneUnmounted { .. } => "sceneUnmounted",
            ViewerEvent::ModuleLoaded { .. } => "moduleLoaded",
            ViewerEvent::ModuleFailed { .. } => "moduleFailed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use habitat_core::scene::ModuleDescriptor;

    #[test]
    fn test_kind_matches_serialized_tag() {
        let events = [
            ViewerEvent::SelectionChanged { details: None },
            ViewerEvent::DragStateChanged { dragging: true },
            ViewerEvent::CameraModeChanged {
                mode: CameraMode::FirstPerson,
            },
            ViewerEvent::ModuleFailed {
                id: "lab".into(),
                reason: "404".into(),
            },
        ];
        for event in events {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["kind"], event.kind());
        }
    }

    #[test]
    fn test_details_carry_metadata_and_live_transform() {
        let descriptor: ModuleDescriptor = serde_json::from_str(
            r#"{ "id": "lab", "name": "Lab", "type": "Laboratory", "path": "/m/lab.glb",
                 "price": 1200.5, "currency": "USD", "position": [1, 2, 3] }"#,
        )
        .unwrap();
        let mut world = World::new();
        let owner = world.spawn();
        world.insert(owner, Name::new("Lab"));
        world.insert(owner, ModuleInfo::from_descriptor(&descriptor));
        world.insert(owner, Transform::from_position(Vec3::new(5.0, 0.0, 0.0)));

        let details = SelectionDetails::of(&world, owner).unwrap();
        assert_eq!(details.id, "lab");
        assert_eq!(details.module_type, "Laboratory");
        assert_eq!(details.price, Some(1200.5));
        assert_eq!(details.position, Vec3::new(5.0, 0.0, 0.0));

        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["type"], "Laboratory");

        world.despawn(owner);
        assert!(SelectionDetails::of(&world, owner).is_none());
    }
}
