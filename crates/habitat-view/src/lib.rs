//! Camera, picking, selection and gizmo editing for the habitat layout viewer.

pub mod camera;
pub mod events;
pub mod gizmo;
pub mod gizmo_mesh;
pub mod input;
pub mod mesh;
pub mod picking;
pub mod rig;
pub mod scene_index;
pub mod selection;
pub mod transform_gizmo;
pub mod viewer;

pub use camera::{Camera, CameraUniform};
pub use events::{SelectionDetails, ViewerEvent};
pub use gizmo::{GizmoAxis, GizmoMode, GizmoState};
pub use gizmo_mesh::{build_gizmo_vertices, GizmoVertex};
pub use input::{key_action, KeyAction, PointerButton};
pub use mesh::{Mesh, Vertex};
pub use picking::{pick, Candidate, Hit, Ray};
pub use rig::{CameraDefaults, CameraMode, CameraRig, MoveKey};
pub use scene_index::SceneGraphIndex;
pub use selection::{Selection, SelectionController};
pub use transform_gizmo::TransformGizmo;
pub use viewer::{AssetRequest, LoadTicket, ProxyDraw, Viewer};

// downstream crates share this glam
pub use glam;
pub use habitat_core;
