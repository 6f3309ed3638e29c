//! Declarative scene documents.
//!
//! A scene document is JSON with camelCase keys. Vectors are `[x, y, z]`
//! arrays, rotations are XYZ Euler angles in radians.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::error::{ConfigLoadError, Result};
use crate::math::{Vec3, Vec4};

/// Scene loaded when the host does not name one
pub const DEFAULT_CONFIG_ID: &str = "arkha_modules";

pub const DEFAULT_FIRST_PERSON_HEIGHT: f32 = 1.7;
pub const DEFAULT_FLY_HEIGHT: f32 = 3.0;
pub const DEFAULT_STANDOFF: f32 = 5.0;

/// Immutable description of one scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneConfig {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub default_time: Option<f64>,
    pub camera_position: Vec3,
    pub camera_target: Vec3,
    #[serde(default)]
    pub floor_material: Option<String>,
    #[serde(default)]
    pub base_model: Option<ModuleDescriptor>,
    #[serde(default)]
    pub modules: Vec<ModuleDescriptor>,
    #[serde(default)]
    pub lighting: Lighting,
    #[serde(default)]
    pub environment: Option<Environment>,
    #[serde(default)]
    pub view_modes: ViewModes,
}

impl SceneConfig {
    /// Parse and validate a scene document
    pub fn from_json(text: &str) -> Result<Self> {
        let config: SceneConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Descriptor ids must be unique across the base model and the module list
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for descriptor in self.descriptors() {
            if !seen.insert(descriptor.id.as_str()) {
                return Err(ConfigLoadError::DuplicateModuleId(descriptor.id.clone()));
            }
        }
        Ok(())
    }

    /// Base model first, then modules in document order
    pub fn descriptors(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.base_model.iter().chain(self.modules.iter())
    }

    /// Look up a descriptor by id, base model included
    pub fn module(&self, id: &str) -> Option<&ModuleDescriptor> {
        self.descriptors().find(|d| d.id == id)
    }

    /// Modules that get instantiated (base model excluded)
    pub fn visible_modules(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.modules.iter().filter(|d| !d.hidden)
    }

    /// Visible modules whose type contains `module_type`, ignoring case
    pub fn modules_by_type(&self, module_type: &str) -> Vec<&ModuleDescriptor> {
        let needle = module_type.to_lowercase();
        self.visible_modules()
            .filter(|d| d.module_type.to_lowercase().contains(&needle))
            .collect()
    }
}

/// Static description of one placeable module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub module_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
    #[serde(default)]
    pub type_model: Option<ModelFormat>,
    #[serde(rename = "path", alias = "assetPath")]
    pub asset_path: String,
    #[serde(default)]
    pub interactive: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub maps: Option<TextureMaps>,
    #[serde(default)]
    pub material_properties: Option<MaterialProperties>,
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    Glb,
    Gltf,
    Obj,
    Fbx,
}

/// Texture overrides keyed by channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextureMaps {
    #[serde(default)]
    pub normal: Option<String>,
    #[serde(default)]
    pub roughness: Option<String>,
    #[serde(default)]
    pub metalness: Option<String>,
    #[serde(default)]
    pub ao: Option<String>,
    #[serde(default)]
    pub emissive: Option<String>,
    /// Channels this viewer does not know about
    #[serde(flatten)]
    pub other: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialProperties {
    #[serde(default)]
    pub roughness: Option<f32>,
    #[serde(default)]
    pub metalness: Option<f32>,
    #[serde(default)]
    pub emissive_intensity: Option<f32>,
    #[serde(default)]
    pub ao_map_intensity: Option<f32>,
    #[serde(default)]
    pub normal_scale: Option<f32>,
    #[serde(default)]
    pub reflective: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lighting {
    #[serde(default)]
    pub ambient: AmbientLight,
    #[serde(default)]
    pub directional: DirectionalLight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbientLight {
    pub color: String,
    pub intensity: f32,
    #[serde(default)]
    pub name: Option<String>,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: "#ffffff".to_string(),
            intensity: 0.5,
            name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionalLight {
    pub color: String,
    pub intensity: f32,
    pub position: Vec3,
    #[serde(default)]
    pub cast_shadow: bool,
    #[serde(default)]
    pub name: Option<String>,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            color: "#ffffff".to_string(),
            intensity: 1.0,
            position: Vec3::new(10.0, 10.0, 5.0),
            cast_shadow: false,
            name: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    #[serde(default)]
    pub sky_color: Option<String>,
    #[serde(default)]
    pub ground_color: Option<String>,
    #[serde(default)]
    pub fog_enabled: bool,
}

/// Vantage defaults for the first-person and fly camera modes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewModes {
    pub first_person_height: f32,
    pub fly_height: f32,
    pub standoff: f32,
}

impl Default for ViewModes {
    fn default() -> Self {
        Self {
            first_person_height: DEFAULT_FIRST_PERSON_HEIGHT,
            fly_height: DEFAULT_FLY_HEIGHT,
            standoff: DEFAULT_STANDOFF,
        }
    }
}

/// `#rgb` / `#rrggbb` to RGBA in 0..1, `None` for anything else
pub fn parse_hex_color(text: &str) -> Option<Vec4> {
    let hex = text.strip_prefix('#').filter(|h| h.is_ascii())?;
    let expand = |s: &str| u8::from_str_radix(s, 16).ok();
    let (r, g, b) = match hex.len() {
        3 => {
            let mut it = hex.chars().map(|c| c.to_digit(16).map(|v| (v * 17) as u8));
            (it.next()??, it.next()??, it.next()??)
        }
        6 => (expand(&hex[0..2])?, expand(&hex[2..4])?, expand(&hex[4..6])?),
        _ => return None,
    };
    Some(Vec4::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        1.0,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r##"{
        "id": "arkha_modules",
        "name": "ARKHA",
        "defaultTime": 12,
        "cameraPosition": [10, 8, 10],
        "cameraTarget": [0, 0, 0],
        "floorMaterial": "regolith",
        "baseModel": {
            "id": "base", "name": "Base", "type": "terrain",
            "position": [0, 0, 0], "rotation": [0, 0, 0], "scale": [1, 1, 1],
            "typeModel": "glb", "path": "/models/base.glb",
            "interactive": false, "hidden": false
        },
        "modules": [
            {
                "id": "lab", "name": "Science Lab", "type": "Laboratory",
                "description": "Research module",
                "position": [2, 0, -1], "rotation": [0, 1.57, 0], "scale": [1, 1, 1],
                "typeModel": "glb", "path": "/models/lab.glb",
                "interactive": true, "hidden": false,
                "price": 1200000, "currency": "USD",
                "materialProperties": { "roughness": 0.4, "normalScale": 1.5, "reflective": true },
                "maps": { "normal": "/tex/lab_n.png", "sheen": "/tex/lab_s.png" }
            },
            {
                "id": "dorm", "name": "Crew Quarters", "type": "habitation",
                "position": [-3, 0, 2], "rotation": [0, 0, 0], "scale": [2, 2, 2],
                "typeModel": "gltf", "path": "/models/dorm.gltf",
                "interactive": true, "hidden": false
            },
            {
                "id": "spare-lab", "name": "Spare Lab", "type": "laboratory",
                "position": [0, 0, 0], "rotation": [0, 0, 0], "scale": [1, 1, 1],
                "typeModel": "glb", "path": "/models/lab.glb",
                "interactive": true, "hidden": true
            }
        ],
        "lighting": {
            "ambient": { "color": "#404040", "intensity": 0.6, "name": "Ambient" },
            "directional": { "color": "#ffffff", "intensity": 1.2, "position": [5, 10, 7], "castShadow": true, "name": "Sun" }
        },
        "environment": { "skyColor": "#000010", "groundColor": "#553322", "fogEnabled": false }
    }"##;

    #[test]
    fn test_parse_full_document() {
        let config = SceneConfig::from_json(SCENE).unwrap();

        assert_eq!(config.id, "arkha_modules");
        assert_eq!(config.camera_position, Vec3::new(10.0, 8.0, 10.0));
        assert_eq!(config.modules.len(), 3);
        assert_eq!(config.lighting.directional.name.as_deref(), Some("Sun"));
        assert!(config.lighting.directional.cast_shadow);
        assert_eq!(config.view_modes, ViewModes::default());

        let lab = config.module("lab").unwrap();
        assert_eq!(lab.module_type, "Laboratory");
        assert_eq!(lab.asset_path, "/models/lab.glb");
        assert_eq!(lab.type_model, Some(ModelFormat::Glb));
        assert_eq!(lab.price, Some(1_200_000.0));
        let material = lab.material_properties.unwrap();
        assert_eq!(material.normal_scale, Some(1.5));
        assert_eq!(material.reflective, Some(true));
        let maps = lab.maps.as_ref().unwrap();
        assert_eq!(maps.normal.as_deref(), Some("/tex/lab_n.png"));
        assert_eq!(maps.other.get("sheen").map(String::as_str), Some("/tex/lab_s.png"));
    }

    #[test]
    fn test_descriptor_defaults() {
        let d: ModuleDescriptor =
            serde_json::from_str(r#"{ "id": "x", "assetPath": "/m/x.glb" }"#).unwrap();
        assert_eq!(d.asset_path, "/m/x.glb");
        assert_eq!(d.position, Vec3::ZERO);
        assert_eq!(d.scale, Vec3::ONE);
        assert!(!d.interactive);
        assert!(!d.hidden);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let text = r#"{
            "cameraPosition": [0, 5, 10], "cameraTarget": [0, 0, 0],
            "baseModel": { "id": "a", "path": "/a.glb" },
            "modules": [ { "id": "a", "path": "/b.glb" } ]
        }"#;
        let err = SceneConfig::from_json(text).unwrap_err();
        assert!(matches!(err, ConfigLoadError::DuplicateModuleId(ref id) if id == "a"));
    }

    #[test]
    fn test_missing_camera_is_parse_error() {
        let err = SceneConfig::from_json(r#"{ "modules": [] }"#).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Parse(_)));
    }

    #[test]
    fn test_descriptors_base_first() {
        let config = SceneConfig::from_json(SCENE).unwrap();
        let ids: Vec<_> = config.descriptors().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["base", "lab", "dorm", "spare-lab"]);
    }

    #[test]
    fn test_visible_and_by_type() {
        let config = SceneConfig::from_json(SCENE).unwrap();

        let visible: Vec<_> = config.visible_modules().map(|d| d.id.as_str()).collect();
        assert_eq!(visible, vec!["lab", "dorm"]);

        let labs: Vec<_> = config
            .modules_by_type("LAB")
            .into_iter()
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(labs, vec!["lab"]);
        assert!(config.modules_by_type("galley").is_empty());
    }

    #[test]
    fn test_view_mode_overrides() {
        let text = r#"{
            "cameraPosition": [0, 5, 10], "cameraTarget": [0, 0, 0],
            "viewModes": { "flyHeight": 8.0 }
        }"#;
        let config = SceneConfig::from_json(text).unwrap();
        assert_eq!(config.view_modes.fly_height, 8.0);
        assert_eq!(config.view_modes.first_person_height, DEFAULT_FIRST_PERSON_HEIGHT);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff0000"), Some(Vec4::new(1.0, 0.0, 0.0, 1.0)));
        assert_eq!(parse_hex_color("#fff"), Some(Vec4::ONE));
        assert_eq!(parse_hex_color("red"), None);
        assert_eq!(parse_hex_color("#12345"), None);
    }
}
