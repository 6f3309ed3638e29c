//! Validation of one scene document against its assets.

use std::fmt;

use habitat_core::assets::{AssetLoadError, AssetSource};
use habitat_core::math::AABB;
use habitat_core::scene::{ModuleDescriptor, SceneConfig};

/// What a successfully loaded asset looks like
#[derive(Debug, Clone, PartialEq)]
pub struct AssetSummary {
    pub meshes: usize,
    pub bounds: Option<AABB>,
}

#[derive(Debug)]
pub struct ModuleReport {
    pub id: String,
    pub asset_path: String,
    pub interactive: bool,
    pub outcome: Result<AssetSummary, AssetLoadError>,
}

impl ModuleReport {
    fn load(descriptor: &ModuleDescriptor, assets: &impl AssetSource) -> Self {
        let outcome = assets.load(&descriptor.asset_path).map(|geometry| AssetSummary {
            meshes: geometry.mesh_count(),
            bounds: geometry.bounds(),
        });
        Self {
            id: descriptor.id.clone(),
            asset_path: descriptor.asset_path.clone(),
            interactive: descriptor.interactive,
            outcome,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

impl fmt::Display for ModuleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Ok(AssetSummary { meshes, bounds: Some(b) }) => write!(
                f,
                "ok    {} ({}): {} mesh(es), bounds {} .. {}",
                self.id, self.asset_path, meshes, b.min, b.max
            ),
            Ok(AssetSummary { bounds: None, .. }) => {
                write!(f, "empty {} ({}): no meshes", self.id, self.asset_path)
            }
            Err(err) => write!(f, "FAIL  {} ({}): {}", self.id, self.asset_path, err),
        }
    }
}

/// Per-scene result: every module asset the viewer would request
#[derive(Debug)]
pub struct SceneReport {
    pub scene_id: String,
    pub name: String,
    pub modules: Vec<ModuleReport>,
}

impl SceneReport {
    pub fn failures(&self) -> impl Iterator<Item = &ModuleReport> {
        self.modules.iter().filter(|m| !m.is_ok())
    }

    pub fn is_ok(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn interactive_count(&self) -> usize {
        self.modules.iter().filter(|m| m.interactive).count()
    }
}

/// Load the base model and every visible module the way a mount would.
pub fn check_scene(config: &SceneConfig, assets: &impl AssetSource) -> SceneReport {
    let base = config.base_model.iter().filter(|d| !d.hidden);
    let modules = base
        .chain(config.visible_modules())
        .map(|descriptor| {
            log::debug!("loading {} from {}", descriptor.id, descriptor.asset_path);
            ModuleReport::load(descriptor, assets)
        })
        .collect();
    SceneReport {
        scene_id: config.id.clone(),
        name: config.name.clone(),
        modules,
    }
}

/// Header line printed above the per-module lines
pub fn summary_line(report: &SceneReport) -> String {
    format!(
        "scene {} \"{}\": {} module(s), {} interactive, {} failed",
        report.scene_id,
        report.name,
        report.modules.len(),
        report.interactive_count(),
        report.failures().count()
    )
}
