use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use super::error::{AssetLoadError, Result};
use super::geometry::AssetGeometry;
use super::gltf_bounds::parse_gltf;

/// Resolves a descriptor's asset path to pickable geometry
pub trait AssetSource {
    fn load(&self, path: &str) -> Result<AssetGeometry>;
}

impl<F> AssetSource for F
where
    F: Fn(&str) -> Result<AssetGeometry>,
{
    fn load(&self, path: &str) -> Result<AssetGeometry> {
        self(path)
    }
}

/// Parse bytes according to the path's extension
pub fn parse_asset(path: &str, bytes: &[u8]) -> Result<AssetGeometry> {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("glb") | Some("gltf") => parse_gltf(path, bytes),
        _ => Err(AssetLoadError::Unsupported(path.to_string())),
    }
}

/// Assets on disk. Web-style absolute paths (`/models/a.glb`) resolve under `root`.
#[derive(Debug, Clone)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(AssetLoadError::NotFound(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl AssetSource for FsAssetSource {
    fn load(&self, path: &str) -> Result<AssetGeometry> {
        let file = self.resolve(path)?;
        let bytes = std::fs::read(&file).map_err(|source| match source.kind() {
            ErrorKind::NotFound => AssetLoadError::NotFound(path.to_string()),
            _ => AssetLoadError::Io {
                path: path.to_string(),
                source,
            },
        })?;
        parse_asset(path, &bytes)
    }
}
