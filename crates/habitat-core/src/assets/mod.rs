//! Module asset geometry: what a loaded model looks like to the picker.

pub mod error;
pub mod geometry;
pub mod gltf_bounds;
pub mod source;

pub use error::AssetLoadError;
pub use geometry::{AssetGeometry, GeometryNode};
pub use gltf_bounds::parse_gltf;
pub use source::{parse_asset, AssetSource, FsAssetSource};
