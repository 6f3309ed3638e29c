//! Scene configuration: documents, validation, caching and instantiation.

pub mod config;
pub mod error;
pub mod instance;
pub mod store;

pub use config::{
    parse_hex_color, AmbientLight, DirectionalLight, Environment, Lighting, MaterialProperties,
    ModelFormat, ModuleDescriptor, SceneConfig, TextureMaps, ViewModes, DEFAULT_CONFIG_ID,
};
pub use error::ConfigLoadError;
pub use instance::{despawn_module, spawn_module, SpawnedModule};
pub use store::{ConfigSource, FsConfigSource, MemoryConfigSource, SceneConfigStore};
