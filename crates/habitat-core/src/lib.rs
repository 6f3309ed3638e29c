pub mod assets;
pub mod components;
pub mod ecs;
pub mod math;
pub mod scene;

// Re-exports
pub use components::{ModelUniform, ModuleInfo, Name, Parent, Primitive, Transform};
pub use ecs::{EntityId, World};
pub use scene::{ModuleDescriptor, SceneConfig, SceneConfigStore};
