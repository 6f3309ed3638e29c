//! Minimal ECS: generational handles over sparse-set storage

pub mod component;
pub mod entity;
pub mod storage;
pub mod world;

pub use component::Component;
pub use entity::EntityId;
pub use storage::ComponentStorage;
pub use world::World;
