mod hierarchy;
mod module;
mod name;
mod primitive;
mod transform;

pub use hierarchy::{children, despawn_recursive, world_matrix, Parent};
pub use module::ModuleInfo;
pub use name::Name;
pub use primitive::Primitive;
pub use transform::{ModelUniform, Transform};
