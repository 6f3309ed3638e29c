use crate::ecs::Component;
use crate::math::AABB;

/// A renderable, ray-castable mesh node. Bounds are in the node's local space.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub bounds: AABB,
}

impl Primitive {
    pub fn new(bounds: AABB) -> Self {
        Self { bounds }
    }
}

impl Component for Primitive {}
