use crate::ecs::{Component, EntityId, World};
use crate::math::Mat4;

use super::Transform;

/// Link to the parent entity. The Transform becomes relative to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent(pub EntityId);

impl Component for Parent {}

/// World matrix through the parent chain.
/// A dead parent ends the chain as if it were the root.
pub fn world_matrix(world: &World, entity: EntityId) -> Mat4 {
    let mut matrix = Mat4::IDENTITY;
    let mut cursor = Some(entity);
    while let Some(current) = cursor.filter(|e| world.is_alive(*e)) {
        if let Some(transform) = world.get::<Transform>(current) {
            matrix = transform.to_matrix() * matrix;
        }
        cursor = world.get::<Parent>(current).map(|p| p.0);
    }
    matrix
}

/// Direct children, in index order
pub fn children(world: &World, parent: EntityId) -> Vec<EntityId> {
    world
        .iter_with::<Parent>()
        .filter(|(_, p)| p.0 == parent)
        .map(|(e, _)| e)
        .collect()
}

/// Despawn with all descendants. Returns what was removed, root first.
pub fn despawn_recursive(world: &mut World, root: EntityId) -> Vec<EntityId> {
    let mut removed = Vec::new();
    let mut stack = vec![root];
    while let Some(entity) = stack.pop() {
        if !world.is_alive(entity) {
            continue;
        }
        stack.extend(children(world, entity));
        world.despawn(entity);
        removed.push(entity);
    }
    removed
}
