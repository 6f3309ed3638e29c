//! Turning a descriptor plus its loaded asset into live entities.

use crate::assets::AssetGeometry;
use crate::components::{despawn_recursive, ModuleInfo, Name, Parent, Primitive, Transform};
use crate::ecs::{EntityId, World};

use super::config::ModuleDescriptor;

/// Entities created for one module instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnedModule {
    /// Top-level entity carrying the live transform and metadata
    pub owner: EntityId,
    /// Every asset node, in asset order
    pub nodes: Vec<EntityId>,
    /// The subset of `nodes` that carry mesh bounds
    pub primitives: Vec<EntityId>,
}

/// Spawn the owner entity and one child entity per asset node.
/// The owner's transform starts equal to the descriptor's values.
pub fn spawn_module(
    world: &mut World,
    descriptor: &ModuleDescriptor,
    geometry: &AssetGeometry,
) -> SpawnedModule {
    let owner = world.spawn();
    world.insert(owner, Name::or_id(&descriptor.name, &descriptor.id));
    world.insert(
        owner,
        Transform::from_euler(descriptor.position, descriptor.rotation, descriptor.scale),
    );
    world.insert(owner, ModuleInfo::from_descriptor(descriptor));

    let nodes: Vec<EntityId> = geometry.nodes.iter().map(|_| world.spawn()).collect();
    let mut primitives = Vec::new();

    for (node, &entity) in geometry.nodes.iter().zip(&nodes) {
        let parent = node.parent.and_then(|i| nodes.get(i).copied()).unwrap_or(owner);
        world.insert(entity, Name::new(node.name.as_str()));
        world.insert(entity, node.local);
        world.insert(entity, Parent(parent));
        if let Some(bounds) = node.bounds {
            world.insert(entity, Primitive::new(bounds));
            primitives.push(entity);
        }
    }

    log::debug!(
        "spawned module {} as {owner} with {} primitives",
        descriptor.id,
        primitives.len()
    );
    SpawnedModule {
        owner,
        nodes,
        primitives,
    }
}

/// Remove an instance and every node under it
pub fn despawn_module(world: &mut World, owner: EntityId) -> Vec<EntityId> {
    despawn_recursive(world, owner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::GeometryNode;
    use crate::components::world_matrix;
    use crate::math::{Vec3, AABB};

    fn descriptor() -> ModuleDescriptor {
        serde_json::from_str(
            r#"{
                "id": "lab", "name": "Science Lab", "type": "laboratory",
                "position": [4, 0, 0], "rotation": [0, 0, 0], "scale": [1, 1, 1],
                "path": "/models/lab.glb", "interactive": true
            }"#,
        )
        .unwrap()
    }

    fn two_level_geometry() -> AssetGeometry {
        AssetGeometry {
            nodes: vec![
                GeometryNode {
                    name: "frame".into(),
                    local: Transform::identity(),
                    parent: None,
                    bounds: None,
                },
                GeometryNode {
                    name: "hull".into(),
                    local: Transform::from_position(Vec3::new(0.0, 1.0, 0.0)),
                    parent: Some(0),
                    bounds: Some(AABB::unit_cube(Vec3::ZERO, Vec3::ONE)),
                },
            ],
        }
    }

    #[test]
    fn test_spawn_module_builds_tree() {
        let mut world = World::new();
        let spawned = spawn_module(&mut world, &descriptor(), &two_level_geometry());

        assert_eq!(spawned.nodes.len(), 2);
        assert_eq!(spawned.primitives, vec![spawned.nodes[1]]);
        assert_eq!(world.get::<Parent>(spawned.nodes[0]), Some(&Parent(spawned.owner)));
        assert_eq!(world.get::<Parent>(spawned.nodes[1]), Some(&Parent(spawned.nodes[0])));
        assert_eq!(world.get::<Name>(spawned.owner).map(Name::as_str), Some("Science Lab"));

        let info = world.get::<ModuleInfo>(spawned.owner).unwrap();
        assert_eq!(info.descriptor_id, "lab");
        assert!(info.interactive);

        let hull = world_matrix(&world, spawned.nodes[1]).transform_point3(Vec3::ZERO);
        assert_eq!(hull, Vec3::new(4.0, 1.0, 0.0));
    }

    #[test]
    fn test_despawn_module_removes_everything() {
        let mut world = World::new();
        let spawned = spawn_module(&mut world, &descriptor(), &two_level_geometry());

        let removed = despawn_module(&mut world, spawned.owner);

        assert_eq!(removed.len(), 3);
        assert_eq!(world.entity_count(), 0);
        assert!(!world.is_alive(spawned.owner));
    }
}
