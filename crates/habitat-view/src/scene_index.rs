//! Primitive → owning module lookup for ray-cast hits.

use std::collections::BTreeMap;

use habitat_core::components::{world_matrix, Parent, Primitive};
use habitat_core::{EntityId, World};

use crate::picking::Candidate;

#[derive(Debug, Clone, Default)]
struct OwnerEntry {
    interactive: bool,
    primitives: Vec<EntityId>,
}

/// Maps renderable primitives to the module instance that owns them.
///
/// Only primitives of interactive owners ever become hit-test candidates.
#[derive(Debug, Clone, Default)]
pub struct SceneGraphIndex {
    owners: BTreeMap<EntityId, OwnerEntry>,
    primitive_owner: BTreeMap<EntityId, EntityId>,
}

impl SceneGraphIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `primitive` belongs to `owner`. Re-registering moves the primitive.
    pub fn register(&mut self, primitive: EntityId, owner: EntityId, interactive: bool) {
        if let Some(previous) = self.primitive_owner.insert(primitive, owner) {
            if let Some(entry) = self.owners.get_mut(&previous) {
                entry.primitives.retain(|p| *p != primitive);
            }
        }
        let entry = self.owners.entry(owner).or_default();
        entry.interactive = interactive;
        entry.primitives.push(primitive);
    }

    /// Nearest interactive owner found walking up from `primitive` (inclusive)
    pub fn resolve_owner(&self, world: &World, primitive: EntityId) -> Option<EntityId> {
        let mut cursor = Some(primitive);
        while let Some(entity) = cursor.filter(|e| world.is_alive(*e)) {
            if self.is_interactive_owner(world, entity) {
                return Some(entity);
            }
            if let Some(&owner) = self.primitive_owner.get(&entity) {
                if self.is_interactive_owner(world, owner) {
                    return Some(owner);
                }
            }
            cursor = world.get::<Parent>(entity).map(|p| p.0);
        }
        None
    }

    /// Registered owner of `primitive`, interactive or not
    pub fn owner_of(&self, primitive: EntityId) -> Option<EntityId> {
        self.primitive_owner.get(&primitive).copied()
    }

    fn is_interactive_owner(&self, world: &World, entity: EntityId) -> bool {
        world.is_alive(entity) && self.owners.get(&entity).is_some_and(|e| e.interactive)
    }

    /// Forget every primitive of `owner`, returning them
    pub fn unregister_all(&mut self, owner: EntityId) -> Vec<EntityId> {
        let Some(entry) = self.owners.remove(&owner) else {
            return Vec::new();
        };
        for primitive in &entry.primitives {
            self.primitive_owner.remove(primitive);
        }
        entry.primitives
    }

    pub fn clear(&mut self) {
        self.owners.clear();
        self.primitive_owner.clear();
    }

    pub fn is_registered(&self, owner: EntityId) -> bool {
        self.owners.contains_key(&owner)
    }

    pub fn primitives_of(&self, owner: EntityId) -> &[EntityId] {
        self.owners
            .get(&owner)
            .map(|entry| entry.primitives.as_slice())
            .unwrap_or(&[])
    }

    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    /// World-space bounds of live primitives of interactive owners, in entity order
    pub fn candidates(&self, world: &World) -> Vec<Candidate> {
        self.primitive_owner
            .iter()
            .filter(|(_, owner)| self.is_interactive_owner(world, **owner))
            .filter_map(|(&primitive, &owner)| {
                let local = world.get::<Primitive>(primitive)?;
                Some(Candidate {
                    primitive,
                    owner,
                    bounds: local.bounds.transformed(&world_matrix(world, primitive)),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use habitat_core::Transform;
    use habitat_core::math::{Vec3, AABB};

    fn spawn_owner_with_primitive(world: &mut World, x: f32) -> (EntityId, EntityId) {
        let owner = world.spawn();
        world.insert(owner, Transform::from_position(Vec3::new(x, 0.0, 0.0)));
        let primitive = world.spawn();
        world.insert(primitive, Transform::identity());
        world.insert(primitive, Parent(owner));
        world.insert(primitive, Primitive::new(AABB::unit_cube(Vec3::ZERO, Vec3::ONE)));
        (owner, primitive)
    }

    #[test]
    fn test_resolve_walks_to_owner() {
        let mut world = World::new();
        let (owner, primitive) = spawn_owner_with_primitive(&mut world, 0.0);
        let nested = world.spawn();
        world.insert(nested, Parent(primitive));

        let mut index = SceneGraphIndex::new();
        index.register(primitive, owner, true);

        assert_eq!(index.resolve_owner(&world, primitive), Some(owner));
        assert_eq!(index.resolve_owner(&world, nested), Some(owner));
        assert_eq!(index.resolve_owner(&world, owner), Some(owner));
        assert_eq!(index.primitives_of(owner), [primitive]);
        assert_eq!(index.owner_of(primitive), Some(owner));
    }

    #[test]
    fn test_resolve_ignores_non_interactive_and_unregistered() {
        let mut world = World::new();
        let (base, base_primitive) = spawn_owner_with_primitive(&mut world, 0.0);
        let stray = world.spawn();

        let mut index = SceneGraphIndex::new();
        index.register(base_primitive, base, false);

        assert_eq!(index.resolve_owner(&world, base_primitive), None);
        assert_eq!(index.resolve_owner(&world, stray), None);
    }

    #[test]
    fn test_candidates_exclude_non_interactive() {
        let mut world = World::new();
        let (lab, lab_primitive) = spawn_owner_with_primitive(&mut world, 5.0);
        let (base, base_primitive) = spawn_owner_with_primitive(&mut world, 0.0);

        let mut index = SceneGraphIndex::new();
        index.register(lab_primitive, lab, true);
        index.register(base_primitive, base, false);

        let candidates = index.candidates(&world);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].owner, lab);
        assert_eq!(candidates[0].bounds.center(), Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_unregister_all() {
        let mut world = World::new();
        let (owner, primitive) = spawn_owner_with_primitive(&mut world, 0.0);
        let mut index = SceneGraphIndex::new();
        index.register(primitive, owner, true);

        assert_eq!(index.unregister_all(owner), vec![primitive]);
        assert!(!index.is_registered(owner));
        assert!(index.candidates(&world).is_empty());
        assert_eq!(index.resolve_owner(&world, primitive), None);
        assert!(index.unregister_all(owner).is_empty());
    }

    #[test]
    fn test_dead_owner_is_not_a_candidate() {
        let mut world = World::new();
        let (owner, primitive) = spawn_owner_with_primitive(&mut world, 0.0);
        let mut index = SceneGraphIndex::new();
        index.register(primitive, owner, true);

        world.despawn(owner);

        assert!(index.candidates(&world).is_empty());
        assert_eq!(index.resolve_owner(&world, primitive), None);
    }
}
