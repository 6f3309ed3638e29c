use std::any::{Any, TypeId};
use std::collections::HashMap;

use super::component::Component;
use super::entity::EntityId;
use super::storage::ComponentStorage;

/// Slot state. A free slot remembers the last handle it issued.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Live(EntityId),
    Free(EntityId),
}

/// Type-erased storage plus the eviction fn for its type
struct ErasedStorage {
    data: Box<dyn Any + Send + Sync>,
    evict: fn(&mut (dyn Any + Send + Sync + 'static), EntityId),
}

impl ErasedStorage {
    fn new<T: Component>() -> Self {
        Self {
            data: Box::new(ComponentStorage::<T>::new()),
            evict: |data, entity| {
                if let Some(storage) = data.downcast_mut::<ComponentStorage<T>>() {
                    storage.remove(entity);
                }
            },
        }
    }
}

/// Holds module instances and their nodes
#[derive(Default)]
pub struct World {
    slots: Vec<Slot>,
    /// Slots waiting for reuse
    free: Vec<u32>,
    storages: HashMap<TypeId, ErasedStorage>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuses a free slot with the next generation when one exists
    pub fn spawn(&mut self) -> EntityId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                let id = match *slot {
                    Slot::Free(last) | Slot::Live(last) => last.next_generation(),
                };
                *slot = Slot::Live(id);
                id
            }
            None => {
                let id = EntityId::new(self.slots.len() as u32, 1);
                self.slots.push(Slot::Live(id));
                id
            }
        }
    }

    /// Destroy with all components. False for stale or dead handles.
    pub fn despawn(&mut self, entity: EntityId) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        self.slots[entity.index() as usize] = Slot::Free(entity);
        self.free.push(entity.index());
        for storage in self.storages.values_mut() {
            (storage.evict)(storage.data.as_mut(), entity);
        }
        true
    }

    pub fn is_alive(&self, entity: EntityId) -> bool {
        matches!(self.slots.get(entity.index() as usize), Some(Slot::Live(id)) if *id == entity)
    }

    /// Inserts on dead handles are ignored
    pub fn insert<T: Component>(&mut self, entity: EntityId, component: T) {
        if !self.is_alive(entity) {
            return;
        }
        let storage = self
            .storages
            .entry(TypeId::of::<T>())
            .or_insert_with(ErasedStorage::new::<T>);
        if let Some(storage) = storage.data.downcast_mut::<ComponentStorage<T>>() {
            storage.insert(entity, component);
        }
    }

    pub fn get<T: Component>(&self, entity: EntityId) -> Option<&T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.storage::<T>()?.get(entity)
    }

    pub fn get_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.storage_mut::<T>()?.get_mut(entity)
    }

    pub fn remove<T: Component>(&mut self, entity: EntityId) -> Option<T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.storage_mut::<T>()?.remove(entity)
    }

    /// Live handles in slot order
    pub fn iter_entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Live(id) => Some(*id),
            Slot::Free(_) => None,
        })
    }

    pub fn entity_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Live entities carrying `T`, in slot order
    pub fn iter_with<T: Component>(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.iter_entities()
            .filter_map(|entity| self.get::<T>(entity).map(|component| (entity, component)))
    }

    fn storage<T: Component>(&self) -> Option<&ComponentStorage<T>> {
        self.storages.get(&TypeId::of::<T>())?.data.downcast_ref()
    }

    fn storage_mut<T: Component>(&mut self) -> Option<&mut ComponentStorage<T>> {
        self.storages.get_mut(&TypeId::of::<T>())?.data.downcast_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Name, Transform};
    use glam::Vec3;

    #[derive(Debug, PartialEq, Clone)]
    struct Crew(u8);
    impl Component for Crew {}

    #[test]
    fn test_handles_are_issued_in_slot_order() {
        let mut world = World::new();
        let handles: Vec<_> = (0..3).map(|_| world.spawn()).collect();
        let slots: Vec<_> = handles.iter().map(EntityId::index).collect();
        assert_eq!(slots, [0, 1, 2]);
        assert!(handles.iter().all(|h| h.generation() == 1));
        assert_eq!(world.entity_count(), 3);
    }

    #[test]
    fn test_despawned_module_handle_goes_stale() {
        let mut world = World::new();
        let lab = world.spawn();
        world.insert(lab, Name::new("Lab"));

        assert!(world.despawn(lab));
        assert!(!world.despawn(lab));

        let dorm = world.spawn();
        world.insert(dorm, Name::new("Dorm"));
        assert_eq!(dorm.index(), lab.index());
        assert_eq!(dorm.generation(), 2);

        assert!(!world.is_alive(lab));
        assert_eq!(world.get::<Name>(lab), None);
        assert_eq!(world.get::<Name>(dorm).map(Name::as_str), Some("Dorm"));
    }

    #[test]
    fn test_component_access() {
        let mut world = World::new();
        let module = world.spawn();
        world.insert(module, Transform::from_position(Vec3::new(1.0, 2.0, 3.0)));
        world.insert(module, Crew(4));

        if let Some(t) = world.get_mut::<Transform>(module) {
            t.position.x = -4.0;
        }
        assert_eq!(
            world.get::<Transform>(module).map(|t| t.position),
            Some(Vec3::new(-4.0, 2.0, 3.0))
        );
        assert_eq!(world.remove::<Crew>(module), Some(Crew(4)));
        assert_eq!(world.get::<Crew>(module), None);
        assert!(world.get::<Name>(module).is_none());
    }

    #[test]
    fn test_despawn_evicts_every_component_type() {
        let mut world = World::new();
        let module = world.spawn();
        world.insert(module, Crew(2));
        world.insert(module, Name::new("Greenhouse"));
        world.despawn(module);

        let reused = world.spawn();
        assert_eq!(reused.index(), module.index());
        assert_eq!(world.get::<Crew>(reused), None);
        assert_eq!(world.get::<Name>(reused), None);
    }

    #[test]
    fn test_iteration_skips_free_slots() {
        let mut world = World::new();
        let a = world.spawn();
        let b = world.spawn();
        let c = world.spawn();
        world.insert(a, Crew(1));
        world.insert(b, Crew(2));
        world.insert(c, Crew(3));
        world.despawn(b);

        assert_eq!(world.iter_entities().collect::<Vec<_>>(), [a, c]);
        let crews: Vec<_> = world.iter_with::<Crew>().map(|(e, c)| (e, c.0)).collect();
        assert_eq!(crews, [(a, 1), (c, 3)]);
        assert_eq!(world.entity_count(), 2);
    }

    #[test]
    fn test_stale_handle_is_ignored() {
        let mut world = World::new();
        let gone = world.spawn();
        world.despawn(gone);

        world.insert(gone, Crew(1));
        assert_eq!(world.get::<Crew>(gone), None);
        assert_eq!(world.get_mut::<Crew>(gone), None);
        assert_eq!(world.remove::<Crew>(gone), None);
    }
}
