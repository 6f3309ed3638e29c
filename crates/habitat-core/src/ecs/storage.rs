use super::component::Component;
use super::entity::EntityId;

const VACANT: u32 = u32::MAX;

/// Sparse set packing one component type
///
/// `slots[entity.index()]` points into `entries`. Entries keep the full handle,
/// so a stale handle never finds the component of a reused slot.
pub struct ComponentStorage<T: Component> {
    entries: Vec<(EntityId, T)>,
    slots: Vec<u32>,
}

impl<T: Component> ComponentStorage<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            slots: Vec::new(),
        }
    }

    fn position(&self, entity: EntityId) -> Option<usize> {
        let position = *self.slots.get(entity.index() as usize)?;
        if position == VACANT {
            return None;
        }
        let position = position as usize;
        (self.entries.get(position)?.0 == entity).then_some(position)
    }

    /// Insert or replace, returning the previous value
    pub fn insert(&mut self, entity: EntityId, component: T) -> Option<T> {
        let slot = entity.index() as usize;
        if slot >= self.slots.len() {
            self.slots.resize(slot + 1, VACANT);
        }

        match self.slots[slot] {
            VACANT => {
                self.slots[slot] = self.entries.len() as u32;
                self.entries.push((entity, component));
                None
            }
            position => {
                // an older generation's entry is overwritten in place
                let (_, previous) =
                    std::mem::replace(&mut self.entries[position as usize], (entity, component));
                Some(previous)
            }
        }
    }

    pub fn get(&self, entity: EntityId) -> Option<&T> {
        self.position(entity).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut T> {
        self.position(entity).map(|i| &mut self.entries[i].1)
    }

    /// Swap-remove; the last entry fills the hole
    pub fn remove(&mut self, entity: EntityId) -> Option<T> {
        let position = self.position(entity)?;
        self.slots[entity.index() as usize] = VACANT;

        let (_, component) = self.entries.swap_remove(position);
        if let Some((moved, _)) = self.entries.get(position) {
            self.slots[moved.index() as usize] = position as u32;
        }
        Some(component)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.entries.iter().map(|(entity, component)| (*entity, component))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.position(entity).is_some()
    }
}

impl<T: Component> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Clone)]
    struct Label(&'static str);

    impl Component for Label {}

    #[test]
    fn test_replace_returns_previous() {
        let mut storage = ComponentStorage::new();
        let lab = EntityId::new(0, 1);

        assert_eq!(storage.insert(lab, Label("lab")), None);
        assert_eq!(storage.insert(lab, Label("greenhouse")), Some(Label("lab")));
        assert_eq!(storage.get(lab), Some(&Label("greenhouse")));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_reused_slot_hides_old_handle() {
        let mut storage = ComponentStorage::new();
        let old = EntityId::new(4, 1);
        let new = old.next_generation();

        storage.insert(new, Label("dock"));

        assert!(!storage.contains(old));
        assert_eq!(storage.remove(old), None);
        assert_eq!(storage.get(new), Some(&Label("dock")));
    }

    #[test]
    fn test_remove_moves_last_entry_into_hole() {
        let mut storage = ComponentStorage::new();
        let ids: Vec<_> = (0..3).map(|i| EntityId::new(i, 1)).collect();
        for (id, label) in ids.iter().zip(["airlock", "dorm", "lab"]) {
            storage.insert(*id, Label(label));
        }

        assert_eq!(storage.remove(ids[0]), Some(Label("airlock")));
        assert_eq!(storage.get(ids[2]), Some(&Label("lab")));
        assert_eq!(storage.get_mut(ids[1]).map(|l| l.0), Some("dorm"));
        assert_eq!(storage.len(), 2);

        storage.remove(ids[2]);
        storage.remove(ids[1]);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_far_slot() {
        let mut storage = ComponentStorage::new();
        let far = EntityId::new(100, 1);
        storage.insert(far, Label("far"));

        let all: Vec<_> = storage.iter().collect();
        assert_eq!(all, [(far, &Label("far"))]);
    }
}
