use std::fmt;

/// Handle to a module or node
///
/// Slot index in the high 32 bits, generation in the low 32. Reusing a slot
/// bumps the generation, so handles to destroyed modules stop matching.
/// Ordering compares the slot first, which keeps hit-test candidates in spawn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// Generation 0 is never issued; it is raised to 1
    pub fn new(index: u32, generation: u32) -> Self {
        Self(((index as u64) << 32) | generation.max(1) as u64)
    }

    #[inline]
    pub fn index(&self) -> u32 {
        (self.0 >> 32) as u32
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.0 as u32
    }

    /// Same slot, next generation
    pub(crate) fn next_generation(&self) -> Self {
        Self::new(self.index(), self.generation().wrapping_add(1))
    }

    /// Raw value, for logs
    pub fn to_bits(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packs_slot_and_generation() {
        let entity = EntityId::new(42, 3);
        assert_eq!(entity.index(), 42);
        assert_eq!(entity.generation(), 3);
        assert_eq!(entity.to_bits(), (42u64 << 32) | 3);
    }

    #[test]
    fn test_generation_zero_is_rounded_up() {
        assert_eq!(EntityId::new(9, 0), EntityId::new(9, 1));
    }

    #[test]
    fn test_stale_handle_differs() {
        let first = EntityId::new(1, 1);
        assert_ne!(first, first.next_generation());
        assert_eq!(first.next_generation().index(), 1);
    }

    #[test]
    fn test_sorted_by_slot_first() {
        let mut ids = vec![EntityId::new(3, 1), EntityId::new(1, 7), EntityId::new(2, 2)];
        ids.sort();
        let slots: Vec<_> = ids.iter().map(EntityId::index).collect();
        assert_eq!(slots, [1, 2, 3]);
    }

    #[test]
    fn test_generation_wraps_to_one() {
        let id = EntityId::new(0, u32::MAX).next_generation();
        assert_eq!(id.generation(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(EntityId::new(5, 2).to_string(), "5v2");
    }
}
