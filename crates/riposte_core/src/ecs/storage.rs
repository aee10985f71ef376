//! Dense per-type component storage.
//!
//! One value slot per entity index, grown on demand with the
//! component's `Default`. The rollback core keeps one storage per world
//! copy and resynchronizes them with [`ComponentStorage::copy_from`],
//! which is a pure value copy - the two copies never alias.

use super::component::Component;
use super::entity::Entity;

/// Dense storage for a single component type.
#[derive(Clone, Debug)]
pub struct ComponentStorage<C: Component> {
    data: Vec<C>,
}

impl<C: Component> ComponentStorage<C> {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Gets a component by entity index.
    #[inline]
    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<&C> {
        self.data.get(entity as usize)
    }

    /// Gets a mutable component by entity index.
    #[inline]
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut C> {
        self.data.get_mut(entity as usize)
    }

    /// Sets the component for an entity, growing the table with default
    /// values as needed.
    pub fn set(&mut self, entity: Entity, component: C) {
        let index = entity as usize;
        if index >= self.data.len() {
            self.data.resize(index + 1, C::default());
        }
        self.data[index] = component;
    }

    /// Replaces this storage's contents with a value copy of `other`.
    pub fn copy_from(&mut self, other: &Self) {
        self.data.clone_from(&other.data);
    }
}

impl<C: Component> Default for ComponentStorage<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::mask;

    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    struct Counter(u32);

    impl Component for Counter {
        const MASK: crate::ComponentMask = mask::OTHER_BASE;
    }

    #[test]
    fn test_set_grows_with_defaults() {
        let mut storage = ComponentStorage::new();
        storage.set(3, Counter(7));

        assert_eq!(storage.get(0), Some(&Counter(0)));
        assert_eq!(storage.get(3), Some(&Counter(7)));
        assert_eq!(storage.get(4), None);
    }

    #[test]
    fn test_copy_from_is_value_copy() {
        let mut a = ComponentStorage::new();
        a.set(0, Counter(1));

        let mut b = ComponentStorage::new();
        b.copy_from(&a);
        b.get_mut(0).unwrap().0 = 99;

        assert_eq!(a.get(0), Some(&Counter(1)));
        assert_eq!(b.get(0), Some(&Counter(99)));
    }
}
