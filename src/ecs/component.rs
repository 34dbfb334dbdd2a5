//! Sparse component columns
//!
//! Each component kind lives in its own `ComponentStorage<T>`, a vector of
//! optional values indexed by entity slot. Lookups are a bounds check and an
//! index, which keeps the per-frame system scans cheap at platformer scale.

use super::entity::Entity;

/// Sparse storage for one component kind, indexed by `Entity::index()`.
///
/// The column does not know about generations; the owning store validates
/// entity liveness before touching it.
#[derive(Debug, Clone)]
pub struct ComponentStorage<T> {
    data: Vec<Option<T>>,
}

impl<T> ComponentStorage<T> {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    fn ensure_capacity(&mut self, index: usize) {
        if index >= self.data.len() {
            self.data.resize_with(index + 1, || None);
        }
    }

    /// Stores a component, returning the one it replaced.
    pub fn insert(&mut self, entity: Entity, component: T) -> Option<T> {
        let idx = entity.index() as usize;
        self.ensure_capacity(idx);
        self.data[idx].replace(component)
    }

    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        self.data.get_mut(entity.index() as usize).and_then(Option::take)
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.data.get(entity.index() as usize).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.data.get_mut(entity.index() as usize).and_then(Option::as_mut)
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.get(entity).is_some()
    }

    /// Iterates `(slot, component)` pairs in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.data
            .iter()
            .enumerate()
            .filter_map(|(idx, opt)| opt.as_ref().map(|c| (idx as u32, c)))
    }

    /// Drops whatever is stored in `index`. Called when an entity is destroyed.
    pub fn clear_slot(&mut self, index: u32) {
        if let Some(slot) = self.data.get_mut(index as usize) {
            *slot = None;
        }
    }
}

impl<T> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_and_reports_previous() {
        let mut storage: ComponentStorage<i32> = ComponentStorage::new();
        let entity = Entity::new(5, 0);

        assert_eq!(storage.insert(entity, 42), None);
        assert_eq!(storage.insert(entity, 7), Some(42));
        assert_eq!(storage.get(entity), Some(&7));
    }

    #[test]
    fn test_sparse_storage() {
        let mut storage: ComponentStorage<i32> = ComponentStorage::new();

        // Insert at index 100 without filling 0-99
        let entity = Entity::new(100, 0);
        storage.insert(entity, 999);

        assert_eq!(storage.get(entity), Some(&999));
        assert!(!storage.contains(Entity::new(50, 0)));
        assert_eq!(storage.iter().count(), 1);
    }

    #[test]
    fn test_iteration_is_slot_ordered() {
        let mut storage: ComponentStorage<&str> = ComponentStorage::new();

        storage.insert(Entity::new(5, 0), "five");
        storage.insert(Entity::new(0, 0), "zero");
        storage.insert(Entity::new(2, 0), "two");

        let items: Vec<_> = storage.iter().collect();
        assert_eq!(items, vec![(0, &"zero"), (2, &"two"), (5, &"five")]);
    }
}
