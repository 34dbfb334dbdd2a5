//! Entities as generational indices
//!
//! An entity is a slot index plus the generation of that slot. Destroying an
//! entity bumps the slot's generation, so stale handles never match a newer
//! entity that reuses the slot. Every allocation also receives a creation
//! sequence number, which the systems use whenever they need a deterministic
//! "earliest created first" order.

use std::fmt;

/// An opaque identifier for a game object.
///
/// Entities carry no data of their own; everything lives in components held
/// by the [`ComponentStore`](super::ComponentStore) that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot of this entity in every component column.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Allocates entity slots and tracks which handles are alive.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    /// Current generation of each slot
    generations: Vec<u32>,
    /// Liveness of each slot
    alive: Vec<bool>,
    /// Creation sequence number of the entity currently in each slot
    created: Vec<u64>,
    /// Freed slots, reused LIFO
    free_indices: Vec<u32>,
    next_sequence: u64,
    alive_count: u32,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> Entity {
        self.alive_count += 1;
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        if let Some(index) = self.free_indices.pop() {
            // Generation was already bumped when the slot was freed
            let idx = index as usize;
            self.alive[idx] = true;
            self.created[idx] = sequence;
            Entity::new(index, self.generations[idx])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            self.alive.push(true);
            self.created.push(sequence);
            Entity::new(index, 0)
        }
    }

    /// Frees an entity. Returns false if it was not alive.
    pub fn free(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }

        let idx = entity.index as usize;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.alive[idx] = false;
        self.free_indices.push(entity.index);
        self.alive_count -= 1;
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        let idx = entity.index as usize;
        idx < self.generations.len() && self.alive[idx] && self.generations[idx] == entity.generation
    }

    /// The live entity occupying `index`, if any.
    pub fn entity_at(&self, index: u32) -> Option<Entity> {
        let idx = index as usize;
        if idx < self.alive.len() && self.alive[idx] {
            Some(Entity::new(index, self.generations[idx]))
        } else {
            None
        }
    }

    /// Creation sequence number of a live entity.
    pub fn creation_order(&self, entity: Entity) -> Option<u64> {
        if self.is_alive(entity) {
            Some(self.created[entity.index as usize])
        } else {
            None
        }
    }

    pub fn alive_count(&self) -> u32 {
        self.alive_count
    }

    /// Iterates live entities in slot order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        (0..self.alive.len() as u32).filter_map(|index| self.entity_at(index))
    }
}
