//! The component store
//!
//! Owns the entity allocator and one sparse column per component kind.
//! Columns are plain typed fields (no `TypeId` map); the `component_kinds!`
//! macro below generates the closed `Component` / `ComponentKind` enums and
//! the glue between them and the columns.

use log::{debug, warn};

use super::component::ComponentStorage;
use super::components::*;
use super::entity::{Entity, EntityAllocator};
use crate::error::{Error, Result};
use crate::physics::{PhysicsBody, PhysicsCollider};

/// A component type with its own column in the store.
pub trait ComponentType: Into<Component> + Sized + 'static {
    const KIND: ComponentKind;

    #[doc(hidden)]
    fn column(columns: &Columns) -> &ComponentStorage<Self>;

    #[doc(hidden)]
    fn column_mut(columns: &mut Columns) -> &mut ComponentStorage<Self>;
}

macro_rules! component_kinds {
    ($($kind:ident => $field:ident),* $(,)?) => {
        /// Names a component type without carrying a value.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ComponentKind {
            $($kind),*
        }

        impl ComponentKind {
            pub fn name(self) -> &'static str {
                match self {
                    $(ComponentKind::$kind => stringify!($kind)),*
                }
            }
        }

        /// Any component value.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Component {
            $($kind($kind)),*
        }

        impl Component {
            pub fn kind(&self) -> ComponentKind {
                match self {
                    $(Component::$kind(_) => ComponentKind::$kind),*
                }
            }
        }

        $(
            impl From<$kind> for Component {
                fn from(component: $kind) -> Self {
                    Component::$kind(component)
                }
            }

            impl ComponentType for $kind {
                const KIND: ComponentKind = ComponentKind::$kind;

                fn column(columns: &Columns) -> &ComponentStorage<Self> {
                    &columns.$field
                }

                fn column_mut(columns: &mut Columns) -> &mut ComponentStorage<Self> {
                    &mut columns.$field
                }
            }
        )*

        /// One column per component kind.
        #[doc(hidden)]
        #[derive(Debug, Default)]
        pub struct Columns {
            $(pub(crate) $field: ComponentStorage<$kind>),*
        }

        impl Columns {
            fn contains(&self, entity: Entity, kind: ComponentKind) -> bool {
                match kind {
                    $(ComponentKind::$kind => self.$field.contains(entity)),*
                }
            }

            fn insert(&mut self, entity: Entity, component: Component) {
                match component {
                    $(Component::$kind(c) => { self.$field.insert(entity, c); })*
                }
            }

            fn get(&self, entity: Entity, kind: ComponentKind) -> Option<Component> {
                match kind {
                    $(ComponentKind::$kind => self.$field.get(entity).cloned().map(Component::$kind)),*
                }
            }

            fn remove(&mut self, entity: Entity, kind: ComponentKind) -> Option<Component> {
                match kind {
                    $(ComponentKind::$kind => self.$field.remove(entity).map(Component::$kind)),*
                }
            }

            fn clear_slot(&mut self, index: u32) {
                $(self.$field.clear_slot(index);)*
            }
        }
    };
}

component_kinds! {
    Position => positions,
    PlatformerControls => controls,
    Health => health,
    ViewportTarget => viewport_targets,
    PhysicsBody => bodies,
    PhysicsCollider => colliders,
    Sprite => sprites,
    CharacterSprites => character_sprites,
    Player => players,
    Wallet => wallets,
    Currency => currencies,
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Entity and component storage for one level.
#[derive(Debug, Default)]
pub struct ComponentStore {
    entities: EntityAllocator,
    columns: Columns,
    /// Entities queued by `despawn`, destroyed by `flush_despawns`
    despawn_queue: Vec<Entity>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Entities
    // =========================================================================

    pub fn create_entity(&mut self) -> Entity {
        self.entities.allocate()
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    pub fn entity_count(&self) -> u32 {
        self.entities.alive_count()
    }

    /// Live entities in slot order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter()
    }

    /// Creation sequence number of a live entity. Later entities have larger
    /// numbers, even when they reuse the slot of a destroyed one.
    pub fn creation_order(&self, entity: Entity) -> Option<u64> {
        self.entities.creation_order(entity)
    }

    /// Destroys an entity and drops all its components.
    pub fn destroy(&mut self, entity: Entity) -> Result<()> {
        if !self.entities.free(entity) {
            return Err(Error::NoSuchEntity(entity));
        }
        self.columns.clear_slot(entity.index());
        debug!("destroyed entity {}", entity);
        Ok(())
    }

    /// Queues an entity for destruction at the next `flush_despawns`.
    pub fn despawn(&mut self, entity: Entity) {
        if !self.despawn_queue.contains(&entity) {
            self.despawn_queue.push(entity);
        }
    }

    /// Destroys every queued entity that is still alive.
    pub fn flush_despawns(&mut self) {
        for entity in std::mem::take(&mut self.despawn_queue) {
            if self.entities.is_alive(entity) {
                let _ = self.destroy(entity);
            }
        }
    }

    fn check_alive(&self, entity: Entity) -> Result<()> {
        if self.entities.is_alive(entity) {
            Ok(())
        } else {
            Err(Error::NoSuchEntity(entity))
        }
    }

    // =========================================================================
    // Dynamic access
    // =========================================================================

    /// Attaches a component.
    ///
    /// Fails with `DuplicateComponent` if the entity already has one of that
    /// kind, and with `AmbiguousViewportTarget` if another entity already
    /// holds the `ViewportTarget` marker.
    pub fn add(&mut self, entity: Entity, component: impl Into<Component>) -> Result<()> {
        let component = component.into();
        let kind = component.kind();
        self.check_alive(entity)?;

        if self.columns.contains(entity, kind) {
            return Err(Error::DuplicateComponent { entity, kind });
        }

        if kind == ComponentKind::ViewportTarget {
            if let Some((existing, _)) = self.iter::<ViewportTarget>().next() {
                return Err(Error::AmbiguousViewportTarget {
                    existing,
                    rejected: entity,
                });
            }
        }

        self.columns.insert(entity, component);
        Ok(())
    }

    /// A copy of the entity's component of `kind`.
    pub fn get_component(&self, entity: Entity, kind: ComponentKind) -> Result<Component> {
        self.check_alive(entity)?;
        self.columns
            .get(entity, kind)
            .ok_or(Error::ComponentNotFound { entity, kind })
    }

    pub fn has(&self, entity: Entity, kind: ComponentKind) -> bool {
        self.entities.is_alive(entity) && self.columns.contains(entity, kind)
    }

    /// Detaches and returns the entity's component of `kind`.
    pub fn remove(&mut self, entity: Entity, kind: ComponentKind) -> Result<Component> {
        self.check_alive(entity)?;
        self.columns
            .remove(entity, kind)
            .ok_or(Error::ComponentNotFound { entity, kind })
    }

    // =========================================================================
    // Typed access
    // =========================================================================

    pub fn insert<T: ComponentType>(&mut self, entity: Entity, component: T) -> Result<()> {
        self.add(entity, component)
    }

    pub fn get<T: ComponentType>(&self, entity: Entity) -> Result<&T> {
        self.check_alive(entity)?;
        T::column(&self.columns)
            .get(entity)
            .ok_or(Error::ComponentNotFound { entity, kind: T::KIND })
    }

    pub fn get_mut<T: ComponentType>(&mut self, entity: Entity) -> Result<&mut T> {
        self.check_alive(entity)?;
        T::column_mut(&mut self.columns)
            .get_mut(entity)
            .ok_or(Error::ComponentNotFound { entity, kind: T::KIND })
    }

    /// Like `get`, but absence is not an error.
    pub fn try_get<T: ComponentType>(&self, entity: Entity) -> Option<&T> {
        if self.entities.is_alive(entity) {
            T::column(&self.columns).get(entity)
        } else {
            None
        }
    }

    pub fn take<T: ComponentType>(&mut self, entity: Entity) -> Result<T> {
        self.check_alive(entity)?;
        T::column_mut(&mut self.columns)
            .remove(entity)
            .ok_or(Error::ComponentNotFound { entity, kind: T::KIND })
    }

    /// Every live entity holding a `T`, in ascending slot order.
    pub fn iter<T: ComponentType>(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        let entities = &self.entities;
        T::column(&self.columns)
            .iter()
            .filter_map(move |(index, c)| entities.entity_at(index).map(|e| (e, c)))
    }

    /// Entities holding a `T`, collected so the store can be mutated while
    /// walking them.
    pub fn entities_with<T: ComponentType>(&self) -> Vec<Entity> {
        self.iter::<T>().map(|(entity, _)| entity).collect()
    }

    /// Moves a `T` between two entities of this store.
    pub fn transfer_within<T: ComponentType>(&mut self, from: Entity, to: Entity) -> Result<()> {
        self.check_alive(to)?;
        if self.has(to, T::KIND) {
            return Err(Error::DuplicateComponent { entity: to, kind: T::KIND });
        }
        let component = self.take::<T>(from)?;
        self.insert(to, component)
    }

    /// Raw column access. Skips every check `add` performs.
    #[cfg(test)]
    pub(crate) fn column_mut<T: ComponentType>(&mut self) -> &mut ComponentStorage<T> {
        T::column_mut(&mut self.columns)
    }
}

/// Moves a `T` from an entity of one store to an entity of another.
///
/// The destination is validated before anything is removed, so on failure
/// the source still holds its component.
pub fn transfer<T: ComponentType>(
    from_store: &mut ComponentStore,
    from: Entity,
    to_store: &mut ComponentStore,
    to: Entity,
) -> Result<()> {
    to_store.check_alive(to)?;
    if to_store.has(to, T::KIND) {
        return Err(Error::DuplicateComponent { entity: to, kind: T::KIND });
    }
    let component = from_store.take::<T>(from)?;
    if let Err(err) = to_store.insert(to, component) {
        warn!("transfer of {} from {} to {} failed: {}", T::KIND, from, to, err);
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{CollisionGroups, Shape};

    #[test]
    fn test_add_get_remove() {
        let mut store = ComponentStore::new();
        let e = store.create_entity();

        store.add(e, Position::new(1.0, 2.0)).unwrap();
        assert_eq!(
            store.get_component(e, ComponentKind::Position).unwrap(),
            Component::Position(Position::new(1.0, 2.0))
        );
        assert!(store.has(e, ComponentKind::Position));

        let removed = store.remove(e, ComponentKind::Position).unwrap();
        assert_eq!(removed.kind(), ComponentKind::Position);
        assert!(matches!(
            store.get::<Position>(e),
            Err(Error::ComponentNotFound { kind: ComponentKind::Position, .. })
        ));
    }

    #[test]
    fn test_duplicate_component_is_rejected() {
        let mut store = ComponentStore::new();
        let e = store.create_entity();

        store.add(e, Health::new(3)).unwrap();
        let err = store.add(e, Health::new(4)).unwrap_err();
        assert!(matches!(err, Error::DuplicateComponent { kind: ComponentKind::Health, .. }));
        assert_eq!(store.get::<Health>(e).unwrap().value, 3);
    }

    #[test]
    fn test_destroy_releases_components_and_handle() {
        let mut store = ComponentStore::new();
        let e = store.create_entity();
        store.add(e, Health::new(3)).unwrap();
        store.add(e, Player).unwrap();

        store.destroy(e).unwrap();
        assert!(!store.is_alive(e));
        assert!(matches!(store.get::<Health>(e), Err(Error::NoSuchEntity(_))));
        assert!(matches!(store.destroy(e), Err(Error::NoSuchEntity(_))));

        // The reused slot starts empty and the stale handle stays dead
        let f = store.create_entity();
        assert_eq!(f.index(), e.index());
        assert!(!store.has(f, ComponentKind::Health));
        assert!(store.add(e, Health::new(1)).is_err());
    }

    #[test]
    fn test_iteration_skips_destroyed_entities() {
        let mut store = ComponentStore::new();
        let a = store.create_entity();
        let b = store.create_entity();
        let c = store.create_entity();
        for e in [a, b, c] {
            store.add(e, Wallet::new(0)).unwrap();
        }
        store.destroy(b).unwrap();

        let seen: Vec<_> = store.iter::<Wallet>().map(|(e, _)| e).collect();
        assert_eq!(seen, vec![a, c]);
    }

    #[test]
    fn test_second_viewport_target_is_rejected() {
        let mut store = ComponentStore::new();
        let a = store.create_entity();
        let b = store.create_entity();

        store.add(a, ViewportTarget).unwrap();
        let err = store.add(b, ViewportTarget).unwrap_err();
        assert!(matches!(
            err,
            Error::AmbiguousViewportTarget { existing, rejected } if existing == a && rejected == b
        ));

        // Moving the marker is fine once the first holder lets go
        store.remove(a, ComponentKind::ViewportTarget).unwrap();
        store.add(b, ViewportTarget).unwrap();
    }

    #[test]
    fn test_deferred_despawn() {
        let mut store = ComponentStore::new();
        let e = store.create_entity();
        store.despawn(e);
        store.despawn(e);
        assert!(store.is_alive(e));

        store.flush_despawns();
        assert!(!store.is_alive(e));
        assert_eq!(store.entity_count(), 0);
    }

    #[test]
    fn test_health_transfers_between_levels() {
        let mut level1 = ComponentStore::new();
        let mut level2 = ComponentStore::new();
        let a = level1.create_entity();
        let b = level2.create_entity();
        level1.add(a, Health::new(6)).unwrap();

        transfer::<Health>(&mut level1, a, &mut level2, b).unwrap();

        assert!(!level1.has(a, ComponentKind::Health));
        assert_eq!(level2.get::<Health>(b).unwrap().value, 6);
    }

    #[test]
    fn test_failed_transfer_keeps_source() {
        let mut level1 = ComponentStore::new();
        let mut level2 = ComponentStore::new();
        let a = level1.create_entity();
        let b = level2.create_entity();
        level1.add(a, Health::new(6)).unwrap();
        level2.add(b, Health::new(1)).unwrap();

        assert!(transfer::<Health>(&mut level1, a, &mut level2, b).is_err());
        assert_eq!(level1.get::<Health>(a).unwrap().value, 6);
        assert_eq!(level2.get::<Health>(b).unwrap().value, 1);
    }

    #[test]
    fn test_transfer_within_one_store() {
        let mut store = ComponentStore::new();
        let a = store.create_entity();
        let b = store.create_entity();
        store.add(a, Wallet::new(12)).unwrap();

        store.transfer_within::<Wallet>(a, b).unwrap();
        assert!(store.try_get::<Wallet>(a).is_none());
        assert_eq!(store.get::<Wallet>(b).unwrap().value, 12);
    }

    #[test]
    fn test_physics_components_are_storable() {
        let mut store = ComponentStore::new();
        let e = store.create_entity();
        store.add(e, PhysicsBody::new(2.0).unwrap()).unwrap();
        store
            .add(e, PhysicsCollider::new(Shape::rect(8.0, 8.0), CollisionGroups::ENEMY).unwrap())
            .unwrap();

        assert_eq!(store.get::<PhysicsBody>(e).unwrap().mass(), 2.0);
        assert_eq!(store.entities_with::<PhysicsCollider>(), vec![e]);
    }
}
