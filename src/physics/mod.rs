//! Physics Engine
//!
//! Axis-aligned rigid bodies under gravity. Each step:
//! 1. adds `gravity * dt` to every dynamic body's velocity
//! 2. moves bodies by `velocity * dt`, split into sub-steps so that nothing
//!    travels more than half its smallest extent at a time. Past
//!    `MAX_SUBSTEPS`, a body's travel per sub-step is clamped to that limit
//! 3. after every sub-step, tests the collider pairs the `CollisionFilter`
//!    lets through and pushes overlapping ones apart along the axis of least
//!    overlap
//! 4. rebuilds the per-entity `Contacts`
//!
//! Only entities with both a `PhysicsBody` and a `PhysicsCollider` move.
//! A collider without a body is static geometry. Pairs are always visited in
//! ascending order of the creation order of their two entities, which keeps
//! the simulation deterministic.

mod body;
mod contacts;
mod groups;
mod shape;

pub use body::{PhysicsBody, PhysicsCollider};
pub use contacts::Contacts;
pub use groups::{CollisionFilter, CollisionGroups};
pub use shape::{Aabb, Shape, ShapeRect};

use std::collections::HashMap;

use log::{debug, warn};
use macroquad::math::Vec2;

use crate::ecs::{ComponentStore, Entity, Position};
use crate::error::{Error, Result};

/// Upper bound on position sub-steps per `step`
pub const MAX_SUBSTEPS: u32 = 64;

/// Upper bound on resolution passes per sub-step
pub const MAX_RESOLUTION_PASSES: u32 = 32;

/// Overlap below this depth is treated as touching, not penetrating
const PENETRATION_SLOP: f32 = 1e-3;

/// Boxes closer than this count as in contact
const CONTACT_TOLERANCE: f32 = 0.01;

/// A collider taking part in the current step.
#[derive(Debug, Clone, Copy)]
struct Collidable {
    entity: Entity,
    collider: PhysicsCollider,
    /// Zero for static geometry
    inverse_mass: f32,
}

impl Collidable {
    fn is_dynamic(&self) -> bool {
        self.inverse_mass > 0.0
    }

    /// Furthest this collider may move in one sub-step.
    fn travel_limit(&self) -> f32 {
        let half = self.collider.shape().half_extents();
        half.x.min(half.y)
    }
}

/// Indices into the collidable list, `first` created before `second`.
#[derive(Debug, Clone, Copy)]
struct Pair {
    first: usize,
    second: usize,
    blocking: bool,
}

/// Gravity, the collision filter table and the contacts of the last step.
#[derive(Debug, Clone, Default)]
pub struct PhysicsEngine {
    gravity: Vec2,
    filter: CollisionFilter,
    contacts: HashMap<Entity, Contacts>,
}

impl PhysicsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec2) -> Result<()> {
        if !gravity.is_finite() {
            return Err(Error::InvalidPhysicsConfig(format!(
                "gravity must be finite, got {}",
                gravity
            )));
        }
        self.gravity = gravity;
        Ok(())
    }

    pub fn filter(&self) -> &CollisionFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: CollisionFilter) {
        self.filter = filter;
    }

    /// Contacts of `entity` during the last step.
    pub fn contacts(&self, entity: Entity) -> Option<&Contacts> {
        self.contacts.get(&entity)
    }

    /// Whether `entity` stood on a ground-group collider during the last step.
    pub fn is_grounded(&self, store: &ComponentStore, entity: Entity) -> bool {
        self.contacts.get(&entity).map_or(false, |contacts| {
            contacts.touching_bottom.iter().any(|&below| {
                store
                    .try_get::<PhysicsCollider>(below)
                    .map_or(false, |c| c.collision_groups.contains(CollisionGroups::GROUND))
            })
        })
    }

    /// Advances the simulation by `dt` seconds.
    pub fn step(&mut self, store: &mut ComponentStore, dt: f32) -> Result<()> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(Error::InvalidPhysicsConfig(format!(
                "time step must be finite and non-negative, got {}",
                dt
            )));
        }

        let collidables = collect(store)?;
        let pairs = self.pairs(&collidables);

        for c in collidables.iter().filter(|c| c.is_dynamic()) {
            store.get_mut::<PhysicsBody>(c.entity)?.velocity += self.gravity * dt;
        }

        let substeps = substeps(store, &collidables, dt)?;
        let h = dt / substeps as f32;
        for _ in 0..substeps {
            for c in collidables.iter().filter(|c| c.is_dynamic()) {
                let velocity = store.get::<PhysicsBody>(c.entity)?.velocity;
                let travel = (velocity * h).clamp_length_max(c.travel_limit());
                let position = store.get_mut::<Position>(c.entity)?;
                position.x += travel.x;
                position.y += travel.y;
            }
            resolve(store, &collidables, &pairs)?;
        }

        self.rebuild_contacts(store, &collidables, &pairs)
    }

    fn pairs(&self, collidables: &[Collidable]) -> Vec<Pair> {
        let mut pairs = Vec::new();
        for (i, a) in collidables.iter().enumerate() {
            for (j, b) in collidables.iter().enumerate().skip(i + 1) {
                if !a.is_dynamic() && !b.is_dynamic() {
                    continue;
                }
                if !self
                    .filter
                    .should_test(a.collider.collision_groups, b.collider.collision_groups)
                {
                    continue;
                }
                pairs.push(Pair {
                    first: i,
                    second: j,
                    blocking: !a.collider.sensor && !b.collider.sensor,
                });
            }
        }
        pairs
    }

    fn rebuild_contacts(
        &mut self,
        store: &ComponentStore,
        collidables: &[Collidable],
        pairs: &[Pair],
    ) -> Result<()> {
        self.contacts.clear();
        for c in collidables {
            self.contacts.insert(c.entity, Contacts::default());
        }

        for pair in pairs {
            let (a, b) = (&collidables[pair.first], &collidables[pair.second]);
            let box_a = aabb_of(store, a)?;
            let box_b = aabb_of(store, b)?;
            let overlap = box_a.overlap(&box_b);

            if !pair.blocking {
                if overlap.x > 0.0 && overlap.y > 0.0 {
                    self.entry(a.entity).intersecting.push(b.entity);
                    self.entry(b.entity).intersecting.push(a.entity);
                }
                continue;
            }

            let near = overlap.x > -CONTACT_TOLERANCE && overlap.y > -CONTACT_TOLERANCE;
            // Corners touching diagonally are not a contact
            if !near || overlap.x.max(overlap.y) <= CONTACT_TOLERANCE {
                continue;
            }

            let (ca, cb) = (box_a.center(), box_b.center());
            if overlap.x < overlap.y {
                let (left, right) = if ca.x < cb.x { (a, b) } else { (b, a) };
                self.entry(left.entity).touching_right.push(right.entity);
                self.entry(right.entity).touching_left.push(left.entity);
            } else {
                let (below, above) = if ca.y < cb.y { (a, b) } else { (b, a) };
                self.entry(below.entity).touching_top.push(above.entity);
                self.entry(above.entity).touching_bottom.push(below.entity);
            }
        }

        debug!(
            "physics step: {} colliders, {} in contact",
            collidables.len(),
            self.contacts.values().filter(|c| !c.is_empty()).count()
        );
        Ok(())
    }

    fn entry(&mut self, entity: Entity) -> &mut Contacts {
        self.contacts.entry(entity).or_default()
    }
}

/// Every live collider, sorted by creation order.
fn collect(store: &ComponentStore) -> Result<Vec<Collidable>> {
    let mut collidables = Vec::new();
    for (entity, collider) in store.iter::<PhysicsCollider>() {
        store.get::<Position>(entity)?;
        let inverse_mass = store
            .try_get::<PhysicsBody>(entity)
            .map_or(0.0, PhysicsBody::inverse_mass);
        collidables.push(Collidable {
            entity,
            collider: *collider,
            inverse_mass,
        });
    }
    collidables.sort_by_key(|c| store.creation_order(c.entity));
    Ok(collidables)
}

/// Number of sub-steps needed so that no dynamic body moves further than
/// half its smallest extent in one of them, capped at `MAX_SUBSTEPS`.
fn substeps(store: &ComponentStore, collidables: &[Collidable], dt: f32) -> Result<u32> {
    let mut needed = 1.0f32;
    for c in collidables.iter().filter(|c| c.is_dynamic()) {
        let travel = store.get::<PhysicsBody>(c.entity)?.velocity.length() * dt;
        needed = needed.max((travel / c.travel_limit()).ceil());
    }
    if needed.is_finite() && needed <= MAX_SUBSTEPS as f32 {
        Ok((needed as u32).max(1))
    } else {
        warn!("body too fast for {} sub-steps, clamping its travel", MAX_SUBSTEPS);
        Ok(MAX_SUBSTEPS)
    }
}

fn aabb_of(store: &ComponentStore, c: &Collidable) -> Result<Aabb> {
    let position = store.get::<Position>(c.entity)?.as_vec2();
    Ok(c.collider.aabb(position))
}

/// Pushes blocking pairs apart until nothing penetrates or the pass cap is
/// reached. Later pairs see the positions left by earlier ones.
fn resolve(store: &mut ComponentStore, collidables: &[Collidable], pairs: &[Pair]) -> Result<()> {
    for _ in 0..MAX_RESOLUTION_PASSES {
        let mut resolved_any = false;

        for pair in pairs.iter().filter(|p| p.blocking) {
            let (a, b) = (&collidables[pair.first], &collidables[pair.second]);
            let box_a = aabb_of(store, a)?;
            let box_b = aabb_of(store, b)?;
            let overlap = box_a.overlap(&box_b);
            if overlap.x <= PENETRATION_SLOP || overlap.y <= PENETRATION_SLOP {
                continue;
            }
            resolved_any = true;

            // Normal points from b towards a
            let delta = box_a.center() - box_b.center();
            let sign = |v: f32| if v >= 0.0 { 1.0 } else { -1.0 };
            let (normal, depth) = if overlap.x < overlap.y {
                (Vec2::new(sign(delta.x), 0.0), overlap.x)
            } else {
                (Vec2::new(0.0, sign(delta.y)), overlap.y)
            };

            let total = a.inverse_mass + b.inverse_mass;
            push(store, a, normal * depth * (a.inverse_mass / total))?;
            push(store, b, -normal * depth * (b.inverse_mass / total))?;
            stop_moving_towards(store, a, -normal)?;
            stop_moving_towards(store, b, normal)?;
        }

        if !resolved_any {
            return Ok(());
        }
    }

    warn!(
        "collision resolution did not settle after {} passes",
        MAX_RESOLUTION_PASSES
    );
    Ok(())
}

fn push(store: &mut ComponentStore, c: &Collidable, by: Vec2) -> Result<()> {
    if c.is_dynamic() {
        let position = store.get_mut::<Position>(c.entity)?;
        position.x += by.x;
        position.y += by.y;
    }
    Ok(())
}

/// Zeroes the velocity components that point along `direction`.
fn stop_moving_towards(store: &mut ComponentStore, c: &Collidable, direction: Vec2) -> Result<()> {
    if !c.is_dynamic() {
        return Ok(());
    }
    let body = store.get_mut::<PhysicsBody>(c.entity)?;
    if body.velocity.x * direction.x > 0.0 {
        body.velocity.x = 0.0;
    }
    if body.velocity.y * direction.y > 0.0 {
        body.velocity.y = 0.0;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::ComponentKind;

    const DT: f32 = 1.0 / 60.0;

    fn spawn_ground(store: &mut ComponentStore, x: f32, y: f32, w: f32, h: f32) -> Entity {
        let e = store.create_entity();
        store.add(e, Position::new(x, y)).unwrap();
        store
            .add(e, PhysicsCollider::new(Shape::rect(w, h), CollisionGroups::GROUND).unwrap())
            .unwrap();
        e
    }

    fn spawn_body(store: &mut ComponentStore, x: f32, y: f32, mass: f32, groups: CollisionGroups) -> Entity {
        let e = store.create_entity();
        store.add(e, Position::new(x, y)).unwrap();
        store.add(e, PhysicsBody::new(mass).unwrap()).unwrap();
        store
            .add(e, PhysicsCollider::new(Shape::rect(10.0, 10.0), groups).unwrap())
            .unwrap();
        e
    }

    fn position(store: &ComponentStore, e: Entity) -> Vec2 {
        store.get::<Position>(e).unwrap().as_vec2()
    }

    fn velocity(store: &ComponentStore, e: Entity) -> Vec2 {
        store.get::<PhysicsBody>(e).unwrap().velocity
    }

    #[test]
    fn test_free_fall_accelerates_downward() {
        let mut store = ComponentStore::new();
        let mut physics = PhysicsEngine::new();
        physics.set_gravity(Vec2::new(0.0, -100.0)).unwrap();
        let body = spawn_body(&mut store, 0.0, 100.0, 1.0, CollisionGroups::PLAYER);

        let mut last = 0.0;
        for _ in 0..10 {
            physics.step(&mut store, DT).unwrap();
            let vy = velocity(&store, body).y;
            assert!(vy < last);
            last = vy;
        }
        assert!(position(&store, body).y < 100.0);
        assert!(!physics.is_grounded(&store, body));
    }

    #[test]
    fn test_body_lands_on_ground() {
        let mut store = ComponentStore::new();
        let mut physics = PhysicsEngine::new();
        physics.set_gravity(Vec2::new(0.0, -100.0)).unwrap();
        let ground = spawn_ground(&mut store, 0.0, 0.0, 100.0, 10.0);
        let body = spawn_body(&mut store, 0.0, 12.0, 1.0, CollisionGroups::PLAYER);

        for _ in 0..60 {
            physics.step(&mut store, DT).unwrap();
        }

        let pos = position(&store, body);
        assert!((pos.y - 10.0).abs() < 0.01, "resting at {}", pos.y);
        assert_eq!(velocity(&store, body).y, 0.0);
        assert_eq!(position(&store, ground), Vec2::ZERO);

        let contacts = physics.contacts(body).unwrap();
        assert_eq!(contacts.touching_bottom, vec![ground]);
        assert_eq!(physics.contacts(ground).unwrap().touching_top, vec![body]);
        assert!(physics.is_grounded(&store, body));
    }

    #[test]
    fn test_fast_body_does_not_tunnel() {
        let mut store = ComponentStore::new();
        let mut physics = PhysicsEngine::new();
        spawn_ground(&mut store, 0.0, 0.0, 100.0, 2.0);
        let body = spawn_body(&mut store, 0.0, 20.0, 1.0, CollisionGroups::PLAYER);
        store.get_mut::<PhysicsBody>(body).unwrap().velocity = Vec2::new(0.0, -2000.0);

        physics.step(&mut store, DT).unwrap();

        assert!(position(&store, body).y >= 6.0 - 0.01);
        assert_eq!(velocity(&store, body).y, 0.0);
    }

    #[test]
    fn test_very_fast_body_lands_on_thin_ground() {
        let mut store = ComponentStore::new();
        let mut physics = PhysicsEngine::new();
        let ground = spawn_ground(&mut store, 0.0, 0.0, 100.0, 16.0);
        let body = store.create_entity();
        store.add(body, Position::new(0.0, 41.0)).unwrap();
        store.add(body, PhysicsBody::new(1.0).unwrap()).unwrap();
        store
            .add(body, PhysicsCollider::new(Shape::rect(12.0, 14.0), CollisionGroups::PLAYER).unwrap())
            .unwrap();

        // Far beyond what MAX_SUBSTEPS sub-steps cover in one frame
        for vy in [-12_000.0, -1.0e6] {
            store.get_mut::<Position>(body).unwrap().set(Vec2::new(0.0, 41.0));
            store.get_mut::<PhysicsBody>(body).unwrap().velocity = Vec2::new(0.0, vy);
            physics.step(&mut store, DT).unwrap();

            let y = position(&store, body).y;
            assert!((y - 15.0).abs() < 0.01, "vy {} left the body at {}", vy, y);
            assert_eq!(velocity(&store, body).y, 0.0);
            assert_eq!(physics.contacts(body).unwrap().touching_bottom, vec![ground]);
        }
    }

    #[test]
    fn test_no_blocking_overlap_after_step() {
        let mut store = ComponentStore::new();
        let mut physics = PhysicsEngine::new();
        physics.set_gravity(Vec2::new(0.0, -300.0)).unwrap();
        let mut ground = Vec::new();
        for i in 0..5 {
            ground.push(spawn_ground(&mut store, i as f32 * 10.0, 0.0, 10.0, 10.0));
        }
        let players: Vec<_> = (0..3)
            .map(|i| spawn_body(&mut store, 3.0 + i as f32 * 12.0, 9.0, 1.0, CollisionGroups::PLAYER))
            .collect();
        let enemy = spawn_body(&mut store, 8.0, 15.0, 2.0, CollisionGroups::ENEMY);

        for _ in 0..30 {
            physics.step(&mut store, DT).unwrap();
        }

        let mut blocking: Vec<Entity> = ground.clone();
        blocking.extend(&players);
        blocking.push(enemy);
        for (i, &a) in blocking.iter().enumerate() {
            for &b in &blocking[i + 1..] {
                let ca = store.get::<PhysicsCollider>(a).unwrap();
                let cb = store.get::<PhysicsCollider>(b).unwrap();
                if !physics.filter().should_test(ca.collision_groups, cb.collision_groups) {
                    continue;
                }
                let overlap = ca
                    .aabb(position(&store, a))
                    .overlap(&cb.aabb(position(&store, b)));
                assert!(
                    overlap.x <= 0.01 || overlap.y <= 0.01,
                    "{} and {} overlap by {}",
                    a,
                    b,
                    overlap
                );
            }
        }
    }

    #[test]
    fn test_correction_is_split_by_mass() {
        let mut store = ComponentStore::new();
        let mut physics = PhysicsEngine::new();
        let light = spawn_body(&mut store, 0.0, 0.0, 1.0, CollisionGroups::PLAYER);
        let heavy = spawn_body(&mut store, 8.0, 0.0, 3.0, CollisionGroups::ENEMY);

        physics.step(&mut store, DT).unwrap();

        assert!((position(&store, light).x - -1.5).abs() < 1e-4);
        assert!((position(&store, heavy).x - 8.5).abs() < 1e-4);
        assert_eq!(physics.contacts(light).unwrap().touching_right, vec![heavy]);
        assert_eq!(physics.contacts(heavy).unwrap().touching_left, vec![light]);
    }

    #[test]
    fn test_pairs_resolve_in_creation_order_not_slot_order() {
        let mut store = ComponentStore::new();
        let mut physics = PhysicsEngine::new();
        let placeholder = store.create_entity();
        let older = spawn_body(&mut store, 0.0, 0.0, 1.0, CollisionGroups::PLAYER);
        store.destroy(placeholder).unwrap();
        let newer = spawn_body(&mut store, 0.0, 0.0, 1.0, CollisionGroups::ENEMY);

        // The newer entity took the freed, lower slot
        assert!(newer.index() < older.index());
        assert!(store.creation_order(older) < store.creation_order(newer));
        let order: Vec<Entity> = collect(&store).unwrap().iter().map(|c| c.entity).collect();
        assert_eq!(order, vec![older, newer]);

        physics.step(&mut store, DT).unwrap();

        // Coincident boxes split vertically; the first of the pair goes up
        assert_eq!(position(&store, older), Vec2::new(0.0, 5.0));
        assert_eq!(position(&store, newer), Vec2::new(0.0, -5.0));
        assert_eq!(physics.contacts(older).unwrap().touching_bottom, vec![newer]);
        assert_eq!(physics.contacts(newer).unwrap().touching_top, vec![older]);
    }

    #[test]
    fn test_velocity_away_from_collider_is_kept() {
        let mut store = ComponentStore::new();
        let mut physics = PhysicsEngine::new();
        spawn_ground(&mut store, 0.0, 0.0, 100.0, 10.0);
        let body = spawn_body(&mut store, 0.0, 9.0, 1.0, CollisionGroups::PLAYER);
        store.get_mut::<PhysicsBody>(body).unwrap().velocity = Vec2::new(0.0, 5.0);

        physics.step(&mut store, DT).unwrap();

        assert_eq!(velocity(&store, body).y, 5.0);
        assert!(position(&store, body).y >= 10.0 - 1e-4);
    }

    #[test]
    fn test_sensor_reports_overlap_without_blocking() {
        let mut store = ComponentStore::new();
        let mut physics = PhysicsEngine::new();
        let player = spawn_body(&mut store, 0.0, 0.0, 1.0, CollisionGroups::PLAYER);
        let coin = store.create_entity();
        store.add(coin, Position::new(3.0, 0.0)).unwrap();
        store
            .add(
                coin,
                PhysicsCollider::new(Shape::rect(4.0, 4.0), CollisionGroups::PICKUP)
                    .unwrap()
                    .as_sensor(),
            )
            .unwrap();

        physics.step(&mut store, DT).unwrap();

        assert_eq!(position(&store, player), Vec2::ZERO);
        assert_eq!(physics.contacts(player).unwrap().intersecting, vec![coin]);
        assert_eq!(physics.contacts(coin).unwrap().intersecting, vec![player]);
    }

    #[test]
    fn test_filtered_pairs_are_ignored() {
        let mut store = ComponentStore::new();
        let mut physics = PhysicsEngine::new();
        let a = spawn_body(&mut store, 0.0, 0.0, 1.0, CollisionGroups::PLAYER);
        let b = spawn_body(&mut store, 5.0, 0.0, 1.0, CollisionGroups::PLAYER);

        physics.step(&mut store, DT).unwrap();

        assert_eq!(position(&store, a), Vec2::ZERO);
        assert_eq!(position(&store, b), Vec2::new(5.0, 0.0));
        assert!(physics.contacts(a).unwrap().is_empty());
    }

    #[test]
    fn test_collider_without_position_fails() {
        let mut store = ComponentStore::new();
        let mut physics = PhysicsEngine::new();
        let e = store.create_entity();
        store
            .add(e, PhysicsCollider::new(Shape::rect(1.0, 1.0), CollisionGroups::GROUND).unwrap())
            .unwrap();

        let err = physics.step(&mut store, DT).unwrap_err();
        assert!(matches!(err, Error::ComponentNotFound { kind: ComponentKind::Position, .. }));
    }

    #[test]
    fn test_invalid_gravity_and_dt() {
        let mut physics = PhysicsEngine::new();
        assert!(physics.set_gravity(Vec2::new(0.0, f32::NAN)).is_err());
        assert_eq!(physics.gravity(), Vec2::ZERO);
        assert!(physics.step(&mut ComponentStore::new(), -1.0).is_err());
    }
}
