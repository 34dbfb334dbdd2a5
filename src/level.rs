//! Levels
//!
//! A `Level` owns everything one playable map needs: the component store,
//! the physics engine, the viewport and the systems' state. Screens drive
//! it with `update` once per frame and then `draw` it.

use log::{debug, info};
use macroquad::color::Color;
use macroquad::math::Vec2;

use crate::assets::TileMap;
use crate::ecs::{ComponentStore, Currency, Entity, Player, Position, Sprite};
use crate::error::{Error, Result};
use crate::event::{EventKind, EventStream, Key, KeyBindings, KeySignature, Modifiers};
use crate::geometry::Rect;
use crate::physics::{CollisionGroups, PhysicsBody, PhysicsCollider, PhysicsEngine, Shape};
use crate::render::Renderer;
use crate::screen::EventLoopControl;
use crate::systems::{collect_currency, update_camera, ControlSystem, Viewport, DEBUG_PAN_STEP};

/// Viewport size of a fresh level, in world units
pub const DEFAULT_VIEWPORT: (f32, f32) = (640.0, 480.0);

const BACKGROUND_COLOR: Color = Color::new(0.0, 0.0, 0.0, 1.0);
const GROUND_COLOR: Color = Color::new(0.35, 0.27, 0.2, 1.0);
const PLAYER_COLOR: Color = Color::new(0.2, 0.6, 0.95, 1.0);
const ENEMY_COLOR: Color = Color::new(0.9, 0.25, 0.25, 1.0);
const PICKUP_COLOR: Color = Color::new(0.98, 0.8, 0.2, 1.0);

pub struct Level {
    store: ComponentStore,
    physics: PhysicsEngine,
    viewport: Viewport,
    tile_map: Option<TileMap>,
    /// World-space centers and sprites of the map's tiles, when it has a tileset
    tile_sprites: Vec<(Vec2, Sprite)>,
    /// Where players are placed, from the map's `P` tile
    level_start: Vec2,
    controls: ControlSystem,
    bindings: KeyBindings<Level>,
    paused: bool,
    /// Total currency collected since the level was created
    collected: u32,
}

impl Level {
    pub fn new() -> Self {
        Self {
            store: ComponentStore::new(),
            physics: PhysicsEngine::new(),
            viewport: Viewport::new(DEFAULT_VIEWPORT.0, DEFAULT_VIEWPORT.1),
            tile_map: None,
            tile_sprites: Vec::new(),
            level_start: Vec2::ZERO,
            controls: ControlSystem::new(),
            bindings: KeyBindings::new(),
            paused: false,
            collected: 0,
        }
    }

    /// Populates the level from a tile map. May only be called once.
    ///
    /// Solid tiles become static ground colliders, coins become currency
    /// sensors, and existing players move to the map's start tile.
    pub fn load(&mut self, map: TileMap) -> Result<()> {
        if self.tile_map.is_some() {
            return Err(Error::LevelAlreadyLoaded);
        }

        let runs = map.solid_runs();
        for run in &runs {
            let ground = self.store.create_entity();
            self.store.add(ground, Position::from(run.center))?;
            self.store.add(
                ground,
                PhysicsCollider::new(Shape::rect(run.size.x, run.size.y), CollisionGroups::GROUND)?,
            )?;
        }

        let coins = map.coins();
        let (coin_w, coin_h) = (map.tile_width() as f32 * 0.5, map.tile_height() as f32 * 0.5);
        for &center in &coins {
            let coin = self.store.create_entity();
            self.store.add(coin, Position::from(center))?;
            self.store.add(coin, Currency::new(map.currency_value()))?;
            self.store.add(
                coin,
                PhysicsCollider::new(Shape::rect(coin_w, coin_h), CollisionGroups::PICKUP)?.as_sensor(),
            )?;
        }

        if let Some(start) = map.player_start() {
            self.level_start = start;
            for player in self.store.entities_with::<Player>() {
                self.store.get_mut::<Position>(player)?.set(start);
            }
        }

        info!(
            "loaded level {}: {}x{} tiles, {} ground colliders, {} coins",
            map.path().map_or_else(|| "<memory>".to_string(), |p| p.display().to_string()),
            map.cols(),
            map.rows(),
            runs.len(),
            coins.len()
        );
        self.tile_sprites = map.tile_sprites();
        self.tile_map = Some(map);
        Ok(())
    }

    /// Creates an entity tagged `Player`, positioned at the level start.
    pub fn add_player(&mut self) -> Result<Entity> {
        let player = self.store.create_entity();
        self.store.add(player, Player)?;
        self.store.add(player, Position::from(self.level_start))?;
        debug!("added player {} at {}", player, self.level_start);
        Ok(player)
    }

    pub fn store(&self) -> &ComponentStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ComponentStore {
        &mut self.store
    }

    pub fn physics(&self) -> &PhysicsEngine {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsEngine {
        &mut self.physics
    }

    pub fn gravity(&self) -> Vec2 {
        self.physics.gravity()
    }

    pub fn set_gravity(&mut self, gravity: Vec2) -> Result<()> {
        self.physics.set_gravity(gravity)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Size of the visible world area. Both sizes must be finite and
    /// strictly positive.
    pub fn set_viewport_dimensions(&mut self, width: f32, height: f32) -> Result<()> {
        self.viewport.set_dimensions(width, height)
    }

    pub fn tile_map(&self) -> Option<&TileMap> {
        self.tile_map.as_ref()
    }

    pub fn level_start(&self) -> Vec2 {
        self.level_start
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// A paused level still dispatches key bindings but does not simulate.
    pub fn set_paused(&mut self, paused: bool) {
        if paused != self.paused {
            info!("level {}", if paused { "paused" } else { "resumed" });
        }
        self.paused = paused;
    }

    pub fn toggle_paused(&mut self) {
        self.set_paused(!self.paused);
    }

    /// Currency collected by any wallet in this level so far.
    pub fn collected_currency(&self) -> u32 {
        self.collected
    }

    /// Runs `handler` whenever `key` is pressed, before the systems see it.
    pub fn on_key_pressed<F>(&mut self, key: impl Into<KeySignature>, handler: F)
    where
        F: FnMut(&mut Level) -> Option<EventLoopControl> + 'static,
    {
        self.bindings.on_key_pressed(key, handler);
    }

    /// Advances the level by one frame.
    ///
    /// Order: key bindings, debug camera controls, platformer controls,
    /// physics, currency, camera, despawn flush.
    pub fn update(&mut self, events: &mut EventStream, dt: f32) -> Result<Option<EventLoopControl>> {
        // Handlers get `&mut Level`, so the table is moved out while they run
        let mut bindings = std::mem::take(&mut self.bindings);
        let control = bindings.dispatch(self, events);
        let added = std::mem::replace(&mut self.bindings, bindings);
        self.bindings.extend(added);

        self.handle_debug_controls(events);
        self.controls.handle_events(events);

        if self.paused {
            self.controls.cancel_jump();
            return Ok(control);
        }

        self.controls.run(&mut self.store, &self.physics)?;
        self.physics.step(&mut self.store, dt)?;
        let gained = collect_currency(&mut self.store, &self.physics)?;
        self.collected = self.collected.saturating_add(gained);
        let map_size = self.tile_map.as_ref().map(TileMap::size);
        update_camera(&self.store, &mut self.viewport, map_size)?;
        self.store.flush_despawns();

        Ok(control)
    }

    /// Ctrl+arrow pans the camera, Ctrl+0 resets it.
    fn handle_debug_controls(&mut self, events: &mut EventStream) {
        for event in events.iter_mut() {
            let EventKind::KeyDown { key, modifiers, .. } = event.kind else {
                continue;
            };
            if modifiers != Modifiers::CTRL {
                continue;
            }
            let delta = match key {
                Key::Up => Vec2::new(0.0, DEBUG_PAN_STEP),
                Key::Down => Vec2::new(0.0, -DEBUG_PAN_STEP),
                Key::Left => Vec2::new(-DEBUG_PAN_STEP, 0.0),
                Key::Right => Vec2::new(DEBUG_PAN_STEP, 0.0),
                Key::Num0 => {
                    self.viewport.reset_pan();
                    event.stop_propagation();
                    continue;
                }
                _ => continue,
            };
            self.viewport.pan_by(delta);
            debug!("debug camera pan now {}", self.viewport.pan());
            event.stop_propagation();
        }
    }

    /// Draws the level scaled so the viewport fills the render target.
    ///
    /// Map tiles come first when the map has a tileset. Colliders without a
    /// sprite are drawn as flat rectangles colored by collision group, except
    /// static ground already covered by tiles. Entities with a `Sprite` are
    /// drawn last, by draw order, then creation order.
    pub fn draw(&self, renderer: &mut dyn Renderer) -> Result<()> {
        let (sw, sh) = renderer.size();
        let screen = Vec2::new(sw, sh);
        let scale = self.viewport.scale(screen);
        let on_screen = |r: &Rect| r.right() >= 0.0 && r.x <= sw && r.bottom() >= 0.0 && r.y <= sh;

        let background = self
            .tile_map
            .as_ref()
            .and_then(TileMap::background)
            .unwrap_or(BACKGROUND_COLOR);
        renderer.clear(background);

        for (center, sprite) in &self.tile_sprites {
            let anchor_point = self.viewport.world_to_screen(*center, screen);
            let size = sprite.size * scale;
            let dest = Rect::anchored(anchor_point, size.x, size.y, sprite.anchor);
            if on_screen(&dest) {
                renderer.draw_sprite(sprite, dest)?;
            }
        }

        let tiles_drawn = !self.tile_sprites.is_empty();
        for (entity, collider) in self.store.iter::<PhysicsCollider>() {
            if self.store.try_get::<Sprite>(entity).is_some() {
                continue;
            }
            let static_ground = collider.collision_groups == CollisionGroups::GROUND
                && self.store.try_get::<PhysicsBody>(entity).is_none();
            if tiles_drawn && static_ground {
                continue;
            }
            let Some(position) = self.store.try_get::<Position>(entity) else {
                continue;
            };
            let aabb = collider.aabb(position.as_vec2());
            let top_left = self.viewport.world_to_screen(Vec2::new(aabb.min.x, aabb.max.y), screen);
            let size = aabb.size() * scale;
            let rect = Rect::new(top_left.x, top_left.y, size.x, size.y);
            if on_screen(&rect) {
                renderer.draw_rect(rect, group_color(collider.collision_groups));
            }
        }

        let mut sprites: Vec<(u8, u64, Entity)> = self
            .store
            .iter::<Sprite>()
            .filter_map(|(entity, sprite)| {
                let order = self.store.creation_order(entity)?;
                Some((sprite.draw_order, order, entity))
            })
            .collect();
        sprites.sort_unstable();

        for (_, _, entity) in sprites {
            let (Some(sprite), Some(position)) =
                (self.store.try_get::<Sprite>(entity), self.store.try_get::<Position>(entity))
            else {
                continue;
            };
            let anchor_point = self.viewport.world_to_screen(position.as_vec2(), screen);
            let size = sprite.size * scale;
            let dest = Rect::anchored(anchor_point, size.x, size.y, sprite.anchor);
            if on_screen(&dest) {
                renderer.draw_sprite(sprite, dest)?;
            }
        }
        Ok(())
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Level")
            .field("entities", &self.store.entity_count())
            .field("gravity", &self.physics.gravity())
            .field("viewport", &self.viewport)
            .field("level_start", &self.level_start)
            .field("paused", &self.paused)
            .finish()
    }
}

fn group_color(groups: CollisionGroups) -> Color {
    if groups.contains(CollisionGroups::PLAYER) {
        PLAYER_COLOR
    } else if groups.contains(CollisionGroups::ENEMY) {
        ENEMY_COLOR
    } else if groups.contains(CollisionGroups::PICKUP) {
        PICKUP_COLOR
    } else {
        GROUND_COLOR
    }
}
