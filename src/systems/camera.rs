//! Viewport and camera follow
//!
//! The viewport is the rectangle of world space shown on screen. Every
//! frame the camera centers it on the `ViewportTarget` entity, clamped to
//! the tile map unless clamping is turned off.

use log::warn;
use macroquad::math::Vec2;

use crate::ecs::{ComponentStore, Position, ViewportTarget};
use crate::error::{Error, Result};
use crate::physics::Aabb;

/// World units moved per debug camera key press
pub const DEBUG_PAN_STEP: f32 = 35.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: f32,
    height: f32,
    /// Camera position in world space, before the debug pan
    center: Vec2,
    /// Offset applied by the debug camera controls
    pan: Vec2,
    clamp_to_map: bool,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            center: Vec2::new(width * 0.5, height * 0.5),
            pan: Vec2::ZERO,
            clamp_to_map: true,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Fails with `InvalidViewport` unless both sizes are finite and
    /// strictly positive; the viewport is left unchanged then.
    pub fn set_dimensions(&mut self, width: f32, height: f32) -> Result<()> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) {
            return Err(Error::InvalidViewport { width, height });
        }
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.center = center;
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    pub fn reset_pan(&mut self) {
        self.pan = Vec2::ZERO;
    }

    pub fn clamps_to_map(&self) -> bool {
        self.clamp_to_map
    }

    pub fn set_clamp_to_map(&mut self, clamp: bool) {
        self.clamp_to_map = clamp;
    }

    /// The visible world rectangle, debug pan included.
    pub fn visible(&self) -> Aabb {
        Aabb::from_center(self.center + self.pan, self.size() * 0.5)
    }

    /// Maps a world point to screen pixels for a target of `screen` size.
    /// World y points up, screen y points down.
    pub fn world_to_screen(&self, world: Vec2, screen: Vec2) -> Vec2 {
        let visible = self.visible();
        let scale = self.scale(screen);
        Vec2::new(
            (world.x - visible.min.x) * scale.x,
            (visible.max.y - world.y) * scale.y,
        )
    }

    /// Screen pixels per world unit on each axis.
    pub fn scale(&self, screen: Vec2) -> Vec2 {
        Vec2::new(screen.x / self.width, screen.y / self.height)
    }
}

/// Centers `viewport` on the viewport target, if there is one.
///
/// `map_size` is the pixel size of the tile map, whose bottom-left corner
/// sits at the world origin.
pub fn update_camera(store: &ComponentStore, viewport: &mut Viewport, map_size: Option<Vec2>) -> Result<()> {
    let mut targets = store.entities_with::<ViewportTarget>();
    if targets.is_empty() {
        return Ok(());
    }
    if targets.len() > 1 {
        targets.sort_by_key(|&e| store.creation_order(e));
        warn!(
            "{} entities hold ViewportTarget, following the earliest created ({})",
            targets.len(),
            targets[0]
        );
    }

    let target = store.get::<Position>(targets[0])?.as_vec2();
    let center = match map_size {
        Some(map) if viewport.clamp_to_map => Vec2::new(
            clamp_axis(target.x, viewport.width, map.x),
            clamp_axis(target.y, viewport.height, map.y),
        ),
        _ => target,
    };
    viewport.set_center(center);
    Ok(())
}

fn clamp_axis(target: f32, view: f32, map: f32) -> f32 {
    if map <= view {
        map * 0.5
    } else {
        target.clamp(view * 0.5, map - view * 0.5)
    }
}
