//! Gameplay components
//!
//! Plain data attached to entities. Behaviour lives in the systems; the only
//! logic here is validation and small helpers. The physics components live
//! in `crate::physics` next to the code that interprets them.

use std::collections::BTreeMap;
use std::path::PathBuf;

use macroquad::math::Vec2;

use crate::geometry::{Anchor, Rect};

/// The position of an entity in world coordinates (y points up).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn set(&mut self, pos: Vec2) {
        self.x = pos.x;
        self.y = pos.y;
    }
}

impl From<Vec2> for Position {
    fn from(pos: Vec2) -> Self {
        Self::new(pos.x, pos.y)
    }
}

/// Marks an entity as one of the players of the game.
///
/// Added automatically by `Level::add_player`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Player;

/// The viewport centers itself on the entity holding this marker.
///
/// At most one entity per store may hold it; a second `add` is rejected with
/// `Error::AmbiguousViewportTarget`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ViewportTarget;

/// Responds to the arrow keys by setting the velocity of the entity's
/// `PhysicsBody`.
///
/// `left_velocity` and `right_velocity` are speeds (the sign is applied by
/// the control system). `jump_velocity` is the upward vertical velocity set
/// when a jump starts on the ground.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlatformerControls {
    pub left_velocity: f32,
    pub right_velocity: f32,
    pub jump_velocity: f32,
    /// Replaces both `left_velocity` and `right_velocity` when set
    pub horizontal_velocity: Option<f32>,
    /// Air control: fraction of each horizontal velocity change applied
    /// while airborne
    pub midair_horizontal_multiplier: Option<f32>,
}

impl PlatformerControls {
    pub fn new(left_velocity: f32, right_velocity: f32, jump_velocity: f32) -> Self {
        Self {
            left_velocity,
            right_velocity,
            jump_velocity,
            ..Self::default()
        }
    }

    pub fn with_horizontal_velocity(mut self, velocity: f32) -> Self {
        self.horizontal_velocity = Some(velocity);
        self
    }

    pub fn with_midair_multiplier(mut self, multiplier: f32) -> Self {
        self.midair_horizontal_multiplier = Some(multiplier);
        self
    }

    pub fn left_speed(&self) -> f32 {
        self.horizontal_velocity.unwrap_or(self.left_velocity)
    }

    pub fn right_speed(&self) -> f32 {
        self.horizontal_velocity.unwrap_or(self.right_velocity)
    }
}

/// The health of an entity. Never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Health {
    pub value: u32,
}

impl Health {
    pub fn new(value: u32) -> Self {
        Self { value }
    }

    /// Returns true if this hit brought health to zero.
    pub fn damage(&mut self, amount: u32) -> bool {
        self.value = self.value.saturating_sub(amount);
        self.value == 0
    }

    pub fn heal(&mut self, amount: u32) {
        self.value = self.value.saturating_add(amount);
    }

    pub fn is_dead(&self) -> bool {
        self.value == 0
    }
}

/// Collected currency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Wallet {
    pub value: u32,
}

impl Wallet {
    pub fn new(value: u32) -> Self {
        Self { value }
    }
}

/// A pickup worth `value`, collected by any `Wallet` entity that touches it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Currency {
    pub value: u32,
}

impl Currency {
    pub fn new(value: u32) -> Self {
        Self { value }
    }
}

/// An image region drawn at the entity's position.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    /// Path of the texture; the renderer caches textures by path
    pub texture: PathBuf,
    /// Source region in texture pixels
    pub region: Rect,
    /// Size of the sprite in world units
    pub size: Vec2,
    /// Which point of the sprite sits on the entity position
    pub anchor: Anchor,
    /// Higher values are drawn later (on top)
    pub draw_order: u8,
}

/// Draw order of sprites attached to characters
pub const CHARACTER_DRAW_ORDER: u8 = 2;

/// The named poses of a character, derived from a `CharacterSpritesheet`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharacterSprites {
    pub poses: BTreeMap<String, Sprite>,
    pub animations: BTreeMap<String, Vec<(Sprite, u32)>>,
}

impl CharacterSprites {
    /// Pose used when nothing else is going on
    pub const DEFAULT_POSE: &'static str = "idle";

    /// The `idle` pose, or the first pose by name if there is none.
    pub fn default_sprite(&self) -> Option<Sprite> {
        self.poses
            .get(Self::DEFAULT_POSE)
            .or_else(|| self.poses.values().next())
            .cloned()
    }

    pub fn pose(&self, name: &str) -> Option<&Sprite> {
        self.poses.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_never_goes_negative() {
        let mut health = Health::new(3);
        assert!(!health.damage(2));
        assert!(health.damage(10));
        assert_eq!(health.value, 0);
        assert!(health.is_dead());
    }

    #[test]
    fn test_horizontal_velocity_overrides_both_directions() {
        let controls = PlatformerControls::new(3.0, 4.0, 10.0).with_horizontal_velocity(6.0);
        assert_eq!(controls.left_speed(), 6.0);
        assert_eq!(controls.right_speed(), 6.0);

        let plain = PlatformerControls::new(3.0, 4.0, 10.0);
        assert_eq!(plain.left_speed(), 3.0);
        assert_eq!(plain.right_speed(), 4.0);
    }

    #[test]
    fn test_default_sprite_prefers_idle() {
        let sprite = |x: f32| Sprite {
            texture: PathBuf::from("hero.png"),
            region: Rect::new(x, 0.0, 16.0, 16.0),
            size: Vec2::new(16.0, 16.0),
            anchor: Anchor::S,
            draw_order: CHARACTER_DRAW_ORDER,
        };

        let mut sprites = CharacterSprites::default();
        assert_eq!(sprites.default_sprite(), None);

        sprites.poses.insert("attack".to_string(), sprite(0.0));
        assert_eq!(sprites.default_sprite().map(|s| s.region.x), Some(0.0));

        sprites.poses.insert("idle".to_string(), sprite(16.0));
        assert_eq!(sprites.default_sprite().map(|s| s.region.x), Some(16.0));
    }
}
