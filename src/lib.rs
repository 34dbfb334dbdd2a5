//! autogamer: a small 2D platformer runtime
//!
//! Levels are built from tile maps into a component store, simulated by an
//! AABB physics engine and platformer controls, followed by a clamped
//! camera, and drawn through a backend-independent renderer. A `Game` runs
//! one `Screen` at a time on a `Platform` (macroquad in the demo binary).
//!
//! World coordinates are in pixels with y pointing up; screen coordinates
//! have y pointing down.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod assets;
pub mod config;
pub mod ecs;
pub mod error;
pub mod event;
pub mod game;
pub mod geometry;
pub mod level;
pub mod physics;
pub mod platform;
pub mod render;
pub mod screen;
pub mod systems;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;

pub use assets::{CharacterSpritesheet, TileMap};
pub use config::GameConfig;
pub use ecs::{ComponentStore, Entity};
pub use error::{Error, Result};
pub use event::{Event, EventKind, EventStream, Key, Modifiers};
pub use game::Game;
pub use geometry::{Anchor, Rect};
pub use level::Level;
pub use physics::{CollisionGroups, PhysicsEngine};
pub use platform::{MacroquadPlatform, Platform};
pub use render::{MacroquadRenderer, Renderer};
pub use screen::{BlankScreen, EventLoopControl, LevelScreen, Screen, ScreenContext};
pub use ui::Hud;
