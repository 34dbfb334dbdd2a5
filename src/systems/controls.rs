//! Platformer controls
//!
//! Keeps track of which movement keys are held and turns that into
//! velocities for every entity with `PlatformerControls`. Runs before the
//! physics step, so "grounded" means grounded during the previous step.

use macroquad::math::Vec2;

use crate::ecs::{ComponentStore, PlatformerControls, Position};
use crate::event::{EventKind, EventStream, Key};
use crate::physics::{PhysicsBody, PhysicsEngine};
use crate::error::Result;

const LEFT_KEYS: [Key; 2] = [Key::Left, Key::A];
const RIGHT_KEYS: [Key; 2] = [Key::Right, Key::D];
const JUMP_KEYS: [Key; 3] = [Key::Space, Key::Up, Key::W];

/// Held-key state for the platformer controls.
#[derive(Debug, Clone, Default)]
pub struct ControlSystem {
    /// Which of `LEFT_KEYS` are held
    left: [bool; 2],
    /// Which of `RIGHT_KEYS` are held
    right: [bool; 2],
    /// A jump key went down this frame
    jump_requested: bool,
}

impl ControlSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn left_pressed(&self) -> bool {
        self.left.iter().any(|&held| held)
    }

    pub fn right_pressed(&self) -> bool {
        self.right.iter().any(|&held| held)
    }

    /// Updates the held-key state from this frame's events. Events are
    /// observed, not consumed.
    pub fn handle_events(&mut self, events: &EventStream) {
        for event in events.iter() {
            match event.kind {
                EventKind::KeyDown { repeat: true, .. } => {}
                EventKind::KeyDown { key, .. } => {
                    set_held(&LEFT_KEYS, &mut self.left, key, true);
                    set_held(&RIGHT_KEYS, &mut self.right, key, true);
                    if JUMP_KEYS.contains(&key) {
                        self.jump_requested = true;
                    }
                }
                EventKind::KeyUp { key, .. } => {
                    set_held(&LEFT_KEYS, &mut self.left, key, false);
                    set_held(&RIGHT_KEYS, &mut self.right, key, false);
                }
                _ => {}
            }
        }
    }

    /// Drops a pending jump, so a press made while paused does not fire
    /// on resume.
    pub fn cancel_jump(&mut self) {
        self.jump_requested = false;
    }

    /// Applies the current key state to every controlled entity.
    pub fn run(&mut self, store: &mut ComponentStore, physics: &PhysicsEngine) -> Result<()> {
        let jump = std::mem::take(&mut self.jump_requested);
        let (left, right) = (self.left_pressed(), self.right_pressed());

        for entity in store.entities_with::<PlatformerControls>() {
            let controls = *store.get::<PlatformerControls>(entity)?;
            // Controlled entities must be placed in the world
            store.get::<Position>(entity)?;
            let grounded = physics.is_grounded(store, entity);
            let body = store.get_mut::<PhysicsBody>(entity)?;

            let target = match (left, right) {
                (true, false) => -controls.left_speed(),
                (false, true) => controls.right_speed(),
                _ => 0.0,
            };
            body.velocity = Vec2::new(
                match controls.midair_horizontal_multiplier {
                    Some(m) if !grounded => body.velocity.x + (target - body.velocity.x) * m,
                    _ => target,
                },
                if jump && grounded {
                    controls.jump_velocity
                } else {
                    body.velocity.y
                },
            );
        }
        Ok(())
    }
}

fn set_held(keys: &[Key; 2], held: &mut [bool; 2], key: Key, state: bool) {
    if let Some(i) = keys.iter().position(|&k| k == key) {
        held[i] = state;
    }
}
