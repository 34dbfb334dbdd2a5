//! Physics components

use macroquad::math::Vec2;

use super::groups::CollisionGroups;
use super::shape::{Aabb, Shape};
use crate::error::{Error, Result};

/// A dynamic body. Together with a `PhysicsCollider` it makes an entity move
/// under gravity and get pushed out of whatever it collides with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsBody {
    mass: f32,
    pub velocity: Vec2,
}

impl PhysicsBody {
    /// Fails with `InvalidPhysicsConfig` unless `mass` is finite and
    /// strictly positive.
    pub fn new(mass: f32) -> Result<Self> {
        if !mass.is_finite() || mass <= 0.0 {
            return Err(Error::InvalidPhysicsConfig(format!(
                "mass must be strictly positive, got {}",
                mass
            )));
        }
        Ok(Self {
            mass,
            velocity: Vec2::ZERO,
        })
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn inverse_mass(&self) -> f32 {
        1.0 / self.mass
    }
}

/// Collision geometry attached to an entity, relative to its `Position`.
///
/// Without a `PhysicsBody` the collider is static geometry and never moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsCollider {
    shape: Shape,
    pub collision_groups: CollisionGroups,
    pub offset: Vec2,
    /// Sensors report overlaps but never block
    pub sensor: bool,
}

impl PhysicsCollider {
    pub fn new(shape: Shape, collision_groups: CollisionGroups) -> Result<Self> {
        shape.validate()?;
        Ok(Self {
            shape,
            collision_groups,
            offset: Vec2::ZERO,
            sensor: false,
        })
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn as_sensor(mut self) -> Self {
        self.sensor = true;
        self
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// World-space box of this collider for an entity at `position`.
    pub fn aabb(&self, position: Vec2) -> Aabb {
        self.shape.aabb(position + self.offset)
    }
}
