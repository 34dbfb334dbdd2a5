//! Collision shapes and axis-aligned boxes

use macroquad::math::Vec2;

use crate::error::{Error, Result};

/// An axis-aligned rectangle, centered on the collider origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeRect {
    pub width: f32,
    pub height: f32,
}

/// Collision geometry of a `PhysicsCollider`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Rect(ShapeRect),
}

impl Shape {
    pub fn rect(width: f32, height: f32) -> Self {
        Shape::Rect(ShapeRect { width, height })
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            Shape::Rect(ShapeRect { width, height }) => {
                let valid = |v: f32| v.is_finite() && v > 0.0;
                if valid(*width) && valid(*height) {
                    Ok(())
                } else {
                    Err(Error::InvalidPhysicsConfig(format!(
                        "rectangle shape must have a positive finite size, got {}x{}",
                        width, height
                    )))
                }
            }
        }
    }

    pub fn half_extents(&self) -> Vec2 {
        match self {
            Shape::Rect(rect) => Vec2::new(rect.width * 0.5, rect.height * 0.5),
        }
    }

    /// Bounding box of the shape centered on `center`.
    pub fn aabb(&self, center: Vec2) -> Aabb {
        Aabb::from_center(center, self.half_extents())
    }
}

/// A world-space axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Overlap depth on each axis. Negative values are the gap between the
    /// boxes on that axis.
    pub fn overlap(&self, other: &Aabb) -> Vec2 {
        Vec2::new(
            self.max.x.min(other.max.x) - self.min.x.max(other.min.x),
            self.max.y.min(other.max.y) - self.min.y.max(other.min.y),
        )
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        let overlap = self.overlap(other);
        overlap.x > 0.0 && overlap.y > 0.0
    }
}
