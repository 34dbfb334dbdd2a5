//! Rectangles and anchors
//!
//! `Rect` is in screen space (y grows downward) unless a caller says
//! otherwise. World-space boxes used by the physics live in
//! `crate::physics::Aabb`.

use macroquad::math::Vec2;

/// A rectangle defined by position and size
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Places a `w` x `h` rectangle so that its `anchor` point sits on `pos`.
    pub fn anchored(pos: Vec2, w: f32, h: f32, anchor: Anchor) -> Self {
        let (fx, fy) = anchor.factors();
        Self::new(pos.x - w * fx, pos.y - h * fy, w, h)
    }

    /// Right edge
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Bottom edge
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Check if point is inside
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// The point of a rectangle that is pinned to its position.
///
/// Compass names refer to screen orientation: `N` is the middle of the top
/// edge, `SW` the bottom-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Anchor {
    N,
    S,
    E,
    W,
    NE,
    SE,
    SW,
    #[default]
    NW,
    Center,
}

impl Anchor {
    /// Fraction of the width and height between the top-left corner and
    /// the anchor point.
    pub fn factors(self) -> (f32, f32) {
        match self {
            Anchor::NW => (0.0, 0.0),
            Anchor::N => (0.5, 0.0),
            Anchor::NE => (1.0, 0.0),
            Anchor::W => (0.0, 0.5),
            Anchor::Center => (0.5, 0.5),
            Anchor::E => (1.0, 0.5),
            Anchor::SW => (0.0, 1.0),
            Anchor::S => (0.5, 1.0),
            Anchor::SE => (1.0, 1.0),
        }
    }
}
