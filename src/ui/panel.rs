//! Filled rectangle widget

use std::any::Any;

use macroquad::color::Color;
use macroquad::math::Vec2;

use super::theme::PANEL_BG;
use super::widget::Widget;
use crate::error::Result;
use crate::geometry::{Anchor, Rect};
use crate::render::Renderer;

/// A flat backdrop, typically placed behind other HUD widgets.
#[derive(Debug, Clone)]
pub struct Panel {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub anchor: Anchor,
    pub color: Color,
}

impl Panel {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            anchor: Anchor::NW,
            color: PANEL_BG,
        }
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn rect(&self) -> Rect {
        Rect::anchored(Vec2::new(self.x, self.y), self.width, self.height, self.anchor)
    }
}

impl Widget for Panel {
    fn draw(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        renderer.draw_rect(self.rect(), self.color);
        Ok(())
    }

    fn bounds(&mut self, _renderer: &mut dyn Renderer) -> Rect {
        self.rect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
