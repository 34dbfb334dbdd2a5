//! Text widget with lazily measured size

use std::any::Any;

use macroquad::color::Color;
use macroquad::math::Vec2;

use super::theme::{FONT_SIZE_CONTENT, TEXT_COLOR};
use super::widget::Widget;
use crate::error::Result;
use crate::geometry::{Anchor, Rect};
use crate::render::{Renderer, TextSize};

/// A line of text anchored at `(x, y)`.
///
/// Its size is only known after measuring it with a renderer. The result is
/// cached until the content or font size changes.
#[derive(Debug, Clone)]
pub struct Text {
    content: String,
    x: f32,
    y: f32,
    anchor: Anchor,
    font_size: u16,
    color: Color,
    measured: Option<TextSize>,
}

impl Text {
    pub fn new(content: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            content: content.into(),
            x,
            y,
            anchor: Anchor::NW,
            font_size: FONT_SIZE_CONTENT,
            color: TEXT_COLOR,
            measured: None,
        }
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_font_size(mut self, font_size: u16) -> Self {
        self.set_font_size(font_size);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn text(&self) -> &str {
        &self.content
    }

    pub fn set_text(&mut self, content: impl Into<String>) {
        let content = content.into();
        if content != self.content {
            self.content = content;
            self.measured = None;
        }
    }

    pub fn font_size(&self) -> u16 {
        self.font_size
    }

    pub fn set_font_size(&mut self, font_size: u16) {
        if font_size != self.font_size {
            self.font_size = font_size;
            self.measured = None;
        }
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: Anchor) {
        self.anchor = anchor;
    }

    /// Whether a measurement is cached.
    pub fn is_measured(&self) -> bool {
        self.measured.is_some()
    }

    pub fn measure(&mut self, renderer: &mut dyn Renderer) -> TextSize {
        match self.measured {
            Some(size) => size,
            None => {
                let size = renderer.measure_text(&self.content, self.font_size);
                self.measured = Some(size);
                size
            }
        }
    }

    pub fn width(&mut self, renderer: &mut dyn Renderer) -> f32 {
        self.measure(renderer).width
    }

    pub fn height(&mut self, renderer: &mut dyn Renderer) -> f32 {
        self.measure(renderer).height
    }
}

impl Widget for Text {
    fn draw(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        let bounds = self.bounds(renderer);
        renderer.draw_text(&self.content, bounds.x, bounds.y, self.font_size, self.color);
        Ok(())
    }

    fn bounds(&mut self, renderer: &mut dyn Renderer) -> Rect {
        let size = self.measure(renderer);
        Rect::anchored(self.position(), size.width, size.height, self.anchor)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
