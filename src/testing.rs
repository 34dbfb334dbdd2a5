//! Headless stand-ins for the renderer and platform

use std::collections::VecDeque;
use std::path::PathBuf;

use macroquad::color::Color;

use crate::ecs::Sprite;
use crate::error::Result;
use crate::event::Event;
use crate::geometry::Rect;
use crate::platform::Platform;
use crate::render::{Renderer, TextSize};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear(Color),
    Rect(Rect, Color),
    Sprite(PathBuf, Rect),
    Text {
        text: String,
        x: f32,
        y: f32,
        font_size: u16,
        color: Color,
    },
}

/// Records draw calls instead of drawing. Text is measured as half the
/// font size per character.
#[derive(Debug)]
pub struct RecordingRenderer {
    pub width: f32,
    pub height: f32,
    pub calls: Vec<DrawCall>,
    pub measure_calls: usize,
}

impl RecordingRenderer {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
            measure_calls: 0,
        }
    }

    pub fn text_width(text: &str, font_size: u16) -> f32 {
        text.chars().count() as f32 * font_size as f32 * 0.5
    }
}

impl Renderer for RecordingRenderer {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Color) {
        self.calls.push(DrawCall::Clear(color));
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) {
        self.calls.push(DrawCall::Rect(rect, color));
    }

    fn draw_sprite(&mut self, sprite: &Sprite, dest: Rect) -> Result<()> {
        self.calls.push(DrawCall::Sprite(sprite.texture.clone(), dest));
        Ok(())
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: u16, color: Color) {
        self.calls.push(DrawCall::Text {
            text: text.to_string(),
            x,
            y,
            font_size,
            color,
        });
    }

    fn measure_text(&mut self, text: &str, font_size: u16) -> TextSize {
        self.measure_calls += 1;
        TextSize {
            width: Self::text_width(text, font_size),
            height: font_size as f32,
            offset_y: font_size as f32 * 0.8,
        }
    }
}

/// Replays one batch of events per frame; frames past the script are empty.
pub struct ScriptedPlatform {
    frames: VecDeque<Vec<Event>>,
    pub renderer: RecordingRenderer,
    pub frames_waited: usize,
}

impl ScriptedPlatform {
    pub fn new(frames: Vec<Vec<Event>>) -> Self {
        Self {
            frames: frames.into(),
            renderer: RecordingRenderer::new(640.0, 480.0),
            frames_waited: 0,
        }
    }
}

impl Platform for ScriptedPlatform {
    fn poll_events(&mut self) -> Vec<Event> {
        self.frames.pop_front().unwrap_or_default()
    }

    fn renderer(&mut self) -> &mut dyn Renderer {
        &mut self.renderer
    }

    async fn next_frame(&mut self) {
        self.frames_waited += 1;
    }
}
