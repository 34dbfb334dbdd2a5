//! Drawing interface
//!
//! Everything in the runtime draws through `Renderer`, in screen pixels with
//! y growing downward. `MacroquadRenderer` is the real backend; tests use a
//! recording renderer instead.

mod macroquad_backend;

pub use macroquad_backend::MacroquadRenderer;

use macroquad::color::Color;

use crate::ecs::Sprite;
use crate::error::Result;
use crate::geometry::Rect;

/// Measured extent of a line of text.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextSize {
    pub width: f32,
    pub height: f32,
    /// Distance from the top of the text box to the baseline
    pub offset_y: f32,
}

pub trait Renderer {
    /// Size of the render target in pixels.
    fn size(&self) -> (f32, f32);

    fn clear(&mut self, color: Color);

    fn draw_rect(&mut self, rect: Rect, color: Color);

    /// Draws `sprite.region` of its texture stretched over `dest`.
    fn draw_sprite(&mut self, sprite: &Sprite, dest: Rect) -> Result<()>;

    /// Draws text with its top-left corner at `(x, y)`.
    fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: u16, color: Color);

    fn measure_text(&mut self, text: &str, font_size: u16) -> TextSize;
}
