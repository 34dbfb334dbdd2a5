//! Renderer backed by macroquad's immediate-mode drawing

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::info;
use macroquad::prelude::{
    clear_background, draw_rectangle, draw_text, draw_texture_ex, measure_text, screen_height,
    screen_width, vec2, Color, DrawTextureParams, FilterMode, Texture2D, WHITE,
};

use super::{Renderer, TextSize};
use crate::ecs::Sprite;
use crate::error::{Error, Result};
use crate::geometry::Rect;

/// Draws to the macroquad window. Textures are decoded once and cached by
/// path.
#[derive(Default)]
pub struct MacroquadRenderer {
    textures: HashMap<PathBuf, Texture2D>,
}

impl MacroquadRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn texture(&mut self, path: &Path) -> Result<&Texture2D> {
        if !self.textures.contains_key(path) {
            let texture = load_texture(path)?;
            info!("loaded texture {} ({}x{})", path.display(), texture.width(), texture.height());
            self.textures.insert(path.to_path_buf(), texture);
        }
        self.textures
            .get(path)
            .ok_or_else(|| Error::asset_data(path, "texture cache miss"))
    }

    pub fn cached_textures(&self) -> usize {
        self.textures.len()
    }
}

fn load_texture(path: &Path) -> Result<Texture2D> {
    let bytes = std::fs::read(path).map_err(|e| Error::asset_io(path, e))?;
    let image = image::load_from_memory(&bytes).map_err(|e| Error::asset_data(path, e))?;
    let rgba = image.to_rgba8();
    let texture = Texture2D::from_rgba8(rgba.width() as u16, rgba.height() as u16, rgba.as_raw());
    // Pixel art
    texture.set_filter(FilterMode::Nearest);
    Ok(texture)
}

impl Renderer for MacroquadRenderer {
    fn size(&self) -> (f32, f32) {
        (screen_width(), screen_height())
    }

    fn clear(&mut self, color: Color) {
        clear_background(color);
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) {
        draw_rectangle(rect.x, rect.y, rect.w, rect.h, color);
    }

    fn draw_sprite(&mut self, sprite: &Sprite, dest: Rect) -> Result<()> {
        let texture = self.texture(&sprite.texture)?;
        let region = sprite.region;
        draw_texture_ex(
            texture,
            dest.x.round(),
            dest.y.round(),
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(dest.w, dest.h)),
                source: Some(macroquad::math::Rect::new(region.x, region.y, region.w, region.h)),
                ..Default::default()
            },
        );
        Ok(())
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: u16, color: Color) {
        // macroquad positions text by its baseline
        let dims = measure_text(text, None, font_size, 1.0);
        draw_text(text, x.round(), (y + dims.offset_y).round(), font_size as f32, color);
    }

    fn measure_text(&mut self, text: &str, font_size: u16) -> TextSize {
        let dims = measure_text(text, None, font_size, 1.0);
        TextSize {
            width: dims.width,
            height: dims.height,
            offset_y: dims.offset_y,
        }
    }
}
