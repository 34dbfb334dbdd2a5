//! Character spritesheets
//!
//! A spritesheet is an image plus a JSON metadata file describing a grid of
//! equally sized cells:
//!
//! ```json
//! {
//!     "layout": "grid",
//!     "tile_width": 32,
//!     "tile_height": 32,
//!     "poses": { "idle": { "row": 0, "col": 0 } },
//!     "animations": { "walk": [{ "row": 1, "col": 0, "duration": 100 }] }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use macroquad::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::ecs::{CharacterSprites, Sprite, CHARACTER_DRAW_ORDER};
use crate::error::{Error, Result};
use crate::geometry::{Anchor, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpritesheetLayout {
    Grid,
}

/// A cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TilePos {
    pub row: u32,
    pub col: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Frame {
    pub row: u32,
    pub col: u32,
    /// Milliseconds
    pub duration: u32,
}

/// The metadata file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpritesheetMetadata {
    pub layout: SpritesheetLayout,
    pub tile_width: u32,
    pub tile_height: u32,
    #[serde(default)]
    pub poses: BTreeMap<String, TilePos>,
    #[serde(default)]
    pub animations: BTreeMap<String, Vec<Frame>>,
}

/// A validated spritesheet: every pose and frame lies inside the image.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterSpritesheet {
    image: PathBuf,
    image_size: (u32, u32),
    metadata: SpritesheetMetadata,
}

impl CharacterSpritesheet {
    pub fn open(image_path: impl AsRef<Path>, metadata_path: impl AsRef<Path>) -> Result<Self> {
        let image_path = image_path.as_ref();
        let metadata_path = metadata_path.as_ref();

        let image_size = image::image_dimensions(image_path).map_err(|e| match e {
            image::ImageError::IoError(io) => Error::asset_io(image_path, io),
            other => Error::asset_data(image_path, other),
        })?;

        let json = fs::read_to_string(metadata_path).map_err(|e| Error::asset_io(metadata_path, e))?;
        let metadata: SpritesheetMetadata =
            serde_json::from_str(&json).map_err(|e| Error::asset_data(metadata_path, e))?;

        Self::new(image_path, image_size, metadata)
            .map_err(|reason| Error::asset_data(metadata_path, reason))
    }

    fn new(image: &Path, image_size: (u32, u32), metadata: SpritesheetMetadata) -> std::result::Result<Self, String> {
        if metadata.tile_width == 0 || metadata.tile_height == 0 {
            return Err("tile_width and tile_height must be positive".to_string());
        }

        let (cols, rows) = (image_size.0 / metadata.tile_width, image_size.1 / metadata.tile_height);
        let check = |what: &str, name: &str, row: u32, col: u32| {
            if row < rows && col < cols {
                Ok(())
            } else {
                Err(format!(
                    "{} `{}` uses cell ({}, {}) but the image only has {}x{} cells",
                    what, name, row, col, rows, cols
                ))
            }
        };

        for (name, pos) in &metadata.poses {
            check("pose", name, pos.row, pos.col)?;
        }
        for (name, frames) in &metadata.animations {
            for frame in frames {
                check("animation", name, frame.row, frame.col)?;
            }
        }

        Ok(Self {
            image: image.to_path_buf(),
            image_size,
            metadata,
        })
    }

    pub fn image(&self) -> &Path {
        &self.image
    }

    pub fn image_size(&self) -> (u32, u32) {
        self.image_size
    }

    pub fn metadata(&self) -> &SpritesheetMetadata {
        &self.metadata
    }

    fn sprite_at(&self, row: u32, col: u32) -> Sprite {
        let (tw, th) = (self.metadata.tile_width as f32, self.metadata.tile_height as f32);
        Sprite {
            texture: self.image.clone(),
            region: Rect::new(col as f32 * tw, row as f32 * th, tw, th),
            size: Vec2::new(tw, th),
            anchor: Anchor::Center,
            draw_order: CHARACTER_DRAW_ORDER,
        }
    }

    /// Every pose and animation as sprites.
    pub fn sprites(&self) -> CharacterSprites {
        let poses = self
            .metadata
            .poses
            .iter()
            .map(|(name, pos)| (name.clone(), self.sprite_at(pos.row, pos.col)))
            .collect();
        let animations = self
            .metadata
            .animations
            .iter()
            .map(|(name, frames)| {
                let frames = frames
                    .iter()
                    .map(|f| (self.sprite_at(f.row, f.col), f.duration))
                    .collect();
                (name.clone(), frames)
            })
            .collect();
        CharacterSprites { poses, animations }
    }

    pub fn default_sprite(&self) -> Option<Sprite> {
        self.sprites().default_sprite()
    }
}
