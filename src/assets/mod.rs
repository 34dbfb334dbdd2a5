//! Asset loading: tile maps (RON) and character spritesheets (image + JSON)

pub mod spritesheet;
pub mod tile_map;

pub use spritesheet::{CharacterSpritesheet, SpritesheetMetadata};
pub use tile_map::{SolidRun, Tile, TileMap, TileMapData, Tileset, TilesetData};
