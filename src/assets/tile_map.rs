//! Tile maps
//!
//! A map is a RON file describing a grid of characters:
//!
//! ```ron
//! (
//!     tile_width: 16,
//!     tile_height: 16,
//!     background: Some((92, 148, 252)),
//!     tileset: Some((
//!         image: "tiles.png",
//!         columns: 8,
//!         legend: {'#': 0, '=': 9},
//!     )),
//!     rows: [
//!         "..........",
//!         "..P...$...",
//!         "####==####",
//!     ],
//! )
//! ```
//!
//! Legend: `#` solid ground, `.` or space empty, `P` player start, `$` coin.
//! With a tileset, any other character listed in its legend is solid ground
//! too, drawn with its own tile. Row 0 is the top of the map. In world space
//! the map's bottom-left corner sits at the origin and y points up.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use macroquad::color::Color;
use macroquad::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::ecs::Sprite;
use crate::error::{Error, Result};
use crate::geometry::{Anchor, Rect};

/// Characters with a fixed meaning, which a tileset legend may not claim
const RESERVED_TILES: [char; 4] = ['.', ' ', 'P', '$'];

/// Limits protecting against absurd map files
pub mod limits {
    pub const MAX_COLUMNS: usize = 4096;
    pub const MAX_ROWS: usize = 4096;
    pub const MAX_TILE_SIZE: u32 = 1024;
}

fn default_currency_value() -> u32 {
    1
}

/// The on-disk form of a tile map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TileMapData {
    pub tile_width: u32,
    pub tile_height: u32,
    pub rows: Vec<String>,
    #[serde(default)]
    pub background: Option<(u8, u8, u8)>,
    /// Value of each `$` coin
    #[serde(default = "default_currency_value")]
    pub currency_value: u32,
    #[serde(default)]
    pub tileset: Option<TilesetData>,
}

/// The on-disk form of a tileset: a grid image cut into map-sized tiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TilesetData {
    /// Relative paths are resolved against the map file's directory
    pub image: PathBuf,
    /// Tiles per row of the image
    pub columns: u32,
    /// Tile index, counted row by row, drawn for each map character
    pub legend: BTreeMap<char, u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Empty,
    /// Ground, with the map character it was written as
    Solid(char),
    PlayerStart,
    Coin,
}

impl Tile {
    fn parse(c: char, tileset: Option<&TilesetData>) -> Option<Tile> {
        match c {
            '.' | ' ' => Some(Tile::Empty),
            '#' => Some(Tile::Solid('#')),
            'P' => Some(Tile::PlayerStart),
            '$' => Some(Tile::Coin),
            _ if tileset.map_or(false, |t| t.legend.contains_key(&c)) => Some(Tile::Solid(c)),
            _ => None,
        }
    }

    pub fn is_solid(self) -> bool {
        matches!(self, Tile::Solid(_))
    }
}

/// A validated tileset.
#[derive(Debug, Clone, PartialEq)]
pub struct Tileset {
    image: PathBuf,
    columns: u32,
    legend: BTreeMap<char, u32>,
}

impl Tileset {
    pub fn image(&self) -> &Path {
        &self.image
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Tile index drawn for a map character.
    pub fn index_of(&self, c: char) -> Option<u32> {
        self.legend.get(&c).copied()
    }

    /// Source rectangle of a tile index, in image pixels.
    pub fn region(&self, index: u32, tile_width: u32, tile_height: u32) -> Rect {
        let (col, row) = (index % self.columns, index / self.columns);
        Rect::new(
            (col * tile_width) as f32,
            (row * tile_height) as f32,
            tile_width as f32,
            tile_height as f32,
        )
    }
}

/// A horizontal run of solid tiles, used to build one ground collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidRun {
    /// World-space center of the run
    pub center: Vec2,
    /// World-space size of the run
    pub size: Vec2,
}

/// A loaded, validated tile map.
#[derive(Debug, Clone, PartialEq)]
pub struct TileMap {
    path: Option<PathBuf>,
    tile_width: u32,
    tile_height: u32,
    cols: usize,
    rows: usize,
    /// Row-major, row 0 at the top
    tiles: Vec<Tile>,
    background: Option<Color>,
    currency_value: u32,
    tileset: Option<Tileset>,
}

impl TileMap {
    /// Reads and validates a RON map file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| Error::asset_io(path, e))?;
        let data: TileMapData = ron::from_str(&contents).map_err(|e| Error::asset_data(path, e))?;
        let mut map = Self::from_data(data).map_err(|e| match e {
            Error::InvalidAsset { reason, .. } => Error::asset_data(path, reason),
            other => other,
        })?;
        if let (Some(tileset), Some(dir)) = (map.tileset.as_mut(), path.parent()) {
            if tileset.image.is_relative() {
                tileset.image = dir.join(&tileset.image);
            }
        }
        map.path = Some(path.to_path_buf());
        Ok(map)
    }

    /// Builds a map from in-memory rows.
    pub fn from_rows(tile_width: u32, tile_height: u32, rows: &[&str]) -> Result<Self> {
        Self::from_data(TileMapData {
            tile_width,
            tile_height,
            rows: rows.iter().map(|r| r.to_string()).collect(),
            background: None,
            currency_value: default_currency_value(),
            tileset: None,
        })
    }

    pub fn from_data(data: TileMapData) -> Result<Self> {
        let invalid = |reason: String| Error::asset_data("<tile map>", reason);

        for (name, size) in [("tile_width", data.tile_width), ("tile_height", data.tile_height)] {
            if size == 0 || size > limits::MAX_TILE_SIZE {
                return Err(invalid(format!(
                    "{} must be between 1 and {}, got {}",
                    name,
                    limits::MAX_TILE_SIZE,
                    size
                )));
            }
        }

        let rows = data.rows.len();
        let cols = data.rows.first().map_or(0, |r| r.chars().count());
        if rows == 0 || cols == 0 {
            return Err(invalid("map has no tiles".to_string()));
        }
        if rows > limits::MAX_ROWS || cols > limits::MAX_COLUMNS {
            return Err(invalid(format!("map is too large ({}x{} tiles)", cols, rows)));
        }

        if let Some(tileset) = &data.tileset {
            if tileset.columns == 0 {
                return Err(invalid("tileset columns must be positive".to_string()));
            }
            if let Some(c) = tileset.legend.keys().find(|c| RESERVED_TILES.contains(*c)) {
                return Err(invalid(format!("tileset legend may not redefine {:?}", c)));
            }
        }

        let mut tiles = Vec::with_capacity(rows * cols);
        let mut player_starts = 0;
        for (row, line) in data.rows.iter().enumerate() {
            let len = line.chars().count();
            if len != cols {
                return Err(invalid(format!(
                    "row {} has {} tiles, expected {}",
                    row, len, cols
                )));
            }
            for (col, c) in line.chars().enumerate() {
                let tile = Tile::parse(c, data.tileset.as_ref()).ok_or_else(|| {
                    invalid(format!("unknown tile {:?} at row {}, column {}", c, row, col))
                })?;
                if let (Tile::Solid(c), Some(tileset)) = (tile, &data.tileset) {
                    if !tileset.legend.contains_key(&c) {
                        return Err(invalid(format!("tile {:?} has no tileset index", c)));
                    }
                }
                if tile == Tile::PlayerStart {
                    player_starts += 1;
                }
                tiles.push(tile);
            }
        }
        if player_starts > 1 {
            return Err(invalid(format!("map has {} player starts, expected at most one", player_starts)));
        }

        Ok(Self {
            path: None,
            tile_width: data.tile_width,
            tile_height: data.tile_height,
            cols,
            rows,
            tiles,
            background: data.background.map(|(r, g, b)| Color::from_rgba(r, g, b, 255)),
            currency_value: data.currency_value,
            tileset: data.tileset.map(|t| Tileset {
                image: t.image,
                columns: t.columns,
                legend: t.legend,
            }),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn pixel_width(&self) -> u32 {
        self.tile_width * self.cols as u32
    }

    pub fn pixel_height(&self) -> u32 {
        self.tile_height * self.rows as u32
    }

    /// Pixel size as a world-space vector.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.pixel_width() as f32, self.pixel_height() as f32)
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub fn currency_value(&self) -> u32 {
        self.currency_value
    }

    pub fn tileset(&self) -> Option<&Tileset> {
        self.tileset.as_ref()
    }

    pub fn tile(&self, col: usize, row: usize) -> Option<Tile> {
        if col < self.cols && row < self.rows {
            Some(self.tiles[row * self.cols + col])
        } else {
            None
        }
    }

    /// World-space center of a tile.
    pub fn tile_center(&self, col: usize, row: usize) -> Vec2 {
        let (tw, th) = (self.tile_width as f32, self.tile_height as f32);
        Vec2::new(
            (col as f32 + 0.5) * tw,
            (self.rows - row) as f32 * th - th * 0.5,
        )
    }

    fn positions_of(&self, wanted: Tile) -> impl Iterator<Item = Vec2> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .filter(move |(_, &tile)| tile == wanted)
            .map(move |(i, _)| self.tile_center(i % self.cols, i / self.cols))
    }

    /// World-space center of the `P` tile.
    pub fn player_start(&self) -> Option<Vec2> {
        self.positions_of(Tile::PlayerStart).next()
    }

    /// World-space centers of the `$` tiles.
    pub fn coins(&self) -> Vec<Vec2> {
        self.positions_of(Tile::Coin).collect()
    }

    /// Solid tiles merged into horizontal runs, top row first.
    pub fn solid_runs(&self) -> Vec<SolidRun> {
        let (tw, th) = (self.tile_width as f32, self.tile_height as f32);
        let mut runs = Vec::new();

        for row in 0..self.rows {
            let mut col = 0;
            while col < self.cols {
                if !self.tile(col, row).map_or(false, Tile::is_solid) {
                    col += 1;
                    continue;
                }
                let start = col;
                while self.tile(col, row).map_or(false, Tile::is_solid) {
                    col += 1;
                }
                let len = (col - start) as f32;
                let left = self.tile_center(start, row) - Vec2::new(tw * 0.5, 0.0);
                runs.push(SolidRun {
                    center: left + Vec2::new(len * tw * 0.5, 0.0),
                    size: Vec2::new(len * tw, th),
                });
            }
        }
        runs
    }

    /// One sprite per solid tile, centered on the tile, in row-major order.
    /// Empty without a tileset.
    pub fn tile_sprites(&self) -> Vec<(Vec2, Sprite)> {
        let Some(tileset) = &self.tileset else {
            return Vec::new();
        };
        let size = Vec2::new(self.tile_width as f32, self.tile_height as f32);

        let mut sprites = Vec::new();
        for (i, &tile) in self.tiles.iter().enumerate() {
            let Tile::Solid(c) = tile else {
                continue;
            };
            let Some(index) = tileset.index_of(c) else {
                continue;
            };
            let sprite = Sprite {
                texture: tileset.image.clone(),
                region: tileset.region(index, self.tile_width, self.tile_height),
                size,
                anchor: Anchor::Center,
                draw_order: 0,
            };
            sprites.push((self.tile_center(i % self.cols, i / self.cols), sprite));
        }
        sprites
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_dimensions_and_positions() {
        let map = TileMap::from_rows(16, 8, &[
            "....",
            ".P$.",
            "####",
        ])
        .unwrap();

        assert_eq!((map.cols(), map.rows()), (4, 3));
        assert_eq!((map.pixel_width(), map.pixel_height()), (64, 24));
        // Row 1 from the top is the middle row: y in 8..16
        assert_eq!(map.player_start(), Some(Vec2::new(24.0, 12.0)));
        assert_eq!(map.coins(), vec![Vec2::new(40.0, 12.0)]);
    }

    #[test]
    fn test_solid_tiles_merge_into_runs() {
        let map = TileMap::from_rows(10, 10, &[
            "#..##",
            "#####",
        ])
        .unwrap();

        let runs = map.solid_runs();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0], SolidRun { center: Vec2::new(5.0, 15.0), size: Vec2::new(10.0, 10.0) });
        assert_eq!(runs[1], SolidRun { center: Vec2::new(40.0, 15.0), size: Vec2::new(20.0, 10.0) });
        assert_eq!(runs[2], SolidRun { center: Vec2::new(25.0, 5.0), size: Vec2::new(50.0, 10.0) });
    }

    #[test]
    fn test_invalid_maps_are_rejected() {
        assert!(TileMap::from_rows(0, 16, &["#"]).is_err());
        assert!(TileMap::from_rows(16, 16, &[]).is_err());
        assert!(TileMap::from_rows(16, 16, &["##", "#"]).is_err());
        assert!(TileMap::from_rows(16, 16, &["#?"]).is_err());
        assert!(matches!(
            TileMap::from_rows(16, 16, &["PP"]),
            Err(Error::InvalidAsset { .. })
        ));
    }

    #[test]
    fn test_open_ron_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r####"(
                tile_width: 32,
                tile_height: 24,
                background: Some((10, 20, 30)),
                currency_value: 5,
                rows: ["..$", "###"],
            )"####
        )
        .unwrap();

        let map = TileMap::open(file.path()).unwrap();
        assert_eq!(map.tile_width(), 32);
        assert_eq!(map.tile_height(), 24);
        assert_eq!(map.currency_value(), 5);
        assert_eq!(map.background(), Some(Color::from_rgba(10, 20, 30, 255)));
        assert_eq!(map.path(), Some(file.path()));
    }

    #[test]
    fn test_tileset_legend_and_image_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("castle.ron");
        std::fs::write(
            &path,
            r####"(
                tile_width: 16,
                tile_height: 16,
                tileset: Some((
                    image: "tiles.png",
                    columns: 4,
                    legend: {'#': 1, '=': 6},
                )),
                rows: ["P...", "##=#"],
            )"####,
        )
        .unwrap();

        let map = TileMap::open(&path).unwrap();
        let tileset = map.tileset().unwrap();
        assert_eq!(tileset.image(), dir.path().join("tiles.png"));
        assert_eq!(map.tile(2, 1), Some(Tile::Solid('=')));
        // Different ground characters still merge into one collider
        assert_eq!(map.solid_runs().len(), 1);

        let sprites = map.tile_sprites();
        assert_eq!(sprites.len(), 4);
        let (center, brick) = &sprites[2];
        assert_eq!(*center, Vec2::new(40.0, 8.0));
        assert_eq!(brick.region, Rect::new(32.0, 16.0, 16.0, 16.0));
        assert_eq!(sprites[0].1.region, Rect::new(16.0, 0.0, 16.0, 16.0));
    }

    #[test]
    fn test_bad_tilesets_are_rejected() {
        let with_tileset = |columns: u32, legend: &[(char, u32)], rows: &[&str]| {
            TileMap::from_data(TileMapData {
                tile_width: 8,
                tile_height: 8,
                rows: rows.iter().map(|r| r.to_string()).collect(),
                background: None,
                currency_value: 1,
                tileset: Some(TilesetData {
                    image: "tiles.png".into(),
                    columns,
                    legend: legend.iter().copied().collect(),
                }),
            })
        };

        assert!(with_tileset(4, &[('#', 0)], &["#"]).is_ok());
        assert!(with_tileset(0, &[('#', 0)], &["#"]).is_err());
        assert!(with_tileset(4, &[('$', 0)], &["#"]).is_err());
        // Ground without a tile index
        assert!(with_tileset(4, &[('=', 0)], &["#="]).is_err());
        // Unlisted characters are still unknown
        assert!(with_tileset(4, &[('#', 0)], &["#="]).is_err());
        assert!(TileMap::from_rows(8, 8, &["#"]).unwrap().tile_sprites().is_empty());
    }

    #[test]
    fn test_open_reports_path_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.ron");
        assert!(matches!(TileMap::open(&missing), Err(Error::InvalidAssetPath { .. })));

        let bad = dir.path().join("bad.ron");
        std::fs::write(&bad, "(tile_width: 16, nonsense: 1)").unwrap();
        match TileMap::open(&bad) {
            Err(Error::InvalidAsset { path, .. }) => assert_eq!(path, bad),
            other => panic!("expected InvalidAsset, got {:?}", other),
        }
    }
}
