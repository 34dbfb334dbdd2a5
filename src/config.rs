//! Game configuration stored as RON

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Window and frame loop settings.
///
/// Missing fields take their default, so a config file only needs the
/// values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Fixed update rate; also caps the frame rate
    pub fps: u32,
    /// How many times a screen may answer `Continue` before the frame is
    /// drawn anyway
    pub max_continues_per_frame: u32,
    pub high_dpi: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            title: "autogamer".to_string(),
            width: 960,
            height: 720,
            fps: 60,
            max_continues_per_frame: 8,
            high_dpi: false,
        }
    }
}

impl GameConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::asset_io(path, e))?;
        let config: Self = ron::from_str(&text).map_err(|e| Error::asset_data(path, e))?;
        if config.fps == 0 {
            return Err(Error::asset_data(path, "fps must be positive"));
        }
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let pretty = ron::ser::PrettyConfig::new().depth_limit(2);
        let text = ron::ser::to_string_pretty(self, pretty).map_err(|e| Error::asset_data(path, e))?;
        std::fs::write(path, text).map_err(|e| Error::asset_io(path, e))
    }

    /// Seconds per update.
    pub fn dt(&self) -> f32 {
        1.0 / self.fps.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "(title: \"Coins\", fps: 30)").unwrap();

        let config = GameConfig::load(file.path()).unwrap();
        assert_eq!(config.title, "Coins");
        assert_eq!(config.fps, 30);
        assert_eq!(config.max_continues_per_frame, 8);
        assert!((config.dt() - 1.0 / 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autogamer.ron");
        let config = GameConfig { width: 320, height: 240, ..GameConfig::default() };
        config.save(&path).unwrap();
        assert_eq!(GameConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_bad_files() {
        assert!(matches!(
            GameConfig::load("/nonexistent/autogamer.ron"),
            Err(Error::InvalidAssetPath { .. })
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "(fps: 0)").unwrap();
        assert!(matches!(GameConfig::load(file.path()), Err(Error::InvalidAsset { .. })));
    }
}
