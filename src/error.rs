//! Crate-wide error type
//!
//! Every fallible operation in the runtime returns [`Result`]. Construction
//! errors (bad mass, degenerate shapes, unreadable assets) are reported to the
//! caller immediately; errors raised while a frame is running abort that
//! frame and end `Game::run`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::ecs::{ComponentKind, Entity};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("entity {entity} has no `{kind}` component")]
    ComponentNotFound {
        entity: Entity,
        kind: ComponentKind,
    },

    #[error("entity {entity} already has a `{kind}` component")]
    DuplicateComponent {
        entity: Entity,
        kind: ComponentKind,
    },

    #[error("entity {0} does not exist or was destroyed")]
    NoSuchEntity(Entity),

    #[error("unable to read asset `{}`: {source}", path.display())]
    InvalidAssetPath {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid asset `{}`: {reason}", path.display())]
    InvalidAsset {
        path: PathBuf,
        reason: String,
    },

    #[error("invalid physics configuration: {0}")]
    InvalidPhysicsConfig(String),

    #[error("viewport must be finite and strictly positive, got {width}x{height}")]
    InvalidViewport {
        width: f32,
        height: f32,
    },

    #[error("entity {existing} is already the viewport target, refusing to also target {rejected}")]
    AmbiguousViewportTarget {
        existing: Entity,
        rejected: Entity,
    },

    #[error("Level::load() may only be called once")]
    LevelAlreadyLoaded,
}

impl Error {
    /// Wraps an I/O failure on `path`.
    pub(crate) fn asset_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::InvalidAssetPath { path: path.into(), source }
    }

    pub(crate) fn asset_data(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::InvalidAsset { path: path.into(), reason: reason.to_string() }
    }
}
