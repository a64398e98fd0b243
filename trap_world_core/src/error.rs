use std::path::PathBuf;

use crate::{Position, map::GridError};

/// Errors that stop the game from starting.
///
/// Things that happen while playing (collisions, expired portals, races
/// between agents) are not errors; they only change the status message.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Failed to read map file {}: {source}", path.display())]
    MapRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid map layout: {0}")]
    Layout(#[from] GridError),
    #[error("No player start ('☺') found in map.")]
    MissingStart,
    #[error("Multiple player starts found at ({}, {}) and ({}, {}).", first.x, first.y, second.x, second.y)]
    MultipleStarts { first: Position, second: Position },
    #[error("No free cell left on the map.")]
    NoFreeCell,
    #[error("Failed to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
