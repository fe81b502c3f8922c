//! Engine error kinds
//!
//! Recoverable kinds (missing assets, bad level lines, puzzle failures) are
//! logged where they happen; the rest propagate up to `main`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("asset missing: {path}")]
    AssetMissing { path: String },

    #[error("{file}:{line}: invalid level line: {reason}")]
    InvalidLevelLine {
        file: String,
        line: usize,
        reason: String,
    },

    #[error("unknown reference id `{0}`")]
    UnknownReferenceId(String),

    #[error("world already has a player")]
    AlreadyHasPlayer,

    #[error("unknown level `{0}`")]
    UnknownLevel(String),

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings: {0}")]
    Settings(#[from] serde_json::Error),
}

impl EngineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure raised inside a puzzle's own update or draw
#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error("puzzle state corrupted: {0}")]
    Corrupted(String),
    #[error("puzzle input out of range: {0}")]
    BadInput(String),
}
