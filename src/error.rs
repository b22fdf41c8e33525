//! Crate-wide error type.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read config: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("failed to write config: {0}")]
    ConfigWrite(#[from] serde_json::Error),

    #[error("cannot watch {path}: {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("audio output unavailable: {0}")]
    AudioOutput(String),

    #[error("cannot decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("nothing is loaded")]
    NoCurrentTrack,

    #[error("track index {0} is out of range")]
    IndexOutOfRange(usize),

    #[error("{0} no longer exists")]
    MissingFile(PathBuf),

    #[error("{0} already exists")]
    NameTaken(PathBuf),

    #[error("{0} is saved; unsave it before deleting")]
    Protected(PathBuf),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
