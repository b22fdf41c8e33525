use std::path::{Path, PathBuf};
use std::time::Duration;

use super::marker::is_saved;
use super::tags::read_tags;

/// One audio file in the playlist. Identity is the path.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub duration: Option<Duration>,
}

impl Track {
    /// Build a track from `path`, reading its tags.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (title, duration) = read_tags(&path);
        Self {
            path,
            title,
            duration,
        }
    }

    /// Point this track at a new location and refresh derived fields.
    pub fn relocate(&mut self, path: PathBuf) {
        *self = Self::from_path(path);
    }

    /// Re-read tags from disk. Files picked up while still being written only
    /// have the filename fallback until this runs.
    pub fn refresh(&mut self) {
        let (title, duration) = read_tags(&self.path);
        self.title = title;
        self.duration = duration;
    }

    pub fn is_saved(&self) -> bool {
        is_saved(&self.path)
    }

    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
    }

    pub fn is_at(&self, path: &Path) -> bool {
        self.path == path
    }
}
