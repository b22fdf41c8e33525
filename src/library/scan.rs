use std::fs;
use std::path::Path;
use std::time::SystemTime;

use tracing::debug;
use walkdir::WalkDir;

use super::model::Track;
use crate::error::{Error, Result};

/// Extensions treated as audio (case-insensitive, without dot).
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "m4a", "wav", "ogg", "opus", "aac", "wma"];

pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            AUDIO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// List the audio files directly inside `dir`, most recently modified first,
/// keeping at most `limit` of them.
pub fn scan_recent(dir: &Path, limit: usize) -> Result<Vec<Track>> {
    let meta = fs::metadata(dir).map_err(|e| Error::io(dir, e))?;
    if !meta.is_dir() {
        return Err(Error::io(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
        ));
    }

    // Non-recursive = only the root directory's children.
    let mut found: Vec<(SystemTime, std::path::PathBuf)> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file() && is_audio_file(entry.path()))
        .map(|entry| {
            let mtime = entry
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (mtime, entry.into_path())
        })
        .collect();

    // Newest first; ties broken by path so reloads are stable.
    found.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    found.truncate(limit);

    debug!(dir = %dir.display(), count = found.len(), "scanned directory");
    Ok(found
        .into_iter()
        .map(|(_, path)| Track::from_path(path))
        .collect())
}
