use std::path::{Path, PathBuf};

/// File-name prefix marking a track as saved.
pub const SAVE_MARKER: &str = "++";

pub fn is_saved(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with(SAVE_MARKER))
        .unwrap_or(false)
}

/// The path `path` would have after toggling the save marker on its file name.
///
/// Returns `None` for paths without a UTF-8 file name, or when stripping the
/// marker would leave an empty name.
pub fn toggled_save_path(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    let new_name = match name.strip_prefix(SAVE_MARKER) {
        Some("") => return None,
        Some(rest) => rest.to_string(),
        None => format!("{SAVE_MARKER}{name}"),
    };
    Some(path.with_file_name(new_name))
}
