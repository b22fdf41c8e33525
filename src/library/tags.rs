use std::path::Path;
use std::time::Duration;

use lofty::prelude::{Accessor, AudioFile, TaggedFileExt};
use tracing::debug;

use super::marker::SAVE_MARKER;

/// Filename stem (without the save marker) used when a file has no usable
/// title tag.
pub(super) fn fallback_title(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN");
    match stem.strip_prefix(SAVE_MARKER) {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => stem.to_string(),
    }
}

/// Title and duration from tags. The title falls back to the filename stem
/// when absent or unreadable.
pub(super) fn read_tags(path: &Path) -> (String, Option<Duration>) {
    let mut title = fallback_title(path);
    let mut duration = None;

    match lofty::read_from_path(path) {
        Ok(tagged) => {
            duration = Some(tagged.properties().duration()).filter(|d| !d.is_zero());

            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(v) = tag.title() {
                    if !v.trim().is_empty() {
                        title = v.trim().to_string();
                    }
                }
            }
        }
        Err(e) => debug!(path = %path.display(), error = %e, "no readable tags, using filename"),
    }

    (title, duration)
}
