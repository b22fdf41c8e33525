use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Second click must land within this window to confirm a delete.
pub const DELETE_CONFIRM_WINDOW: Duration = Duration::from_secs(1);

/// Clicks closer together than this are key auto-repeat, not a second click.
pub const DELETE_REPEAT_GUARD: Duration = Duration::from_millis(150);

#[derive(Debug)]
struct Pending {
    path: PathBuf,
    armed_at: Instant,
    last_click: Instant,
}

/// Two-click confirmation for destructive actions on a track.
///
/// A click arms the confirmation for one track. A second click on the same
/// track inside [`DELETE_CONFIRM_WINDOW`] confirms; a click on another track,
/// or after the window, re-arms for that click instead. Clicks arriving less
/// than [`DELETE_REPEAT_GUARD`] after the previous one are ignored, so a held
/// key never confirms on its own.
#[derive(Debug, Default)]
pub struct DeleteConfirm {
    pending: Option<Pending>,
}

impl DeleteConfirm {
    /// Register a click on `path` at `now`. Returns `true` when this click
    /// confirms.
    pub fn click(&mut self, path: &Path, now: Instant) -> bool {
        if let Some(p) = self.pending.as_mut().filter(|p| p.path == path) {
            let since_armed = now.saturating_duration_since(p.armed_at);
            if since_armed <= DELETE_CONFIRM_WINDOW {
                if now.saturating_duration_since(p.last_click) < DELETE_REPEAT_GUARD {
                    p.last_click = now;
                    return false;
                }
                self.pending = None;
                return true;
            }
        }

        self.pending = Some(Pending {
            path: path.to_path_buf(),
            armed_at: now,
            last_click: now,
        });
        false
    }

    /// Track currently armed for deletion, if the window has not expired at `now`.
    pub fn armed(&self, now: Instant) -> Option<&Path> {
        self.pending
            .as_ref()
            .filter(|p| now.saturating_duration_since(p.armed_at) <= DELETE_CONFIRM_WINDOW)
            .map(|p| p.path.as_path())
    }

    pub fn reset(&mut self) {
        self.pending = None;
    }
}
