use std::path::PathBuf;
use std::sync::mpsc::Sender;

use tracing::warn;

use crate::app::App;
use crate::audio::PlaybackDriver;
use crate::event::AppEvent;
use crate::playlist::Controller;
use crate::watcher::DirectoryWatcher;

use super::settings::start_watcher;

/// Build the first playlist and start the watcher.
///
/// A directory given on the command line replaces (and persists over) the
/// configured one. Failures only end up in the status line.
pub fn open_initial_directory<D: PlaybackDriver>(
    controller: &mut Controller<D>,
    app: &mut App,
    cli_dir: Option<PathBuf>,
    tx: &Sender<AppEvent>,
) -> Option<DirectoryWatcher> {
    let result = match cli_dir {
        Some(dir) => controller.set_target_directory(dir),
        None if controller.target_directory().is_none() => {
            app.set_status("press f to pick a folder to watch");
            return None;
        }
        None => controller.reload(),
    };

    if let Err(e) = result {
        warn!(error = %e, "initial load failed");
        app.set_status(format!("cannot load folder: {e}"));
        return None;
    }

    start_watcher(controller, app, tx)
}
