use std::env;
use std::path::PathBuf;
use std::sync::mpsc::Sender;

use tracing::warn;

use crate::app::App;
use crate::audio::PlaybackDriver;
use crate::config::{ConfigStore, Settings};
use crate::event::AppEvent;
use crate::playlist::Controller;
use crate::watcher::DirectoryWatcher;

use super::WATCHER_GRACE;

pub fn load_settings(store: Option<&ConfigStore>) -> Settings {
    match store {
        Some(store) => store.load_or_default(),
        None => {
            warn!("no config location (HOME unset?), settings will not be saved");
            Settings::default()
        }
    }
}

/// Expand a leading `~` the way a shell would.
pub fn expand_home(input: &str) -> PathBuf {
    let home = env::var_os("HOME").map(PathBuf::from);
    match (input, home) {
        ("~", Some(home)) => home,
        (s, Some(home)) if s.starts_with("~/") => home.join(&s[2..]),
        (s, _) => PathBuf::from(s),
    }
}

/// Start watching `controller`'s target directory, if it has one.
pub fn start_watcher<D: PlaybackDriver>(
    controller: &Controller<D>,
    app: &mut App,
    tx: &Sender<AppEvent>,
) -> Option<DirectoryWatcher> {
    let dir = controller.target_directory()?;
    match DirectoryWatcher::spawn(dir, tx.clone()) {
        Ok(w) => Some(w),
        Err(e) => {
            app.set_status(format!("not watching for new files: {e}"));
            None
        }
    }
}

/// Point the player at a new directory and move the watcher along with it.
/// On failure nothing changes.
pub fn change_directory<D: PlaybackDriver>(
    controller: &mut Controller<D>,
    app: &mut App,
    watcher: &mut Option<DirectoryWatcher>,
    tx: &Sender<AppEvent>,
    input: &str,
) {
    let dir = expand_home(input);
    if let Err(e) = controller.set_target_directory(dir.clone()) {
        warn!(dir = %dir.display(), error = %e, "cannot switch directory");
        app.set_status(format!("cannot open {}: {e}", dir.display()));
        return;
    }

    if let Some(old) = watcher.take() {
        old.stop(WATCHER_GRACE);
    }
    *watcher = start_watcher(controller, app, tx);
    app.follow_playback_on();
    if watcher.is_some() {
        app.set_status(format!(
            "watching {} ({} tracks)",
            dir.display(),
            controller.tracks().len()
        ));
    }
}

pub fn change_initial_songs<D: PlaybackDriver>(
    controller: &mut Controller<D>,
    app: &mut App,
    count: usize,
) {
    match controller.set_initial_songs_count(count) {
        Ok(()) => app.set_status(format!(
            "initial playlist size: {}",
            controller.settings().initial_songs_count
        )),
        Err(e) => app.set_status(format!("reload failed: {e}")),
    }
}
