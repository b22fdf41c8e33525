use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::audio::PlaybackDriver;
use crate::config::{ConfigStore, MAX_INITIAL_SONGS, Settings};
use crate::error::{Error, Result};
use crate::library::{Track, is_audio_file, is_saved, scan_recent, toggled_save_path};

use super::confirm::DeleteConfirm;
use super::types::{Direction, LoopMode, PlayOrder, PlaybackState, wrap_index};

/// "Previous" restarts the current track instead of stepping back once
/// playback is past this point.
pub const PREVIOUS_RESTART_THRESHOLD: Duration = Duration::from_millis(3000);

/// Result of a delete click on the current track.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteClick {
    /// First click: waiting for the confirming one.
    Armed(PathBuf),
    /// Confirmed and removed from disk.
    Deleted(PathBuf),
}

/// Owns the playlist and everything that decides which track is current.
///
/// The playlist is stored newest-first. All methods run on the main thread;
/// the driver only ever receives fire-and-forget commands.
pub struct Controller<D> {
    tracks: Vec<Track>,
    current: Option<usize>,
    /// Path the driver was last told to load.
    loaded: Option<PathBuf>,
    state: PlaybackState,
    position: Duration,
    duration: Option<Duration>,
    settings: Settings,
    store: Option<ConfigStore>,
    delete_confirm: DeleteConfirm,
    driver: D,
}

impl<D: PlaybackDriver> Controller<D> {
    /// Create a controller with an empty playlist. `store`, when given,
    /// receives the settings after every change.
    pub fn new(mut driver: D, settings: Settings, store: Option<ConfigStore>) -> Self {
        driver.set_volume(settings.volume);
        Self {
            tracks: Vec::new(),
            current: None,
            loaded: None,
            state: PlaybackState::Stopped,
            position: Duration::ZERO,
            duration: None,
            settings,
            store,
            delete_confirm: DeleteConfirm::default(),
            driver,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|i| self.tracks.get(i))
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn position(&self) -> Duration {
        self.position
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.settings.loop_mode
    }

    pub fn play_order(&self) -> PlayOrder {
        self.settings.play_order
    }

    pub fn target_directory(&self) -> Option<&Path> {
        self.settings.target_directory.as_deref()
    }

    /// Track armed for deletion by a first click, if still within the window.
    pub fn pending_delete(&self, now: Instant) -> Option<&Path> {
        self.delete_confirm.armed(now)
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Replace the playlist with the `limit` most recently modified audio
    /// files in `dir`.
    ///
    /// With nothing loaded yet, the play-order start is loaded (not played).
    /// Otherwise the current index follows the previously current file if it
    /// survived, or is clamped into range; the driver keeps its source.
    pub fn load_initial(&mut self, dir: &Path, limit: usize) -> Result<()> {
        let tracks = scan_recent(dir, limit)?;
        let previous = self.current_track().map(|t| t.path.clone());

        self.tracks = tracks;
        self.delete_confirm.reset();
        info!(dir = %dir.display(), count = self.tracks.len(), "playlist loaded");

        let len = self.tracks.len();
        match self.current {
            _ if len == 0 => {
                self.current = None;
            }
            None => {
                self.current = self.settings.play_order.start_index(len);
                self.load_current();
            }
            Some(i) => {
                let anchored = previous
                    .and_then(|p| self.tracks.iter().position(|t| t.is_at(&p)))
                    .unwrap_or(i.min(len - 1));
                self.current = Some(anchored);
            }
        }
        Ok(())
    }

    /// Re-run [`load_initial`](Self::load_initial) for the configured directory.
    pub fn reload(&mut self) -> Result<()> {
        match self.settings.target_directory.clone() {
            Some(dir) => self.load_initial(&dir, self.settings.initial_songs_count),
            None => Ok(()),
        }
    }

    /// Prepend a newly discovered file. Returns `true` if it was added.
    ///
    /// Known paths are ignored, so repeated notifications are harmless. The
    /// current index shifts with the insertion and keeps naming the same track.
    pub fn merge_discovered(&mut self, path: PathBuf) -> bool {
        if self.tracks.iter().any(|t| t.is_at(&path)) {
            return false;
        }
        // Created-then-renamed or already deleted by the time we got here.
        if !path.is_file() || !is_audio_file(&path) {
            debug!(path = %path.display(), "ignoring vanished or non-audio file");
            return false;
        }

        info!(path = %path.display(), "new track discovered");
        self.tracks.insert(0, Track::from_path(path));

        match self.current {
            Some(i) => self.current = Some(i + 1),
            None => {
                self.current = self.settings.play_order.start_index(self.tracks.len());
                self.load_and_play();
            }
        }
        true
    }

    /// Move to the next or previous track according to loop mode and play order.
    pub fn advance(&mut self, direction: Direction) {
        if self.tracks.is_empty() {
            return;
        }
        if self.settings.loop_mode == LoopMode::LoopSingle {
            self.restart();
            return;
        }
        if direction == Direction::Previous && self.position > PREVIOUS_RESTART_THRESHOLD {
            self.driver.seek(Duration::ZERO);
            self.position = Duration::ZERO;
            return;
        }
        self.step(direction);
    }

    /// The driver finished the current track on its own.
    pub fn end_of_media(&mut self) {
        let Some(index) = self.current else {
            return;
        };

        match self.settings.loop_mode {
            LoopMode::LoopSingle => self.restart(),
            LoopMode::LoopPlaylist => self.step(Direction::Next),
            LoopMode::NoLoop => {
                if self.settings.play_order.far_end_index(self.tracks.len()) == Some(index) {
                    debug!("reached the end of the playlist");
                    self.state = PlaybackState::Stopped;
                } else {
                    self.step(Direction::Next);
                }
            }
        }
    }

    pub fn toggle_play_pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.driver.pause();
            self.state = PlaybackState::Paused;
            return;
        }

        if self.current.is_none() {
            self.current = self.settings.play_order.start_index(self.tracks.len());
        }
        let Some(track) = self.current_track() else {
            return;
        };
        if self.loaded.as_deref() != Some(track.path.as_path()) {
            self.load_current();
        }
        self.driver.play();
        self.state = PlaybackState::Playing;
    }

    /// Make `index` current and start playing it.
    pub fn play_index(&mut self, index: usize) -> Result<()> {
        if index >= self.tracks.len() {
            return Err(Error::IndexOutOfRange(index));
        }
        self.current = Some(index);
        self.load_and_play();
        Ok(())
    }

    pub fn stop(&mut self) {
        self.driver.stop();
        self.loaded = None;
        self.state = PlaybackState::Stopped;
        self.position = Duration::ZERO;
    }

    pub fn seek(&mut self, position: Duration) {
        if self.loaded.is_none() {
            return;
        }
        let position = match self.duration {
            Some(total) => position.min(total),
            None => position,
        };
        self.driver.seek(position);
        self.position = position;
    }

    /// Seek relative to the last reported position.
    pub fn seek_by(&mut self, delta_secs: i64) {
        let delta = Duration::from_secs(delta_secs.unsigned_abs());
        let target = if delta_secs < 0 {
            self.position.saturating_sub(delta)
        } else {
            self.position + delta
        };
        self.seek(target);
    }

    pub fn on_position_changed(&mut self, position: Duration) {
        self.position = position;
    }

    pub fn on_duration_changed(&mut self, duration: Duration) {
        self.duration = Some(duration);

        let Some(track) = self.current.and_then(|i| self.tracks.get_mut(i)) else {
            return;
        };
        if track.duration.is_none() && self.loaded.as_deref() == Some(track.path.as_path()) {
            track.refresh();
            debug!(path = %track.path.display(), title = %track.title, "refreshed tags");
            track.duration.get_or_insert(duration);
        }
    }

    /// The driver could not open `path`; nothing is playing now.
    ///
    /// Only current events reach this, so the driver has no source whatever
    /// path it names.
    pub fn on_load_failed(&mut self, path: &Path) {
        debug!(path = %path.display(), "driver dropped its source");
        self.loaded = None;
        self.state = PlaybackState::Stopped;
    }

    /// Add or remove the save marker on the file at `index`.
    ///
    /// Returns the new path. On any failure the playlist is left unchanged.
    pub fn toggle_save(&mut self, index: usize) -> Result<PathBuf> {
        let old = self
            .tracks
            .get(index)
            .ok_or(Error::IndexOutOfRange(index))?
            .path
            .clone();
        if !old.is_file() {
            return Err(Error::MissingFile(old));
        }
        let new = toggled_save_path(&old).ok_or_else(|| {
            Error::io(
                &old,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "unsupported file name"),
            )
        })?;
        if new.exists() {
            return Err(Error::NameTaken(new));
        }

        if let Err(e) = fs::rename(&old, &new) {
            warn!(from = %old.display(), to = %new.display(), error = %e, "rename failed");
            return Err(Error::io(&old, e));
        }

        // Keep the source playing; only later reopens need the new name.
        if self.loaded.as_deref() == Some(old.as_path()) {
            self.driver.relocate(&new);
            self.loaded = Some(new.clone());
        }
        self.tracks[index].relocate(new.clone());
        self.delete_confirm.reset();

        info!(from = %old.display(), to = %new.display(), "toggled save marker");
        Ok(new)
    }

    /// [`toggle_save`](Self::toggle_save) on the current track.
    pub fn toggle_save_current(&mut self) -> Result<PathBuf> {
        let index = self.current.ok_or(Error::NoCurrentTrack)?;
        self.toggle_save(index)
    }

    /// One click of the two-click delete gesture on the current track.
    pub fn handle_delete_click(&mut self, now: Instant) -> Result<DeleteClick> {
        let path = self
            .current_track()
            .ok_or(Error::NoCurrentTrack)?
            .path
            .clone();

        if self.delete_confirm.click(&path, now) {
            self.delete_current().map(DeleteClick::Deleted)
        } else {
            debug!(path = %path.display(), "delete armed");
            Ok(DeleteClick::Armed(path))
        }
    }

    /// Stop playback, remove the current file from disk, then drop it from the
    /// playlist. The entry stays if the removal fails.
    pub fn delete_current(&mut self) -> Result<PathBuf> {
        let index = self.current.ok_or(Error::NoCurrentTrack)?;
        let path = self.tracks[index].path.clone();
        if is_saved(&path) {
            return Err(Error::Protected(path));
        }

        self.stop();
        if let Err(e) = fs::remove_file(&path) {
            warn!(path = %path.display(), error = %e, "delete failed");
            return Err(Error::io(&path, e));
        }

        self.tracks.remove(index);
        self.delete_confirm.reset();
        info!(path = %path.display(), "track deleted");

        if self.tracks.is_empty() {
            self.current = None;
            self.duration = None;
        } else {
            self.current = Some(index.min(self.tracks.len() - 1));
            self.load_current();
        }
        Ok(path)
    }

    /// `NoLoop -> LoopPlaylist -> LoopSingle -> NoLoop`.
    pub fn cycle_loop_mode(&mut self) -> LoopMode {
        self.settings.loop_mode = self.settings.loop_mode.cycled();
        self.persist();
        self.settings.loop_mode
    }

    /// Changing the play order rebuilds the playlist.
    pub fn set_play_order(&mut self, order: PlayOrder) -> Result<()> {
        if self.settings.play_order == order {
            return Ok(());
        }
        self.settings.play_order = order;
        self.persist();
        self.reload()
    }

    pub fn toggle_play_order(&mut self) -> Result<()> {
        self.set_play_order(self.settings.play_order.toggled())
    }

    /// Changing the initial playlist size rebuilds the playlist.
    pub fn set_initial_songs_count(&mut self, count: usize) -> Result<()> {
        let count = count.clamp(1, MAX_INITIAL_SONGS);
        if self.settings.initial_songs_count == count {
            return Ok(());
        }
        self.settings.initial_songs_count = count;
        self.persist();
        self.reload()
    }

    pub fn set_volume(&mut self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.driver.set_volume(volume);
        self.settings.volume = volume;
        self.persist();
    }

    pub fn adjust_volume(&mut self, delta: f32) {
        self.set_volume(self.settings.volume + delta);
    }

    /// Switch to a new directory: the playlist is rebuilt from it and its
    /// play-order start is loaded. The setting only changes if the scan works.
    pub fn set_target_directory(&mut self, dir: PathBuf) -> Result<()> {
        let previous = self.current.take();
        if let Err(e) = self.load_initial(&dir, self.settings.initial_songs_count) {
            self.current = previous;
            return Err(e);
        }
        if self.current.is_none() {
            self.stop();
        }
        self.settings.target_directory = Some(dir);
        self.persist();
        Ok(())
    }

    /// Write the settings out; failures are only logged.
    pub fn persist(&self) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&self.settings) {
                warn!(error = %e, "failed to save settings");
            }
        }
    }

    fn step(&mut self, direction: Direction) {
        let len = self.tracks.len();
        let next = match self.current {
            Some(i) => wrap_index(i, direction.step(self.settings.play_order), len),
            None => match self.settings.play_order.start_index(len) {
                Some(start) => start,
                None => return,
            },
        };
        self.current = Some(next);
        self.load_and_play();
    }

    fn restart(&mut self) {
        if self.loaded.is_none() {
            self.load_and_play();
            return;
        }
        self.driver.seek(Duration::ZERO);
        self.driver.play();
        self.position = Duration::ZERO;
        self.state = PlaybackState::Playing;
    }

    fn load_current(&mut self) {
        let Some(track) = self.current.and_then(|i| self.tracks.get(i)) else {
            return;
        };
        self.driver.load(&track.path);
        self.loaded = Some(track.path.clone());
        self.duration = track.duration;
        self.position = Duration::ZERO;
        self.state = PlaybackState::Stopped;
    }

    fn load_and_play(&mut self) {
        self.load_current();
        if self.loaded.is_some() {
            self.driver.play();
            self.state = PlaybackState::Playing;
        }
    }
}
