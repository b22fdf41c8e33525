//! Directory watcher.
//!
//! Watches the target directory (non-recursive) and forwards audio files that
//! appear in it to the main loop as [`AppEvent::FileCreated`]. The playlist
//! itself decides what to do with them.
//!
//! # Platform Support
//!
//! Whatever `notify::recommended_watcher` picks: inotify on Linux, FSEvents on
//! macOS, `ReadDirectoryChangesW` on Windows.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::event::AppEvent;
use crate::library::is_audio_file;

/// How often the watcher thread checks for a stop request while idle.
const POLL: Duration = Duration::from_millis(100);

/// Handle to the watcher thread. Dropping it without [`stop`](Self::stop)
/// leaves the thread to exit once the main channel closes.
pub struct DirectoryWatcher {
    dir: PathBuf,
    stop_tx: Sender<()>,
    done_rx: mpsc::Receiver<()>,
    join: Option<JoinHandle<()>>,
}

impl DirectoryWatcher {
    /// Start watching `dir`. Returns once the OS watch is in place, or with
    /// [`Error::Watch`] if it could not be set up.
    pub fn spawn(dir: &Path, events: Sender<AppEvent>) -> Result<Self> {
        let (ready_tx, ready_rx) = mpsc::channel::<std::result::Result<(), notify::Error>>();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (done_tx, done_rx) = mpsc::channel::<()>();
        let watched = dir.to_path_buf();

        let join = thread::Builder::new()
            .name("watcher".into())
            .spawn(move || {
                let (fs_tx, fs_rx) = mpsc::channel();
                let mut watcher = match notify::recommended_watcher(fs_tx) {
                    Ok(w) => w,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                if let Err(e) = watcher.watch(&watched, RecursiveMode::NonRecursive) {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
                let _ = ready_tx.send(Ok(()));

                forward_events(&fs_rx, &stop_rx, &events);

                drop(watcher);
                let _ = done_tx.send(());
            })
            .map_err(|e| Error::io(dir, e))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(source)) => {
                let _ = join.join();
                error!(dir = %dir.display(), error = %source, "cannot watch directory");
                return Err(Error::Watch {
                    path: dir.to_path_buf(),
                    source,
                });
            }
            Err(_) => {
                let _ = join.join();
                return Err(Error::Watch {
                    path: dir.to_path_buf(),
                    source: notify::Error::generic("watcher thread exited during setup"),
                });
            }
        }

        info!(dir = %dir.display(), "watching directory");
        Ok(Self {
            dir: dir.to_path_buf(),
            stop_tx,
            done_rx,
            join: Some(join),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ask the thread to exit and wait at most `grace` for it.
    pub fn stop(mut self, grace: Duration) {
        let _ = self.stop_tx.send(());
        match self.done_rx.recv_timeout(grace) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if let Some(join) = self.join.take() {
                    let _ = join.join();
                }
                debug!(dir = %self.dir.display(), "watcher stopped");
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(dir = %self.dir.display(), "watcher did not stop in time, detaching");
            }
        }
    }
}

fn forward_events(
    fs_rx: &mpsc::Receiver<notify::Result<Event>>,
    stop_rx: &mpsc::Receiver<()>,
    events: &Sender<AppEvent>,
) {
    loop {
        match stop_rx.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => return,
            Err(TryRecvError::Empty) => {}
        }

        match fs_rx.recv_timeout(POLL) {
            Ok(Ok(event)) => {
                for path in created_audio_paths(&event) {
                    debug!(path = %path.display(), "file appeared");
                    if events.send(AppEvent::FileCreated(path)).is_err() {
                        return;
                    }
                }
            }
            Ok(Err(e)) => warn!(error = %e, "watcher error"),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

/// Audio files an event says have appeared: creations and moves into the
/// directory. Everything else is ignored.
pub fn created_audio_paths(event: &Event) -> Vec<PathBuf> {
    let candidates: &[PathBuf] = match event.kind {
        EventKind::Create(CreateKind::Folder) => &[],
        EventKind::Create(_) => &event.paths,
        EventKind::Modify(ModifyKind::Name(RenameMode::To | RenameMode::Any)) => &event.paths,
        // [from, to]
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            event.paths.last().map(std::slice::from_ref).unwrap_or(&[])
        }
        _ => &[],
    };

    candidates
        .iter()
        .filter(|p| is_audio_file(p))
        .cloned()
        .collect()
}
