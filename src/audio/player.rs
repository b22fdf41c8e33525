use std::path::Path;
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::warn;

use crate::error::{Error, Result};
use crate::event::AppEvent;

use super::driver::PlaybackDriver;
use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, Generations};

/// Handle to the audio thread.
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    generations: Generations,
    join: Option<JoinHandle<()>>,
}

impl AudioPlayer {
    /// Open the default output device on a new audio thread. Player events
    /// are delivered through `events`.
    pub fn new(events: Sender<AppEvent>, volume: f32) -> Result<Self> {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (ready_tx, ready_rx) = mpsc::channel();

        let join = spawn_audio_thread(rx, events, ready_tx, volume)
            .map_err(|e| Error::AudioOutput(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                tx,
                generations: Generations::default(),
                join: Some(join),
            }),
            Ok(Err(reason)) => Err(Error::AudioOutput(reason)),
            Err(_) => Err(Error::AudioOutput("audio thread exited".into())),
        }
    }

    fn send(&self, cmd: AudioCmd) {
        if let Err(e) = self.tx.send(cmd) {
            warn!(cmd = ?e.0, "audio thread is gone");
        }
    }

    pub fn quit_softly(&mut self, fade_out: Duration) {
        self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}

impl PlaybackDriver for AudioPlayer {
    fn load(&mut self, path: &Path) {
        let generation = self.generations.bump();
        self.send(AudioCmd::Load {
            path: path.to_path_buf(),
            generation,
        });
    }

    fn play(&mut self) {
        self.send(AudioCmd::Play);
    }

    fn pause(&mut self) {
        self.send(AudioCmd::Pause);
    }

    fn stop(&mut self) {
        // Events from the dropped source are stale from here on.
        self.generations.bump();
        self.send(AudioCmd::Stop);
    }

    fn seek(&mut self, position: Duration) {
        self.send(AudioCmd::Seek(position));
    }

    fn set_volume(&mut self, volume: f32) {
        self.send(AudioCmd::SetVolume(volume));
    }

    fn relocate(&mut self, path: &Path) {
        self.send(AudioCmd::Relocate(path.to_path_buf()));
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generations.is_current(generation)
    }
}
