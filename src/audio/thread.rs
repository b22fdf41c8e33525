use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, error, warn};

use crate::event::AppEvent;

use super::sink::create_sink_at;
use super::types::{AudioCmd, PlayerEvent};

/// How often the thread reports position and checks for end of media.
const TICK: Duration = Duration::from_millis(200);

struct Playback {
    stream: OutputStream,
    sink: Option<Sink>,
    loaded: Option<PathBuf>,
    generation: u64,
    /// Position the current sink started at; `Sink::get_pos` counts from here.
    offset: Duration,
    paused: bool,
    ended: bool,
    volume: f32,
    events: Sender<AppEvent>,
}

impl Playback {
    fn emit(&self, event: PlayerEvent) -> bool {
        self.events
            .send(AppEvent::Player {
                generation: self.generation,
                event,
            })
            .is_ok()
    }

    fn position(&self) -> Duration {
        self.offset + self.sink.as_ref().map_or(Duration::ZERO, |s| s.get_pos())
    }

    fn drop_sink(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
    }

    /// Rebuild the sink for the loaded file at `start_at`, keeping the paused state.
    fn rebuild_at(&mut self, start_at: Duration) -> Option<Duration> {
        let path = self.loaded.clone()?;
        self.drop_sink();

        match create_sink_at(&self.stream, &path, start_at, self.volume) {
            Ok((sink, total)) => {
                if !self.paused {
                    sink.play();
                }
                self.sink = Some(sink);
                self.offset = start_at;
                self.ended = false;
                total
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to open track");
                self.loaded = None;
                self.paused = true;
                self.emit(PlayerEvent::LoadFailed {
                    path,
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    fn load(&mut self, path: PathBuf, generation: u64) {
        self.generation = generation;
        self.loaded = Some(path);
        self.paused = true;

        let total = self.rebuild_at(Duration::ZERO);
        if self.loaded.is_some() {
            if let Some(total) = total {
                self.emit(PlayerEvent::DurationChanged(total));
            }
            self.emit(PlayerEvent::PositionChanged(Duration::ZERO));
        }
    }

    fn play(&mut self) {
        if self.ended {
            // Drained sinks cannot resume; start the track over.
            self.paused = false;
            self.rebuild_at(Duration::ZERO);
            return;
        }
        if let Some(s) = self.sink.as_ref() {
            s.play();
            self.paused = false;
        }
    }

    fn pause(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            s.pause();
        }
        self.paused = true;
    }

    fn stop(&mut self) {
        self.drop_sink();
        self.loaded = None;
        self.paused = true;
        self.ended = false;
        self.offset = Duration::ZERO;
    }

    fn seek(&mut self, position: Duration) {
        if self.loaded.is_none() {
            return;
        }
        // Scrubbing: rebuild the current sink and skip into the file.
        self.rebuild_at(position);
        if self.loaded.is_some() {
            self.emit(PlayerEvent::PositionChanged(position));
        }
    }

    fn relocate(&mut self, path: PathBuf) {
        if self.loaded.is_some() {
            debug!(path = %path.display(), "loaded file renamed");
            self.loaded = Some(path);
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(s) = self.sink.as_ref() {
            s.set_volume(volume);
        }
    }

    /// Periodic work: report position or detect end of media.
    /// Returns `false` once nobody listens to events anymore.
    fn tick(&mut self) -> bool {
        let Some(s) = self.sink.as_ref() else {
            return true;
        };
        if self.paused || self.ended {
            return true;
        }
        if s.empty() {
            self.ended = true;
            self.paused = true;
            debug!("end of media");
            return self.emit(PlayerEvent::EndOfMedia);
        }
        self.emit(PlayerEvent::PositionChanged(self.position()))
    }

    fn fade_out(&self, fade_out_ms: u64) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        if fade_out_ms == 0 || self.paused {
            sink.set_volume(0.0);
            return;
        }
        let steps: u64 = 20;
        let step_ms = (fade_out_ms / steps).max(1);
        for step in 1..=steps {
            let t = step as f32 / steps as f32;
            sink.set_volume(self.volume * (1.0 - t));
            thread::sleep(Duration::from_millis(step_ms));
        }
        sink.set_volume(0.0);
    }
}

/// Spawn the audio thread. `ready` receives `Ok(())` once the output device is
/// open, or the reason it could not be opened.
pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    events: Sender<AppEvent>,
    ready: Sender<Result<(), String>>,
    volume: f32,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new().name("audio".into()).spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "no audio output device");
                let _ = ready.send(Err(e.to_string()));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);
        let _ = ready.send(Ok(()));

        let mut playback = Playback {
            stream,
            sink: None,
            loaded: None,
            generation: 0,
            offset: Duration::ZERO,
            paused: true,
            ended: false,
            volume,
            events,
        };

        loop {
            match rx.recv_timeout(TICK) {
                Ok(cmd) => match cmd {
                    AudioCmd::Load { path, generation } => playback.load(path, generation),
                    AudioCmd::Play => playback.play(),
                    AudioCmd::Pause => playback.pause(),
                    AudioCmd::Stop => playback.stop(),
                    AudioCmd::Seek(position) => playback.seek(position),
                    AudioCmd::SetVolume(v) => playback.set_volume(v),
                    AudioCmd::Relocate(path) => playback.relocate(path),
                    AudioCmd::Quit { fade_out_ms } => {
                        // Fade out gently before stopping.
                        playback.fade_out(fade_out_ms);
                        playback.stop();
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => {
                    if !playback.tick() {
                        break;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        debug!("audio thread exiting");
    })
}
