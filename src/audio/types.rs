//! Audio-related small types.
//!
//! Commands flow from the main thread to the audio thread; `PlayerEvent`s
//! flow back through the application event channel.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug)]
pub enum AudioCmd {
    /// Replace the current source with `path`, paused at the start.
    Load { path: PathBuf, generation: u64 },
    /// Start or resume playback of the loaded source.
    Play,
    /// Pause playback, keeping the position.
    Pause,
    /// Drop the current source entirely.
    Stop,
    /// Jump to an absolute position in the loaded source.
    Seek(Duration),
    /// The loaded file now lives at this path.
    Relocate(PathBuf),
    /// Output volume, `0.0..=1.0`.
    SetVolume(f32),
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// Notifications emitted by the audio thread.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    PositionChanged(Duration),
    DurationChanged(Duration),
    /// The loaded source played to its end.
    EndOfMedia,
    LoadFailed { path: PathBuf, reason: String },
}

/// Counter tagging each `Load` so events from a replaced source can be told
/// apart from events about the current one.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Generations {
    current: u64,
}

impl Generations {
    pub(crate) fn bump(&mut self) -> u64 {
        self.current = self.current.wrapping_add(1);
        self.current
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.current == generation
    }
}
