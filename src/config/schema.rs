use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::playlist::{LoopMode, PlayOrder};

pub const DEFAULT_VOLUME: f32 = 0.7;
pub const DEFAULT_INITIAL_SONGS: usize = 50;
pub const MAX_INITIAL_SONGS: usize = 1000;

/// Persisted player settings.
///
/// File format: JSON
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/arrivo/config.json` or `~/.config/arrivo/config.json`
///
/// ```json
/// {
///   "target_directory": "/home/me/Downloads",
///   "loop_mode": 1,
///   "play_order": 0,
///   "volume": 0.7,
///   "initial_songs_count": 50
/// }
/// ```
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `ARRIVO__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_directory: Option<PathBuf>,
    pub loop_mode: LoopMode,
    pub play_order: PlayOrder,
    /// Output volume, `0.0..=1.0`.
    pub volume: f32,
    /// How many of the most recent files the initial load keeps.
    pub initial_songs_count: usize,
    pub audio: AudioSettings,
    pub controls: ControlsSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_directory: None,
            loop_mode: LoopMode::NoLoop,
            play_order: PlayOrder::OldestToNewest,
            volume: DEFAULT_VOLUME,
            initial_songs_count: DEFAULT_INITIAL_SONGS,
            audio: AudioSettings::default(),
            controls: ControlsSettings::default(),
        }
    }
}

impl Settings {
    /// Clamp out-of-range values instead of rejecting the whole document.
    pub fn normalized(mut self) -> Self {
        if !(0.0..=1.0).contains(&self.volume) || self.volume.is_nan() {
            warn!(volume = self.volume, "volume out of range, clamping");
            self.volume = if self.volume.is_nan() {
                DEFAULT_VOLUME
            } else {
                self.volume.clamp(0.0, 1.0)
            };
        }
        if self.initial_songs_count == 0 || self.initial_songs_count > MAX_INITIAL_SONGS {
            warn!(
                count = self.initial_songs_count,
                "initial_songs_count out of range, clamping"
            );
            self.initial_songs_count = self.initial_songs_count.clamp(1, MAX_INITIAL_SONGS);
        }
        if self.controls.volume_step <= 0.0 || self.controls.volume_step > 1.0 {
            self.controls.volume_step = ControlsSettings::default().volume_step;
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            quit_fade_out_ms: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
    /// Volume change per `+` / `-` press.
    pub volume_step: f32,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            scrub_seconds: 5,
            volume_step: 0.05,
        }
    }
}
