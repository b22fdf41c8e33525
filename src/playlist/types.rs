//! Small enums shared by the playlist controller, the UI and the config.

use serde::{Deserialize, Serialize};

/// What happens when the active track finishes.
///
/// Persisted as `0`, `1`, `2`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LoopMode {
    /// Stop once the far end of the playlist is reached.
    #[default]
    NoLoop,
    /// Wrap around to the other end of the playlist.
    LoopPlaylist,
    /// Repeat the current track.
    LoopSingle,
}

impl LoopMode {
    /// `NoLoop -> LoopPlaylist -> LoopSingle -> NoLoop`.
    pub fn cycled(self) -> Self {
        match self {
            Self::NoLoop => Self::LoopPlaylist,
            Self::LoopPlaylist => Self::LoopSingle,
            Self::LoopSingle => Self::NoLoop,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::NoLoop => "No-loop",
            Self::LoopPlaylist => "Loop playlist",
            Self::LoopSingle => "Repeat one",
        }
    }
}

impl TryFrom<u8> for LoopMode {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::NoLoop),
            1 => Ok(Self::LoopPlaylist),
            2 => Ok(Self::LoopSingle),
            other => Err(format!("invalid loop_mode {other}, expected 0, 1 or 2")),
        }
    }
}

impl From<LoopMode> for u8 {
    fn from(m: LoopMode) -> Self {
        match m {
            LoopMode::NoLoop => 0,
            LoopMode::LoopPlaylist => 1,
            LoopMode::LoopSingle => 2,
        }
    }
}

/// Traversal convention through the playlist, which is stored newest-first.
///
/// `OldestToNewest` starts at index 0 and `Next` walks towards higher indices;
/// `NewestToOldest` starts at the last index and `Next` walks towards 0.
/// Persisted as `0`, `1`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PlayOrder {
    #[default]
    OldestToNewest,
    NewestToOldest,
}

impl PlayOrder {
    pub fn toggled(self) -> Self {
        match self {
            Self::OldestToNewest => Self::NewestToOldest,
            Self::NewestToOldest => Self::OldestToNewest,
        }
    }

    /// Index playback starts from in a playlist of `len` tracks.
    pub fn start_index(self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        match self {
            Self::OldestToNewest => Some(0),
            Self::NewestToOldest => Some(len - 1),
        }
    }

    /// Index at which a non-looping traversal stops.
    pub fn far_end_index(self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        match self {
            Self::OldestToNewest => Some(len - 1),
            Self::NewestToOldest => Some(0),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::OldestToNewest => "Oldest to newest",
            Self::NewestToOldest => "Newest to oldest",
        }
    }
}

impl TryFrom<u8> for PlayOrder {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::OldestToNewest),
            1 => Ok(Self::NewestToOldest),
            other => Err(format!("invalid play_order {other}, expected 0 or 1")),
        }
    }
}

impl From<PlayOrder> for u8 {
    fn from(o: PlayOrder) -> Self {
        match o {
            PlayOrder::OldestToNewest => 0,
            PlayOrder::NewestToOldest => 1,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

impl Direction {
    /// Signed index step for this direction under `order`.
    ///
    /// `Next` always moves away from the play-order start, so `Next` then
    /// `Previous` lands back on the same index.
    pub fn step(self, order: PlayOrder) -> isize {
        match (self, order) {
            (Self::Next, PlayOrder::OldestToNewest) => 1,
            (Self::Previous, PlayOrder::OldestToNewest) => -1,
            (Self::Next, PlayOrder::NewestToOldest) => -1,
            (Self::Previous, PlayOrder::NewestToOldest) => 1,
        }
    }
}

/// Wrapping index arithmetic over a playlist of `len` tracks.
pub fn wrap_index(index: usize, step: isize, len: usize) -> usize {
    debug_assert!(len > 0);
    let len = len as isize;
    ((index as isize + step).rem_euclid(len)) as usize
}

/// The transport state as last commanded by the controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}
