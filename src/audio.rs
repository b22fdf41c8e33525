//! Playback driver: the `PlaybackDriver` seam used by the playlist controller
//! and its rodio-backed implementation running on a dedicated audio thread.

mod driver;
mod player;
mod sink;
mod thread;
mod types;

pub use driver::PlaybackDriver;
pub use player::AudioPlayer;
pub use types::PlayerEvent;

#[cfg(test)]
pub use driver::testing;
