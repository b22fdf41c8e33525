//! Everything that can wake the main loop besides a key press.
//!
//! The watcher, audio and MPRIS threads never touch playlist state; they only
//! send one of these over the shared channel, and the main loop applies them
//! one at a time.

use std::path::PathBuf;

use crate::audio::PlayerEvent;
use crate::mpris::ControlCmd;

#[derive(Debug)]
pub enum AppEvent {
    /// The directory watcher saw a new audio file.
    FileCreated(PathBuf),
    /// A report from the audio thread about the source loaded as `generation`.
    Player { generation: u64, event: PlayerEvent },
    /// A desktop media-control request.
    Control(ControlCmd),
}
