use std::path::PathBuf;

use crate::audio::PlaybackDriver;
use crate::mpris::MprisHandle;
use crate::playlist::{Controller, PlaybackState};

pub fn update_mpris<D: PlaybackDriver>(mpris: &MprisHandle, controller: &Controller<D>) {
    mpris.set_track(controller.current_index(), controller.current_track());
    mpris.set_playback(controller.state());
}

/// What was last published, so the snapshot is only rebuilt on change.
#[derive(Debug, Default)]
pub struct MprisSync {
    track: Option<PathBuf>,
    playback: PlaybackState,
    index: Option<usize>,
}

impl MprisSync {
    /// Publish if the current track, its index or the transport state changed.
    /// Returns `true` when something was published.
    pub fn sync<D: PlaybackDriver>(&mut self, mpris: &MprisHandle, controller: &Controller<D>) -> bool {
        let track = controller.current_track().map(|t| t.path.clone());
        let index = controller.current_index();
        let playback = controller.state();
        if track == self.track && index == self.index && playback == self.playback {
            return false;
        }

        update_mpris(mpris, controller);
        self.track = track;
        self.index = index;
        self.playback = playback;
        true
    }
}
