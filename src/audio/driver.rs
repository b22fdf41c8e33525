use std::path::Path;
use std::time::Duration;

/// Commands the playlist controller issues to whatever plays audio.
///
/// Every call is fire-and-forget; results come back later as
/// [`PlayerEvent`](super::PlayerEvent)s on the application event channel.
pub trait PlaybackDriver {
    fn load(&mut self, path: &Path);
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    fn seek(&mut self, position: Duration);
    fn set_volume(&mut self, volume: f32);
    /// The loaded file was renamed to `path`. Later reopens (seek, restart)
    /// must use the new name; the source itself is not reloaded.
    fn relocate(&mut self, path: &Path);

    /// Whether a player event tagged `generation` is about the source loaded
    /// last. Events for anything older are stale.
    fn is_current(&self, _generation: u64) -> bool {
        true
    }
}
