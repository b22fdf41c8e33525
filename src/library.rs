//! Track model and everything that touches audio files on disk: extension
//! filtering, tag titles, the save marker and the initial directory scan.

mod marker;
mod model;
mod scan;
mod tags;

pub use marker::{is_saved, toggled_save_path};
pub use model::Track;
pub use scan::{AUDIO_EXTENSIONS, is_audio_file, scan_recent};
