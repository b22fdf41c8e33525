//! Utilities for creating `rodio` sinks from files.
//!
//! Opening/decoding is split from sink creation so it can be exercised without
//! an output device.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::error::{Error, Result};

/// Decode `path`, skipping to `start_at`. Also returns the total duration when
/// the decoder knows it.
pub(super) fn open_source(
    path: &Path,
    start_at: Duration,
) -> Result<(impl Source + Send + 'static, Option<Duration>)> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;

    let decoder = Decoder::new(BufReader::new(file)).map_err(|e| Error::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let total = decoder.total_duration();

    // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
    Ok((decoder.skip_duration(start_at), total))
}

/// Create a paused `Sink` for `path` that starts playback at `start_at`.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    path: &Path,
    start_at: Duration,
    volume: f32,
) -> Result<(Sink, Option<Duration>)> {
    let (source, total) = open_source(path, start_at)?;

    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(volume);
    sink.append(source);
    sink.pause();
    Ok((sink, total))
}
