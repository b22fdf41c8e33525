//! MPRIS service so desktop media keys and `playerctl` can drive the player.
//!
//! The D-Bus side runs on its own thread. Method calls are turned into
//! [`ControlCmd`]s on the main event channel; properties are served from a
//! small snapshot the main loop keeps up to date through [`MprisHandle`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc::Sender};

use async_io::{Timer, block_on};
use tracing::{debug, info, warn};
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::event::AppEvent;
use crate::library::Track;
use crate::playlist::PlaybackState;

const BUS_NAME: &str = "org.mpris.MediaPlayer2.arrivo";
const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const NO_TRACK: &str = "/org/mpris/MediaPlayer2/TrackList/NoTrack";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
}

#[derive(Debug, Default)]
struct SharedState {
    playback: PlaybackState,
    track_id: Option<OwnedObjectPath>,
    title: Option<String>,
    url: Option<String>,
    length_micros: Option<i64>,
}

/// Main-loop side of the service.
#[derive(Clone)]
pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
}

impl MprisHandle {
    pub fn set_playback(&self, playback: PlaybackState) {
        if let Ok(mut s) = self.state.lock() {
            s.playback = playback;
        }
    }

    /// Publish the current track, or clear everything with `None`.
    pub fn set_track(&self, index: Option<usize>, track: Option<&Track>) {
        let Ok(mut s) = self.state.lock() else {
            return;
        };

        let Some(track) = track else {
            s.track_id = None;
            s.title = None;
            s.url = None;
            s.length_micros = None;
            return;
        };

        s.track_id = index.and_then(|i| {
            ObjectPath::try_from(format!("{OBJECT_PATH}/track/{i}"))
                .ok()
                .map(OwnedObjectPath::from)
        });
        s.title = Some(track.title.clone());
        s.url = Some(format!("file://{}", track.path.display()));
        s.length_micros = track
            .duration
            .map(|d| i64::try_from(d.as_micros()).unwrap_or(i64::MAX));
    }
}

struct RootIface {
    tx: Sender<AppEvent>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // Nothing to raise in a terminal.
    }

    fn quit(&self) {
        send(&self.tx, ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "arrivo"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<AppEvent>,
    state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        send(&self.tx, ControlCmd::Next);
    }

    fn previous(&self) {
        send(&self.tx, ControlCmd::Prev);
    }

    fn play(&self) {
        send(&self.tx, ControlCmd::Play);
    }

    fn pause(&self) {
        send(&self.tx, ControlCmd::Pause);
    }

    fn play_pause(&self) {
        send(&self.tx, ControlCmd::PlayPause);
    }

    fn stop(&self) {
        send(&self.tx, ControlCmd::Stop);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.playback {
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        let track_id = match &s.track_id {
            Some(p) => p.clone().into_inner(),
            None => ObjectPath::from_static_str_unchecked(NO_TRACK),
        };
        insert(&mut map, "mpris:trackid", Value::from(track_id));
        if let Some(title) = &s.title {
            insert(&mut map, "xesam:title", Value::from(title.as_str()));
        }
        if let Some(url) = &s.url {
            insert(&mut map, "xesam:url", Value::from(url.as_str()));
        }
        if let Some(length) = s.length_micros {
            insert(&mut map, "mpris:length", Value::from(length));
        }
        map
    }
}

fn send(tx: &Sender<AppEvent>, cmd: ControlCmd) {
    debug!(?cmd, "mpris command");
    let _ = tx.send(AppEvent::Control(cmd));
}

fn insert(map: &mut HashMap<String, OwnedValue>, key: &str, value: Value<'_>) {
    if let Ok(v) = OwnedValue::try_from(value) {
        map.insert(key.to_string(), v);
    }
}

/// Register the service on the session bus from a background thread.
///
/// Bus failures are logged and leave the player running without media keys.
pub fn spawn_mpris(tx: Sender<AppEvent>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let state_for_thread = state.clone();

    let spawned = std::thread::Builder::new()
        .name("mpris".into())
        .spawn(move || {
            block_on(async move {
                let connection = match Connection::session().await {
                    Ok(c) => c,
                    Err(e) => {
                        warn!(error = %e, "MPRIS: failed to connect to session bus");
                        return;
                    }
                };

                if let Err(e) = connection.request_name(BUS_NAME).await {
                    warn!(error = %e, "MPRIS: failed to acquire name");
                    return;
                }

                let object_server = connection.object_server();

                if let Err(e) = object_server
                    .at(OBJECT_PATH, RootIface { tx: tx.clone() })
                    .await
                {
                    warn!(error = %e, "MPRIS: failed to register root iface");
                    return;
                }

                if let Err(e) = object_server
                    .at(
                        OBJECT_PATH,
                        PlayerIface {
                            tx,
                            state: state_for_thread,
                        },
                    )
                    .await
                {
                    warn!(error = %e, "MPRIS: failed to register player iface");
                    return;
                }

                info!(name = BUS_NAME, "MPRIS service registered");

                // Keep the service alive.
                loop {
                    Timer::after(std::time::Duration::from_secs(3600)).await;
                }
            });
        });

    if let Err(e) = spawned {
        warn!(error = %e, "MPRIS: failed to start thread");
    }

    MprisHandle { state }
}
