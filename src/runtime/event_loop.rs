use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, info, warn};

use crate::app::{App, Submitted};
use crate::audio::{PlaybackDriver, PlayerEvent};
use crate::event::AppEvent;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::playlist::{Controller, DeleteClick, Direction, PlaybackState};
use crate::runtime::mpris_sync::MprisSync;
use crate::runtime::settings::{change_directory, change_initial_songs};
use crate::ui;
use crate::watcher::DirectoryWatcher;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    pub watcher: Option<DirectoryWatcher>,
    mpris_sync: MprisSync,
}

impl EventLoopState {
    pub fn new(watcher: Option<DirectoryWatcher>) -> Self {
        Self {
            watcher,
            mpris_sync: MprisSync::default(),
        }
    }
}

/// Main terminal event loop: applies queued events, draws, and handles keys.
/// Returns `Ok(())` when shutdown is requested.
pub fn run<D: PlaybackDriver>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    controller: &mut Controller<D>,
    mpris: &MprisHandle,
    tx: &mpsc::Sender<AppEvent>,
    rx: &mpsc::Receiver<AppEvent>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Ok(ev) = rx.try_recv() {
            if handle_app_event(ev, app, controller) {
                return Ok(());
            }
        }

        app.sync_cursor(controller.current_index(), controller.tracks().len());
        state.mpris_sync.sync(mpris, controller);

        terminal.draw(|f| ui::draw(f, app, controller, Instant::now()))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, app, controller, &mut state.watcher, tx) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Apply one queued event. Returns `true` when the app should quit.
pub fn handle_app_event<D: PlaybackDriver>(
    ev: AppEvent,
    app: &mut App,
    controller: &mut Controller<D>,
) -> bool {
    match ev {
        AppEvent::FileCreated(path) => {
            if controller.merge_discovered(path) {
                if let Some(track) = controller.tracks().first() {
                    app.set_status(format!("new: {}", track.title));
                }
            }
        }
        AppEvent::Player { generation, event } => {
            if !controller.driver().is_current(generation) {
                debug!(generation, ?event, "dropping stale player event");
                return false;
            }
            handle_player_event(event, app, controller);
        }
        AppEvent::Control(cmd) => return handle_control_cmd(cmd, app, controller),
    }
    false
}

fn handle_player_event<D: PlaybackDriver>(
    event: PlayerEvent,
    app: &mut App,
    controller: &mut Controller<D>,
) {
    match event {
        PlayerEvent::PositionChanged(pos) => controller.on_position_changed(pos),
        PlayerEvent::DurationChanged(total) => controller.on_duration_changed(total),
        PlayerEvent::EndOfMedia => controller.end_of_media(),
        PlayerEvent::LoadFailed { path, reason } => {
            warn!(path = %path.display(), %reason, "playback failed");
            controller.on_load_failed(&path);
            app.set_status(format!("cannot play {}: {reason}", path.display()));
        }
    }
}

/// Transport commands shared by the keyboard and MPRIS. Returns `true` on quit.
pub fn handle_control_cmd<D: PlaybackDriver>(
    cmd: ControlCmd,
    app: &mut App,
    controller: &mut Controller<D>,
) -> bool {
    match cmd {
        ControlCmd::Quit => {
            info!("quit requested");
            return true;
        }
        ControlCmd::Play => {
            if controller.state() != PlaybackState::Playing {
                app.follow_playback_on();
                controller.toggle_play_pause();
            }
        }
        ControlCmd::Pause => {
            if controller.state() == PlaybackState::Playing {
                controller.toggle_play_pause();
            }
        }
        ControlCmd::PlayPause => {
            app.follow_playback_on();
            controller.toggle_play_pause();
        }
        ControlCmd::Stop => controller.stop(),
        ControlCmd::Next => {
            app.follow_playback_on();
            controller.advance(Direction::Next);
        }
        ControlCmd::Prev => {
            app.follow_playback_on();
            controller.advance(Direction::Previous);
        }
    }
    false
}

/// Returns `true` when the app should quit.
pub fn handle_key_event<D: PlaybackDriver>(
    key: KeyEvent,
    app: &mut App,
    controller: &mut Controller<D>,
    watcher: &mut Option<DirectoryWatcher>,
    tx: &mpsc::Sender<AppEvent>,
) -> bool {
    if app.is_editing() {
        match key.code {
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Backspace => app.pop_input(),
            KeyCode::Enter => match app.submit_input() {
                Some(Submitted::Directory(dir)) => {
                    change_directory(controller, app, watcher, tx, &dir);
                }
                Some(Submitted::InitialSongs(n)) => change_initial_songs(controller, app, n),
                None => {}
            },
            KeyCode::Char(c) if !c.is_control() => app.push_input(c),
            _ => {}
        }
        return false;
    }

    let controls = controller.settings().controls.clone();
    let scrub = i64::try_from(controls.scrub_seconds).unwrap_or(i64::MAX);
    let len = controller.tracks().len();

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char(' ') | KeyCode::Char('p') => {
            return handle_control_cmd(ControlCmd::PlayPause, app, controller);
        }
        KeyCode::Char('l') | KeyCode::Right => {
            return handle_control_cmd(ControlCmd::Next, app, controller);
        }
        KeyCode::Char('h') | KeyCode::Left => {
            return handle_control_cmd(ControlCmd::Prev, app, controller);
        }
        KeyCode::Char('L') => controller.seek_by(scrub),
        KeyCode::Char('H') => controller.seek_by(-scrub),
        KeyCode::Char('j') | KeyCode::Down => app.next(len),
        KeyCode::Char('k') | KeyCode::Up => app.prev(len),
        KeyCode::Enter => {
            if len > 0 {
                app.follow_playback_on();
                if let Err(e) = controller.play_index(app.selected) {
                    app.set_status(e.to_string());
                }
            }
        }
        KeyCode::Char('r') => {
            let mode = controller.cycle_loop_mode();
            app.set_status(format!("loop: {}", mode.label()));
        }
        KeyCode::Char('o') => match controller.toggle_play_order() {
            Ok(()) => app.set_status(format!("order: {}", controller.play_order().label())),
            Err(e) => app.set_status(format!("reload failed: {e}")),
        },
        KeyCode::Char('+') | KeyCode::Char('=') => controller.adjust_volume(controls.volume_step),
        KeyCode::Char('-') => controller.adjust_volume(-controls.volume_step),
        KeyCode::Char('s') => match controller.toggle_save_current() {
            Ok(path) => {
                let saved = crate::library::is_saved(&path);
                app.set_status(if saved { "saved" } else { "unsaved" });
            }
            Err(e) => app.set_status(e.to_string()),
        },
        KeyCode::Char('d') => match controller.handle_delete_click(Instant::now()) {
            Ok(DeleteClick::Armed(_)) => app.set_status("press d again to delete"),
            Ok(DeleteClick::Deleted(path)) => {
                let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
                app.set_status(format!("deleted {}", name.unwrap_or_default()));
            }
            Err(e) => app.set_status(e.to_string()),
        },
        KeyCode::Char('f') => {
            let current = controller
                .target_directory()
                .map(|d| d.display().to_string())
                .unwrap_or_default();
            app.open_directory_prompt(current);
        }
        KeyCode::Char(',') => app.open_settings(controller.settings().initial_songs_count),
        _ => {}
    }

    false
}
