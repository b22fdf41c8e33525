use std::env;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{error, info};

use crate::app::App;
use crate::audio::AudioPlayer;
use crate::config::ConfigStore;
use crate::event::AppEvent;
use crate::playlist::Controller;

mod event_loop;
mod mpris_sync;
mod settings;
mod startup;

/// How long shutdown waits for the watcher thread.
const WATCHER_GRACE: Duration = Duration::from_millis(500);

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let _log_guard = match crate::logging::init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("arrivo: logging disabled: {e}");
            None
        }
    };

    let store = ConfigStore::from_env();
    let settings = settings::load_settings(store.as_ref());
    let cli_dir = env::args_os().nth(1).map(PathBuf::from);
    info!(config = ?store.as_ref().map(|s| s.path()), "starting");

    let (tx, rx) = mpsc::channel::<AppEvent>();
    let player = AudioPlayer::new(tx.clone(), settings.volume).inspect_err(|e| {
        error!(error = %e, "cannot open audio output");
    })?;

    let mut controller = Controller::new(player, settings, store);
    let mut app = App::new();
    let watcher = startup::open_initial_directory(&mut controller, &mut app, cli_dir, &tx);
    let mpris = crate::mpris::spawn_mpris(tx.clone());

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = event_loop::EventLoopState::new(watcher);
    let run_result = event_loop::run(
        &mut terminal,
        &mut app,
        &mut controller,
        &mpris,
        &tx,
        &rx,
        &mut state,
    );

    let fade_out = Duration::from_millis(controller.settings().audio.quit_fade_out_ms);
    controller.driver_mut().quit_softly(fade_out);
    if let Some(watcher) = state.watcher.take() {
        watcher.stop(WATCHER_GRACE);
    }
    controller.persist();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("bye");
    run_result
}
