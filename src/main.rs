mod app;
mod audio;
mod config;
mod error;
mod event;
mod library;
mod logging;
mod mpris;
mod playlist;
mod runtime;
mod ui;
mod watcher;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
