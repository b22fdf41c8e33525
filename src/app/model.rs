//! Application model: the UI-side state that is not part of the playlist.
//!
//! The playlist itself lives in the controller; `App` only tracks the list
//! cursor, the modal input state and the status line.

use std::time::{Duration, Instant};

/// How long a status message stays on screen.
pub const STATUS_TTL: Duration = Duration::from_secs(4);

/// Modal input state. Anything but `Normal` captures typed characters.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Editing the target directory path.
    DirectoryPrompt(String),
    /// Editing the initial playlist size.
    Settings(String),
}

/// A submitted modal input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submitted {
    Directory(String),
    InitialSongs(usize),
}

/// The main application model.
#[derive(Debug)]
pub struct App {
    pub selected: usize,
    /// Cursor follows the current track while set.
    pub follow_playback: bool,
    pub mode: InputMode,
    status: Option<(String, Instant)>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            selected: 0,
            follow_playback: true,
            mode: InputMode::Normal,
            status: None,
        }
    }

    /// Move the cursor down, wrapping. Manual movement stops following.
    pub fn next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.follow_playback = false;
        self.selected = (self.selected + 1) % len;
    }

    /// Move the cursor up, wrapping.
    pub fn prev(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.follow_playback = false;
        self.selected = if self.selected == 0 {
            len - 1
        } else {
            self.selected - 1
        };
    }

    /// Snap the cursor to `current` when following, and keep it in range.
    pub fn sync_cursor(&mut self, current: Option<usize>, len: usize) {
        if let (true, Some(i)) = (self.follow_playback, current) {
            self.selected = i;
        }
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some((msg.into(), Instant::now()));
    }

    /// Current status message, if it has not expired at `now`.
    pub fn status(&self, now: Instant) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|(_, at)| now.saturating_duration_since(*at) < STATUS_TTL)
            .map(|(m, _)| m.as_str())
    }

    pub fn is_editing(&self) -> bool {
        self.mode != InputMode::Normal
    }

    pub fn open_directory_prompt(&mut self, initial: String) {
        self.mode = InputMode::DirectoryPrompt(initial);
    }

    pub fn open_settings(&mut self, initial_songs: usize) {
        self.mode = InputMode::Settings(initial_songs.to_string());
    }

    /// Type a character into the open prompt. The settings field takes digits only.
    pub fn push_input(&mut self, c: char) {
        match &mut self.mode {
            InputMode::Normal => {}
            InputMode::DirectoryPrompt(buf) => buf.push(c),
            InputMode::Settings(buf) => {
                if c.is_ascii_digit() && buf.len() < 4 {
                    buf.push(c);
                }
            }
        }
    }

    pub fn pop_input(&mut self) {
        match &mut self.mode {
            InputMode::Normal => {}
            InputMode::DirectoryPrompt(buf) | InputMode::Settings(buf) => {
                buf.pop();
            }
        }
    }

    pub fn cancel_input(&mut self) {
        self.mode = InputMode::Normal;
    }

    /// Close the prompt and return what was entered, if it is usable.
    pub fn submit_input(&mut self) -> Option<Submitted> {
        match std::mem::take(&mut self.mode) {
            InputMode::Normal => None,
            InputMode::DirectoryPrompt(buf) => {
                let trimmed = buf.trim();
                (!trimmed.is_empty()).then(|| Submitted::Directory(trimmed.to_string()))
            }
            InputMode::Settings(buf) => buf
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .map(Submitted::InitialSongs),
        }
    }
}
