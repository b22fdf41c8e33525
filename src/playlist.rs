//! The playlist controller: ordered tracks, the current-index pointer, loop
//! mode and play order, and the rules for moving between them.

mod confirm;
mod controller;
mod types;

pub use confirm::{DELETE_CONFIRM_WINDOW, DELETE_REPEAT_GUARD, DeleteConfirm};
pub use controller::{Controller, DeleteClick, PREVIOUS_RESTART_THRESHOLD};
pub use types::{Direction, LoopMode, PlayOrder, PlaybackState, wrap_index};

#[cfg(test)]
mod tests;
