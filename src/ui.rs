//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use std::time::{Duration, Instant};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::{App, InputMode};
use crate::audio::PlaybackDriver;
use crate::library::Track;
use crate::playlist::{Controller, PlaybackState};

const LEFT_PAD: Padding = Padding {
    left: 1,
    right: 0,
    top: 0,
    bottom: 0,
};

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    [
        "[space/p] play/pause".to_string(),
        "[h/l] prev/next".to_string(),
        format!("[H/L] scrub -/+{scrub_seconds}s"),
        "[j/k] up/down".to_string(),
        "[enter] play selected".to_string(),
        "[r] loop mode".to_string(),
        "[o] play order".to_string(),
        "[+/-] volume".to_string(),
        "[s] save".to_string(),
        "[d d] delete".to_string(),
        "[f] folder".to_string(),
        "[,] settings".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

/// Format a `Duration` as `M:SS`.
pub fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Playlist row text: `♪ title`, with saved tracks marked.
pub fn track_label(track: &Track) -> String {
    if track.is_saved() {
        format!("♪ {} [saved]", track.title)
    } else {
        format!("♪ {}", track.title)
    }
}

/// `M:SS / M:SS`, or `--:--` for an unknown total.
fn time_text(position: Duration, total: Option<Duration>) -> String {
    let total = total.map(format_mmss).unwrap_or_else(|| "--:--".to_string());
    format!("{} / {}", format_mmss(position), total)
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(3);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width: width.min(r.width),
        height: height.min(r.height),
    }
}

/// Visible window `[start, end)` over `total` rows that keeps `selected`
/// centered when possible.
fn visible_window(total: usize, selected: usize, height: usize) -> (usize, usize) {
    if total <= height || height == 0 {
        return (0, total);
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

/// Render the entire UI into the provided `frame`.
pub fn draw<D: PlaybackDriver>(
    frame: &mut Frame,
    app: &App,
    controller: &Controller<D>,
    now: Instant,
) {
    let settings = controller.settings();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let dir_text = controller
        .target_directory()
        .map(|d| d.display().to_string())
        .unwrap_or_else(|| "no folder selected, press f".to_string());
    let header = Paragraph::new(dir_text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" arrivo ")
            .title_alignment(Alignment::Center),
    );
    frame.render_widget(header, chunks[0]);

    // Now playing + status
    {
        let state = match controller.state() {
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
            PlaybackState::Stopped => "Stopped",
        };
        let now_playing = match controller.current_track() {
            Some(track) => format!(
                "{state}: {} [{}]",
                track.title,
                time_text(controller.position(), controller.duration())
            ),
            None => "Nothing loaded".to_string(),
        };

        let mut parts = vec![
            format!("PLAYBACK: {}", settings.loop_mode.label()),
            format!("ORDER: {}", settings.play_order.label()),
            format!("VOL: {:.0}%", settings.volume * 100.0),
        ];
        if controller.pending_delete(now).is_some() {
            parts.push("press d again to delete".to_string());
        }
        if let Some(msg) = app.status(now) {
            parts.push(msg.to_string());
        }

        let status = Paragraph::new(vec![
            Line::from(Span::styled(now_playing, Style::default().bold())),
            Line::from(parts.join(" • ")),
        ])
        .block(Block::bordered().padding(LEFT_PAD).title(" status "))
        .wrap(Wrap { trim: true });
        frame.render_widget(status, chunks[1]);
    }

    // Playlist
    {
        let tracks = controller.tracks();
        let current = controller.current_index();
        let (start, end) = visible_window(
            tracks.len(),
            app.selected,
            chunks[2].height.saturating_sub(2) as usize,
        );

        let items: Vec<ListItem> = tracks[start..end]
            .iter()
            .enumerate()
            .map(|(offset, track)| {
                let mut style = Style::default();
                if track.is_saved() {
                    style = style.fg(Color::Green);
                }
                if current == Some(start + offset) {
                    style = style.add_modifier(Modifier::BOLD).fg(Color::Yellow);
                }
                ListItem::new(track_label(track)).style(style)
            })
            .collect();

        let title = format!(" tracks ({}) ", tracks.len());
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        if !tracks.is_empty() {
            state.select(Some(app.selected.saturating_sub(start)));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    // Modal input
    let popup = match &app.mode {
        InputMode::Normal => None,
        InputMode::DirectoryPrompt(buf) => Some((" folder to watch (enter/esc) ", buf)),
        InputMode::Settings(buf) => Some((" initial playlist size (enter/esc) ", buf)),
    };
    if let Some((title, buf)) = popup {
        let area = centered_rect_sized(64, 3, chunks[2]);
        frame.render_widget(Clear, area);
        let input = Paragraph::new(format!("{buf}_")).block(
            Block::default()
                .borders(Borders::ALL)
                .padding(LEFT_PAD)
                .title(title),
        );
        frame.render_widget(input, area);
    }

    let footer = Paragraph::new(controls_text(settings.controls.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(LEFT_PAD),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}

#[cfg(test)]
mod tests;
