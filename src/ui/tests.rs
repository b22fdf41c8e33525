use super::*;
use std::path::PathBuf;

fn track(name: &str, title: &str) -> Track {
    Track {
        path: PathBuf::from(format!("/music/{name}")),
        title: title.to_string(),
        duration: None,
    }
}

#[test]
fn format_mmss_pads_seconds_only() {
    assert_eq!(format_mmss(Duration::from_secs(0)), "0:00");
    assert_eq!(format_mmss(Duration::from_secs(65)), "1:05");
    assert_eq!(format_mmss(Duration::from_secs(3600)), "60:00");
}

#[test]
fn time_text_handles_unknown_total() {
    assert_eq!(
        time_text(Duration::from_secs(3), Some(Duration::from_secs(200))),
        "0:03 / 3:20"
    );
    assert_eq!(time_text(Duration::from_secs(3), None), "0:03 / --:--");
}

#[test]
fn labels_mark_saved_tracks() {
    assert_eq!(track_label(&track("a.mp3", "A")), "♪ A");
    assert_eq!(track_label(&track("++a.mp3", "A")), "♪ A [saved]");
}

#[test]
fn window_keeps_selection_visible() {
    assert_eq!(visible_window(5, 4, 10), (0, 5));
    assert_eq!(visible_window(100, 0, 10), (0, 10));
    assert_eq!(visible_window(100, 50, 10), (45, 55));
    assert_eq!(visible_window(100, 99, 10), (90, 100));
}

#[test]
fn controls_mention_scrub_step() {
    assert!(controls_text(7).contains("[H/L] scrub -/+7s"));
}
