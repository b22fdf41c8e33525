use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use filetime::{FileTime, set_file_mtime};
use tempfile::TempDir;

use super::*;
use crate::audio::testing::{DriverCall, RecordingDriver};
use crate::config::{ConfigStore, Settings};
use crate::error::Error;

/// Create `names` in a fresh directory; the first name gets the newest mtime.
fn dir_with(names: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let base = SystemTime::now() - Duration::from_secs(3600);
    for (age, name) in names.iter().enumerate() {
        let path = dir.path().join(name);
        fs::write(&path, b"not really audio").unwrap();
        let mtime = base - Duration::from_secs(age as u64 * 10);
        set_file_mtime(&path, FileTime::from_system_time(mtime)).unwrap();
    }
    dir
}

fn controller(settings: Settings) -> Controller<RecordingDriver> {
    Controller::new(RecordingDriver::default(), settings, None)
}

/// Controller loaded from a directory holding `names`, driver log cleared.
fn loaded(names: &[&str], settings: Settings) -> (TempDir, Controller<RecordingDriver>) {
    let dir = dir_with(names);
    let mut c = controller(settings);
    c.load_initial(dir.path(), 50).unwrap();
    c.driver_mut().take();
    (dir, c)
}

fn names(c: &Controller<RecordingDriver>) -> Vec<String> {
    c.tracks().iter().map(|t| t.file_name().to_string()).collect()
}

fn current_name(c: &Controller<RecordingDriver>) -> Option<String> {
    c.current_track().map(|t| t.file_name().to_string())
}

fn order(play_order: PlayOrder) -> Settings {
    Settings {
        play_order,
        ..Settings::default()
    }
}

fn looping(loop_mode: LoopMode) -> Settings {
    Settings {
        loop_mode,
        ..Settings::default()
    }
}

#[test]
fn wrap_index_wraps_both_ways() {
    assert_eq!(wrap_index(2, 1, 3), 0);
    assert_eq!(wrap_index(0, -1, 3), 2);
    assert_eq!(wrap_index(1, 1, 3), 2);
    assert_eq!(wrap_index(0, 1, 1), 0);
}

#[test]
fn initial_load_keeps_newest_and_loads_start_without_playing() {
    let dir = dir_with(&["file3.mp3", "file2.mp3", "file1.mp3"]);
    let mut c = controller(Settings::default());
    c.driver_mut().take();

    c.load_initial(dir.path(), 2).unwrap();

    assert_eq!(names(&c), vec!["file3.mp3", "file2.mp3"]);
    assert_eq!(c.current_index(), Some(0));
    assert_eq!(c.state(), PlaybackState::Stopped);
    assert_eq!(
        c.driver_mut().take(),
        vec![DriverCall::Load(dir.path().join("file3.mp3"))]
    );
}

#[test]
fn newest_to_oldest_starts_at_the_last_index() {
    let (_dir, c) = loaded(&["c.mp3", "b.mp3", "a.mp3"], order(PlayOrder::NewestToOldest));
    assert_eq!(c.current_index(), Some(2));
    assert_eq!(current_name(&c).as_deref(), Some("a.mp3"));
}

#[test]
fn empty_directory_leaves_nothing_current() {
    let (_dir, mut c) = loaded(&[], Settings::default());
    assert!(c.tracks().is_empty());
    assert_eq!(c.current_index(), None);

    c.advance(Direction::Next);
    c.toggle_play_pause();
    assert!(c.driver_mut().take().is_empty());
    assert_eq!(c.state(), PlaybackState::Stopped);
}

#[test]
fn reload_keeps_the_current_file_current() {
    let (dir, mut c) = loaded(&["b.mp3", "a.mp3"], Settings::default());
    c.play_index(1).unwrap();

    let newer = dir.path().join("new.mp3");
    fs::write(&newer, b"x").unwrap();
    c.load_initial(dir.path(), 50).unwrap();

    assert_eq!(c.tracks().len(), 3);
    assert_eq!(current_name(&c).as_deref(), Some("a.mp3"));
}

#[test]
fn next_then_previous_is_identity_in_both_orders() {
    for play_order in [PlayOrder::OldestToNewest, PlayOrder::NewestToOldest] {
        let (_dir, mut c) = loaded(&["d.mp3", "c.mp3", "b.mp3", "a.mp3"], order(play_order));
        for start in 0..4 {
            c.play_index(start).unwrap();
            c.advance(Direction::Next);
            assert_ne!(c.current_index(), Some(start));
            c.advance(Direction::Previous);
            assert_eq!(c.current_index(), Some(start), "{play_order:?} from {start}");
        }
    }
}

#[test]
fn next_follows_play_order() {
    let (_dir, mut c) = loaded(&["c.mp3", "b.mp3", "a.mp3"], Settings::default());
    c.advance(Direction::Next);
    assert_eq!(c.current_index(), Some(1));

    let (_dir, mut c) = loaded(&["c.mp3", "b.mp3", "a.mp3"], order(PlayOrder::NewestToOldest));
    c.advance(Direction::Next);
    assert_eq!(c.current_index(), Some(1));
    c.advance(Direction::Next);
    assert_eq!(c.current_index(), Some(0));
}

#[test]
fn manual_next_wraps_at_the_far_end() {
    let (dir, mut c) = loaded(&["b.mp3", "a.mp3"], Settings::default());
    c.play_index(1).unwrap();
    c.driver_mut().take();

    c.advance(Direction::Next);

    assert_eq!(c.current_index(), Some(0));
    assert_eq!(
        c.driver_mut().take(),
        vec![DriverCall::Load(dir.path().join("b.mp3")), DriverCall::Play]
    );
    assert_eq!(c.state(), PlaybackState::Playing);
}

#[test]
fn previous_late_in_a_track_restarts_it() {
    let (_dir, mut c) = loaded(&["b.mp3", "a.mp3"], Settings::default());
    c.play_index(1).unwrap();
    c.driver_mut().take();

    c.on_position_changed(Duration::from_millis(5000));
    c.advance(Direction::Previous);

    assert_eq!(c.current_index(), Some(1));
    assert_eq!(c.driver_mut().take(), vec![DriverCall::Seek(Duration::ZERO)]);
    assert_eq!(c.position(), Duration::ZERO);
}

#[test]
fn previous_early_in_a_track_steps_back() {
    let (_dir, mut c) = loaded(&["b.mp3", "a.mp3"], Settings::default());
    c.play_index(1).unwrap();

    c.on_position_changed(PREVIOUS_RESTART_THRESHOLD);
    c.advance(Direction::Previous);

    assert_eq!(c.current_index(), Some(0));
}

#[test]
fn loop_single_restarts_on_next_and_at_the_end() {
    let (_dir, mut c) = loaded(&["b.mp3", "a.mp3"], looping(LoopMode::LoopSingle));
    c.toggle_play_pause();
    c.driver_mut().take();

    c.advance(Direction::Next);
    assert_eq!(c.current_index(), Some(0));
    assert_eq!(
        c.driver_mut().take(),
        vec![DriverCall::Seek(Duration::ZERO), DriverCall::Play]
    );

    c.end_of_media();
    assert_eq!(c.current_index(), Some(0));
    assert_eq!(
        c.driver_mut().take(),
        vec![DriverCall::Seek(Duration::ZERO), DriverCall::Play]
    );
    assert_eq!(c.state(), PlaybackState::Playing);
}

#[test]
fn no_loop_stops_at_the_far_end() {
    let (_dir, mut c) = loaded(&["b.mp3", "a.mp3"], Settings::default());
    c.toggle_play_pause();

    c.end_of_media();
    assert_eq!(c.current_index(), Some(1));
    assert_eq!(c.state(), PlaybackState::Playing);
    c.driver_mut().take();

    c.end_of_media();
    assert_eq!(c.current_index(), Some(1));
    assert_eq!(c.state(), PlaybackState::Stopped);
    assert!(c.driver_mut().take().is_empty());
}

#[test]
fn no_loop_far_end_follows_play_order() {
    let (_dir, mut c) = loaded(&["b.mp3", "a.mp3"], order(PlayOrder::NewestToOldest));
    c.toggle_play_pause();

    c.end_of_media();
    assert_eq!(c.current_index(), Some(0));
    c.end_of_media();
    assert_eq!(c.current_index(), Some(0));
    assert_eq!(c.state(), PlaybackState::Stopped);
}

#[test]
fn loop_playlist_wraps_at_the_end() {
    let (_dir, mut c) = loaded(&["b.mp3", "a.mp3"], looping(LoopMode::LoopPlaylist));
    c.play_index(1).unwrap();

    c.end_of_media();

    assert_eq!(c.current_index(), Some(0));
    assert_eq!(c.state(), PlaybackState::Playing);
}

#[test]
fn play_pause_toggles_without_reloading() {
    let (dir, mut c) = loaded(&["a.mp3"], Settings::default());

    c.toggle_play_pause();
    c.toggle_play_pause();
    c.toggle_play_pause();

    assert_eq!(
        c.driver_mut().take(),
        vec![DriverCall::Play, DriverCall::Pause, DriverCall::Play]
    );

    c.stop();
    c.driver_mut().take();
    c.toggle_play_pause();
    assert_eq!(
        c.driver_mut().take(),
        vec![DriverCall::Load(dir.path().join("a.mp3")), DriverCall::Play]
    );
}

#[test]
fn play_index_out_of_range_is_an_error() {
    let (_dir, mut c) = loaded(&["a.mp3"], Settings::default());
    assert!(matches!(c.play_index(1), Err(Error::IndexOutOfRange(1))));
    assert_eq!(c.current_index(), Some(0));
}

#[test]
fn seek_is_clamped_to_duration_and_needs_a_source() {
    let mut c = controller(Settings::default());
    c.seek(Duration::from_secs(5));
    assert_eq!(c.driver_mut().take(), vec![DriverCall::SetVolume(0.7)]);

    let (_dir, mut c) = loaded(&["a.mp3"], Settings::default());
    c.on_duration_changed(Duration::from_secs(10));
    c.seek(Duration::from_secs(30));
    c.seek_by(-4);

    assert_eq!(
        c.driver_mut().take(),
        vec![
            DriverCall::Seek(Duration::from_secs(10)),
            DriverCall::Seek(Duration::from_secs(6)),
        ]
    );
}

#[test]
fn merge_prepends_and_keeps_the_current_track() {
    let (dir, mut c) = loaded(&["b.mp3", "a.mp3"], Settings::default());
    c.play_index(1).unwrap();
    c.driver_mut().take();

    let new = dir.path().join("new.mp3");
    fs::write(&new, b"x").unwrap();
    assert!(c.merge_discovered(new.clone()));

    assert_eq!(names(&c), vec!["new.mp3", "b.mp3", "a.mp3"]);
    assert_eq!(c.current_index(), Some(2));
    assert_eq!(current_name(&c).as_deref(), Some("a.mp3"));
    assert!(c.driver_mut().take().is_empty());
}

#[test]
fn merging_the_same_path_twice_is_a_no_op() {
    let (dir, mut c) = loaded(&["a.mp3"], Settings::default());
    let new = dir.path().join("new.mp3");
    fs::write(&new, b"x").unwrap();

    assert!(c.merge_discovered(new.clone()));
    assert!(!c.merge_discovered(new));
    assert_eq!(c.tracks().len(), 2);
}

#[test]
fn merge_into_an_empty_playlist_starts_playing() {
    let (dir, mut c) = loaded(&[], Settings::default());
    let new = dir.path().join("first.flac");
    fs::write(&new, b"x").unwrap();

    assert!(c.merge_discovered(new.clone()));

    assert_eq!(c.current_index(), Some(0));
    assert_eq!(c.state(), PlaybackState::Playing);
    assert_eq!(
        c.driver_mut().take(),
        vec![DriverCall::Load(new), DriverCall::Play]
    );
}

#[test]
fn merge_ignores_vanished_and_non_audio_files() {
    let (dir, mut c) = loaded(&["a.mp3"], Settings::default());

    assert!(!c.merge_discovered(dir.path().join("gone.mp3")));

    let notes = dir.path().join("notes.txt");
    fs::write(&notes, b"x").unwrap();
    assert!(!c.merge_discovered(notes));

    assert_eq!(c.tracks().len(), 1);
}

#[test]
fn toggling_save_twice_restores_the_name() {
    let (dir, mut c) = loaded(&["song.mp3"], Settings::default());
    let original = dir.path().join("song.mp3");
    let saved = dir.path().join("++song.mp3");

    assert_eq!(c.toggle_save(0).unwrap(), saved);
    assert!(saved.is_file());
    assert!(!original.exists());
    assert!(c.tracks()[0].is_saved());
    assert_eq!(c.tracks()[0].title, "song");

    assert_eq!(c.toggle_save_current().unwrap(), original);
    assert!(original.is_file());
    assert!(!saved.exists());
    assert!(!c.tracks()[0].is_saved());
}

#[test]
fn saving_the_loaded_track_does_not_reload_it() {
    let (dir, mut c) = loaded(&["song.mp3"], Settings::default());
    c.toggle_play_pause();
    c.toggle_save(0).unwrap();
    c.driver_mut().take();

    c.toggle_play_pause();
    c.toggle_play_pause();

    assert_eq!(c.driver_mut().take(), vec![DriverCall::Pause, DriverCall::Play]);
    assert!(dir.path().join("++song.mp3").is_file());
}

#[test]
fn saving_the_loaded_track_tells_the_driver_its_new_name() {
    let (dir, mut c) = loaded(&["song.mp3"], Settings::default());
    c.toggle_play_pause();
    c.driver_mut().take();

    let saved = c.toggle_save(0).unwrap();
    c.seek(Duration::from_secs(5));

    assert_eq!(saved, dir.path().join("++song.mp3"));
    assert_eq!(
        c.driver_mut().take(),
        vec![
            DriverCall::Relocate(saved.clone()),
            DriverCall::Seek(Duration::from_secs(5)),
        ]
    );

    c.toggle_save(0).unwrap();
    assert_eq!(
        c.driver_mut().take(),
        vec![DriverCall::Relocate(dir.path().join("song.mp3"))]
    );
}

#[test]
fn saving_a_track_that_is_not_loaded_leaves_the_driver_alone() {
    let (_dir, mut c) = loaded(&["b.mp3", "a.mp3"], Settings::default());
    c.toggle_save(1).unwrap();
    assert!(c.driver_mut().take().is_empty());
}

#[test]
fn any_current_load_failure_drops_the_source() {
    let (dir, mut c) = loaded(&["song.mp3"], Settings::default());
    c.toggle_play_pause();
    c.driver_mut().take();

    c.on_load_failed(&dir.path().join("something else.mp3"));
    assert_eq!(c.state(), PlaybackState::Stopped);

    c.toggle_play_pause();
    assert_eq!(
        c.driver_mut().take(),
        vec![
            DriverCall::Load(dir.path().join("song.mp3")),
            DriverCall::Play,
        ]
    );
}

#[test]
fn first_duration_report_fills_in_missing_tags() {
    let (_dir, mut c) = loaded(&["song.mp3"], Settings::default());
    assert_eq!(c.current_track().unwrap().duration, None);

    c.on_duration_changed(Duration::from_secs(180));

    let track = c.current_track().unwrap();
    assert_eq!(track.duration, Some(Duration::from_secs(180)));
    assert_eq!(track.title, "song");
}

#[test]
fn save_fails_cleanly() {
    let (dir, mut c) = loaded(&["song.mp3"], Settings::default());
    assert!(matches!(c.toggle_save(3), Err(Error::IndexOutOfRange(3))));

    fs::write(dir.path().join("++song.mp3"), b"x").unwrap();
    assert!(matches!(c.toggle_save(0), Err(Error::NameTaken(_))));

    fs::remove_file(dir.path().join("song.mp3")).unwrap();
    assert!(matches!(c.toggle_save(0), Err(Error::MissingFile(_))));
    assert_eq!(names(&c), vec!["song.mp3"]);
}

#[test]
fn double_click_within_the_window_deletes() {
    let (dir, mut c) = loaded(&["b.mp3", "a.mp3"], Settings::default());
    let target = dir.path().join("b.mp3");
    let t0 = Instant::now();

    assert_eq!(
        c.handle_delete_click(t0).unwrap(),
        DeleteClick::Armed(target.clone())
    );
    assert_eq!(c.pending_delete(t0), Some(target.as_path()));
    assert_eq!(
        c.handle_delete_click(t0 + Duration::from_millis(400)).unwrap(),
        DeleteClick::Deleted(target.clone())
    );

    assert!(!target.exists());
    assert_eq!(names(&c), vec!["a.mp3"]);
    assert_eq!(c.current_index(), Some(0));
    assert_eq!(c.driver().last_loaded(), Some(dir.path().join("a.mp3").as_path()));
    assert_eq!(c.state(), PlaybackState::Stopped);
}

#[test]
fn slow_second_click_only_rearms() {
    let (dir, mut c) = loaded(&["a.mp3"], Settings::default());
    let t0 = Instant::now();

    c.handle_delete_click(t0).unwrap();
    let second = c
        .handle_delete_click(t0 + Duration::from_millis(1500))
        .unwrap();

    assert!(matches!(second, DeleteClick::Armed(_)));
    assert!(dir.path().join("a.mp3").is_file());
    assert_eq!(c.tracks().len(), 1);
}

#[test]
fn clicks_on_different_tracks_do_not_confirm() {
    let (dir, mut c) = loaded(&["b.mp3", "a.mp3"], Settings::default());
    let t0 = Instant::now();

    c.handle_delete_click(t0).unwrap();
    c.advance(Direction::Next);
    let second = c
        .handle_delete_click(t0 + Duration::from_millis(200))
        .unwrap();

    assert_eq!(second, DeleteClick::Armed(dir.path().join("a.mp3")));
    assert!(dir.path().join("a.mp3").is_file());
    assert!(dir.path().join("b.mp3").is_file());
}

#[test]
fn held_key_repeats_never_confirm() {
    let mut confirm = DeleteConfirm::default();
    let path = Path::new("/music/a.mp3");
    let t0 = Instant::now();

    assert!(!confirm.click(path, t0));
    for i in 1..=20 {
        assert!(!confirm.click(path, t0 + Duration::from_millis(i * 30)));
    }
    assert_eq!(confirm.armed(t0 + Duration::from_millis(600)), Some(path));

    let released = t0 + Duration::from_millis(600) + DELETE_REPEAT_GUARD;
    assert!(confirm.click(path, released));
}

#[test]
fn delete_confirm_window_is_inclusive() {
    let mut confirm = DeleteConfirm::default();
    let path = Path::new("/music/a.mp3");
    let t0 = Instant::now();

    assert!(!confirm.click(path, t0));
    assert!(confirm.click(path, t0 + DELETE_CONFIRM_WINDOW));
    assert_eq!(confirm.armed(t0 + DELETE_CONFIRM_WINDOW), None);
}

#[test]
fn deleting_the_only_track_empties_the_playlist() {
    let (dir, mut c) = loaded(&["a.mp3"], Settings::default());
    c.toggle_play_pause();

    let removed = c.delete_current().unwrap();

    assert_eq!(removed, dir.path().join("a.mp3"));
    assert!(c.tracks().is_empty());
    assert_eq!(c.current_index(), None);
    assert_eq!(c.state(), PlaybackState::Stopped);
    assert!(c.driver_mut().take().contains(&DriverCall::Stop));
}

#[test]
fn deleting_the_last_index_clamps() {
    let (_dir, mut c) = loaded(&["c.mp3", "b.mp3", "a.mp3"], Settings::default());
    c.play_index(2).unwrap();

    c.delete_current().unwrap();

    assert_eq!(names(&c), vec!["c.mp3", "b.mp3"]);
    assert_eq!(c.current_index(), Some(1));
}

#[test]
fn saved_tracks_cannot_be_deleted() {
    let (dir, mut c) = loaded(&["++keep.mp3"], Settings::default());

    assert!(matches!(c.delete_current(), Err(Error::Protected(_))));
    assert!(dir.path().join("++keep.mp3").is_file());
    assert_eq!(c.tracks().len(), 1);
}

#[test]
fn failed_removal_keeps_the_entry() {
    let (dir, mut c) = loaded(&["a.mp3"], Settings::default());
    fs::remove_file(dir.path().join("a.mp3")).unwrap();

    assert!(matches!(c.delete_current(), Err(Error::Io { .. })));
    assert_eq!(c.tracks().len(), 1);
    assert_eq!(c.current_index(), Some(0));
}

#[test]
fn loop_mode_cycles_through_all_three() {
    let mut c = controller(Settings::default());
    assert_eq!(c.cycle_loop_mode(), LoopMode::LoopPlaylist);
    assert_eq!(c.cycle_loop_mode(), LoopMode::LoopSingle);
    assert_eq!(c.cycle_loop_mode(), LoopMode::NoLoop);
}

#[test]
fn settings_changes_are_persisted_and_rebuild_the_playlist() {
    let music = dir_with(&["c.mp3", "b.mp3", "a.mp3"]);
    let conf = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(conf.path().join("config.json"));
    let settings = Settings {
        target_directory: Some(music.path().to_path_buf()),
        ..Settings::default()
    };
    let mut c = Controller::new(RecordingDriver::default(), settings, Some(store.clone()));
    c.reload().unwrap();

    c.set_initial_songs_count(2).unwrap();
    assert_eq!(names(&c), vec!["c.mp3", "b.mp3"]);

    c.set_play_order(PlayOrder::NewestToOldest).unwrap();
    c.set_volume(1.5);

    let on_disk: Settings =
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(on_disk.initial_songs_count, 2);
    assert_eq!(on_disk.play_order, PlayOrder::NewestToOldest);
    assert_eq!(on_disk.volume, 1.0);
    assert_eq!(on_disk.target_directory.as_deref(), Some(music.path()));
    assert_eq!(c.driver().calls.last(), Some(&DriverCall::SetVolume(1.0)));
}

#[test]
fn switching_directory_loads_the_new_start() {
    let (_old, mut c) = loaded(&["old.mp3"], Settings::default());
    let new = dir_with(&["y.mp3", "x.mp3"]);

    c.set_target_directory(new.path().to_path_buf()).unwrap();

    assert_eq!(names(&c), vec!["y.mp3", "x.mp3"]);
    assert_eq!(c.current_index(), Some(0));
    assert_eq!(c.driver().last_loaded(), Some(new.path().join("y.mp3").as_path()));
    assert_eq!(c.target_directory(), Some(new.path()));
}

#[test]
fn switching_to_a_missing_directory_changes_nothing() {
    let (old, mut c) = loaded(&["old.mp3"], Settings::default());
    let missing: PathBuf = old.path().join("nope");

    assert!(c.set_target_directory(missing).is_err());
    assert_eq!(names(&c), vec!["old.mp3"]);
    assert_eq!(c.current_index(), Some(0));
    assert_eq!(c.target_directory(), None);
}
