mod common;

use std::time::Duration;

use common::{bound, FakeViewport};
use serde_json::json;
use slicelens::cine::{frame_interval, MIN_INTERVAL};
use slicelens::prefs::Preferences;
use slicelens::{OverlayEngine, Settings};

fn engine() -> OverlayEngine {
    OverlayEngine::new(Settings::default(), Preferences::in_memory())
}

#[test]
fn stepping_wraps_at_both_ends() {
    let mut engine = engine();
    let mut viewport = FakeViewport::new("CT", 5).with_index(4);

    engine.step_forward(bound(&mut viewport));
    assert_eq!(viewport.index, 0);
    engine.step_backward(bound(&mut viewport));
    assert_eq!(viewport.index, 4);
}

#[test]
fn full_cycle_of_ticks_returns_to_start() {
    let mut engine = engine();
    let mut viewport = FakeViewport::new("CT", 6).with_index(2);

    assert!(engine.toggle_cine(bound(&mut viewport)));
    let Some(timer) = engine.cine_timer() else {
        panic!("cine should be armed");
    };
    for _ in 0..6 {
        engine.cine_tick(timer.id, bound(&mut viewport));
    }
    assert_eq!(viewport.index, 2);
}

#[test]
fn ticks_keep_the_overlay_on_the_current_slice() {
    let mut engine = engine();
    let mut viewport = FakeViewport::new("CT", 3).with_index(0);
    engine.ingest_json(&json!([{ "id": "a", "label": "Mass", "sliceIndex": 1, "bbox": [0.1, 0.1, 0.2, 0.2] }]));
    engine.poll(bound(&mut viewport));
    assert!(engine.scene().is_empty());

    engine.toggle_cine(bound(&mut viewport));
    let timer = engine.cine_timer().map(|timer| timer.id).unwrap_or_default();
    engine.cine_tick(timer, bound(&mut viewport));
    assert_eq!(viewport.index, 1);
    assert_eq!(engine.scene().len(), 1);
}

#[test]
fn frame_interval_follows_fps_with_a_floor() {
    assert_eq!(frame_interval(12, MIN_INTERVAL), Duration::from_millis(83));
    assert_eq!(frame_interval(30, MIN_INTERVAL), Duration::from_millis(33));
    assert_eq!(frame_interval(500, MIN_INTERVAL), Duration::from_millis(33));
    assert_eq!(
        frame_interval(30, Duration::from_millis(50)),
        Duration::from_millis(50)
    );
}

#[test]
fn changing_fps_retires_the_running_timer() {
    let mut engine = engine();
    let mut viewport = FakeViewport::new("CT", 4);
    engine.toggle_cine(bound(&mut viewport));
    let Some(old) = engine.cine_timer() else {
        panic!("cine should be armed");
    };

    engine.set_cine_fps(24);
    let Some(new) = engine.cine_timer() else {
        panic!("cine should stay armed");
    };
    assert_ne!(old.id, new.id);
    assert_eq!(new.interval, Duration::from_millis(42));

    engine.cine_tick(old.id, bound(&mut viewport));
    assert_eq!(viewport.index, 0);
    engine.cine_tick(new.id, bound(&mut viewport));
    assert_eq!(viewport.index, 1);
}

#[test]
fn fps_changes_while_stopped_do_not_arm() {
    let mut engine = engine();
    engine.set_cine_fps(0);
    assert_eq!(engine.cine().fps(), 1);
    assert!(engine.cine_timer().is_none());
}

#[test]
fn empty_stack_cannot_play() {
    let mut engine = engine();
    let mut viewport = FakeViewport::new("CT", 0);
    assert!(!engine.toggle_cine(bound(&mut viewport)));
    assert!(engine.cine_timer().is_none());
}

#[test]
fn stopping_ignores_late_ticks() {
    let mut engine = engine();
    let mut viewport = FakeViewport::new("CT", 4);
    engine.toggle_cine(bound(&mut viewport));
    let id = engine.cine_timer().map(|timer| timer.id).unwrap_or_default();

    assert!(!engine.toggle_cine(bound(&mut viewport)));
    assert!(!engine.cine().is_playing());
    engine.cine_tick(id, bound(&mut viewport));
    assert_eq!(viewport.index, 0);
}

#[test]
fn tick_without_viewport_stops_playback() {
    let mut engine = engine();
    let mut viewport = FakeViewport::new("CT", 4);
    engine.toggle_cine(bound(&mut viewport));
    let id = engine.cine_timer().map(|timer| timer.id).unwrap_or_default();

    engine.cine_tick(id, None);
    assert!(!engine.cine().is_playing());
}

#[test]
fn counter_and_scene_follow_engine_moves_before_the_next_poll() {
    let mut engine = engine();
    let mut viewport = FakeViewport::new("CT", 10).with_index(4);
    engine.poll(bound(&mut viewport));
    assert_eq!(engine.slice_counter(), "5 / 10");

    engine.step_forward(bound(&mut viewport));
    assert_eq!(viewport.index, 5);
    assert_eq!(engine.slice_counter(), "6 / 10");
    assert_eq!(engine.current_index(), 5);

    engine.ingest_json(&json!([{ "id": "n", "label": "Nodule", "sliceIndex": 5, "bbox": [0.1, 0.1, 0.2, 0.2] }]));
    assert_eq!(engine.scene().len(), 1);

    engine.toggle_cine(bound(&mut viewport));
    let timer = engine.cine_timer().map(|timer| timer.id).unwrap_or_default();
    engine.cine_tick(timer, bound(&mut viewport));
    assert_eq!(engine.slice_counter(), "7 / 10");
    assert!(engine.scene().is_empty());
}
