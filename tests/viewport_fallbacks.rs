mod common;

use common::{bound, FakeViewport, ScrollOnlyViewport};
use dicom::dictionary_std::tags;
use serde_json::json;
use slicelens::geometry::FALLBACK_DIMS;
use slicelens::prefs::Preferences;
use slicelens::window_level::{VoiRange, WindowLevel};
use slicelens::{ImageDims, Modality, OverlayEngine, Settings, Viewport, ViewportAdapter};

struct BareViewport;

impl ViewportAdapter for BareViewport {}

fn scroll_only(size: usize, position: usize) -> ScrollOnlyViewport {
    ScrollOnlyViewport {
        ids: (0..size).map(|idx| format!("img-{idx}")).collect(),
        position,
        ..ScrollOnlyViewport::default()
    }
}

#[test]
fn bare_adapter_resolves_to_defaults() {
    let mut adapter = BareViewport;
    let mut viewport = Viewport::new(&mut adapter);

    assert_eq!(viewport.current_index(), 0);
    assert_eq!(viewport.stack_size(), 0);
    assert_eq!(viewport.image_identity(), None);
    assert_eq!(viewport.image_dimensions(), FALLBACK_DIMS);
    assert_eq!(viewport.windowing(), None);
    assert_eq!(viewport.modality(), Modality::Other);
    assert!(!viewport.apply_windowing(WindowLevel::new(400.0, 40.0)));
    assert!(!viewport.set_index(1));
    assert!(!viewport.reset_properties());
}

#[test]
fn secondary_accessors_fill_in() {
    let mut adapter = scroll_only(4, 2);
    let viewport = Viewport::new(&mut adapter);

    assert_eq!(viewport.current_index(), 2);
    assert_eq!(viewport.stack_size(), 4);
    assert_eq!(viewport.image_identity().as_deref(), Some("img-2"));
}

#[test]
fn dimensions_fall_back_to_tags() {
    let mut adapter = scroll_only(1, 0);
    adapter.tags.insert(tags::ROWS, String::from("256"));
    adapter.tags.insert(tags::COLUMNS, String::from(" 128 "));
    let viewport = Viewport::new(&mut adapter);
    assert_eq!(
        viewport.image_dimensions(),
        ImageDims {
            columns: 128,
            rows: 256
        }
    );

    let mut adapter = scroll_only(1, 0);
    adapter.tags.insert(tags::ROWS, String::from("0"));
    adapter.tags.insert(tags::COLUMNS, String::from("128"));
    assert_eq!(Viewport::new(&mut adapter).image_dimensions(), FALLBACK_DIMS);
}

#[test]
fn modality_falls_back_to_tag() {
    let mut adapter = scroll_only(1, 0);
    adapter.tags.insert(tags::MODALITY, String::from("MR"));
    assert_eq!(Viewport::new(&mut adapter).modality(), Modality::Mr);
}

#[test]
fn voi_range_is_preferred_for_windowing() {
    let mut adapter = scroll_only(1, 0);
    adapter.voi = Some(VoiRange {
        lower: -160.0,
        upper: 240.0,
    });
    let mut viewport = Viewport::new(&mut adapter);
    assert_eq!(viewport.windowing(), Some(WindowLevel::new(400.0, 40.0)));

    assert!(viewport.apply_windowing(WindowLevel::new(1500.0, -600.0)));
    assert_eq!(
        adapter.voi,
        Some(VoiRange {
            lower: -1350.0,
            upper: 150.0
        })
    );
}

#[test]
fn inverted_voi_reads_as_no_window() {
    let mut adapter = scroll_only(1, 0);
    adapter.voi = Some(VoiRange {
        lower: 10.0,
        upper: 10.0,
    });
    assert_eq!(Viewport::new(&mut adapter).windowing(), None);
}

#[test]
fn set_index_falls_back_to_scrolling() {
    let mut adapter = scroll_only(5, 1);
    let mut viewport = Viewport::new(&mut adapter);
    assert!(viewport.set_index(4));
    assert!(!viewport.set_index(9));
    assert_eq!(adapter.position, 4);
}

#[test]
fn engine_drives_a_scroll_only_viewport() {
    let mut engine = OverlayEngine::new(Settings::default(), Preferences::in_memory());
    let mut adapter = scroll_only(5, 0);
    engine.ingest_json(&json!([{ "id": "f", "label": "Mass", "sliceIndex": 3, "bbox": [0.2, 0.2, 0.1, 0.1] }]));
    engine.poll(bound(&mut adapter));

    assert!(engine.jump_to_finding("f", bound(&mut adapter)));
    assert_eq!(adapter.position, 3);
    assert_eq!(engine.scene().len(), 1);
    assert_eq!(engine.slice_counter(), "4 / 5");

    let outcome = engine.poll(bound(&mut adapter));
    assert!(outcome.hud_refresh);
    assert_eq!(engine.slice_counter(), "4 / 5");
}

#[test]
fn apply_renders_after_setting() {
    let mut adapter = FakeViewport::new("CT", 2);
    let mut viewport = Viewport::new(&mut adapter);
    assert!(!viewport.apply_windowing(WindowLevel::new(0.0, 40.0)));
    assert!(viewport.apply_windowing(WindowLevel::new(80.0, 40.0)));
    assert_eq!(adapter.renders, 1);
    assert_eq!(adapter.applied, vec![WindowLevel::new(80.0, 40.0)]);
}
