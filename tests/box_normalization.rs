use serde_json::json;
use slicelens::geometry::{normalize, BoxEncoding, CanonicalRect, ImageDims};

const DIMS: ImageDims = ImageDims {
    columns: 1000,
    rows: 500,
};

fn close(a: CanonicalRect, b: CanonicalRect) -> bool {
    [(a.x, b.x), (a.y, b.y), (a.w, b.w), (a.h, b.h)]
        .iter()
        .all(|(l, r)| (l - r).abs() < 1e-9)
}

#[test]
fn every_encoding_of_one_pixel_box_agrees() {
    // Pixel box at (300, 200) sized 200x100.
    let expected = CanonicalRect::new(0.3, 0.4, 0.2, 0.2);
    let encodings = [
        json!([300, 200, 200, 100]),
        json!({ "x": 300, "y": 200, "w": 200, "h": 100 }),
        json!({ "left": 300, "top": 200, "width": 200, "height": 100 }),
        json!({ "x1": 300, "y1": 200, "x2": 500, "y2": 300 }),
        json!([300, 200, 500, 300]),
        json!(["300", "200", "200", "100"]),
        json!([300, 200, 200, 100, 0.9]),
    ];

    for raw in &encodings {
        let rect = normalize(raw, DIMS).unwrap_or_default();
        assert!(close(rect, expected), "{raw} normalized to {rect:?}");
    }
}

#[test]
fn four_entry_corners_are_detected() {
    // x2 > x1 and y2 > y1: read as corners.
    let rect = normalize(&json!([100, 50, 300, 150]), DIMS).unwrap_or_default();
    assert!(close(rect, CanonicalRect::new(0.1, 0.1, 0.2, 0.2)));
    assert!(BoxEncoding::resolve(&json!([100, 50, 300, 150])).is_ambiguous());
}

#[test]
fn longer_sequences_are_always_xywh() {
    let rect = normalize(&json!([100, 50, 300, 150, 0.9]), DIMS).unwrap_or_default();
    assert!(close(rect, CanonicalRect::new(0.1, 0.1, 0.3, 0.3)));
}

#[test]
fn normalization_is_idempotent() {
    let raws = [
        json!([0.3, 0.4, 0.2, 0.1]),
        json!([120, 40, 60, 30]),
        json!({ "left": 10, "top": 20, "x2": 110, "y2": 220 }),
        json!({ "x": "0.25", "y": 0.5, "width": 0.5, "height": 0.25 }),
    ];

    for raw in &raws {
        let Some(first) = normalize(raw, DIMS) else {
            panic!("{raw} should normalize");
        };
        let second = normalize(&first.to_value(), DIMS);
        assert_eq!(second, Some(first), "re-normalizing {raw}");
    }
}

#[test]
fn unusable_boxes_normalize_to_nothing() {
    for raw in [
        json!(null),
        json!([1, 2, 3]),
        json!({ "x": 1, "y": 2 }),
        json!({ "x": 10, "y": 10, "x2": 5, "y2": 20 }),
        json!("10,10,20,20"),
    ] {
        assert_eq!(normalize(&raw, DIMS), None, "{raw}");
    }
}

#[test]
fn zero_dimensions_do_not_divide_by_zero() {
    let dims = ImageDims {
        columns: 0,
        rows: 0,
    };
    let rect = normalize(&json!([2, 2, 4, 4]), dims).unwrap_or_default();
    assert!(rect.x.is_finite() && rect.w.is_finite());
    assert!(rect.right() <= 2.0);
}
