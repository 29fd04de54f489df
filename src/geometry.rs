use serde_json::{Map, Value};

/// Pixel dimensions assumed when the viewport cannot report its own.
pub const FALLBACK_DIMS: ImageDims = ImageDims {
    columns: 512,
    rows: 512,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDims {
    pub columns: u32,
    pub rows: u32,
}

impl Default for ImageDims {
    fn default() -> Self {
        FALLBACK_DIMS
    }
}

/// Axis-aligned box in normalized image space, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CanonicalRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl CanonicalRect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn is_degenerate(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    fn clamped(self) -> Self {
        Self {
            x: self.x.clamp(0.0, 1.0),
            y: self.y.clamp(0.0, 1.0),
            w: self.w.clamp(0.0, 1.0),
            h: self.h.clamp(0.0, 1.0),
        }
    }

    /// Keyed `{x, y, w, h}` form, accepted back by [`normalize`].
    pub fn to_value(&self) -> Value {
        serde_json::json!({ "x": self.x, "y": self.y, "w": self.w, "h": self.h })
    }
}

/// Which raw encoding a bounding box uses.
///
/// Four-entry sequences are ambiguous by construction: `[x1, y1, x2, y2]` is
/// picked whenever `x2 > x1 && y2 > y1`, which also matches plenty of valid
/// `[x, y, w, h]` boxes. Such cases are marked `ambiguous` so callers can
/// report them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoxEncoding {
    ArrayXywh([f64; 4]),
    ArrayCorners { corners: [f64; 4], ambiguous: bool },
    KeyedXywh([f64; 4]),
    KeyedCorners([f64; 4]),
    Invalid,
}

impl BoxEncoding {
    pub fn resolve(raw: &Value) -> Self {
        match raw {
            Value::Array(items) => Self::from_sequence(items),
            Value::Object(fields) => Self::from_fields(fields),
            _ => Self::Invalid,
        }
    }

    fn from_sequence(items: &[Value]) -> Self {
        if items.len() < 4 {
            return Self::Invalid;
        }

        let mut parsed = Vec::with_capacity(items.len());
        for item in items {
            match number(item) {
                Some(value) => parsed.push(value),
                None => return Self::Invalid,
            }
        }

        let values = [parsed[0], parsed[1], parsed[2], parsed[3]];
        let [x1, y1, x2, y2] = values;
        if items.len() == 4 && x2 > x1 && y2 > y1 {
            return Self::ArrayCorners {
                corners: values,
                ambiguous: reads_as_xywh(values),
            };
        }

        Self::ArrayXywh(values)
    }

    fn from_fields(fields: &Map<String, Value>) -> Self {
        let x = field(fields, &["x", "left", "x1"]);
        let y = field(fields, &["y", "top", "y1"]);
        let w = field(fields, &["w", "width"]);
        let h = field(fields, &["h", "height"]);

        if let (Some(x), Some(y), Some(w), Some(h)) = (x, y, w, h) {
            return Self::KeyedXywh([x, y, w, h]);
        }

        let x2 = field(fields, &["x2"]);
        let y2 = field(fields, &["y2"]);
        match (x, y, x2, y2) {
            (Some(x), Some(y), Some(x2), Some(y2)) if x2 > x && y2 > y => {
                Self::KeyedCorners([x, y, x2, y2])
            }
            _ => Self::Invalid,
        }
    }

    /// `[x, y, w, h]` for every valid encoding.
    pub fn to_xywh(&self) -> Option<[f64; 4]> {
        match *self {
            Self::ArrayXywh(values) | Self::KeyedXywh(values) => Some(values),
            Self::ArrayCorners {
                corners: [x1, y1, x2, y2],
                ..
            }
            | Self::KeyedCorners([x1, y1, x2, y2]) => Some([x1, y1, x2 - x1, y2 - y1]),
            Self::Invalid => None,
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::ArrayCorners { ambiguous: true, .. })
    }
}

/// Converts any accepted raw bounding box into a [`CanonicalRect`].
///
/// Boxes whose largest component is at most `1.0` are taken as already
/// normalized; anything else is treated as pixels and divided by `dims`.
/// Returns `None` when no consistent field set is present.
pub fn normalize(raw: &Value, dims: ImageDims) -> Option<CanonicalRect> {
    normalize_encoding(&BoxEncoding::resolve(raw), dims)
}

pub fn normalize_encoding(encoding: &BoxEncoding, dims: ImageDims) -> Option<CanonicalRect> {
    let [x, y, w, h] = encoding.to_xywh()?;
    let rect = if x.max(y).max(w).max(h) <= 1.0 {
        CanonicalRect::new(x, y, w, h)
    } else {
        let columns = f64::from(dims.columns.max(1));
        let rows = f64::from(dims.rows.max(1));
        CanonicalRect::new(x / columns, y / rows, w / columns, h / rows)
    };
    Some(rect.clamped())
}

fn reads_as_xywh([x, y, w, h]: [f64; 4]) -> bool {
    if w <= 0.0 || h <= 0.0 {
        return false;
    }
    x.max(y).max(w).max(h) > 1.0 || (x + w <= 1.0 && y + h <= 1.0)
}

fn field(fields: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .find_map(|key| fields.get(*key).filter(|value| !value.is_null()))
        .and_then(number)
}

/// Finite number from a JSON number or a numeric string.
pub(crate) fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_strings_are_accepted() {
        assert_eq!(number(&json!(" 12.5 ")), Some(12.5));
        assert_eq!(number(&json!("abc")), None);
        assert_eq!(number(&json!(true)), None);
        assert_eq!(number(&Value::Null), None);
    }

    #[test]
    fn short_or_non_numeric_sequences_are_invalid() {
        assert_eq!(BoxEncoding::resolve(&json!([1, 2, 3])), BoxEncoding::Invalid);
        assert_eq!(
            BoxEncoding::resolve(&json!([1, 2, "x", 4])),
            BoxEncoding::Invalid
        );
        assert_eq!(BoxEncoding::resolve(&json!("0,0,1,1")), BoxEncoding::Invalid);
    }

    #[test]
    fn longer_sequences_never_use_corner_form() {
        assert_eq!(
            BoxEncoding::resolve(&json!([10, 20, 30, 40, 0.9])),
            BoxEncoding::ArrayXywh([10.0, 20.0, 30.0, 40.0])
        );
    }

    #[test]
    fn keyed_aliases_resolve_in_order() {
        let encoding = BoxEncoding::resolve(&json!({
            "left": 5, "top": 6, "width": 7, "height": 8, "x1": 100
        }));
        assert_eq!(encoding, BoxEncoding::KeyedXywh([5.0, 6.0, 7.0, 8.0]));
    }

    #[test]
    fn keyed_corners_need_positive_extent() {
        assert_eq!(
            BoxEncoding::resolve(&json!({ "x1": 10, "y1": 10, "x2": 5, "y2": 20 })),
            BoxEncoding::Invalid
        );
    }

    #[test]
    fn corner_form_flags_xywh_lookalikes() {
        let encoding = BoxEncoding::resolve(&json!([0.1, 0.1, 0.3, 0.3]));
        assert!(encoding.is_ambiguous());

        let encoding = BoxEncoding::resolve(&json!([0.5, 0.5, 0.9, 0.9]));
        assert!(!encoding.is_ambiguous());
    }

    #[test]
    fn pixel_boxes_divide_by_dimensions() {
        let rect = normalize(&json!([100, 50, 200, 25]), ImageDims { columns: 1000, rows: 500 })
            .unwrap_or_default();
        assert!((rect.x - 0.1).abs() < 1e-9);
        assert!((rect.y - 0.1).abs() < 1e-9);
        assert!((rect.w - 0.2).abs() < 1e-9);
        assert!((rect.h - 0.05).abs() < 1e-9);
    }
}
