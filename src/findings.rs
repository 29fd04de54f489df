use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::IngestError;
use crate::geometry::number;

/// Which slices a finding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SliceAssignment {
    /// No slice given; the finding shows on every slice.
    #[default]
    All,
    Slice(i64),
    /// A slice was given but is not an integer. Matches no slice.
    Invalid,
}

impl SliceAssignment {
    /// Absent, null and empty values mean every slice.
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(value) = value.filter(|value| !value.is_null()) else {
            return Self::All;
        };
        if value.as_str() == Some("") {
            return Self::All;
        }
        match number(value) {
            Some(index) if index.fract() == 0.0 => Self::Slice(index as i64),
            _ => Self::Invalid,
        }
    }

    pub fn matches(self, slice: usize) -> bool {
        match self {
            Self::All => true,
            Self::Slice(index) => i64::try_from(slice).is_ok_and(|slice| slice == index),
            Self::Invalid => false,
        }
    }

    pub fn index(self) -> Option<i64> {
        match self {
            Self::Slice(index) => Some(index),
            Self::All | Self::Invalid => None,
        }
    }
}

/// A detected region of interest.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub id: String,
    pub label: String,
    pub score: Option<f64>,
    pub slice_index: SliceAssignment,
    pub bbox: Value,
}

impl Finding {
    pub fn visible_on(&self, slice: usize) -> bool {
        self.slice_index.matches(slice)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FindingStore {
    findings: Vec<Finding>,
}

impl FindingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards everything held and keeps `findings` as given.
    pub fn replace_all(&mut self, findings: Vec<Finding>) {
        self.findings = findings;
    }

    /// Findings assigned to `slice` or to no slice, in ingestion order.
    pub fn finds_for_slice(&self, slice: usize) -> Vec<&Finding> {
        self.findings
            .iter()
            .filter(|finding| finding.visible_on(slice))
            .collect()
    }

    pub fn all(&self) -> &[Finding] {
        &self.findings
    }

    pub fn get(&self, id: &str) -> Option<&Finding> {
        self.findings.iter().find(|finding| finding.id == id)
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Distinct lower-cased labels, sorted.
    pub fn unique_labels(&self) -> Vec<String> {
        self.findings
            .iter()
            .map(|finding| finding.label.to_lowercase())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn query<'a>(&'a self, query: &FindingQuery) -> Vec<&'a Finding> {
        self.findings
            .iter()
            .filter(|finding| query.matches(finding))
            .collect()
    }
}

/// Side-list search box and label filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindingQuery {
    pub search: String,
    /// Lower-cased label to keep; `None` keeps all.
    pub label: Option<String>,
}

impl FindingQuery {
    pub fn matches(&self, finding: &Finding) -> bool {
        let label = finding.label.to_lowercase();
        if let Some(wanted) = &self.label {
            if label != wanted.trim().to_lowercase() {
                return false;
            }
        }

        let needle = self.search.trim().to_lowercase();
        needle.is_empty() || label.contains(&needle) || finding.id.to_lowercase().contains(&needle)
    }
}

pub fn score_badge(score: Option<f64>) -> String {
    match score {
        Some(score) => format!("{}%", (score * 100.0).round()),
        None => String::from("NA"),
    }
}

pub fn slice_caption(slice: SliceAssignment) -> String {
    match slice.index() {
        Some(slice) => format!("Slice {slice}"),
        None => String::from("Slice NA"),
    }
}

const LIST_KEYS: [&str; 5] = ["findings", "detections", "predictions", "results", "output"];

/// Accepts a bare array of records or an object wrapping one under a known
/// key, tolerating the field names common detectors emit.
pub fn parse_findings(payload: &Value) -> Vec<Finding> {
    let records = match payload {
        Value::Array(items) => items.as_slice(),
        Value::Object(root) => LIST_KEYS
            .iter()
            .find_map(|key| root.get(*key).filter(|value| !value.is_null()))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    };

    records
        .iter()
        .enumerate()
        .map(|(idx, record)| finding_from_record(record, idx))
        .collect()
}

pub fn load_findings_file(path: &Path) -> Result<Vec<Finding>, IngestError> {
    let contents = fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let payload: Value = serde_json::from_str(&contents)?;
    let findings = parse_findings(&payload);
    log::info!("Read {} finding(s) from {}", findings.len(), path.display());
    Ok(findings)
}

fn finding_from_record(record: &Value, idx: usize) -> Finding {
    let empty = Map::new();
    let fields = record.as_object().unwrap_or(&empty);

    let id = first_present(fields, &["id", "uid", "nameId"])
        .map(text_of)
        .unwrap_or_else(|| format!("f{}", idx + 1));
    let label = first_present(fields, &["label", "type", "class", "name"])
        .map(text_of)
        .unwrap_or_else(|| String::from("Finding"));
    let score = ["score", "confidence", "prob"]
        .iter()
        .find_map(|key| fields.get(*key).and_then(Value::as_f64));
    let slice_index =
        SliceAssignment::from_value(first_present(fields, &["sliceIndex", "slice", "z", "frame"]));
    let bbox = first_present(fields, &["bbox", "box", "boundingBox"])
        .cloned()
        .unwrap_or(Value::Null);

    Finding {
        id,
        label,
        score,
        slice_index,
        bbox,
    }
}

fn first_present<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| fields.get(*key).filter(|value| !value.is_null()))
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn badges_and_captions() {
        assert_eq!(score_badge(Some(0.874)), "87%");
        assert_eq!(score_badge(None), "NA");
        assert_eq!(slice_caption(SliceAssignment::Slice(4)), "Slice 4");
        assert_eq!(slice_caption(SliceAssignment::All), "Slice NA");
        assert_eq!(slice_caption(SliceAssignment::Invalid), "Slice NA");
    }

    #[test]
    fn negative_slice_never_matches() {
        let finding = Finding {
            id: "a".into(),
            label: "x".into(),
            score: None,
            slice_index: SliceAssignment::Slice(-1),
            bbox: Value::Null,
        };
        assert!(!finding.visible_on(0));
    }

    #[test]
    fn malformed_slice_matches_no_slice() {
        let findings = parse_findings(&json!([
            { "id": "frac", "sliceIndex": 2.5 },
            { "id": "junk", "sliceIndex": "abc" },
            { "id": "blank", "sliceIndex": "" },
            { "id": "null", "sliceIndex": null },
            { "id": "text", "slice": "3" },
        ]));
        let assignments: Vec<SliceAssignment> =
            findings.iter().map(|finding| finding.slice_index).collect();
        assert_eq!(
            assignments,
            vec![
                SliceAssignment::Invalid,
                SliceAssignment::Invalid,
                SliceAssignment::All,
                SliceAssignment::All,
                SliceAssignment::Slice(3),
            ]
        );

        let mut store = FindingStore::new();
        store.replace_all(findings);
        for slice in 0..6 {
            let ids: Vec<&str> = store
                .finds_for_slice(slice)
                .iter()
                .map(|finding| finding.id.as_str())
                .collect();
            assert!(!ids.contains(&"frac") && !ids.contains(&"junk"), "{ids:?}");
            assert!(ids.contains(&"blank") && ids.contains(&"null"));
        }
        assert_eq!(store.query(&FindingQuery::default()).len(), 5);
    }

    #[test]
    fn non_list_payloads_yield_nothing() {
        assert!(parse_findings(&json!({ "status": "ok" })).is_empty());
        assert!(parse_findings(&json!("findings")).is_empty());
        assert!(parse_findings(&json!({ "findings": {} })).is_empty());
    }
}
