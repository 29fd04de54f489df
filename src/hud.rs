use dicom::core::Tag;
use dicom::dictionary_std::tags;

use crate::adapter::Viewport;
use crate::findings::FindingStore;
use crate::modality::Modality;

pub const HUD_FINDINGS_LIMIT: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudField {
    pub key: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudFinding {
    pub id: String,
    pub label: String,
    pub caption: String,
    pub target_slice: usize,
}

const HUD_TAGS: [(&str, Tag); 10] = [
    ("Patient", tags::PATIENT_NAME),
    ("Patient ID", tags::PATIENT_ID),
    ("Study Date", tags::STUDY_DATE),
    ("Study", tags::STUDY_DESCRIPTION),
    ("Series", tags::SERIES_DESCRIPTION),
    ("Modality", tags::MODALITY),
    ("Series No", tags::SERIES_NUMBER),
    ("Instance No", tags::INSTANCE_NUMBER),
    ("Slice Thick", tags::SLICE_THICKNESS),
    ("Pixel Spacing", tags::PIXEL_SPACING),
];

/// Metadata of the current image; missing values read `--`.
pub fn hud_fields(viewport: &Viewport<'_>) -> Vec<HudField> {
    HUD_TAGS
        .iter()
        .map(|&(key, tag)| {
            let raw = viewport.tag_text(tag);
            let value = if tag == tags::STUDY_DATE {
                raw.map(|date| format_dicom_date(&date))
            } else if tag == tags::MODALITY {
                raw.map(|modality| Modality::classify(&modality).to_string())
            } else {
                raw
            };
            HudField {
                key,
                value: value.unwrap_or_else(|| String::from("--")),
            }
        })
        .collect()
}

/// `YYYYMMDD` becomes `YYYY-MM-DD`; anything else is returned trimmed.
pub fn format_dicom_date(raw: &str) -> String {
    let value = raw.trim();
    if value.len() == 8 && value.bytes().all(|byte| byte.is_ascii_digit()) {
        format!("{}-{}-{}", &value[0..4], &value[4..6], &value[6..8])
    } else {
        value.to_string()
    }
}

/// Findings on `current`, captioned `S<n>` (1-based) plus score.
pub fn hud_findings(store: &FindingStore, current: usize) -> Vec<HudFinding> {
    store
        .finds_for_slice(current)
        .into_iter()
        .take(HUD_FINDINGS_LIMIT)
        .map(|finding| {
            let slice = finding
                .slice_index
                .index()
                .and_then(|slice| usize::try_from(slice).ok())
                .unwrap_or(current);
            let score = finding
                .score
                .map(|score| format!(" {}%", (score * 100.0).round() as i64))
                .unwrap_or_default();
            HudFinding {
                id: finding.id.clone(),
                label: finding.label.clone(),
                caption: format!("S{}{score}", slice + 1),
                target_slice: slice,
            }
        })
        .collect()
}

/// `"<current+1> / <total>"`, or `"-- / --"` without a stack.
pub fn slice_counter(current: usize, total: usize) -> String {
    if total == 0 {
        return String::from("-- / --");
    }
    format!("{} / {total}", current.min(total - 1) + 1)
}
