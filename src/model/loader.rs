use super::DicomSlice;
use crate::utils::{first_value, natural_cmp};
use dicom::object::{open_file, DefaultDicomObject};
use slicelens::geometry::ImageDims;
use slicelens::window_level::WindowLevel;
use std::path::PathBuf;
use std::sync::Arc;

/// Loads a series, ordering files by natural filename order
/// (`IM-2.dcm` before `IM-10.dcm`).
pub fn load_series(mut paths: Vec<PathBuf>) -> Vec<Result<DicomSlice, String>> {
    paths.sort_by(|a, b| {
        let a = a.file_name().map(|name| name.to_string_lossy()).unwrap_or_default();
        let b = b.file_name().map(|name| name.to_string_lossy()).unwrap_or_default();
        natural_cmp(&a, &b)
    });

    paths
        .into_iter()
        .flat_map(|path| match load_dicom(path) {
            Ok(slices) => slices.into_iter().map(Ok).collect::<Vec<_>>(),
            Err(err) => vec![Err(err)],
        })
        .collect()
}

pub fn load_dicom(path: PathBuf) -> Result<Vec<DicomSlice>, String> {
    log::info!("Loading DICOM file: {}", path.display());
    let object = open_file(&path).map_err(|err| {
        let message = format!("{}: failed to open DICOM file ({err})", path.display());
        log::error!("{message}");
        message
    })?;

    let sop_instance_uid = attribute_text(&object, "SOPInstanceUID")
        .unwrap_or_else(|| path.display().to_string());
    let modality = attribute_text(&object, "Modality");
    let dims = match (
        attribute_number(&object, "Columns"),
        attribute_number(&object, "Rows"),
    ) {
        (Some(columns), Some(rows)) if columns > 0.0 && rows > 0.0 => Some(ImageDims {
            columns: columns as u32,
            rows: rows as u32,
        }),
        _ => None,
    };
    let file_window = match (
        attribute_number(&object, "WindowWidth"),
        attribute_number(&object, "WindowCenter"),
    ) {
        (Some(width), Some(level)) => {
            Some(WindowLevel::new(width, level)).filter(WindowLevel::is_valid)
        }
        _ => None,
    };
    let frames = attribute_number(&object, "NumberOfFrames")
        .map(|count| count.max(1.0) as u32)
        .unwrap_or(1);

    let object = Arc::new(object);
    Ok((0..frames)
        .map(|frame| DicomSlice {
            file_path: path.clone(),
            object: Arc::clone(&object),
            frame,
            sop_instance_uid: sop_instance_uid.clone(),
            modality: modality.clone(),
            dims,
            file_window,
        })
        .collect())
}

pub fn attribute_text(object: &DefaultDicomObject, name: &str) -> Option<String> {
    object
        .element_by_name(name)
        .ok()
        .and_then(|element| element.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// First value of a numeric attribute (`"40\\400"` reads as 40).
fn attribute_number(object: &DefaultDicomObject, name: &str) -> Option<f64> {
    attribute_text(object, name)
        .and_then(|value| first_value(&value).parse::<f64>().ok())
        .filter(|value| value.is_finite())
}
