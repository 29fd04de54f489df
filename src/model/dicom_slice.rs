use dicom::object::DefaultDicomObject;
use slicelens::geometry::ImageDims;
use slicelens::window_level::WindowLevel;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// One frame of the loaded stack. Multi-frame files yield one slice per frame
/// sharing the same parsed object.
#[derive(Clone)]
pub struct DicomSlice {
    pub file_path: PathBuf,
    pub object: Arc<DefaultDicomObject>,
    pub frame: u32,
    pub sop_instance_uid: String,
    pub modality: Option<String>,
    pub dims: Option<ImageDims>,
    /// Window stored in the file, if any.
    pub file_window: Option<WindowLevel>,
}

impl DicomSlice {
    /// Stable per-frame identity used for change detection.
    pub fn identity(&self) -> String {
        if self.frame == 0 {
            self.sop_instance_uid.clone()
        } else {
            format!("{}#{}", self.sop_instance_uid, self.frame)
        }
    }
}

impl fmt::Debug for DicomSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DicomSlice")
            .field("file_path", &self.file_path)
            .field("frame", &self.frame)
            .field("sop_instance_uid", &self.sop_instance_uid)
            .field("modality", &self.modality)
            .finish_non_exhaustive()
    }
}
