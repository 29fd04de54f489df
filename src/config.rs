use std::path::PathBuf;
use std::time::Duration;

use crate::cine::{DEFAULT_FPS, MIN_INTERVAL};
use crate::geometry::{ImageDims, FALLBACK_DIMS};
use crate::poller::POLL_INTERVAL;

/// Runtime settings for the engine and its host.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Viewport sampling cadence.
    pub poll_interval: Duration,
    pub default_fps: u32,
    /// Shortest cine frame interval regardless of fps.
    pub min_cine_interval: Duration,
    pub fallback_dims: ImageDims,
    /// Window/level preferences file; in-memory when unset.
    pub prefs_path: Option<PathBuf>,
    /// Findings JSON ingested at startup.
    pub findings_path: Option<PathBuf>,
    /// DICOM files opened at startup.
    pub dicom_paths: Vec<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            default_fps: DEFAULT_FPS,
            min_cine_interval: MIN_INTERVAL,
            fallback_dims: FALLBACK_DIMS,
            prefs_path: None,
            findings_path: None,
            dicom_paths: Vec::new(),
        }
    }
}
