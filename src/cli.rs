use clap::Parser;
use slicelens::cine::{MAX_FPS, MIN_FPS};
use slicelens::Settings;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "slicelens",
    about = "DICOM stack viewer with AI finding overlays",
    version
)]
pub struct Cli {
    /// JSON file holding window/level preferences between runs
    #[arg(long = "prefs")]
    prefs: Option<PathBuf>,

    /// Findings JSON to show on startup
    #[arg(long = "findings", short = 'f')]
    findings: Option<PathBuf>,

    /// Viewport sampling interval in milliseconds
    #[arg(long = "poll-interval-ms", default_value_t = 350)]
    poll_interval_ms: u64,

    /// Initial cine frame rate
    #[arg(long = "fps", default_value_t = 12)]
    fps: u32,

    /// DICOM files to open on startup
    paths: Vec<PathBuf>,
}

impl Cli {
    pub fn into_settings(self) -> Settings {
        Settings {
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            default_fps: self.fps.clamp(MIN_FPS, MAX_FPS),
            prefs_path: self.prefs,
            findings_path: self.findings,
            dicom_paths: self.paths,
            ..Settings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_settings() {
        let settings = Cli::parse_from(["slicelens"]).into_settings();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn flags_and_paths_are_carried() {
        let settings = Cli::parse_from([
            "slicelens",
            "--findings",
            "ai.json",
            "--fps",
            "99",
            "--poll-interval-ms",
            "100",
            "a.dcm",
            "b.dcm",
        ])
        .into_settings();
        assert_eq!(settings.findings_path, Some(PathBuf::from("ai.json")));
        assert_eq!(settings.default_fps, MAX_FPS);
        assert_eq!(settings.poll_interval, Duration::from_millis(100));
        assert_eq!(settings.dicom_paths.len(), 2);
    }
}
