use crate::model::DicomSlice;
use slicelens::window_level::WlMode;
use slicelens::Finding;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SidePanel {
    #[default]
    Findings,
    Hud,
}

#[derive(Debug, Clone)]
pub enum Message {
    PickFiles,
    FilesLoaded(Vec<Result<DicomSlice, String>>),
    PickFindings,
    FindingsPublished(Vec<Finding>),
    FindingsFailed(String),
    ClearFindings,
    PollTick,
    CineTick(u64),
    ToggleCine,
    StepForward,
    StepBackward,
    SetFps(u32),
    SelectWindowLevel(WlMode),
    WindowWidthChanged(f64),
    WindowLevelChanged(f64),
    SliderReleased,
    ResetView,
    JumpToFinding(String),
    SearchChanged(String),
    LabelFilterChanged(LabelFilter),
    SetSidePanel(SidePanel),
}

/// Label filter choice in the side list; `All` disables filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelFilter {
    All,
    Label(String),
}

impl LabelFilter {
    pub fn as_label(&self) -> Option<&str> {
        match self {
            LabelFilter::All => None,
            LabelFilter::Label(label) => Some(label),
        }
    }
}

impl std::fmt::Display for LabelFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LabelFilter::All => f.write_str("All labels"),
            LabelFilter::Label(label) => f.write_str(label),
        }
    }
}
