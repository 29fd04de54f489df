//! Window/level presets and the per-modality state machine.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;

use crate::adapter::Viewport;
use crate::modality::Modality;
use crate::prefs::{wl_key, Preferences};

pub const DEFAULT_WIDTH: f64 = 800.0;
pub const DEFAULT_LEVEL: f64 = 0.0;

/// Displayed values within this many units of the viewport's are left alone.
const RECONCILE_TOLERANCE: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowLevel {
    pub width: f64,
    pub level: f64,
}

impl WindowLevel {
    pub fn new(width: f64, level: f64) -> Self {
        Self { width, level }
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.level.is_finite() && self.width > 0.0
    }

    pub fn to_voi(&self) -> VoiRange {
        VoiRange {
            lower: self.level - self.width / 2.0,
            upper: self.level + self.width / 2.0,
        }
    }
}

/// Lower/upper bounds of the displayed intensity window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiRange {
    pub lower: f64,
    pub upper: f64,
}

impl VoiRange {
    pub fn to_window_level(&self) -> Option<WindowLevel> {
        let window = WindowLevel::new(self.upper - self.lower, (self.upper + self.lower) / 2.0);
        window.is_valid().then_some(window)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    CtBrain,
    CtSoftTissue,
    CtLung,
    CtBone,
    CtAbdomen,
    CtLiver,
    MrLowContrast,
    MrHighContrast,
}

impl Preset {
    pub const CT: [Preset; 6] = [
        Preset::CtBrain,
        Preset::CtSoftTissue,
        Preset::CtLung,
        Preset::CtBone,
        Preset::CtAbdomen,
        Preset::CtLiver,
    ];

    pub const MR: [Preset; 2] = [Preset::MrLowContrast, Preset::MrHighContrast];

    pub fn modality(&self) -> Modality {
        match self {
            Preset::MrLowContrast | Preset::MrHighContrast => Modality::Mr,
            _ => Modality::Ct,
        }
    }

    pub fn for_modality(modality: Modality) -> &'static [Preset] {
        match modality {
            Modality::Ct => &Self::CT,
            Modality::Mr => &Self::MR,
            Modality::Other => &[],
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Preset::CtBrain => "brain",
            Preset::CtSoftTissue => "soft",
            Preset::CtLung => "lung",
            Preset::CtBone => "bone",
            Preset::CtAbdomen => "abdomen",
            Preset::CtLiver => "liver",
            Preset::MrLowContrast => "mr_low",
            Preset::MrHighContrast => "mr_high",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        [Self::CT.as_slice(), Self::MR.as_slice()]
            .concat()
            .into_iter()
            .find(|preset| preset.key() == key)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Preset::CtBrain => "CT Brain (70/35)",
            Preset::CtSoftTissue => "Soft Tissue (350/50)",
            Preset::CtLung => "Lung (1500/-600)",
            Preset::CtBone => "Bone (2500/500)",
            Preset::CtAbdomen => "Abdomen (400/50)",
            Preset::CtLiver => "Liver (150/30)",
            Preset::MrLowContrast => "MR Low contrast",
            Preset::MrHighContrast => "MR High contrast",
        }
    }

    /// Target window. CT presets are absolute; MR presets scale the width
    /// the viewport currently reports and need it to be present.
    pub fn window(&self, current: Option<WindowLevel>) -> Option<WindowLevel> {
        let absolute = |width, level| Some(WindowLevel::new(width, level));
        match self {
            Preset::CtBrain => absolute(70.0, 35.0),
            Preset::CtSoftTissue => absolute(350.0, 50.0),
            Preset::CtLung => absolute(1500.0, -600.0),
            Preset::CtBone => absolute(2500.0, 500.0),
            Preset::CtAbdomen => absolute(400.0, 50.0),
            Preset::CtLiver => absolute(150.0, 30.0),
            Preset::MrLowContrast => current.map(|window| scaled(window, 1.4)),
            Preset::MrHighContrast => current.map(|window| scaled(window, 0.7)),
        }
    }
}

fn scaled(window: WindowLevel, factor: f64) -> WindowLevel {
    WindowLevel::new((window.width * factor).max(1.0), window.level)
}

/// Which layer of the window/level stack is in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WlMode {
    #[default]
    Default,
    Preset(Preset),
    Custom,
}

impl WlMode {
    pub fn key(&self) -> &'static str {
        match self {
            WlMode::Default => "default",
            WlMode::Preset(preset) => preset.key(),
            WlMode::Custom => "custom",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "default" => Some(WlMode::Default),
            "custom" => Some(WlMode::Custom),
            other => Preset::from_key(other).map(WlMode::Preset),
        }
    }

    /// Options offered for `modality`: default, its presets, then custom.
    pub fn choices_for(modality: Modality) -> Vec<WlMode> {
        let mut choices = vec![WlMode::Default];
        choices.extend(
            Preset::for_modality(modality)
                .iter()
                .copied()
                .map(WlMode::Preset),
        );
        choices.push(WlMode::Custom);
        choices
    }

    fn allowed_for(&self, modality: Modality) -> bool {
        match self {
            WlMode::Preset(preset) => preset.modality() == modality,
            _ => true,
        }
    }
}

impl fmt::Display for WlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WlMode::Default => f.write_str("W/L: Default"),
            WlMode::Preset(preset) => f.write_str(preset.label()),
            WlMode::Custom => f.write_str("Custom (sliders)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WlState {
    pub modality: Modality,
    pub mode: WlMode,
    pub window_width: f64,
    pub window_level: f64,
}

impl WlState {
    pub fn new(modality: Modality) -> Self {
        Self {
            modality,
            mode: WlMode::Default,
            window_width: DEFAULT_WIDTH,
            window_level: DEFAULT_LEVEL,
        }
    }

    pub fn window(&self) -> WindowLevel {
        WindowLevel::new(self.window_width, self.window_level)
    }

    fn set_window(&mut self, window: WindowLevel) {
        self.window_width = window.width;
        self.window_level = window.level;
    }
}

/// Slider bounds for the W/L controls.
#[derive(Debug, Clone, PartialEq)]
pub struct SliderRange {
    pub level: RangeInclusive<f64>,
    pub width: RangeInclusive<f64>,
}

impl SliderRange {
    /// CT has fixed Hounsfield bounds; other modalities are centered on the
    /// current window.
    pub fn for_modality(modality: Modality, current: Option<WindowLevel>) -> Self {
        if modality == Modality::Ct {
            return Self {
                level: -1024.0..=3071.0,
                width: 1.0..=4000.0,
            };
        }

        let (level, width) = current
            .map(|window| (window.level, window.width))
            .unwrap_or((DEFAULT_LEVEL, DEFAULT_WIDTH));
        Self {
            level: (level - 2000.0).floor()..=(level + 2000.0).ceil(),
            width: 1.0..=(width * 3.0).max(2000.0).ceil(),
        }
    }
}

pub struct WindowLevelController {
    states: BTreeMap<Modality, WlState>,
    active: Modality,
    dragging: bool,
    prefs: Preferences,
}

impl WindowLevelController {
    pub fn new(prefs: Preferences) -> Self {
        Self {
            states: BTreeMap::new(),
            active: Modality::default(),
            dragging: false,
            prefs,
        }
    }

    pub fn active_modality(&self) -> Modality {
        self.active
    }

    /// State of the active modality (a fresh default if never touched).
    pub fn state(&self) -> WlState {
        self.states
            .get(&self.active)
            .cloned()
            .unwrap_or_else(|| WlState::new(self.active))
    }

    pub fn choices(&self) -> Vec<WlMode> {
        WlMode::choices_for(self.active)
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    /// Moves to `mode` on the active modality and applies it.
    pub fn select(&mut self, mode: WlMode, viewport: &mut Viewport<'_>) -> bool {
        let modality = self.active;
        if !mode.allowed_for(modality) {
            log::warn!("Preset `{}` is not available for {modality}", mode.key());
            return false;
        }

        match mode {
            WlMode::Default => {
                viewport.reset_properties();
                self.active_state().mode = WlMode::Default;
                self.prefs.set(&wl_key("preset", modality), mode.key());
                if let Some(native) = viewport.windowing() {
                    self.active_state().set_window(rounded(native));
                }
                true
            }
            WlMode::Preset(preset) => {
                let Some(window) = preset.window(viewport.windowing()) else {
                    log::warn!(
                        "Preset `{}` needs the current window, which the viewport does not report",
                        preset.key()
                    );
                    return false;
                };
                viewport.apply_windowing(window);
                let state = self.active_state();
                state.mode = mode;
                state.set_window(window);
                self.prefs.set(&wl_key("preset", modality), preset.key());
                true
            }
            WlMode::Custom => {
                let window = self.saved_custom(modality);
                viewport.apply_windowing(window);
                let state = self.active_state();
                state.mode = WlMode::Custom;
                state.set_window(window);
                self.prefs.set(&wl_key("preset", modality), mode.key());
                true
            }
        }
    }

    /// Width slider moved. Rejects non-finite or non-positive widths.
    pub fn set_width(&mut self, width: f64, viewport: &mut Viewport<'_>) -> bool {
        if !width.is_finite() || width <= 0.0 {
            log::warn!("Ignoring invalid window width {width}");
            return false;
        }
        let level = self.state().window_level;
        self.apply_custom(WindowLevel::new(width, level), viewport);
        true
    }

    /// Level slider moved. Rejects non-finite levels.
    pub fn set_level(&mut self, level: f64, viewport: &mut Viewport<'_>) -> bool {
        if !level.is_finite() {
            log::warn!("Ignoring invalid window level {level}");
            return false;
        }
        let width = self.state().window_width;
        self.apply_custom(WindowLevel::new(width, level), viewport);
        true
    }

    /// Activates `modality` and reapplies its persisted preset or custom
    /// window. Other modalities keep their state untouched.
    pub fn switch_modality(&mut self, modality: Modality, viewport: &mut Viewport<'_>) {
        self.active = modality;
        let saved = self.prefs.get_or(&wl_key("preset", modality), "default");
        let mode = WlMode::from_key(&saved)
            .filter(|mode| mode.allowed_for(modality))
            .unwrap_or_default();
        log::info!("Modality {modality}: restoring window/level `{}`", mode.key());

        if !self.select(mode, viewport) {
            self.active_state().mode = WlMode::Default;
        }
    }

    /// Adopts windowing changed outside the controls (e.g. a drag on the
    /// image itself). Suppressed while a slider is held. Returns whether the
    /// displayed values changed.
    pub fn reconcile(&mut self, viewport: &Viewport<'_>) -> bool {
        if self.dragging {
            return false;
        }
        let Some(current) = viewport.windowing() else {
            return false;
        };

        let current = rounded(current);
        let state = self.active_state();
        let mut changed = false;
        if (state.window_level - current.level).abs() > RECONCILE_TOLERANCE {
            state.window_level = current.level;
            changed = true;
        }
        if (state.window_width - current.width).abs() > RECONCILE_TOLERANCE {
            state.window_width = current.width;
            changed = true;
        }
        if changed {
            log::debug!(
                "Adopted viewport window {}/{} for {}",
                current.width,
                current.level,
                self.active
            );
        }
        changed
    }

    pub fn slider_range(&self, viewport: &Viewport<'_>) -> SliderRange {
        SliderRange::for_modality(self.active, viewport.windowing())
    }

    fn apply_custom(&mut self, window: WindowLevel, viewport: &mut Viewport<'_>) {
        let modality = self.active;
        let state = self.active_state();
        state.mode = WlMode::Custom;
        state.set_window(window);
        viewport.apply_windowing(window);

        self.prefs.set(&wl_key("wl", modality), window.level);
        self.prefs.set(&wl_key("ww", modality), window.width);
        self.prefs.set(&wl_key("preset", modality), WlMode::Custom.key());
    }

    fn saved_custom(&self, modality: Modality) -> WindowLevel {
        let width = self.prefs.get_f64(&wl_key("ww", modality), DEFAULT_WIDTH);
        let level = self.prefs.get_f64(&wl_key("wl", modality), DEFAULT_LEVEL);
        let width = if width > 0.0 { width } else { DEFAULT_WIDTH };
        WindowLevel::new(width, level)
    }

    fn active_state(&mut self) -> &mut WlState {
        let modality = self.active;
        self.states
            .entry(modality)
            .or_insert_with(|| WlState::new(modality))
    }
}

fn rounded(window: WindowLevel) -> WindowLevel {
    WindowLevel::new(window.width.round(), window.level.round())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voi_round_trips_through_window_level() {
        let window = WindowLevel::new(400.0, 40.0);
        let voi = window.to_voi();
        assert_eq!(voi, VoiRange { lower: -160.0, upper: 240.0 });
        assert_eq!(voi.to_window_level(), Some(window));
    }

    #[test]
    fn inverted_voi_has_no_window() {
        let voi = VoiRange { lower: 10.0, upper: 10.0 };
        assert_eq!(voi.to_window_level(), None);
    }

    #[test]
    fn mr_presets_scale_current_width() {
        let current = Some(WindowLevel::new(1000.0, 300.0));
        assert_eq!(
            Preset::MrLowContrast.window(current),
            Some(WindowLevel::new(1400.0, 300.0))
        );
        assert_eq!(
            Preset::MrHighContrast.window(current),
            Some(WindowLevel::new(700.0, 300.0))
        );
        assert_eq!(Preset::MrHighContrast.window(None), None);
        assert_eq!(
            Preset::MrHighContrast.window(Some(WindowLevel::new(1.0, 0.0))),
            Some(WindowLevel::new(1.0, 0.0))
        );
    }

    #[test]
    fn mode_keys_round_trip() {
        for modality in Modality::ALL {
            for mode in WlMode::choices_for(modality) {
                assert_eq!(WlMode::from_key(mode.key()), Some(mode));
            }
        }
        assert_eq!(WlMode::from_key("nope"), None);
    }

    #[test]
    fn other_modality_offers_only_default_and_custom() {
        assert_eq!(
            WlMode::choices_for(Modality::Other),
            vec![WlMode::Default, WlMode::Custom]
        );
    }

    #[test]
    fn slider_ranges_follow_modality() {
        let ct = SliderRange::for_modality(Modality::Ct, None);
        assert_eq!(ct.level, -1024.0..=3071.0);

        let mr = SliderRange::for_modality(Modality::Mr, Some(WindowLevel::new(1000.0, 250.0)));
        assert_eq!(mr.level, -1750.0..=2250.0);
        assert_eq!(mr.width, 1.0..=3000.0);
    }
}
