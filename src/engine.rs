//! The overlay synchronization context.
//!
//! [`OverlayEngine`] owns every piece of mutable state: findings, the last
//! viewport sample, window/level, cine and the overlay renderer. Hosts call
//! into it from their timer callbacks and input handlers, passing the bound
//! viewport (or `None` while nothing is bound). Nothing here returns an
//! adapter error; failures are logged and the call degrades to a no-op.

use std::cell::RefCell;

use serde_json::Value;

use crate::adapter::{Viewport, ViewportAdapter};
use crate::cine::{CineScheduler, TimerHandle};
use crate::config::Settings;
use crate::findings::{parse_findings, Finding, FindingStore, SliceAssignment};
use crate::geometry::ImageDims;
use crate::hud::{hud_fields, hud_findings, slice_counter, HudField, HudFinding};
use crate::overlay::{build_scene, HostSize, OverlayItem, OverlayRenderer, Surface};
use crate::poller::{ChangeDetector, Transition, ViewportSnapshot};
use crate::prefs::Preferences;
use crate::window_level::{SliderRange, WindowLevelController, WlMode, WlState};

/// What one poll tick observed and refreshed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollOutcome {
    pub transitions: Vec<Transition>,
    pub hud_refresh: bool,
    pub redraw: bool,
    pub windowing_synced: bool,
    pub cine_stopped: bool,
}

pub struct OverlayEngine {
    settings: Settings,
    store: FindingStore,
    detector: ChangeDetector,
    window_level: WindowLevelController,
    cine: CineScheduler,
    renderer: RefCell<OverlayRenderer>,
    scene: Vec<OverlayItem>,
    dims: ImageDims,
    hud: Vec<HudField>,
    hud_findings: Vec<HudFinding>,
    slider_range: SliderRange,
    warned_unbound: bool,
}

impl OverlayEngine {
    pub fn new(settings: Settings, prefs: Preferences) -> Self {
        let window_level = WindowLevelController::new(prefs);
        let slider_range = SliderRange::for_modality(window_level.active_modality(), None);
        Self {
            cine: CineScheduler::new(settings.default_fps, settings.min_cine_interval),
            dims: settings.fallback_dims,
            settings,
            store: FindingStore::new(),
            detector: ChangeDetector::new(),
            window_level,
            renderer: RefCell::new(OverlayRenderer::new()),
            scene: Vec::new(),
            hud: Vec::new(),
            hud_findings: Vec::new(),
            slider_range,
            warned_unbound: false,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// One change-detection tick.
    pub fn poll(&mut self, adapter: Option<&mut dyn ViewportAdapter>) -> PollOutcome {
        let mut outcome = PollOutcome::default();

        let Some(adapter) = adapter else {
            if !self.warned_unbound {
                log::warn!("No viewport bound; overlay sync is idle");
                self.warned_unbound = true;
            }
            if self.cine.is_playing() {
                self.cine.stop();
                outcome.cine_stopped = true;
            }
            self.detector.reset();
            if !self.scene.is_empty() {
                self.scene.clear();
                self.hud_findings.clear();
                outcome.redraw = true;
            }
            return outcome;
        };
        self.warned_unbound = false;

        let mut viewport = Viewport::new(adapter);
        let snapshot = ViewportSnapshot::capture(&viewport);
        let transitions = self.detector.observe(snapshot.clone());

        for transition in &transitions {
            match transition {
                Transition::ModalityChanged { to, .. } => {
                    self.window_level.switch_modality(*to, &mut viewport);
                }
                Transition::ImageChanged { .. } => {
                    self.hud = hud_fields(&viewport);
                    outcome.hud_refresh = true;
                }
                Transition::SliceChanged { .. } | Transition::StackResized { .. } => {}
            }
        }

        if snapshot.is_empty() && self.cine.is_playing() {
            log::info!("Stack is empty; stopping cine");
            self.cine.stop();
            outcome.cine_stopped = true;
        }

        outcome.windowing_synced = self.window_level.reconcile(&viewport);
        self.slider_range = self.window_level.slider_range(&viewport);
        self.dims = viewport.image_dimensions_or(self.settings.fallback_dims);
        self.rebuild_scene(snapshot.current_index);
        outcome.redraw = true;
        outcome.transitions = transitions;
        outcome
    }

    /// Wholesale replacement of the findings; both the direct push and the
    /// broadcast path land here.
    pub fn ingest(&mut self, findings: Vec<Finding>) -> usize {
        let count = findings.len();
        self.store.replace_all(findings);
        log::info!("Ingested {count} finding(s)");
        self.rebuild_scene(self.current_index());
        count
    }

    pub fn ingest_json(&mut self, payload: &Value) -> usize {
        self.ingest(parse_findings(payload))
    }

    pub fn clear_findings(&mut self) {
        self.ingest(Vec::new());
    }

    pub fn select_window_level(
        &mut self,
        mode: WlMode,
        adapter: Option<&mut dyn ViewportAdapter>,
    ) -> bool {
        let controller = &mut self.window_level;
        with_viewport(adapter, "Window/level preset", |viewport| {
            controller.select(mode, viewport)
        })
        .unwrap_or(false)
    }

    pub fn set_window_width(
        &mut self,
        width: f64,
        adapter: Option<&mut dyn ViewportAdapter>,
    ) -> bool {
        let controller = &mut self.window_level;
        with_viewport(adapter, "Window width", |viewport| {
            controller.set_width(width, viewport)
        })
        .unwrap_or(false)
    }

    pub fn set_window_level(
        &mut self,
        level: f64,
        adapter: Option<&mut dyn ViewportAdapter>,
    ) -> bool {
        let controller = &mut self.window_level;
        with_viewport(adapter, "Window level", |viewport| {
            controller.set_level(level, viewport)
        })
        .unwrap_or(false)
    }

    pub fn begin_window_drag(&mut self) {
        self.window_level.begin_drag();
    }

    pub fn end_window_drag(&mut self) {
        self.window_level.end_drag();
    }

    /// Restores the viewport's native presentation. The displayed
    /// window/level catches up on the next poll.
    pub fn reset_view(&mut self, adapter: Option<&mut dyn ViewportAdapter>) {
        with_viewport(adapter, "Reset view", |viewport| viewport.reset_properties());
    }

    pub fn toggle_cine(&mut self, adapter: Option<&mut dyn ViewportAdapter>) -> bool {
        let cine = &mut self.cine;
        with_viewport(adapter, "Cine", |viewport| cine.toggle(viewport)).unwrap_or(false)
    }

    pub fn stop_cine(&mut self) {
        self.cine.stop();
    }

    pub fn set_cine_fps(&mut self, fps: u32) {
        self.cine.set_fps(fps);
    }

    pub fn cine_tick(&mut self, timer_id: u64, adapter: Option<&mut dyn ViewportAdapter>) {
        let Some(adapter) = adapter else {
            log::warn!("Cine: viewport went away; stopping");
            self.cine.stop();
            return;
        };
        let mut viewport = Viewport::new(adapter);
        if self.cine.tick(timer_id, &mut viewport) {
            let index = viewport.current_index();
            self.moved_to(index);
        }
    }

    pub fn step_forward(&mut self, adapter: Option<&mut dyn ViewportAdapter>) {
        self.step(adapter, true);
    }

    pub fn step_backward(&mut self, adapter: Option<&mut dyn ViewportAdapter>) {
        self.step(adapter, false);
    }

    fn step(&mut self, adapter: Option<&mut dyn ViewportAdapter>, forward: bool) {
        let cine = &self.cine;
        let moved_to = with_viewport(adapter, "Step", |viewport| {
            let moved = if forward {
                cine.step_forward(viewport)
            } else {
                cine.step_backward(viewport)
            };
            moved.then(|| viewport.current_index())
        })
        .flatten();
        if let Some(index) = moved_to {
            self.moved_to(index);
        }
    }

    /// Moves the viewport to the finding's slice; findings without one keep
    /// the current slice.
    pub fn jump_to_finding(&mut self, id: &str, adapter: Option<&mut dyn ViewportAdapter>) -> bool {
        let Some(finding) = self.store.get(id) else {
            log::warn!("No finding with id `{id}`");
            return false;
        };
        let target = finding.slice_index;

        let moved_to = with_viewport(adapter, "Jump to finding", |viewport| {
            let index = match target {
                SliceAssignment::All => viewport.current_index(),
                SliceAssignment::Slice(slice) => match usize::try_from(slice) {
                    Ok(index) if index < viewport.stack_size() => index,
                    _ => {
                        log::warn!("Finding `{id}` is on slice {slice}, outside the stack");
                        return None;
                    }
                },
                SliceAssignment::Invalid => {
                    log::warn!("Finding `{id}` has no usable slice");
                    return None;
                }
            };
            viewport.set_index(index).then_some(index)
        })
        .flatten();

        match moved_to {
            Some(index) => {
                self.moved_to(index);
                true
            }
            None => false,
        }
    }

    /// Paints the current scene onto `surface`.
    pub fn paint<S: Surface + ?Sized>(&self, surface: &mut S, host: HostSize) -> usize {
        self.renderer.borrow_mut().redraw(surface, host, &self.scene)
    }

    pub fn findings(&self) -> &FindingStore {
        &self.store
    }

    pub fn scene(&self) -> &[OverlayItem] {
        &self.scene
    }

    pub fn snapshot(&self) -> Option<&ViewportSnapshot> {
        self.detector.last()
    }

    pub fn current_index(&self) -> usize {
        self.snapshot()
            .map(|snapshot| snapshot.current_index)
            .unwrap_or(0)
    }

    pub fn slice_counter(&self) -> String {
        match self.snapshot() {
            Some(snapshot) => slice_counter(snapshot.current_index, snapshot.stack_size),
            None => slice_counter(0, 0),
        }
    }

    pub fn hud_fields(&self) -> &[HudField] {
        &self.hud
    }

    pub fn hud_findings(&self) -> &[HudFinding] {
        &self.hud_findings
    }

    pub fn window_level(&self) -> &WindowLevelController {
        &self.window_level
    }

    pub fn window_state(&self) -> WlState {
        self.window_level.state()
    }

    pub fn slider_range(&self) -> &SliderRange {
        &self.slider_range
    }

    pub fn cine(&self) -> &CineScheduler {
        &self.cine
    }

    pub fn cine_timer(&self) -> Option<TimerHandle> {
        self.cine.active_timer()
    }

    fn moved_to(&mut self, index: usize) {
        self.detector.record_index(index);
        self.rebuild_scene(index);
    }

    fn rebuild_scene(&mut self, index: usize) {
        let visible = self.store.finds_for_slice(index);
        self.scene = build_scene(&visible, self.dims);
        self.hud_findings = hud_findings(&self.store, index);
    }
}

fn with_viewport<T>(
    adapter: Option<&mut dyn ViewportAdapter>,
    action: &str,
    f: impl FnOnce(&mut Viewport<'_>) -> T,
) -> Option<T> {
    match adapter {
        Some(adapter) => Some(f(&mut Viewport::new(adapter))),
        None => {
            log::warn!("{action}: no viewport bound");
            None
        }
    }
}
