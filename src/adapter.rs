//! Capability boundary to the externally owned viewport.
//!
//! Viewports differ in which operations they expose, so every method of
//! [`ViewportAdapter`] is optional: getters default to `None` and setters to
//! [`AdapterError::Unsupported`]. [`Viewport`] wraps an adapter and resolves
//! each operation through an ordered fallback chain ending in a fixed
//! default, which keeps capability probing out of the call sites.

use dicom::core::Tag;
use dicom::dictionary_std::tags;

use crate::error::AdapterError;
use crate::geometry::{ImageDims, FALLBACK_DIMS};
use crate::modality::Modality;
use crate::window_level::{VoiRange, WindowLevel};

pub trait ViewportAdapter {
    fn current_index(&self) -> Option<usize> {
        None
    }

    /// Secondary source for the current slice, e.g. a scroll offset.
    fn scroll_position(&self) -> Option<usize> {
        None
    }

    fn set_index(&mut self, _index: usize) -> Result<(), AdapterError> {
        Err(AdapterError::Unsupported("set_index"))
    }

    fn scroll(&mut self, _delta: isize) -> Result<(), AdapterError> {
        Err(AdapterError::Unsupported("scroll"))
    }

    fn stack_size(&self) -> Option<usize> {
        None
    }

    fn image_ids(&self) -> Option<Vec<String>> {
        None
    }

    fn image_identity(&self) -> Option<String> {
        None
    }

    fn image_dimensions(&self) -> Option<ImageDims> {
        None
    }

    fn voi_range(&self) -> Option<VoiRange> {
        None
    }

    fn windowing(&self) -> Option<WindowLevel> {
        None
    }

    fn set_voi_range(&mut self, _range: VoiRange) -> Result<(), AdapterError> {
        Err(AdapterError::Unsupported("set_voi_range"))
    }

    fn set_windowing(&mut self, _window: WindowLevel) -> Result<(), AdapterError> {
        Err(AdapterError::Unsupported("set_windowing"))
    }

    /// Drops any display overrides and returns to the native presentation.
    fn reset_properties(&mut self) -> Result<(), AdapterError> {
        Err(AdapterError::Unsupported("reset_properties"))
    }

    fn modality_hint(&self) -> Option<String> {
        None
    }

    /// Metadata lookup for the current image.
    fn tag_value(&self, _tag: Tag) -> Option<String> {
        None
    }

    fn render(&mut self) -> Result<(), AdapterError> {
        Err(AdapterError::Unsupported("render"))
    }
}

/// Probe over a [`ViewportAdapter`] with the fallback chains applied.
pub struct Viewport<'a> {
    adapter: &'a mut dyn ViewportAdapter,
}

impl<'a> Viewport<'a> {
    pub fn new(adapter: &'a mut dyn ViewportAdapter) -> Self {
        Self { adapter }
    }

    /// `current_index → scroll_position → 0`
    pub fn current_index(&self) -> usize {
        self.adapter
            .current_index()
            .or_else(|| self.adapter.scroll_position())
            .unwrap_or(0)
    }

    /// `stack_size → image_ids().len() → 0`
    pub fn stack_size(&self) -> usize {
        self.adapter
            .stack_size()
            .or_else(|| self.adapter.image_ids().map(|ids| ids.len()))
            .unwrap_or(0)
    }

    /// `image_identity → image_ids()[current] → None`
    pub fn image_identity(&self) -> Option<String> {
        if let Some(identity) = self.adapter.image_identity() {
            return Some(identity);
        }
        let ids = self.adapter.image_ids()?;
        if ids.is_empty() {
            return None;
        }
        let index = self.current_index().min(ids.len() - 1);
        ids.into_iter().nth(index)
    }

    /// `image_dimensions → Rows/Columns tags → 512×512`
    pub fn image_dimensions(&self) -> ImageDims {
        self.image_dimensions_or(FALLBACK_DIMS)
    }

    pub fn image_dimensions_or(&self, fallback: ImageDims) -> ImageDims {
        if let Some(dims) = self
            .adapter
            .image_dimensions()
            .filter(|dims| dims.columns > 0 && dims.rows > 0)
        {
            return dims;
        }

        let rows = self.tag_number(tags::ROWS);
        let columns = self.tag_number(tags::COLUMNS);
        match (columns, rows) {
            (Some(columns), Some(rows)) if columns > 0 && rows > 0 => ImageDims { columns, rows },
            _ => fallback,
        }
    }

    /// `voi_range → windowing → None`; ranges without positive width are dropped.
    pub fn windowing(&self) -> Option<WindowLevel> {
        self.adapter
            .voi_range()
            .and_then(|range| range.to_window_level())
            .or_else(|| self.adapter.windowing().filter(WindowLevel::is_valid))
    }

    /// `set_voi_range → set_windowing`, then `render`.
    pub fn apply_windowing(&mut self, window: WindowLevel) -> bool {
        if !window.is_valid() {
            log::warn!("Refusing to apply invalid window {window:?}");
            return false;
        }

        let applied = match self.adapter.set_voi_range(window.to_voi()) {
            Err(err) if err.is_unsupported() => self.adapter.set_windowing(window),
            other => other,
        };

        match applied {
            Ok(()) => {
                self.render();
                true
            }
            Err(err) if err.is_unsupported() => {
                log::warn!("Viewport has no window/level setter; skipping apply");
                false
            }
            Err(err) => {
                log::warn!("Window/level apply failed: {err}");
                false
            }
        }
    }

    pub fn reset_properties(&mut self) -> bool {
        match self.adapter.reset_properties() {
            Ok(()) => {
                self.render();
                true
            }
            Err(err) => {
                log::warn!("Reset view skipped: {err}");
                false
            }
        }
    }

    /// `modality_hint → Modality tag → OTHER`
    pub fn modality(&self) -> Modality {
        self.adapter
            .modality_hint()
            .or_else(|| self.tag_text(tags::MODALITY))
            .map(|raw| Modality::classify(&raw))
            .unwrap_or_default()
    }

    /// `set_index → scroll(delta)`, then `render`.
    pub fn set_index(&mut self, index: usize) -> bool {
        let result = match self.adapter.set_index(index) {
            Err(err) if err.is_unsupported() => {
                let delta = index as isize - self.current_index() as isize;
                self.adapter.scroll(delta)
            }
            other => other,
        };

        match result {
            Ok(()) => {
                self.render();
                true
            }
            Err(err) if err.is_unsupported() => {
                log::warn!("Viewport cannot change slice; no setter or scroll available");
                false
            }
            Err(err) => {
                log::warn!("Set slice {index} failed: {err}");
                false
            }
        }
    }

    pub fn render(&mut self) {
        match self.adapter.render() {
            Ok(()) => {}
            Err(err) if err.is_unsupported() => {}
            Err(err) => log::warn!("Viewport render failed: {err}"),
        }
    }

    /// Trimmed, non-empty metadata text.
    pub fn tag_text(&self, tag: Tag) -> Option<String> {
        self.adapter
            .tag_value(tag)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn tag_number(&self, tag: Tag) -> Option<u32> {
        self.tag_text(tag)?.parse::<u32>().ok()
    }
}
