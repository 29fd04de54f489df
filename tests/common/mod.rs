#![allow(dead_code)]

use std::collections::HashMap;

use dicom::core::Tag;
use slicelens::error::{AdapterError, StoreError};
use slicelens::geometry::ImageDims;
use slicelens::overlay::{PixelRect, Rgba, Surface};
use slicelens::prefs::KeyValueStore;
use slicelens::window_level::{VoiRange, WindowLevel};
use slicelens::ViewportAdapter;

/// In-memory stack viewport exposing the full capability set.
#[derive(Debug, Clone)]
pub struct FakeViewport {
    pub ids: Vec<String>,
    pub index: usize,
    pub modality: Option<String>,
    pub native: Option<WindowLevel>,
    pub window: Option<WindowLevel>,
    pub dims: Option<ImageDims>,
    pub tags: HashMap<Tag, String>,
    pub renders: usize,
    pub applied: Vec<WindowLevel>,
}

impl FakeViewport {
    pub fn new(modality: &str, size: usize) -> Self {
        Self {
            ids: (0..size).map(|idx| format!("{modality}-{idx}")).collect(),
            index: 0,
            modality: Some(modality.to_string()),
            native: Some(WindowLevel::new(400.0, 40.0)),
            window: None,
            dims: Some(ImageDims {
                columns: 512,
                rows: 512,
            }),
            tags: HashMap::new(),
            renders: 0,
            applied: Vec::new(),
        }
    }

    pub fn with_native(mut self, width: f64, level: f64) -> Self {
        self.native = Some(WindowLevel::new(width, level));
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Swaps in another series, as when the host loads a new study.
    pub fn load_series(&mut self, modality: &str, size: usize, native: WindowLevel) {
        self.ids = (0..size).map(|idx| format!("{modality}-{idx}")).collect();
        self.index = 0;
        self.modality = Some(modality.to_string());
        self.native = Some(native);
        self.window = None;
    }
}

impl ViewportAdapter for FakeViewport {
    fn current_index(&self) -> Option<usize> {
        Some(self.index)
    }

    fn set_index(&mut self, index: usize) -> Result<(), AdapterError> {
        if index >= self.ids.len() {
            return Err(AdapterError::failed("set_index", "out of range"));
        }
        self.index = index;
        Ok(())
    }

    fn stack_size(&self) -> Option<usize> {
        Some(self.ids.len())
    }

    fn image_ids(&self) -> Option<Vec<String>> {
        Some(self.ids.clone())
    }

    fn image_dimensions(&self) -> Option<ImageDims> {
        self.dims
    }

    fn windowing(&self) -> Option<WindowLevel> {
        self.window.or(self.native)
    }

    fn set_windowing(&mut self, window: WindowLevel) -> Result<(), AdapterError> {
        self.window = Some(window);
        self.applied.push(window);
        Ok(())
    }

    fn reset_properties(&mut self) -> Result<(), AdapterError> {
        self.window = None;
        Ok(())
    }

    fn modality_hint(&self) -> Option<String> {
        self.modality.clone()
    }

    fn tag_value(&self, tag: Tag) -> Option<String> {
        self.tags.get(&tag).cloned()
    }

    fn render(&mut self) -> Result<(), AdapterError> {
        self.renders += 1;
        Ok(())
    }
}

/// Viewport that only offers the secondary accessors: a scroll position,
/// relative scrolling, an id list and VOI ranges.
#[derive(Debug, Clone, Default)]
pub struct ScrollOnlyViewport {
    pub ids: Vec<String>,
    pub position: usize,
    pub voi: Option<VoiRange>,
    pub tags: HashMap<Tag, String>,
}

impl ViewportAdapter for ScrollOnlyViewport {
    fn scroll_position(&self) -> Option<usize> {
        Some(self.position)
    }

    fn scroll(&mut self, delta: isize) -> Result<(), AdapterError> {
        let target = self.position as isize + delta;
        if target < 0 || target as usize >= self.ids.len() {
            return Err(AdapterError::failed("scroll", "out of range"));
        }
        self.position = target as usize;
        Ok(())
    }

    fn image_ids(&self) -> Option<Vec<String>> {
        Some(self.ids.clone())
    }

    fn voi_range(&self) -> Option<VoiRange> {
        self.voi
    }

    fn set_voi_range(&mut self, range: VoiRange) -> Result<(), AdapterError> {
        self.voi = Some(range);
        Ok(())
    }

    fn tag_value(&self, tag: Tag) -> Option<String> {
        self.tags.get(&tag).cloned()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Resize(u32, u32),
    Clear,
    Fill(PixelRect, Rgba),
    Stroke(PixelRect, Rgba, f32),
    Text(String, f32, f32),
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn strokes(&self) -> Vec<PixelRect> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Stroke(rect, ..) => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text(text, ..) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn resizes(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Resize(..)))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.ops.push(DrawOp::Resize(width, height));
    }

    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Rgba) {
        self.ops.push(DrawOp::Fill(rect, color));
    }

    fn stroke_rect(&mut self, rect: PixelRect, color: Rgba, line_width: f32) {
        self.ops.push(DrawOp::Stroke(rect, color, line_width));
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, _color: Rgba) {
        self.ops.push(DrawOp::Text(text.to_string(), x, y));
    }
}

/// Store whose every call fails.
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable(String::from("disabled")))
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable(String::from("disabled")))
    }
}

pub fn bound<A: ViewportAdapter>(viewport: &mut A) -> Option<&mut dyn ViewportAdapter> {
    Some(viewport)
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}
