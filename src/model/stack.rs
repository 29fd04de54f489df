use super::DicomSlice;
use crate::image_pipeline::FrameImagePipeline;
use dicom::core::Tag;
use iced::widget::image::Handle;
use slicelens::error::AdapterError;
use slicelens::geometry::ImageDims;
use slicelens::window_level::WindowLevel;
use slicelens::ViewportAdapter;

/// The loaded series as seen through the adapter boundary.
///
/// Windowing is either the file's own (or min/max derived) window, or an
/// override set through the adapter. `render` re-decodes the current frame
/// only when the slice or the window changed since the last call.
pub struct StackViewport {
    slices: Vec<DicomSlice>,
    current: usize,
    window_override: Option<WindowLevel>,
    derived_windows: Vec<Option<WindowLevel>>,
    image: Option<Handle>,
    stale: bool,
}

impl StackViewport {
    pub fn new(slices: Vec<DicomSlice>) -> Self {
        let derived_windows = vec![None; slices.len()];
        let mut viewport = Self {
            slices,
            current: 0,
            window_override: None,
            derived_windows,
            image: None,
            stale: true,
        };
        viewport.refresh_image();
        viewport
    }

    pub fn image(&self) -> Option<&Handle> {
        self.image.as_ref()
    }

    pub fn current_slice(&self) -> Option<&DicomSlice> {
        self.slices.get(self.current)
    }

    pub fn current_dims(&self) -> Option<ImageDims> {
        self.current_slice().and_then(|slice| slice.dims)
    }

    fn native_window(&self) -> Option<WindowLevel> {
        let slice = self.current_slice()?;
        slice
            .file_window
            .or_else(|| self.derived_windows.get(self.current).copied().flatten())
    }

    fn refresh_image(&mut self) {
        if !self.stale {
            return;
        }
        self.stale = false;

        let Some(slice) = self.slices.get(self.current) else {
            self.image = None;
            return;
        };
        let window = self.window_override.or(slice.file_window);
        match FrameImagePipeline::render_frame(&slice.object, slice.frame, window) {
            Ok(Some(rendered)) => {
                if let Some(derived) = self.derived_windows.get_mut(self.current) {
                    *derived = rendered.value_window;
                }
                self.image = Some(rendered.handle);
            }
            Ok(None) => self.image = None,
            Err(err) => {
                log::warn!("Unable to render slice {}: {err}", self.current);
                self.image = None;
            }
        }
    }
}

impl ViewportAdapter for StackViewport {
    fn current_index(&self) -> Option<usize> {
        Some(self.current)
    }

    fn set_index(&mut self, index: usize) -> Result<(), AdapterError> {
        if index >= self.slices.len() {
            return Err(AdapterError::failed(
                "set_index",
                format!("slice {index} outside stack of {}", self.slices.len()),
            ));
        }
        if index != self.current {
            self.current = index;
            self.stale = true;
        }
        Ok(())
    }

    fn stack_size(&self) -> Option<usize> {
        Some(self.slices.len())
    }

    fn image_ids(&self) -> Option<Vec<String>> {
        Some(self.slices.iter().map(DicomSlice::identity).collect())
    }

    fn image_identity(&self) -> Option<String> {
        self.current_slice().map(DicomSlice::identity)
    }

    fn image_dimensions(&self) -> Option<ImageDims> {
        self.current_dims()
    }

    fn windowing(&self) -> Option<WindowLevel> {
        self.window_override.or_else(|| self.native_window())
    }

    fn set_windowing(&mut self, window: WindowLevel) -> Result<(), AdapterError> {
        if !window.is_valid() {
            return Err(AdapterError::failed(
                "set_windowing",
                format!("invalid window {}/{}", window.width, window.level),
            ));
        }
        if self.window_override != Some(window) {
            self.window_override = Some(window);
            self.stale = true;
        }
        Ok(())
    }

    fn reset_properties(&mut self) -> Result<(), AdapterError> {
        if self.window_override.take().is_some() {
            self.stale = true;
        }
        Ok(())
    }

    fn modality_hint(&self) -> Option<String> {
        self.current_slice().and_then(|slice| slice.modality.clone())
    }

    fn tag_value(&self, tag: Tag) -> Option<String> {
        let slice = self.current_slice()?;
        slice
            .object
            .element(tag)
            .ok()
            .and_then(|element| element.to_str().ok())
            .map(|value| value.into_owned())
    }

    fn render(&mut self) -> Result<(), AdapterError> {
        self.refresh_image();
        Ok(())
    }
}
