use dicom::object::DefaultDicomObject;
use dicom::pixeldata::{
    DecodedPixelData, PhotometricInterpretation, PixelDecoder, PlanarConfiguration,
};
use iced::widget::image::Handle;
use slicelens::window_level::WindowLevel;

pub struct RenderedFrame {
    pub handle: Handle,
    /// Window spanning the frame's value range, for monochrome frames.
    pub value_window: Option<WindowLevel>,
}

pub struct FrameImagePipeline;

impl FrameImagePipeline {
    /// Decodes one frame and maps it to display pixels. Monochrome frames are
    /// windowed linearly with `window`, or stretched over their min/max when
    /// no window is given.
    pub fn render_frame(
        object: &DefaultDicomObject,
        frame_idx: u32,
        window: Option<WindowLevel>,
    ) -> Result<Option<RenderedFrame>, String> {
        let decoded = object
            .decode_pixel_data()
            .map_err(|err| format!("Failed to decode pixel data: {err}"))?;

        if decoded.number_of_frames() == 0 {
            return Ok(None);
        }
        if frame_idx >= decoded.number_of_frames() {
            return Err(format!(
                "Requested frame {frame_idx}, but only {} frame(s) are available",
                decoded.number_of_frames()
            ));
        }

        match decoded.photometric_interpretation() {
            photometric if photometric.is_monochrome() => {
                Self::monochrome_to_handle(&decoded, frame_idx, window).map(Some)
            }
            PhotometricInterpretation::Rgb if decoded.bits_allocated() <= 8 => {
                Self::rgb_to_handle(&decoded, frame_idx).map(Some)
            }
            other => {
                let name = other.as_str().to_string();
                Self::fallback_to_dynamic(&decoded, frame_idx, &name).map(Some)
            }
        }
    }

    fn monochrome_to_handle(
        decoded: &DecodedPixelData<'_>,
        frame_idx: u32,
        window: Option<WindowLevel>,
    ) -> Result<RenderedFrame, String> {
        let width = decoded.columns();
        let height = decoded.rows();
        let invert = matches!(
            decoded.photometric_interpretation(),
            PhotometricInterpretation::Monochrome1
        );

        // Values come back with the modality rescale already applied.
        let samples = decoded
            .to_vec_frame::<f32>(frame_idx)
            .map_err(|err| format!("Failed to materialize frame data: {err}"))?;

        let value_window = min_max(&samples).and_then(|(min, max)| {
            let window = WindowLevel::new(f64::from(max - min), f64::from(min + max) / 2.0);
            window.is_valid().then_some(window)
        });
        let lut = window.or(value_window).map(LinearVoi::new);

        let mut rgba = Vec::with_capacity(samples.len() * 4);
        for &value in &samples {
            let mut gray = lut.as_ref().map(|lut| lut.apply(value)).unwrap_or(0);
            if invert {
                gray = 255 - gray;
            }
            rgba.extend_from_slice(&[gray, gray, gray, 255]);
        }

        Ok(RenderedFrame {
            handle: Handle::from_rgba(width, height, rgba),
            value_window,
        })
    }

    fn rgb_to_handle(
        decoded: &DecodedPixelData<'_>,
        frame_idx: u32,
    ) -> Result<RenderedFrame, String> {
        let width = decoded.columns();
        let height = decoded.rows();
        let pixel_count = (width * height) as usize;

        let samples = decoded
            .to_vec_frame::<u8>(frame_idx)
            .map_err(|err| format!("Failed to materialize RGB frame: {err}"))?;
        let rgba = match decoded.planar_configuration() {
            PlanarConfiguration::Standard => rgb_interleaved_to_rgba(&samples)?,
            PlanarConfiguration::PixelFirst => rgb_planar_to_rgba(&samples, pixel_count)?,
        };
        Ok(RenderedFrame {
            handle: Handle::from_rgba(width, height, rgba),
            value_window: None,
        })
    }

    fn fallback_to_dynamic(
        decoded: &DecodedPixelData<'_>,
        frame_idx: u32,
        interpretation: &str,
    ) -> Result<RenderedFrame, String> {
        decoded
            .to_dynamic_image(frame_idx)
            .map_err(|err| {
                format!("Unsupported photometric interpretation `{interpretation}`: {err}")
            })
            .map(|image| {
                let rgba = image.into_rgba8();
                let (width, height) = rgba.dimensions();
                RenderedFrame {
                    handle: Handle::from_rgba(width, height, rgba.into_raw()),
                    value_window: None,
                }
            })
    }
}

/// Linear VOI function: values below `level - width/2` map to black, above
/// `level + width/2` to white.
struct LinearVoi {
    lower: f64,
    width: f64,
}

impl LinearVoi {
    fn new(window: WindowLevel) -> Self {
        Self {
            lower: window.level - window.width / 2.0,
            width: window.width.max(1.0),
        }
    }

    fn apply(&self, value: f32) -> u8 {
        let normalized = (f64::from(value) - self.lower) / self.width;
        (normalized * 255.0).clamp(0.0, 255.0).round() as u8
    }
}

fn rgb_interleaved_to_rgba(samples: &[u8]) -> Result<Vec<u8>, String> {
    if samples.len() % 3 != 0 {
        return Err(format!(
            "RGB buffer length {} is not divisible by 3",
            samples.len()
        ));
    }
    let mut rgba = Vec::with_capacity(samples.len() / 3 * 4);
    for chunk in samples.chunks(3) {
        if let [r, g, b] = *chunk {
            rgba.extend_from_slice(&[r, g, b, 255]);
        }
    }
    Ok(rgba)
}

fn rgb_planar_to_rgba(samples: &[u8], pixel_count: usize) -> Result<Vec<u8>, String> {
    if samples.len() < pixel_count * 3 {
        return Err(format!(
            "RGB buffer length {} is too small for {pixel_count} pixels",
            samples.len()
        ));
    }
    let (r_plane, rest) = samples.split_at(pixel_count);
    let (g_plane, b_plane) = rest.split_at(pixel_count);

    let mut rgba = Vec::with_capacity(pixel_count * 4);
    for idx in 0..pixel_count {
        rgba.extend_from_slice(&[r_plane[idx], g_plane[idx], b_plane[idx], 255]);
    }
    Ok(rgba)
}

fn min_max(values: &[f32]) -> Option<(f32, f32)> {
    values
        .iter()
        .copied()
        .filter(|value| value.is_finite())
        .fold(None, |acc, value| match acc {
            None => Some((value, value)),
            Some((min, max)) => Some((min.min(value), max.max(value))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_voi_maps_window_edges() {
        let lut = LinearVoi::new(WindowLevel::new(400.0, 40.0));
        assert_eq!(lut.apply(-160.0), 0);
        assert_eq!(lut.apply(240.0), 255);
        assert_eq!(lut.apply(-1000.0), 0);
        assert_eq!(lut.apply(3000.0), 255);
        assert_eq!(lut.apply(40.0), 128);
    }

    #[test]
    fn planar_rgb_interleaves_planes() {
        let samples = [1, 2, 10, 20, 100, 200];
        let rgba = rgb_planar_to_rgba(&samples, 2).unwrap();
        assert_eq!(rgba, vec![1, 10, 100, 255, 2, 20, 200, 255]);
    }

    #[test]
    fn min_max_skips_non_finite() {
        assert_eq!(min_max(&[3.0, f32::NAN, -2.0]), Some((-2.0, 3.0)));
        assert_eq!(min_max(&[]), None);
    }
}
