use crate::findings::Finding;
use crate::geometry::{normalize_encoding, BoxEncoding, CanonicalRect, ImageDims};

pub const LINE_WIDTH: f32 = 2.0;
pub const TAG_HEIGHT: f32 = 16.0;
pub const TAG_PADDING: f32 = 4.0;
/// Advance of one glyph at the 12 px tag font, for surfaces that cannot measure.
pub const APPROX_CHAR_WIDTH: f32 = 7.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn from_rgba8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a,
        }
    }
}

pub const BOX_STROKE: Rgba = Rgba::from_rgba8(34, 197, 94, 0.95);
pub const BOX_FILL: Rgba = Rgba::from_rgba8(34, 197, 94, 0.18);
pub const TAG_BACKGROUND: Rgba = Rgba::from_rgba8(0, 0, 0, 0.55);
pub const TAG_TEXT: Rgba = Rgba::from_rgba8(255, 255, 255, 0.95);

/// Rectangle in logical surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Transparent drawing target laid over the host viewport.
///
/// Drawing calls use logical pixels; `resize` receives the backing size,
/// which already includes the device pixel ratio.
pub trait Surface {
    fn resize(&mut self, width: u32, height: u32);
    fn clear(&mut self);
    fn fill_rect(&mut self, rect: PixelRect, color: Rgba);
    fn stroke_rect(&mut self, rect: PixelRect, color: Rgba, line_width: f32);
    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Rgba);

    fn measure_text(&self, text: &str) -> f32 {
        text.chars().count() as f32 * APPROX_CHAR_WIDTH
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostSize {
    pub width: f32,
    pub height: f32,
    pub device_pixel_ratio: f32,
}

impl HostSize {
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    pub fn logical(&self) -> (f32, f32) {
        (self.width.max(1.0).floor(), self.height.max(1.0).floor())
    }

    pub fn backing_size(&self) -> (u32, u32) {
        let (width, height) = self.logical();
        let ratio = self.device_pixel_ratio.floor().max(1.0);
        ((width * ratio) as u32, (height * ratio) as u32)
    }
}

/// One finding ready to draw on the current slice.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayItem {
    pub finding_id: String,
    pub label: String,
    pub rect: CanonicalRect,
}

/// `"Nodule 87%"`, or the bare label without a score.
pub fn label_text(finding: &Finding) -> String {
    match finding.score {
        Some(score) => format!("{} {}%", finding.label, (score * 100.0).round() as i64),
        None => finding.label.clone(),
    }
}

/// Normalizes every visible finding, dropping those without a usable box.
pub fn build_scene(visible: &[&Finding], dims: ImageDims) -> Vec<OverlayItem> {
    visible
        .iter()
        .filter_map(|finding| {
            let encoding = BoxEncoding::resolve(&finding.bbox);
            if encoding.is_ambiguous() {
                log::debug!(
                    "Finding {} bbox {} read as corners; it is also a valid x/y/w/h box",
                    finding.id,
                    finding.bbox
                );
            }
            let Some(rect) = normalize_encoding(&encoding, dims) else {
                log::debug!("Finding {} has no usable bbox; not drawn", finding.id);
                return None;
            };
            Some(OverlayItem {
                finding_id: finding.id.clone(),
                label: label_text(finding),
                rect,
            })
        })
        .collect()
}

/// Where the label tag goes: just above the box, kept inside the surface.
pub fn tag_rect(rect: PixelRect, text_width: f32, surface_width: f32) -> PixelRect {
    let width = text_width + TAG_PADDING * 2.0;
    let max_x = (surface_width - width).max(0.0);
    PixelRect {
        x: rect.x.min(max_x).max(0.0),
        y: (rect.y - TAG_HEIGHT).max(0.0),
        width,
        height: TAG_HEIGHT,
    }
}

#[derive(Debug, Default)]
pub struct OverlayRenderer {
    backing: Option<(u32, u32)>,
}

impl OverlayRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repaints `items` from scratch. Returns how many boxes were drawn.
    pub fn redraw<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        host: HostSize,
        items: &[OverlayItem],
    ) -> usize {
        let backing = host.backing_size();
        if self.backing != Some(backing) {
            surface.resize(backing.0, backing.1);
            self.backing = Some(backing);
        }
        surface.clear();

        let (width, height) = host.logical();
        let mut drawn = 0;
        for item in items {
            if item.rect.is_degenerate() {
                continue;
            }
            let rect = PixelRect {
                x: item.rect.x as f32 * width,
                y: item.rect.y as f32 * height,
                width: item.rect.w as f32 * width,
                height: item.rect.h as f32 * height,
            };
            surface.fill_rect(rect, BOX_FILL);
            surface.stroke_rect(rect, BOX_STROKE, LINE_WIDTH);

            let tag = tag_rect(rect, surface.measure_text(&item.label), width);
            surface.fill_rect(tag, TAG_BACKGROUND);
            surface.fill_text(&item.label, tag.x + TAG_PADDING, tag.y + 2.0, TAG_TEXT);
            drawn += 1;
        }
        drawn
    }

    pub fn backing_size(&self) -> Option<(u32, u32)> {
        self.backing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backing_size_floors_ratio() {
        assert_eq!(HostSize::new(200.0, 100.0, 1.5).backing_size(), (200, 100));
        assert_eq!(HostSize::new(200.0, 100.0, 2.0).backing_size(), (400, 200));
        assert_eq!(HostSize::new(0.0, 0.0, 0.0).backing_size(), (1, 1));
    }

    #[test]
    fn tag_stays_inside_surface() {
        let rect = PixelRect {
            x: 190.0,
            y: 5.0,
            width: 10.0,
            height: 10.0,
        };
        let tag = tag_rect(rect, 42.0, 200.0);
        assert_eq!(tag.y, 0.0);
        assert_eq!(tag.x + tag.width, 200.0);
    }
}
