use crate::message::Message;
use crate::model::StackViewport;
use iced::mouse;
use iced::widget::canvas::{self, Frame, Geometry, Path, Stroke};
use iced::widget::{canvas as canvas_widget, container, stack, text, Image};
use iced::{Alignment, Color, Element, Length, Pixels, Point, Rectangle, Renderer, Size, Theme, Vector};
use slicelens::geometry::ImageDims;
use slicelens::overlay::{HostSize, PixelRect, Rgba, Surface};
use slicelens::OverlayEngine;

const TAG_FONT_SIZE: f32 = 12.0;

pub fn viewport_panel<'a>(
    viewport: Option<&'a StackViewport>,
    engine: &'a OverlayEngine,
) -> Element<'a, Message> {
    let Some(viewport) = viewport else {
        return centered(text("Open a DICOM series to start"));
    };
    let Some(handle) = viewport.image() else {
        return centered(text("No frame preview available"));
    };

    let dims = viewport
        .current_dims()
        .unwrap_or(engine.settings().fallback_dims);
    let layer = OverlayLayer { engine, dims };

    stack![
        Image::new(handle.clone())
            .width(Length::Fill)
            .height(Length::Fill),
        canvas_widget(layer).width(Length::Fill).height(Length::Fill),
    ]
    .width(Length::Fill)
    .height(Length::Fill)
    .into()
}

fn centered<'a>(content: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .align_x(Alignment::Center)
        .align_y(Alignment::Center)
        .into()
}

/// Transparent layer matching the letterboxed image rectangle.
struct OverlayLayer<'a> {
    engine: &'a OverlayEngine,
    dims: ImageDims,
}

impl OverlayLayer<'_> {
    /// Where an image of `dims` lands inside `bounds` when scaled to fit.
    fn image_rect(&self, bounds: Size) -> Rectangle {
        let columns = self.dims.columns.max(1) as f32;
        let rows = self.dims.rows.max(1) as f32;
        let scale = (bounds.width / columns).min(bounds.height / rows);
        let size = Size::new(columns * scale, rows * scale);
        Rectangle::new(
            Point::new(
                (bounds.width - size.width) / 2.0,
                (bounds.height - size.height) / 2.0,
            ),
            size,
        )
    }
}

impl canvas::Program<Message> for OverlayLayer<'_> {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let target = self.image_rect(bounds.size());
        frame.translate(Vector::new(target.x, target.y));

        let mut surface = FrameSurface { frame: &mut frame };
        let host = HostSize::new(target.width, target.height, 1.0);
        self.engine.paint(&mut surface, host);

        vec![frame.into_geometry()]
    }
}

struct FrameSurface<'f> {
    frame: &'f mut Frame,
}

impl Surface for FrameSurface<'_> {
    fn resize(&mut self, width: u32, height: u32) {
        log::debug!("Overlay surface resized to {width}x{height}");
    }

    // Each canvas draw starts from a fresh frame.
    fn clear(&mut self) {}

    fn fill_rect(&mut self, rect: PixelRect, color: Rgba) {
        self.frame.fill_rectangle(
            Point::new(rect.x, rect.y),
            Size::new(rect.width, rect.height),
            to_color(color),
        );
    }

    fn stroke_rect(&mut self, rect: PixelRect, color: Rgba, line_width: f32) {
        let path = Path::rectangle(
            Point::new(rect.x, rect.y),
            Size::new(rect.width, rect.height),
        );
        self.frame.stroke(
            &path,
            Stroke::default()
                .with_color(to_color(color))
                .with_width(line_width),
        );
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Rgba) {
        self.frame.fill_text(canvas::Text {
            content: text.to_string(),
            position: Point::new(x, y),
            color: to_color(color),
            size: Pixels(TAG_FONT_SIZE),
            ..canvas::Text::default()
        });
    }
}

fn to_color(color: Rgba) -> Color {
    Color::from_rgba(color.r, color.g, color.b, color.a)
}
