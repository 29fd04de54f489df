use crate::message::{Message, SidePanel};
use iced::border::{Border, Radius};
use iced::widget::text::Wrapping;
use iced::widget::{button, container, text, Container, Row};
use iced::{Alignment, Background, Color, Length, Theme};

const PILL: f32 = 999.0;
const INNER: f32 = 6.0;

/// Switches the side column between the findings list and the HUD.
pub fn side_panel_toggle(current: SidePanel, finding_count: usize) -> Container<'static, Message> {
    let panels = [
        (format!("Findings ({finding_count})"), SidePanel::Findings),
        (String::from("HUD"), SidePanel::Hud),
    ];
    let last = panels.len() - 1;

    let segments = panels
        .into_iter()
        .enumerate()
        .fold(Row::new(), |segments, (idx, (label, panel))| {
            segments.push(segment(label, panel == current, idx, last, panel))
        });

    container(segments)
        .padding(3)
        .width(Length::Fill)
        .style(track_style)
}

fn segment(
    label: String,
    active: bool,
    idx: usize,
    last: usize,
    panel: SidePanel,
) -> button::Button<'static, Message> {
    let radius = Radius {
        top_left: if idx == 0 { PILL } else { INNER },
        bottom_left: if idx == 0 { PILL } else { INNER },
        top_right: if idx == last { PILL } else { INNER },
        bottom_right: if idx == last { PILL } else { INNER },
    };
    let label = container(text(label).size(14).wrapping(Wrapping::None))
        .center_x(Length::Fill)
        .align_y(Alignment::Center)
        .height(Length::Fixed(30.0));

    button(label)
        .padding([0, 12])
        .width(Length::FillPortion(1))
        .on_press_maybe((!active).then_some(Message::SetSidePanel(panel)))
        .style(move |theme, status| segment_style(theme, status, active, radius))
}

fn track_style(theme: &Theme) -> container::Style {
    let palette = theme.extended_palette();
    container::Style {
        background: Some(Background::Color(palette.background.weak.color)),
        border: Border {
            color: palette.background.strong.color,
            width: 1.0,
            radius: Radius::new(PILL),
        },
        ..container::Style::default()
    }
}

fn segment_style(
    theme: &Theme,
    status: button::Status,
    active: bool,
    radius: Radius,
) -> button::Style {
    let palette = theme.extended_palette();
    // The active segment has no press handler, so it always reports Disabled.
    let (fill, text_color) = match (active, status) {
        (true, _) => (palette.primary.strong.color, palette.primary.strong.text),
        (false, button::Status::Hovered) => (
            palette.background.strong.color,
            palette.background.strong.text,
        ),
        (false, button::Status::Pressed) => (
            palette.primary.weak.color,
            palette.primary.weak.text,
        ),
        (false, _) => (Color::TRANSPARENT, palette.background.base.text),
    };

    button::Style {
        background: Some(Background::Color(fill)),
        text_color,
        border: Border {
            radius,
            ..Border::default()
        },
        ..button::Style::default()
    }
}
