use crate::message::Message;
use crate::utils::truncate_value;
use iced::widget::text::Wrapping;
use iced::widget::{button, column, row, scrollable, text};
use iced::{Element, Length};
use slicelens::hud::{HudField, HudFinding};

pub fn hud_panel<'a>(fields: &'a [HudField], findings: &'a [HudFinding]) -> Element<'a, Message> {
    if fields.is_empty() {
        return text("No image metadata yet").into();
    }

    let mut table = column![].spacing(8);
    for field in fields {
        table = table.push(
            row![
                text(field.key).width(Length::FillPortion(2)),
                text(truncate_value(&field.value))
                    .width(Length::FillPortion(3))
                    .wrapping(Wrapping::Word),
            ]
            .spacing(12),
        );
    }

    table = table.push(text("Findings on this slice").size(16));
    if findings.is_empty() {
        table = table.push(text("None"));
    }
    for finding in findings {
        table = table.push(
            button(
                row![
                    text(&finding.label).width(Length::FillPortion(3)),
                    text(&finding.caption).width(Length::FillPortion(2)),
                ]
                .spacing(12),
            )
            .width(Length::Fill)
            .style(button::text)
            .on_press(Message::JumpToFinding(finding.id.clone())),
        );
    }

    scrollable(table).into()
}
