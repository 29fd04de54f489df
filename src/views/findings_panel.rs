use crate::message::{LabelFilter, Message};
use iced::widget::text::Wrapping;
use iced::widget::{button, column, pick_list, row, scrollable, text, text_input};
use iced::{Element, Length};
use slicelens::findings::{score_badge, slice_caption, FindingQuery};
use slicelens::FindingStore;

/// Searchable side list. Clicking a row jumps the viewport to its slice.
pub fn findings_panel<'a>(
    store: &'a FindingStore,
    search: &'a str,
    filter: &'a LabelFilter,
) -> Element<'a, Message> {
    if store.is_empty() {
        return text("No results loaded").into();
    }

    let mut filters = vec![LabelFilter::All];
    filters.extend(store.unique_labels().into_iter().map(LabelFilter::Label));

    let controls = row![
        text_input("Search findings", search)
            .on_input(Message::SearchChanged)
            .width(Length::FillPortion(3)),
        pick_list(filters, Some(filter.clone()), Message::LabelFilterChanged)
            .width(Length::FillPortion(2)),
    ]
    .spacing(8);

    let query = FindingQuery {
        search: search.to_string(),
        label: filter.as_label().map(str::to_string),
    };
    let matches = store.query(&query);

    let mut list = column![].spacing(4);
    if matches.is_empty() {
        list = list.push(text("No findings match"));
    }
    for finding in matches {
        let entry = row![
            text(&finding.label)
                .width(Length::FillPortion(3))
                .wrapping(Wrapping::Word),
            text(score_badge(finding.score)).width(Length::FillPortion(1)),
            text(slice_caption(finding.slice_index)).width(Length::FillPortion(2)),
        ]
        .spacing(12);
        list = list.push(
            button(entry)
                .width(Length::Fill)
                .style(button::text)
                .on_press(Message::JumpToFinding(finding.id.clone())),
        );
    }

    column![controls, scrollable(list)].spacing(12).into()
}
