use crate::message::Message;
use iced::widget::{button, column, container, pick_list, row, slider, text};
use iced::{Alignment, Element, Length};
use slicelens::cine::{MAX_FPS, MIN_FPS};
use slicelens::OverlayEngine;

pub fn toolbar(engine: &OverlayEngine, has_stack: bool) -> Element<'_, Message> {
    let results = engine.findings().len();
    let results_badge = match results {
        0 => String::from("No results"),
        1 => String::from("1 result"),
        n => format!("{n} results"),
    };

    let files = row![
        button("Open DICOM").on_press(Message::PickFiles),
        button("Load Results").on_press(Message::PickFindings),
        button("Clear").on_press_maybe((results > 0).then_some(Message::ClearFindings)),
        text(results_badge),
        button("Reset View").on_press_maybe(has_stack.then_some(Message::ResetView)),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    column![files, window_level_row(engine, has_stack), cine_row(engine, has_stack)]
        .spacing(8)
        .into()
}

fn window_level_row(engine: &OverlayEngine, has_stack: bool) -> Element<'_, Message> {
    let state = engine.window_state();
    let range = engine.slider_range();

    let mut controls = row![
        container(text(state.modality.as_str())).padding([2, 8]),
        pick_list(
            engine.window_level().choices(),
            Some(state.mode),
            Message::SelectWindowLevel
        ),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    if has_stack {
        controls = controls.push(
            row![
                text(format!("WW {:.0}", state.window_width)),
                slider(
                    range.width.clone(),
                    state.window_width,
                    Message::WindowWidthChanged
                )
                .step(1.0)
                .on_release(Message::SliderReleased)
                .width(Length::Fixed(160.0)),
                text(format!("WL {:.0}", state.window_level)),
                slider(
                    range.level.clone(),
                    state.window_level,
                    Message::WindowLevelChanged
                )
                .step(1.0)
                .on_release(Message::SliderReleased)
                .width(Length::Fixed(160.0)),
            ]
            .spacing(8)
            .align_y(Alignment::Center),
        );
    }

    controls.into()
}

fn cine_row(engine: &OverlayEngine, has_stack: bool) -> Element<'_, Message> {
    let cine = engine.cine();
    let play_label = if cine.is_playing() { "Pause" } else { "Play" };

    row![
        text(engine.slice_counter()).width(Length::Fixed(80.0)),
        button("<").on_press_maybe(has_stack.then_some(Message::StepBackward)),
        button(play_label).on_press_maybe(has_stack.then_some(Message::ToggleCine)),
        button(">").on_press_maybe(has_stack.then_some(Message::StepForward)),
        text(format!("{} fps", cine.fps())),
        slider(MIN_FPS..=MAX_FPS, cine.fps(), Message::SetFps)
            .step(1u32)
            .width(Length::Fixed(120.0)),
    ]
    .spacing(8)
    .align_y(Alignment::Center)
    .into()
}
