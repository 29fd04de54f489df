use crate::components::side_panel_toggle;
use crate::message::{LabelFilter, Message, SidePanel};
use crate::model::loader::load_series;
use crate::model::StackViewport;
use crate::views::{findings_panel, hud_panel, toolbar, viewport_panel};
use iced::widget::text::Wrapping;
use iced::widget::{column, container, row, text};
use iced::{application, time, Alignment, Element, Length, Subscription, Task, Theme};
use rfd::AsyncFileDialog;
use slicelens::findings::load_findings_file;
use slicelens::prefs::Preferences;
use slicelens::{OverlayEngine, Settings, ViewportAdapter};

const APP_TITLE: &str = "SliceLens";

pub fn run(settings: Settings) -> iced::Result {
    application(APP_TITLE, App::update, App::view)
        .subscription(App::subscription)
        .theme(App::theme)
        .run_with(move || App::new(settings))
}

pub struct App {
    engine: OverlayEngine,
    viewport: Option<StackViewport>,
    side_panel: SidePanel,
    search: String,
    label_filter: LabelFilter,
    last_error: Option<String>,
}

impl App {
    fn new(settings: Settings) -> (Self, Task<Message>) {
        let prefs = match &settings.prefs_path {
            Some(path) => Preferences::open_file(path),
            None => Preferences::in_memory(),
        };
        let findings_path = settings.findings_path.clone();
        let dicom_paths = settings.dicom_paths.clone();

        let mut app = Self {
            engine: OverlayEngine::new(settings, prefs),
            viewport: None,
            side_panel: SidePanel::default(),
            search: String::new(),
            label_filter: LabelFilter::All,
            last_error: None,
        };

        if let Some(path) = findings_path {
            match load_findings_file(&path) {
                Ok(findings) => {
                    app.engine.ingest(findings);
                }
                Err(err) => {
                    log::error!("{err}");
                    app.last_error = Some(err.to_string());
                }
            }
        }

        let task = if dicom_paths.is_empty() {
            Task::none()
        } else {
            Task::perform(async move { load_series(dicom_paths) }, Message::FilesLoaded)
        };
        (app, task)
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickFiles => Task::perform(
                async {
                    match AsyncFileDialog::new().pick_files().await {
                        Some(handles) if !handles.is_empty() => load_series(
                            handles
                                .into_iter()
                                .map(|handle| handle.path().to_path_buf())
                                .collect(),
                        ),
                        _ => Vec::new(),
                    }
                },
                Message::FilesLoaded,
            ),
            Message::FilesLoaded(results) => {
                if results.is_empty() {
                    return Task::none();
                }

                let mut slices = Vec::new();
                let mut errors = Vec::new();
                for result in results {
                    match result {
                        Ok(slice) => slices.push(slice),
                        Err(err) => errors.push(err),
                    }
                }

                if !slices.is_empty() {
                    log::info!("Opened series with {} slice(s)", slices.len());
                    self.engine.stop_cine();
                    self.viewport = Some(StackViewport::new(slices));
                }
                self.last_error = if errors.is_empty() {
                    None
                } else {
                    Some(errors.join("\n"))
                };

                Task::done(Message::PollTick)
            }
            Message::PickFindings => Task::perform(
                async {
                    let handle = AsyncFileDialog::new()
                        .add_filter("JSON", &["json"])
                        .pick_file()
                        .await?;
                    Some(load_findings_file(handle.path()).map_err(|err| err.to_string()))
                },
                |picked| match picked {
                    Some(Ok(findings)) => Message::FindingsPublished(findings),
                    Some(Err(err)) => Message::FindingsFailed(err),
                    None => Message::FindingsFailed(String::new()),
                },
            ),
            Message::FindingsPublished(findings) => {
                self.engine.ingest(findings);
                self.label_filter = LabelFilter::All;
                self.last_error = None;
                Task::none()
            }
            Message::FindingsFailed(err) => {
                if !err.is_empty() {
                    log::error!("{err}");
                    self.last_error = Some(err);
                }
                Task::none()
            }
            Message::ClearFindings => {
                self.engine.clear_findings();
                self.label_filter = LabelFilter::All;
                Task::none()
            }
            Message::PollTick => {
                let outcome = self.engine.poll(bound(&mut self.viewport));
                if !outcome.transitions.is_empty() {
                    log::debug!("Viewport transitions: {:?}", outcome.transitions);
                }
                Task::none()
            }
            Message::CineTick(id) => {
                self.engine.cine_tick(id, bound(&mut self.viewport));
                Task::none()
            }
            Message::ToggleCine => {
                self.engine.toggle_cine(bound(&mut self.viewport));
                Task::none()
            }
            Message::StepForward => {
                self.engine.step_forward(bound(&mut self.viewport));
                Task::none()
            }
            Message::StepBackward => {
                self.engine.step_backward(bound(&mut self.viewport));
                Task::none()
            }
            Message::SetFps(fps) => {
                self.engine.set_cine_fps(fps);
                Task::none()
            }
            Message::SelectWindowLevel(mode) => {
                self.engine
                    .select_window_level(mode, bound(&mut self.viewport));
                Task::none()
            }
            Message::WindowWidthChanged(width) => {
                self.engine.begin_window_drag();
                self.engine
                    .set_window_width(width, bound(&mut self.viewport));
                Task::none()
            }
            Message::WindowLevelChanged(level) => {
                self.engine.begin_window_drag();
                self.engine
                    .set_window_level(level, bound(&mut self.viewport));
                Task::none()
            }
            Message::SliderReleased => {
                self.engine.end_window_drag();
                Task::none()
            }
            Message::ResetView => {
                self.engine.reset_view(bound(&mut self.viewport));
                Task::done(Message::PollTick)
            }
            Message::JumpToFinding(id) => {
                self.engine.jump_to_finding(&id, bound(&mut self.viewport));
                Task::done(Message::PollTick)
            }
            Message::SearchChanged(search) => {
                self.search = search;
                Task::none()
            }
            Message::LabelFilterChanged(filter) => {
                self.label_filter = filter;
                Task::none()
            }
            Message::SetSidePanel(panel) => {
                self.side_panel = panel;
                Task::none()
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let bar = toolbar(&self.engine, self.viewport.is_some());

        let image = container(viewport_panel(self.viewport.as_ref(), &self.engine))
            .padding(16)
            .width(Length::FillPortion(3))
            .height(Length::Fill)
            .align_x(Alignment::Center)
            .align_y(Alignment::Center);

        let side_content = match self.side_panel {
            SidePanel::Findings => {
                findings_panel(self.engine.findings(), &self.search, &self.label_filter)
            }
            SidePanel::Hud => hud_panel(self.engine.hud_fields(), self.engine.hud_findings()),
        };
        let side = container(
            column![
                side_panel_toggle(self.side_panel, self.engine.findings().len()),
                side_content,
            ]
            .spacing(12),
        )
        .padding(16)
        .width(Length::FillPortion(1));

        let mut content = column![row![image, side]
            .spacing(16)
            .width(Length::Fill)
            .height(Length::Fill)]
        .spacing(16);

        if let Some(error) = &self.last_error {
            content = content.push(text(error).size(16).wrapping(Wrapping::Word));
        }

        column![bar, content]
            .padding(20)
            .spacing(20)
            .align_x(Alignment::Start)
            .into()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let poll = time::every(self.engine.settings().poll_interval).map(|_| Message::PollTick);
        let cine = match self.engine.cine_timer() {
            Some(timer) => time::every(timer.interval)
                .with(timer.id)
                .map(|(id, _)| Message::CineTick(id)),
            None => Subscription::none(),
        };
        Subscription::batch([poll, cine])
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn bound(viewport: &mut Option<StackViewport>) -> Option<&mut dyn ViewportAdapter> {
    viewport
        .as_mut()
        .map(|viewport| viewport as &mut dyn ViewportAdapter)
}
