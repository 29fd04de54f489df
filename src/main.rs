mod app;
mod cli;
mod components;
mod image_pipeline;
mod message;
mod model;
mod utils;
mod views;

use clap::Parser;

pub fn main() -> iced::Result {
    let _ = env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .try_init();

    let settings = cli::Cli::parse().into_settings();
    app::run(settings)
}
