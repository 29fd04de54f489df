//! Overlay synchronization for a DICOM stack viewport.
//!
//! Findings are drawn on top of a viewport that is owned elsewhere and only
//! reachable through [`adapter::ViewportAdapter`]. [`engine::OverlayEngine`]
//! polls that viewport, keeps the overlay and side list in step with the
//! current slice, runs the window/level state machine and drives cine.

pub mod adapter;
pub mod cine;
pub mod config;
pub mod engine;
pub mod error;
pub mod findings;
pub mod geometry;
pub mod hud;
pub mod modality;
pub mod overlay;
pub mod poller;
pub mod prefs;
pub mod window_level;

pub use adapter::{Viewport, ViewportAdapter};
pub use config::Settings;
pub use engine::{OverlayEngine, PollOutcome};
pub use findings::{Finding, FindingStore};
pub use geometry::{normalize, CanonicalRect, ImageDims};
pub use modality::Modality;
