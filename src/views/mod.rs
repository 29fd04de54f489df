pub mod findings_panel;
pub mod hud_panel;
pub mod toolbar;
pub mod viewport_panel;

pub use findings_panel::findings_panel;
pub use hud_panel::hud_panel;
pub use toolbar::toolbar;
pub use viewport_panel::viewport_panel;
