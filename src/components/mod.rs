pub mod segmented_toggle;

pub use segmented_toggle::side_panel_toggle;
