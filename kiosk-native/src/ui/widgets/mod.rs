//! Reusable UI widgets.

pub mod animations;
pub mod config_panel;
pub mod strip_view;

pub use config_panel::ConfigPanel;
pub use strip_view::{strip_texture, StripView};
