//! StripBooth - photo strip booth core.
//!
//! Architecture:
//! - `capture` module: countdown and shutter sequencing
//! - `view` module: screen selection derived from capture state
//! - `compositor` module: strip layout and rasterization
//! - `export` module: PNG data URI encoding and export request state
//! - `state` module: GTK-free state machine tying the above together (testable)
//! - `app`, `ui`, `video` modules (feature `kiosk`): GTK4 + GStreamer front end

pub mod camera;
pub mod capture;
pub mod compositor;
pub mod config;
pub mod export;
pub mod filter;
pub mod state;
pub mod style;
pub mod view;

#[cfg(feature = "kiosk")]
pub mod app;
#[cfg(feature = "kiosk")]
pub mod ui;
#[cfg(feature = "kiosk")]
pub mod video;
