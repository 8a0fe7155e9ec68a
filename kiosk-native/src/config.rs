//! Configuration constants and the optional settings file for the booth.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::style::FontFamily;

/// Environment variable naming the JSON settings file
pub const SETTINGS_ENV: &str = "STRIPBOOTH_SETTINGS";

/// Countdown value each shot starts from
pub const COUNT_STARTER: u32 = 3;

/// Number of photos in one strip
pub const MAX_CAPTURES: usize = 4;

/// Delay between countdown ticks in milliseconds
pub const TICK_INTERVAL_MS: u64 = 1000;

/// Default camera device
pub const CAMERA_DEVICE: &str = "/dev/video0";

/// Requested camera resolution (16:9)
pub const CAMERA_WIDTH: u32 = 1280;
pub const CAMERA_HEIGHT: u32 = 720;

/// Preview FPS (reduced for ARM efficiency)
pub const PREVIEW_FPS: u32 = 15;

/// Directory holding the decorative frame art
pub const FRAMES_DIR: &str = "/usr/share/stripbooth/frames";

/// Default strip layout geometry (pixels)
pub mod strip {
    pub const WIDTH: u32 = 600;
    pub const PADDING: u32 = 24;
    pub const IMAGE_GAP: u32 = 12;
    pub const TEXT_MARGIN: u32 = 16;
    pub const TEXT_GAP: u32 = 8;
    pub const CAPTION_SIZE: f32 = 32.0;
    pub const DATE_SIZE: f32 = 22.0;
}

/// Framed layout geometry (pixels), sized to the frame art
pub mod framed {
    pub const CANVAS: u32 = 500;
    pub const CELL_WIDTH: u32 = 200;
    pub const CELL_HEIGHT: u32 = 115;
    pub const CELL_GAP: u32 = 8;
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Camera options passed to the video pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraOptions {
    pub device: String,
    pub width: u32,
    pub height: u32,
    pub mirrored: bool,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            device: CAMERA_DEVICE.to_string(),
            width: CAMERA_WIDTH,
            height: CAMERA_HEIGHT,
            mirrored: true,
        }
    }
}

/// Runtime settings, loaded from JSON with every field optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub max_captures: usize,
    pub countdown_start: u32,
    pub tick_interval_ms: u64,
    pub camera: CameraOptions,
    pub frames_dir: PathBuf,
    /// Font file per family. Families without an entry fall back to any
    /// loaded font.
    pub fonts: HashMap<FontFamily, PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_captures: MAX_CAPTURES,
            countdown_start: COUNT_STARTER,
            tick_interval_ms: TICK_INTERVAL_MS,
            camera: CameraOptions::default(),
            frames_dir: PathBuf::from(FRAMES_DIR),
            fonts: HashMap::new(),
        }
    }
}

impl Settings {
    /// Parse and validate settings from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load from the file named by `STRIPBOOTH_SETTINGS`, or defaults if unset
    pub fn from_env() -> Result<Self, SettingsError> {
        match std::env::var_os(SETTINGS_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_captures == 0 {
            return Err(invalid("max_captures", "must be at least 1"));
        }
        if self.countdown_start == 0 {
            return Err(invalid("countdown_start", "must be at least 1"));
        }
        if self.tick_interval_ms == 0 {
            return Err(invalid("tick_interval_ms", "must be positive"));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(invalid(
                "camera",
                format!("resolution {}x{} is empty", self.camera.width, self.camera.height),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> SettingsError {
    SettingsError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.max_captures, 4);
        assert_eq!(settings.countdown_start, 3);
        assert!(settings.camera.mirrored);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json_str(
            r#"{ "max_captures": 3, "camera": { "device": "/dev/video2" } }"#,
        )
        .unwrap();
        assert_eq!(settings.max_captures, 3);
        assert_eq!(settings.countdown_start, COUNT_STARTER);
        assert_eq!(settings.camera.device, "/dev/video2");
        assert_eq!(settings.camera.width, CAMERA_WIDTH);
    }

    #[test]
    fn test_font_map() {
        let settings = Settings::from_json_str(
            r#"{ "fonts": { "cursive": "/fonts/Pacifico.ttf", "monospace": "/fonts/Mono.ttf" } }"#,
        )
        .unwrap();
        assert_eq!(
            settings.fonts.get(&FontFamily::Cursive),
            Some(&PathBuf::from("/fonts/Pacifico.ttf"))
        );
        assert_eq!(settings.fonts.len(), 2);
    }

    #[test]
    fn test_rejects_zero_values() {
        let err = Settings::from_json_str(r#"{ "max_captures": 0 }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "max_captures", .. }));

        let err = Settings::from_json_str(r#"{ "countdown_start": 0 }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "countdown_start", .. }));

        let err = Settings::from_json_str(r#"{ "camera": { "width": 0 } }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "camera", .. }));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = Settings::from_json_str("{ max_captures: ").unwrap_err();
        assert!(matches!(err, SettingsError::Json(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "tick_interval_ms": 500, "frames_dir": "/tmp/frames" }}"#).unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.tick_interval_ms, 500);
        assert_eq!(settings.frames_dir, PathBuf::from("/tmp/frames"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }
}
