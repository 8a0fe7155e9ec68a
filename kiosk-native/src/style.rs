//! Strip appearance: the configuration the panel edits and the compositor reads.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, 255])
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Background swatches offered by the configuration panel
pub const BACKGROUND_SWATCHES: [(&str, Color); 6] = [
    ("Red", Color::rgb(0xc0, 0x39, 0x2b)),
    ("Green", Color::rgb(0x1e, 0x6b, 0x3a)),
    ("Gold", Color::rgb(0xd4, 0xa0, 0x17)),
    ("Navy", Color::rgb(0x1b, 0x2a, 0x49)),
    ("Cream", Color::rgb(0xf5, 0xec, 0xd7)),
    ("Black", Color::rgb(0x11, 0x11, 0x11)),
];

pub const DEFAULT_BACKGROUND: Color = BACKGROUND_SWATCHES[0].1;

/// Image filter applied to every photo in the strip
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterKind {
    #[default]
    None,
    /// Black and white; the default layout adds a contrast boost on top
    Greyscale,
    Sepia,
    Vintage,
    Cool,
}

impl FilterKind {
    pub const ALL: [FilterKind; 5] = [
        FilterKind::None,
        FilterKind::Greyscale,
        FilterKind::Sepia,
        FilterKind::Vintage,
        FilterKind::Cool,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterKind::None => "None",
            FilterKind::Greyscale => "Greyscale",
            FilterKind::Sepia => "Sepia",
            FilterKind::Vintage => "Vintage",
            FilterKind::Cool => "Cool",
        }
    }
}

/// Caption and date color
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextColor {
    #[default]
    Light,
    Dark,
}

impl TextColor {
    pub fn color(self) -> Color {
        match self {
            TextColor::Light => Color::rgb(255, 255, 255),
            TextColor::Dark => Color::rgb(0, 0, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    #[default]
    Cursive,
    Serif,
    SansSerif,
    Monospace,
}

impl FontFamily {
    pub const ALL: [FontFamily; 4] = [
        FontFamily::Cursive,
        FontFamily::Serif,
        FontFamily::SansSerif,
        FontFamily::Monospace,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FontFamily::Cursive => "Cursive",
            FontFamily::Serif => "Serif",
            FontFamily::SansSerif => "Sans",
            FontFamily::Monospace => "Mono",
        }
    }
}

/// Decorative frame art. `None` selects the default stacked strip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameChoice {
    #[default]
    None,
    Holly,
    Snowflakes,
    Garland,
}

impl FrameChoice {
    pub const ALL: [FrameChoice; 4] = [
        FrameChoice::None,
        FrameChoice::Holly,
        FrameChoice::Snowflakes,
        FrameChoice::Garland,
    ];

    /// File name of the frame art inside the frames directory
    pub fn asset_name(self) -> Option<&'static str> {
        match self {
            FrameChoice::None => None,
            FrameChoice::Holly => Some("holly.png"),
            FrameChoice::Snowflakes => Some("snowflakes.png"),
            FrameChoice::Garland => Some("garland.png"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FrameChoice::None => "No frame",
            FrameChoice::Holly => "Holly",
            FrameChoice::Snowflakes => "Snowflakes",
            FrameChoice::Garland => "Garland",
        }
    }
}

/// Everything the configuration panel can change about the strip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripConfig {
    pub background: Color,
    pub filter: FilterKind,
    pub caption: String,
    pub text_color: TextColor,
    pub show_date: bool,
    pub font: FontFamily,
    pub frame: FrameChoice,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            background: DEFAULT_BACKGROUND,
            filter: FilterKind::None,
            caption: String::new(),
            text_color: TextColor::Light,
            show_date: true,
            font: FontFamily::Cursive,
            frame: FrameChoice::None,
        }
    }
}

impl StripConfig {
    /// Defaults for a new session. Font family and frame are kept from the
    /// previous session; everything else starts over.
    pub fn for_next_session(&self) -> Self {
        Self {
            font: self.font,
            frame: self.frame,
            ..Self::default()
        }
    }
}
