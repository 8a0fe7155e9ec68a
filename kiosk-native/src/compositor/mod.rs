//! Strip compositor: lays captured photos out as a default strip or inside
//! decorative frame art, then rasterizes the result.
//!
//! Layout is decided by [`select_layout`] from the frame choice alone and is
//! planned as plain geometry ([`StripPlan`]) before any pixels are touched.

mod frames;
mod render;
mod text;

use std::path::PathBuf;

use thiserror::Error;

pub use frames::FrameLibrary;
pub use render::{Compositor, RenderedStrip};
pub use text::FontBook;

use crate::camera::Frame;
use crate::config::{framed, strip};
use crate::filter::GREYSCALE_CONTRAST;
use crate::style::{Color, FilterKind, FontFamily, FrameChoice, StripConfig};

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to load image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Failed to parse font {path}: {reason}")]
    Font { path: PathBuf, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("No photos to compose")]
    NoImages,
    #[error("Photo {index} has no pixels")]
    EmptyFrame { index: usize },
}

/// The two strip layouts. There is no blend of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    /// Photos stacked at half width over the background color, caption below
    Default,
    /// Photos in a fixed grid under the frame art
    Framed,
}

pub fn select_layout(frame: FrameChoice) -> LayoutKind {
    match frame {
        FrameChoice::None => LayoutKind::Default,
        _ => LayoutKind::Framed,
    }
}

/// How a photo is scaled into its cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    /// Cell already has the photo's aspect ratio
    Stretch,
    /// Scale to cover the cell and crop the overflow
    Cover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Cell {
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

/// One centered line of text
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub top: u32,
    pub size: f32,
    pub line_height: u32,
}

/// Geometry and styling of a strip, ready to rasterize
#[derive(Debug, Clone, PartialEq)]
pub struct StripPlan {
    pub kind: LayoutKind,
    pub width: u32,
    pub height: u32,
    /// `None` leaves the canvas transparent
    pub background: Option<Color>,
    pub cells: Vec<Cell>,
    pub fit: Fit,
    pub filter: FilterKind,
    /// Extra contrast applied after the filter
    pub contrast: Option<f32>,
    pub text_color: Color,
    pub lines: Vec<TextLine>,
    pub overlay: Option<FrameChoice>,
}

/// Measures laid-out text so the plan can reserve room for wrapped lines
pub trait TextMeasure {
    /// Height of `text` wrapped to `max_width`, or `None` if it would not be drawn
    fn text_height(&self, family: FontFamily, text: &str, size: f32, max_width: u32)
        -> Option<u32>;
}

/// Plan the strip for `images` under `config`. `date_label` is only used
/// when the config shows the date.
pub fn plan(
    images: &[Frame],
    config: &StripConfig,
    date_label: &str,
    measure: &dyn TextMeasure,
) -> StripPlan {
    let sizes: Vec<(u32, u32)> = images.iter().map(|f| (f.width(), f.height())).collect();
    match select_layout(config.frame) {
        LayoutKind::Default => plan_default(&sizes, config, date_label, measure),
        LayoutKind::Framed => plan_framed(sizes.len(), config),
    }
}

fn line_height(size: f32) -> u32 {
    (size * 1.3).ceil() as u32
}

/// One line box at least, or as many as the wrapped text needs
fn text_box(measure: &dyn TextMeasure, font: FontFamily, text: &str, size: f32) -> u32 {
    let single = line_height(size);
    measure
        .text_height(font, text, size, strip::WIDTH)
        .map_or(single, |height| height.max(single))
}

fn plan_default(
    sizes: &[(u32, u32)],
    config: &StripConfig,
    date_label: &str,
    measure: &dyn TextMeasure,
) -> StripPlan {
    let photo_width = strip::WIDTH / 2;
    let x = (strip::WIDTH - photo_width) / 2;

    let mut cells = Vec::with_capacity(sizes.len());
    let mut y = strip::PADDING;
    for (i, &(w, h)) in sizes.iter().enumerate() {
        if i > 0 {
            y += strip::IMAGE_GAP;
        }
        let height = if w == 0 {
            0
        } else {
            ((photo_width as u64 * h as u64 + w as u64 / 2) / w as u64) as u32
        };
        cells.push(Cell {
            x,
            y,
            width: photo_width,
            height: height.max(1),
        });
        y += height.max(1);
    }

    let mut lines = Vec::with_capacity(2);
    y += strip::TEXT_MARGIN;
    let caption_height = text_box(measure, config.font, &config.caption, strip::CAPTION_SIZE);
    lines.push(TextLine {
        text: config.caption.clone(),
        top: y,
        size: strip::CAPTION_SIZE,
        line_height: caption_height,
    });
    y += caption_height;

    if config.show_date {
        y += strip::TEXT_GAP;
        let date_height = text_box(measure, config.font, date_label, strip::DATE_SIZE);
        lines.push(TextLine {
            text: date_label.to_string(),
            top: y,
            size: strip::DATE_SIZE,
            line_height: date_height,
        });
        y += date_height;
    }

    StripPlan {
        kind: LayoutKind::Default,
        width: strip::WIDTH,
        height: y + strip::PADDING,
        background: Some(config.background),
        cells,
        fit: Fit::Stretch,
        filter: config.filter,
        contrast: (config.filter == FilterKind::Greyscale).then_some(GREYSCALE_CONTRAST),
        text_color: config.text_color.color(),
        lines,
        overlay: None,
    }
}

fn plan_framed(count: usize, config: &StripConfig) -> StripPlan {
    let count = count as u32;
    let column = count * framed::CELL_HEIGHT + count.saturating_sub(1) * framed::CELL_GAP;
    let x = (framed::CANVAS - framed::CELL_WIDTH) / 2;
    let mut y = framed::CANVAS.saturating_sub(column) / 2;

    let cells = (0..count)
        .map(|_| {
            let cell = Cell {
                x,
                y,
                width: framed::CELL_WIDTH,
                height: framed::CELL_HEIGHT,
            };
            y += framed::CELL_HEIGHT + framed::CELL_GAP;
            cell
        })
        .collect();

    StripPlan {
        kind: LayoutKind::Framed,
        width: framed::CANVAS,
        height: framed::CANVAS,
        background: None,
        cells,
        fit: Fit::Cover,
        filter: config.filter,
        contrast: None,
        text_color: config.text_color.color(),
        lines: Vec::new(),
        overlay: Some(config.frame),
    }
}
