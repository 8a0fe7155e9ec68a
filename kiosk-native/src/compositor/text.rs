//! Caption and date rasterization with fontdue.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use fontdue::layout::{CoordinateSystem, HorizontalAlign, Layout, LayoutSettings, TextStyle};
use fontdue::{Font, FontSettings};
use image::RgbaImage;

use super::{AssetError, TextMeasure};
use crate::style::{Color, FontFamily};

/// Fonts per family, loaded once at startup
#[derive(Default)]
pub struct FontBook {
    fonts: HashMap<FontFamily, Font>,
}

impl FontBook {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load every configured font. Fonts that fail to load are logged and
    /// left out; text in those families falls back to another font.
    pub fn load(paths: &HashMap<FontFamily, PathBuf>) -> Self {
        let mut book = Self::empty();
        for (family, path) in paths {
            match load_font(path) {
                Ok(font) => {
                    log::info!("Loaded {:?} font from {}", family, path.display());
                    book.insert(*family, font);
                }
                Err(e) => log::warn!("{}", e),
            }
        }
        if book.fonts.is_empty() {
            log::warn!("No fonts loaded; strip captions will not be drawn");
        }
        book
    }

    pub fn insert(&mut self, family: FontFamily, font: Font) {
        self.fonts.insert(family, font);
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// The font for `family`, or the first loaded family in declaration order
    pub fn resolve(&self, family: FontFamily) -> Option<&Font> {
        self.fonts.get(&family).or_else(|| {
            FontFamily::ALL
                .iter()
                .find_map(|fallback| self.fonts.get(fallback))
        })
    }

    /// Draw `text` horizontally centered on `canvas` with its line box
    /// starting at `top`. Returns false when nothing could be drawn.
    pub fn draw_centered(
        &self,
        canvas: &mut RgbaImage,
        family: FontFamily,
        text: &str,
        size: f32,
        top: u32,
        color: Color,
    ) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        let Some(font) = self.resolve(family) else {
            log::warn!("No font available for {:?}; skipping \"{}\"", family, text);
            return false;
        };

        let layout = centered_layout(font, text, size, top as f32, canvas.width());
        for glyph in layout.glyphs() {
            if glyph.width == 0 || glyph.height == 0 {
                continue;
            }
            let (_, coverage) = font.rasterize_config(glyph.key);
            blend_coverage(
                canvas,
                glyph.x.round() as i64,
                glyph.y.round() as i64,
                glyph.width,
                glyph.height,
                &coverage,
                color,
            );
        }
        true
    }
}

impl TextMeasure for FontBook {
    fn text_height(
        &self,
        family: FontFamily,
        text: &str,
        size: f32,
        max_width: u32,
    ) -> Option<u32> {
        if text.trim().is_empty() {
            return None;
        }
        let font = self.resolve(family)?;
        let layout = centered_layout(font, text, size, 0.0, max_width);
        Some(layout.height().ceil() as u32)
    }
}

/// Lay `text` out centered across `max_width`, wrapping at word boundaries
fn centered_layout(font: &Font, text: &str, size: f32, top: f32, max_width: u32) -> Layout {
    let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
    layout.reset(&LayoutSettings {
        x: 0.0,
        y: top,
        max_width: Some(max_width as f32),
        horizontal_align: HorizontalAlign::Center,
        ..LayoutSettings::default()
    });
    layout.append(&[font], &TextStyle::new(text, size, 0));
    layout
}

fn load_font(path: &Path) -> Result<Font, AssetError> {
    let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Font::from_bytes(bytes, FontSettings::default()).map_err(|reason| AssetError::Font {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    })
}

/// Alpha-blend a glyph coverage mask onto the canvas, clipping at the edges
fn blend_coverage(
    canvas: &mut RgbaImage,
    x: i64,
    y: i64,
    width: usize,
    height: usize,
    coverage: &[u8],
    color: Color,
) {
    let (cw, ch) = (canvas.width() as i64, canvas.height() as i64);
    for row in 0..height {
        let py = y + row as i64;
        if py < 0 || py >= ch {
            continue;
        }
        for col in 0..width {
            let px = x + col as i64;
            if px < 0 || px >= cw {
                continue;
            }
            let mask = coverage[row * width + col];
            if mask == 0 {
                continue;
            }
            let pixel = canvas.get_pixel_mut(px as u32, py as u32);
            blend_pixel(pixel, color, mask);
        }
    }
}

fn blend_pixel(pixel: &mut image::Rgba<u8>, color: Color, alpha: u8) {
    let a = alpha as u32;
    let inv = 255 - a;
    let mix = |src: u8, dst: u8| ((src as u32 * a + dst as u32 * inv + 127) / 255) as u8;
    pixel.0[0] = mix(color.r, pixel.0[0]);
    pixel.0[1] = mix(color.g, pixel.0[1]);
    pixel.0[2] = mix(color.b, pixel.0[2]);
    pixel.0[3] = (a + (pixel.0[3] as u32 * inv + 127) / 255).min(255) as u8;
}
