//! Rasterization of a [`StripPlan`].

use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use super::{plan, Cell, Fit, FontBook, FrameLibrary, LayoutKind, RenderError, StripPlan};
use crate::camera::Frame;
use crate::config::Settings;
use crate::filter::{apply_filter, boost_contrast};
use crate::style::StripConfig;

/// A finished strip image, shared with the export path
#[derive(Debug, Clone)]
pub struct RenderedStrip {
    pub kind: LayoutKind,
    pub image: Arc<RgbaImage>,
}

impl RenderedStrip {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Renders strips using the loaded fonts and frame art
#[derive(Default)]
pub struct Compositor {
    fonts: FontBook,
    frames: FrameLibrary,
}

impl Compositor {
    pub fn new(fonts: FontBook, frames: FrameLibrary) -> Self {
        Self { fonts, frames }
    }

    /// Load fonts and frame art named in the settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            FontBook::load(&settings.fonts),
            FrameLibrary::load(&settings.frames_dir),
        )
    }

    pub fn render(
        &self,
        images: &[Frame],
        config: &StripConfig,
        date_label: &str,
    ) -> Result<RenderedStrip, RenderError> {
        if images.is_empty() {
            return Err(RenderError::NoImages);
        }
        if let Some(index) = images.iter().position(|f| f.width() == 0 || f.height() == 0) {
            return Err(RenderError::EmptyFrame { index });
        }

        let plan = plan(images, config, date_label, &self.fonts);
        let background = plan
            .background
            .map(|c| c.to_rgba())
            .unwrap_or(Rgba([0, 0, 0, 0]));
        let mut canvas = RgbaImage::from_pixel(plan.width, plan.height, background);

        for (frame, cell) in images.iter().zip(&plan.cells) {
            let photo = self.prepare_photo(&frame.image, cell, &plan);
            imageops::overlay(&mut canvas, &photo, cell.x as i64, cell.y as i64);
        }

        for line in &plan.lines {
            self.fonts.draw_centered(
                &mut canvas,
                config.font,
                &line.text,
                line.size,
                line.top,
                plan.text_color,
            );
        }

        if let Some(choice) = plan.overlay {
            match self.frames.get(choice) {
                Some(art) => overlay_contained(&mut canvas, art),
                None => log::warn!("Frame art for {:?} not loaded; drawing photos only", choice),
            }
        }

        Ok(RenderedStrip {
            kind: plan.kind,
            image: Arc::new(canvas),
        })
    }

    fn prepare_photo(&self, image: &RgbaImage, cell: &Cell, plan: &StripPlan) -> RgbaImage {
        let scaled = match plan.fit {
            Fit::Stretch => imageops::resize(image, cell.width, cell.height, FilterType::Triangle),
            Fit::Cover => cover(image, cell.width, cell.height),
        };
        let mut photo = apply_filter(&scaled, plan.filter);
        if let Some(factor) = plan.contrast {
            boost_contrast(&mut photo, factor);
        }
        photo
    }
}

/// Scale to cover `width` x `height`, cropping the overflow around the center
fn cover(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (iw, ih) = (image.width() as f64, image.height() as f64);
    let scale = (width as f64 / iw).max(height as f64 / ih);
    let sw = ((iw * scale).ceil() as u32).max(width);
    let sh = ((ih * scale).ceil() as u32).max(height);
    let scaled = imageops::resize(image, sw, sh, FilterType::Triangle);
    imageops::crop_imm(&scaled, (sw - width) / 2, (sh - height) / 2, width, height).to_image()
}

/// Scale `art` to fit inside the canvas and draw it centered on top
fn overlay_contained(canvas: &mut RgbaImage, art: &RgbaImage) {
    let (cw, ch) = (canvas.width(), canvas.height());
    let scale = (cw as f64 / art.width() as f64).min(ch as f64 / art.height() as f64);
    let w = ((art.width() as f64 * scale).round() as u32).clamp(1, cw);
    let h = ((art.height() as f64 * scale).round() as u32).clamp(1, ch);
    let scaled = imageops::resize(art, w, h, FilterType::Triangle);
    imageops::overlay(canvas, &scaled, ((cw - w) / 2) as i64, ((ch - h) / 2) as i64);
}
