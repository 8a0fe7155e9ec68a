//! Capture screen - full preview with countdown overlay and shutter flash.

use gtk4 as gtk;
use gtk4::prelude::*;

use crate::style::FilterKind;

use super::widgets::animations::{self, CountdownAnimator};

/// References to updateable widgets in the capture screen
pub struct CaptureWidgets {
    pub root: gtk::Overlay,
    preview: gtk::Picture,
    progress: gtk::Label,
    countdown: CountdownAnimator,
    flash: gtk::Box,
}

/// Create the capture screen around the live camera paintable
pub fn create_capture_screen(video_paintable: &gtk::gdk::Paintable) -> CaptureWidgets {
    let root = gtk::Overlay::new();
    root.add_css_class("capture-screen");

    let preview = gtk::Picture::new();
    preview.set_paintable(Some(video_paintable));
    preview.set_content_fit(gtk::ContentFit::Contain);
    preview.set_hexpand(true);
    preview.set_vexpand(true);
    preview.add_css_class("video-preview");
    root.set_child(Some(&preview));

    // Countdown number, centered
    let number = gtk::Label::new(None);
    number.add_css_class("countdown-number");
    number.set_halign(gtk::Align::Center);
    number.set_valign(gtk::Align::Center);
    number.set_can_target(false);
    number.set_visible(false);
    root.add_overlay(&number);

    // Shot counter, top right
    let progress = gtk::Label::new(None);
    progress.add_css_class("capture-progress");
    progress.set_halign(gtk::Align::End);
    progress.set_valign(gtk::Align::Start);
    progress.set_margin_end(24);
    progress.set_margin_top(24);
    root.add_overlay(&progress);

    // White flash, above everything
    let flash = gtk::Box::new(gtk::Orientation::Vertical, 0);
    flash.add_css_class("camera-flash");
    flash.set_hexpand(true);
    flash.set_vexpand(true);
    flash.set_can_target(false);
    flash.set_visible(false);
    root.add_overlay(&flash);

    CaptureWidgets {
        root,
        preview,
        progress,
        countdown: CountdownAnimator::new(number),
        flash,
    }
}

impl CaptureWidgets {
    /// Update countdown and progress
    pub fn update(&self, countdown: Option<u32>, taken: usize, total: usize, filter: FilterKind) {
        match countdown {
            Some(value) => self.countdown.animate_number(value),
            None => self.countdown.hide(),
        }
        self.progress
            .set_text(&format!("{} / {}", (taken + 1).min(total), total));

        // Greyscale preview gets the same contrast boost as the strip
        if filter == FilterKind::Greyscale {
            self.preview.add_css_class("preview-contrast");
        } else {
            self.preview.remove_css_class("preview-contrast");
        }
    }

    pub fn flash(&self) {
        animations::camera_flash(&self.flash);
    }
}
