//! Rendered strip display.

use gtk4 as gtk;
use gtk4::prelude::*;
use image::RgbaImage;
use std::cell::RefCell;
use std::sync::Arc;

use crate::compositor::RenderedStrip;

/// Upload an RGBA image as a GDK texture
pub fn strip_texture(image: &RgbaImage) -> gtk::gdk::MemoryTexture {
    let bytes = glib::Bytes::from(image.as_raw().as_slice());
    gtk::gdk::MemoryTexture::new(
        image.width() as i32,
        image.height() as i32,
        gtk::gdk::MemoryFormat::R8g8b8a8,
        &bytes,
        image.width() as usize * 4,
    )
}

/// Picture showing the latest rendered strip, or an error message in its place
pub struct StripView {
    pub root: gtk::Stack,
    picture: gtk::Picture,
    error: gtk::Label,
    shown: RefCell<Option<Arc<RgbaImage>>>,
}

impl StripView {
    pub fn new() -> Self {
        let root = gtk::Stack::new();
        root.set_transition_type(gtk::StackTransitionType::Crossfade);
        root.add_css_class("strip-view");
        root.set_hexpand(true);
        root.set_vexpand(true);

        let picture = gtk::Picture::new();
        picture.set_content_fit(gtk::ContentFit::Contain);
        picture.set_can_shrink(true);
        picture.add_css_class("strip-picture");

        let error = gtk::Label::new(None);
        error.add_css_class("strip-error");
        error.set_wrap(true);

        root.add_named(&picture, Some("strip"));
        root.add_named(&error, Some("error"));
        root.set_visible_child_name("strip");

        Self {
            root,
            picture,
            error,
            shown: RefCell::new(None),
        }
    }

    pub fn show_strip(&self, strip: &RenderedStrip) {
        self.root.set_visible_child_name("strip");

        let mut shown = self.shown.borrow_mut();
        if shown.as_ref().is_some_and(|img| Arc::ptr_eq(img, &strip.image)) {
            return;
        }
        let texture = strip_texture(&strip.image);
        self.picture.set_paintable(Some(&texture));
        *shown = Some(strip.image.clone());
    }

    pub fn show_error(&self, message: &str) {
        self.error.set_text(message);
        self.root.set_visible_child_name("error");
    }

    pub fn clear(&self) {
        self.shown.borrow_mut().take();
        self.picture.set_paintable(None::<&gtk::gdk::Paintable>);
    }
}

impl Default for StripView {
    fn default() -> Self {
        Self::new()
    }
}
