//! Review screen - composed strip beside the configuration panel.

use gtk4 as gtk;
use gtk4::prelude::*;
use std::rc::Rc;

use crate::app::AppContext;
use crate::state::BoothEvent;

use super::widgets::{animations, ConfigPanel, StripView};

pub struct ReviewWidgets {
    pub root: gtk::Overlay,
    pub strip: StripView,
    pub panel: Rc<ConfigPanel>,
    back_button: gtk::Button,
}

pub fn create_review_screen(ctx: &Rc<AppContext>) -> ReviewWidgets {
    let root = gtk::Overlay::new();
    root.add_css_class("review-screen");

    let content = gtk::Box::new(gtk::Orientation::Horizontal, 32);
    content.set_margin_start(32);
    content.set_margin_end(32);
    content.set_margin_top(32);
    content.set_margin_bottom(96);

    let strip = StripView::new();
    let panel = ConfigPanel::new(ctx);

    content.append(&strip.root);
    content.append(&panel.root);
    root.set_child(Some(&content));

    let back_button = gtk::Button::with_label("← Go Back");
    back_button.add_css_class("back-button");
    back_button.set_halign(gtk::Align::Start);
    back_button.set_valign(gtk::Align::End);
    back_button.set_margin_start(24);
    back_button.set_margin_bottom(24);
    {
        let ctx = ctx.clone();
        back_button.connect_clicked(move |btn| {
            animations::button_press(btn);
            ctx.send_event(BoothEvent::Restart);
        });
    }
    root.add_overlay(&back_button);

    ReviewWidgets {
        root,
        strip,
        panel,
        back_button,
    }
}

impl ReviewWidgets {
    pub fn set_restart_visible(&self, visible: bool) {
        self.back_button.set_visible(visible);
    }
}
