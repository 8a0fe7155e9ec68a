//! Welcome screen - start card shown before a session.

use gtk4 as gtk;
use gtk4::prelude::*;

use super::widgets::animations;

/// Create the welcome screen
pub fn create_welcome_screen(shots: usize, on_start: impl Fn() + 'static) -> gtk::Box {
    let screen = gtk::Box::new(gtk::Orientation::Vertical, 0);
    screen.add_css_class("welcome-screen");
    screen.set_hexpand(true);
    screen.set_vexpand(true);

    // Center card
    let card = gtk::Box::new(gtk::Orientation::Vertical, 24);
    card.set_halign(gtk::Align::Center);
    card.set_valign(gtk::Align::Center);
    card.set_vexpand(true);
    card.add_css_class("welcome-card");

    let icon = gtk::Image::from_icon_name("camera-photo-symbolic");
    icon.set_pixel_size(96);
    icon.add_css_class("welcome-icon");

    let title = gtk::Label::new(Some("Photo Booth"));
    title.add_css_class("welcome-title");

    let subtitle = gtk::Label::new(Some(&format!("{} photos, one strip. Strike a pose!", shots)));
    subtitle.add_css_class("welcome-subtitle");

    let button = gtk::Button::with_label("Start");
    button.add_css_class("start-button");
    button.set_halign(gtk::Align::Center);
    button.connect_clicked(move |btn| {
        animations::button_press(btn);
        on_start();
    });

    card.append(&icon);
    card.append(&title);
    card.append(&subtitle);
    card.append(&button);

    screen.append(&card);
    screen
}
