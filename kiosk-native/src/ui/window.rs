//! Main application window switching between welcome, capture and review.

use gtk4 as gtk;
use gtk4::prelude::*;
use libadwaita as adw;
use libadwaita::prelude::*;
use std::rc::Rc;

use crate::app::{AppContext, AppMessage};
use crate::state::{BoothCommand, BoothEvent};
use crate::style::BACKGROUND_SWATCHES;
use crate::view::Screen;

use super::capture::{self, CaptureWidgets};
use super::review::{self, ReviewWidgets};
use super::welcome;
use super::widgets::config_panel::swatch_class;

/// Main window holding one stack page per screen
pub struct MainWindow {
    pub window: adw::ApplicationWindow,
    ctx: Rc<AppContext>,
    stack: gtk::Stack,
    capture: CaptureWidgets,
    review: ReviewWidgets,
}

impl MainWindow {
    pub fn new(app: &adw::Application, ctx: Rc<AppContext>) -> Rc<Self> {
        let window = adw::ApplicationWindow::builder()
            .application(app)
            .title("StripBooth")
            .default_width(1920)
            .default_height(1080)
            .build();

        // Make fullscreen after window is mapped
        window.connect_map(|window| {
            let window = window.clone();
            glib::timeout_add_local_once(std::time::Duration::from_millis(100), move || {
                window.fullscreen();
            });
        });

        let stack = gtk::Stack::new();
        stack.set_transition_type(gtk::StackTransitionType::Crossfade);
        stack.set_transition_duration(250);

        let shots = ctx.state_machine.borrow().capture().max_captures();
        let welcome = {
            let ctx = ctx.clone();
            welcome::create_welcome_screen(shots, move || {
                ctx.send_event(BoothEvent::Start);
            })
        };
        let capture = capture::create_capture_screen(ctx.video.paintable());
        let review = review::create_review_screen(&ctx);

        stack.add_named(&welcome, Some(page_name(Screen::Initial)));
        stack.add_named(&capture.root, Some(page_name(Screen::Capturing)));
        stack.add_named(&review.root, Some(page_name(Screen::Review)));

        window.set_content(Some(&stack));

        let main_window = Rc::new(Self {
            window,
            ctx,
            stack,
            capture,
            review,
        });

        main_window.load_css();
        main_window.update_ui();

        main_window
    }

    fn load_css(&self) {
        let mut css = String::from(include_str!("../../resources/style.css"));
        for (index, (_, color)) in BACKGROUND_SWATCHES.iter().enumerate() {
            css.push_str(&format!(
                ".{} {{ background: {}; }}\n",
                swatch_class(index),
                color
            ));
        }

        let provider = gtk::CssProvider::new();
        provider.load_from_string(&css);

        let Some(display) = gtk::gdk::Display::default() else {
            log::warn!("No display, skipping stylesheet");
            return;
        };
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }

    /// Handle app messages - main entry point for state updates
    pub fn handle_message(self: &Rc<Self>, msg: AppMessage) {
        match msg {
            AppMessage::Event(event) => {
                let commands = self.ctx.process_event(event);

                if commands.iter().any(|c| matches!(c, BoothCommand::UpdateUI)) {
                    self.update_ui();
                }
                if commands.iter().any(|c| matches!(c, BoothCommand::Flash)) {
                    self.capture.flash();
                }
            }
        }
    }

    /// Update the UI to reflect current state
    fn update_ui(self: &Rc<Self>) {
        let sm = self.ctx.state_machine.borrow();
        let flags = sm.view();
        let taken = sm.images().len();
        let total = sm.capture().max_captures();
        let config = sm.config().clone();
        let export = sm.export().clone();
        drop(sm);

        self.stack.set_visible_child_name(page_name(flags.screen));

        match flags.screen {
            Screen::Initial => {
                self.review.strip.clear();
                self.window.set_cursor_from_name(None);
            }

            Screen::Capturing => {
                self.window.set_cursor_from_name(Some("none"));
                self.capture
                    .update(flags.countdown, taken, total, config.filter);
            }

            Screen::Review => {
                self.window.set_cursor_from_name(None);
                let rendered = self.ctx.state_machine.borrow_mut().strip();
                match rendered {
                    Ok(strip) => self.review.strip.show_strip(&strip),
                    Err(e) => {
                        log::error!("Failed to render strip: {}", e);
                        self.review.strip.show_error(&e.to_string());
                    }
                }
                self.review.panel.sync(&config, &export);
                self.review.set_restart_visible(flags.show_restart);
            }
        }
    }
}

fn page_name(screen: Screen) -> &'static str {
    match screen {
        Screen::Initial => "initial",
        Screen::Capturing => "capturing",
        Screen::Review => "review",
    }
}
