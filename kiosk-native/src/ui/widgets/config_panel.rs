//! Strip configuration panel with export controls.

use gtk4 as gtk;
use gtk4::prelude::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::app::AppContext;
use crate::export::{ExportState, ExportStatus};
use crate::state::BoothEvent;
use crate::style::{
    FilterKind, FontFamily, FrameChoice, StripConfig, TextColor, BACKGROUND_SWATCHES,
};

use super::animations;

/// CSS class for the background swatch at `index`
pub fn swatch_class(index: usize) -> String {
    format!("swatch-{}", index)
}

pub struct ConfigPanel {
    pub root: gtk::Box,
    swatches: Vec<gtk::ToggleButton>,
    filter: gtk::DropDown,
    caption: gtk::Entry,
    dark_text: gtk::Switch,
    show_date: gtk::CheckButton,
    font: gtk::DropDown,
    frame: gtk::DropDown,
    export_button: gtk::Button,
    spinner: gtk::Spinner,
    status: gtk::Label,
    copy_button: gtk::Button,
    data_uri: RefCell<Option<String>>,
    /// Set while widgets are updated from state, so their signals are not echoed back
    syncing: Cell<bool>,
}

fn row(label: &str, control: &impl IsA<gtk::Widget>) -> gtk::Box {
    let row = gtk::Box::new(gtk::Orientation::Horizontal, 12);
    row.add_css_class("config-row");

    let title = gtk::Label::new(Some(label));
    title.set_halign(gtk::Align::Start);
    title.set_hexpand(true);
    title.add_css_class("config-label");

    row.append(&title);
    row.append(control);
    row
}

impl ConfigPanel {
    pub fn new(ctx: &Rc<AppContext>) -> Rc<Self> {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
        root.add_css_class("config-panel");
        root.set_width_request(360);
        root.set_valign(gtk::Align::Center);

        let heading = gtk::Label::new(Some("Customize"));
        heading.add_css_class("config-heading");
        heading.set_halign(gtk::Align::Start);
        root.append(&heading);

        // Background swatches
        let swatch_box = gtk::Box::new(gtk::Orientation::Horizontal, 8);
        let mut swatches: Vec<gtk::ToggleButton> = Vec::with_capacity(BACKGROUND_SWATCHES.len());
        for (index, (name, _)) in BACKGROUND_SWATCHES.iter().enumerate() {
            let button = gtk::ToggleButton::new();
            button.set_tooltip_text(Some(name));
            button.add_css_class("swatch");
            button.add_css_class(&swatch_class(index));
            if let Some(first) = swatches.first() {
                button.set_group(Some(first));
            }
            swatch_box.append(&button);
            swatches.push(button);
        }
        root.append(&row("Background", &swatch_box));

        let filter_labels: Vec<&str> = FilterKind::ALL.iter().map(|f| f.label()).collect();
        let filter = gtk::DropDown::from_strings(&filter_labels);
        root.append(&row("Filter", &filter));

        let caption = gtk::Entry::new();
        caption.set_placeholder_text(Some("Add a caption"));
        caption.set_hexpand(true);
        root.append(&caption);

        let dark_text = gtk::Switch::new();
        dark_text.set_valign(gtk::Align::Center);
        root.append(&row("Dark text", &dark_text));

        let show_date = gtk::CheckButton::new();
        root.append(&row("Show date", &show_date));

        let font_labels: Vec<&str> = FontFamily::ALL.iter().map(|f| f.label()).collect();
        let font = gtk::DropDown::from_strings(&font_labels);
        root.append(&row("Font", &font));

        let frame_labels: Vec<&str> = FrameChoice::ALL.iter().map(|f| f.label()).collect();
        let frame = gtk::DropDown::from_strings(&frame_labels);
        root.append(&row("Frame", &frame));

        // Export controls
        let export_box = gtk::Box::new(gtk::Orientation::Horizontal, 12);
        export_box.add_css_class("export-row");

        let export_button = gtk::Button::with_label("Export");
        export_button.add_css_class("export-button");

        let spinner = gtk::Spinner::new();
        spinner.set_visible(false);

        let copy_button = gtk::Button::with_label("Copy");
        copy_button.set_tooltip_text(Some("Copy the PNG data URI"));
        copy_button.set_visible(false);

        export_box.append(&export_button);
        export_box.append(&spinner);
        export_box.append(&copy_button);
        root.append(&export_box);

        let status = gtk::Label::new(None);
        status.add_css_class("export-status");
        status.set_halign(gtk::Align::Start);
        status.set_wrap(true);
        root.append(&status);

        let panel = Rc::new(Self {
            root,
            swatches,
            filter,
            caption,
            dark_text,
            show_date,
            font,
            frame,
            export_button,
            spinner,
            status,
            copy_button,
            data_uri: RefCell::new(None),
            syncing: Cell::new(false),
        });

        panel.connect_signals(ctx);
        panel
    }

    fn connect_signals(self: &Rc<Self>, ctx: &Rc<AppContext>) {
        for (index, button) in self.swatches.iter().enumerate() {
            let panel = Rc::downgrade(self);
            let ctx = ctx.clone();
            button.connect_toggled(move |btn| {
                let Some(panel) = panel.upgrade() else { return };
                if panel.syncing.get() || !btn.is_active() {
                    return;
                }
                ctx.send_event(BoothEvent::SetBackground(BACKGROUND_SWATCHES[index].1));
            });
        }

        self.on_selected(ctx, &self.filter, |i| {
            FilterKind::ALL.get(i).map(|f| BoothEvent::SetFilter(*f))
        });
        self.on_selected(ctx, &self.font, |i| {
            FontFamily::ALL.get(i).map(|f| BoothEvent::SetFont(*f))
        });
        self.on_selected(ctx, &self.frame, |i| {
            FrameChoice::ALL.get(i).map(|f| BoothEvent::SetFrame(*f))
        });

        {
            let panel = Rc::downgrade(self);
            let ctx = ctx.clone();
            self.caption.connect_changed(move |entry| {
                let Some(panel) = panel.upgrade() else { return };
                if !panel.syncing.get() {
                    ctx.send_event(BoothEvent::SetCaption(entry.text().to_string()));
                }
            });
        }

        {
            let panel = Rc::downgrade(self);
            let ctx = ctx.clone();
            self.dark_text.connect_active_notify(move |switch| {
                let Some(panel) = panel.upgrade() else { return };
                if !panel.syncing.get() {
                    let color = if switch.is_active() {
                        TextColor::Dark
                    } else {
                        TextColor::Light
                    };
                    ctx.send_event(BoothEvent::SetTextColor(color));
                }
            });
        }

        {
            let panel = Rc::downgrade(self);
            let ctx = ctx.clone();
            self.show_date.connect_toggled(move |check| {
                let Some(panel) = panel.upgrade() else { return };
                if !panel.syncing.get() {
                    ctx.send_event(BoothEvent::SetShowDate(check.is_active()));
                }
            });
        }

        {
            let ctx = ctx.clone();
            self.export_button.connect_clicked(move |btn| {
                animations::button_press(btn);
                ctx.send_event(BoothEvent::RequestExport);
            });
        }

        {
            let panel = Rc::downgrade(self);
            self.copy_button.connect_clicked(move |btn| {
                let Some(panel) = panel.upgrade() else { return };
                if let Some(uri) = panel.data_uri.borrow().as_deref() {
                    btn.clipboard().set_text(uri);
                    panel.status.set_text("Copied to clipboard");
                    log::info!("Copied strip data URI ({} bytes)", uri.len());
                }
            });
        }
    }

    fn on_selected(
        self: &Rc<Self>,
        ctx: &Rc<AppContext>,
        dropdown: &gtk::DropDown,
        to_event: impl Fn(usize) -> Option<BoothEvent> + 'static,
    ) {
        let panel = Rc::downgrade(self);
        let ctx = ctx.clone();
        dropdown.connect_selected_notify(move |dropdown| {
            let Some(panel) = panel.upgrade() else { return };
            if panel.syncing.get() {
                return;
            }
            if let Some(event) = to_event(dropdown.selected() as usize) {
                ctx.send_event(event);
            }
        });
    }

    /// Reflect the current configuration and export state
    pub fn sync(&self, config: &StripConfig, export: &ExportState) {
        self.syncing.set(true);

        if let Some(index) = BACKGROUND_SWATCHES
            .iter()
            .position(|(_, color)| *color == config.background)
        {
            if !self.swatches[index].is_active() {
                self.swatches[index].set_active(true);
            }
        }

        set_selected(&self.filter, FilterKind::ALL.iter().position(|f| *f == config.filter));
        set_selected(&self.font, FontFamily::ALL.iter().position(|f| *f == config.font));
        set_selected(&self.frame, FrameChoice::ALL.iter().position(|f| *f == config.frame));

        if self.caption.text() != config.caption.as_str() {
            self.caption.set_text(&config.caption);
        }
        let dark = config.text_color == TextColor::Dark;
        if self.dark_text.is_active() != dark {
            self.dark_text.set_active(dark);
        }
        if self.show_date.is_active() != config.show_date {
            self.show_date.set_active(config.show_date);
        }

        self.syncing.set(false);
        self.sync_export(export);
    }

    fn sync_export(&self, export: &ExportState) {
        let in_progress = export.in_progress();
        self.spinner.set_visible(in_progress);
        self.spinner.set_spinning(in_progress);

        match export.status() {
            ExportStatus::Idle => {
                self.status.set_text("");
                self.status.remove_css_class("error");
                *self.data_uri.borrow_mut() = None;
            }
            ExportStatus::InProgress { .. } => {
                self.status.set_text("Exporting...");
                self.status.remove_css_class("error");
            }
            ExportStatus::Ready(artifact) => {
                self.status.set_text(&format!(
                    "Ready: {}x{} PNG",
                    artifact.width, artifact.height
                ));
                self.status.remove_css_class("error");
                *self.data_uri.borrow_mut() = Some(artifact.data_uri.clone());
            }
            ExportStatus::Failed { message, .. } => {
                self.status.set_text(&format!("Export failed: {}", message));
                self.status.add_css_class("error");
                *self.data_uri.borrow_mut() = None;
            }
        }
        self.copy_button.set_visible(self.data_uri.borrow().is_some());
    }
}

fn set_selected(dropdown: &gtk::DropDown, index: Option<usize>) {
    if let Some(index) = index {
        if dropdown.selected() != index as u32 {
            dropdown.set_selected(index as u32);
        }
    }
}
