//! Animation utilities using libadwaita.

use gtk4 as gtk;
use gtk4::prelude::*;
use libadwaita as adw;
use libadwaita::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

/// Animation durations (in milliseconds)
pub mod duration {
    pub const FAST: u32 = 150;
    pub const FLASH: u32 = 450;
    pub const COUNTDOWN: u32 = 800;
}

/// Animate a widget's opacity (fade in/out)
pub fn fade(
    widget: &impl IsA<gtk::Widget>,
    from: f64,
    to: f64,
    duration_ms: u32,
    on_complete: Option<Box<dyn Fn()>>,
) -> adw::TimedAnimation {
    widget.set_opacity(from);

    let widget_clone = widget.clone().upcast::<gtk::Widget>();
    let target = adw::CallbackAnimationTarget::new(move |value| {
        widget_clone.set_opacity(value);
    });

    let animation = adw::TimedAnimation::builder()
        .widget(widget)
        .value_from(from)
        .value_to(to)
        .duration(duration_ms)
        .easing(adw::Easing::EaseOutCubic)
        .target(&target)
        .build();

    if let Some(callback) = on_complete {
        animation.connect_done(move |_| callback());
    }

    animation.play();
    animation
}

/// Camera flash: show the white overlay at full opacity and fade it away
pub fn camera_flash(overlay: &impl IsA<gtk::Widget>) -> adw::TimedAnimation {
    overlay.set_visible(true);
    let overlay_clone = overlay.clone().upcast::<gtk::Widget>();
    fade(
        overlay,
        1.0,
        0.0,
        duration::FLASH,
        Some(Box::new(move || overlay_clone.set_visible(false))),
    )
}

/// Button press animation - quick opacity dip and back
pub fn button_press(widget: &impl IsA<gtk::Widget>) -> adw::TimedAnimation {
    let widget_clone = widget.clone().upcast::<gtk::Widget>();

    let target = adw::CallbackAnimationTarget::new(move |value| {
        // 1.0 -> 0.7 -> 1.0
        let opacity = if value < 0.5 {
            1.0 - (value * 0.6)
        } else {
            0.7 + ((value - 0.5) * 0.6)
        };
        widget_clone.set_opacity(opacity);
    });

    let animation = adw::TimedAnimation::builder()
        .widget(widget)
        .value_from(0.0)
        .value_to(1.0)
        .duration(duration::FAST)
        .easing(adw::Easing::EaseOutCubic)
        .target(&target)
        .build();

    animation.play();
    animation
}

/// Countdown number animation - each new number fades in while shrinking
/// from an enlarged CSS state
pub struct CountdownAnimator {
    label: gtk::Label,
    animation: Rc<RefCell<Option<adw::TimedAnimation>>>,
}

impl CountdownAnimator {
    pub fn new(label: gtk::Label) -> Self {
        Self {
            label,
            animation: Rc::new(RefCell::new(None)),
        }
    }

    pub fn animate_number(&self, number: u32) {
        if self.label.text() == number.to_string() && self.label.is_visible() {
            return;
        }

        // Cancel any existing animation
        if let Some(ref anim) = *self.animation.borrow() {
            anim.skip();
        }

        self.label.set_text(&number.to_string());
        self.label.set_visible(true);
        self.label.add_css_class("countdown-enter");

        let label = self.label.clone();
        let target = adw::CallbackAnimationTarget::new(move |value| {
            label.set_opacity(if value < 0.3 { value / 0.3 } else { 1.0 });
            if value > 0.3 {
                label.remove_css_class("countdown-enter");
            }
        });

        let animation = adw::TimedAnimation::builder()
            .widget(&self.label)
            .value_from(0.0)
            .value_to(1.0)
            .duration(duration::COUNTDOWN)
            .easing(adw::Easing::EaseOutCubic)
            .target(&target)
            .build();

        animation.play();
        *self.animation.borrow_mut() = Some(animation);
    }

    pub fn hide(&self) {
        if let Some(anim) = self.animation.borrow_mut().take() {
            anim.skip();
        }
        self.label.set_visible(false);
    }
}
