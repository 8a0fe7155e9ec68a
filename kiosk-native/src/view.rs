//! Screen selection derived from capture state. Holds no state of its own.

use crate::capture::CaptureController;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Start card; camera preview kept warm but hidden
    Initial,
    /// Full-screen preview with countdown and flash
    Capturing,
    /// Strip plus configuration panel
    Review,
}

/// Pick the screen for a session snapshot
pub fn select_view(started: bool, captured: usize, max: usize) -> Screen {
    if !started && captured == 0 {
        Screen::Initial
    } else if started && captured < max {
        Screen::Capturing
    } else {
        Screen::Review
    }
}

/// Overlay state for the current screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewFlags {
    pub screen: Screen,
    /// Countdown number to show, if any
    pub countdown: Option<u32>,
    pub flash: bool,
    pub show_restart: bool,
}

pub fn view_flags(started: bool, captured: usize, max: usize, countdown: u32) -> ViewFlags {
    let screen = select_view(started, captured, max);
    let capturing = screen == Screen::Capturing;
    ViewFlags {
        screen,
        countdown: (capturing && countdown > 0).then_some(countdown),
        flash: capturing && countdown == 0,
        show_restart: captured == max,
    }
}

impl ViewFlags {
    pub fn for_controller(ctl: &CaptureController) -> Self {
        let session = ctl.session();
        view_flags(
            session.started,
            session.images.len(),
            ctl.max_captures(),
            session.countdown,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::scripted::ScriptedCamera;

    #[test]
    fn test_selection_table() {
        assert_eq!(select_view(false, 0, 4), Screen::Initial);
        assert_eq!(select_view(true, 0, 4), Screen::Capturing);
        assert_eq!(select_view(true, 3, 4), Screen::Capturing);
        assert_eq!(select_view(true, 4, 4), Screen::Review);
        assert_eq!(select_view(false, 4, 4), Screen::Review);
    }

    #[test]
    fn test_selection_is_pure() {
        let inputs = [(false, 0, 4), (true, 2, 4), (true, 4, 4), (false, 1, 4)];
        let first: Vec<_> = inputs.iter().map(|&(s, c, m)| select_view(s, c, m)).collect();
        // Same inputs in a different order give the same answers
        for _ in 0..3 {
            for (i, &(s, c, m)) in inputs.iter().enumerate().rev() {
                assert_eq!(select_view(s, c, m), first[i]);
            }
        }
    }

    #[test]
    fn test_flags() {
        let counting = view_flags(true, 1, 4, 2);
        assert_eq!(counting.screen, Screen::Capturing);
        assert_eq!(counting.countdown, Some(2));
        assert!(!counting.flash);
        assert!(!counting.show_restart);

        let flashing = view_flags(true, 2, 4, 0);
        assert_eq!(flashing.countdown, None);
        assert!(flashing.flash);

        let done = view_flags(true, 4, 4, 0);
        assert_eq!(done.screen, Screen::Review);
        assert!(!done.flash);
        assert!(done.show_restart);

        let initial = view_flags(false, 0, 4, 3);
        assert_eq!(initial.countdown, None);
        assert!(!initial.show_restart);
    }

    #[test]
    fn test_follows_controller() {
        let mut ctl = CaptureController::new(2, 2);
        let mut cam = ScriptedCamera::always();
        assert_eq!(ViewFlags::for_controller(&ctl).screen, Screen::Initial);

        ctl.start();
        assert_eq!(ViewFlags::for_controller(&ctl).countdown, Some(2));

        ctl.tick(&mut cam);
        ctl.tick(&mut cam);
        let flags = ViewFlags::for_controller(&ctl);
        assert_eq!(flags.screen, Screen::Capturing);
        assert!(flags.flash);

        ctl.tick(&mut cam);
        ctl.tick(&mut cam);
        ctl.tick(&mut cam);
        let flags = ViewFlags::for_controller(&ctl);
        assert_eq!(flags.screen, Screen::Review);
        assert!(flags.show_restart);
    }
}
