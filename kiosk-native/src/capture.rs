//! Countdown and shutter sequencing.
//!
//! The controller has no timer of its own. Whoever owns it calls [`tick`]
//! at the countdown interval; tests call it directly.
//!
//! [`tick`]: CaptureController::tick

use crate::camera::{Frame, FrameSource};

/// Where the capture sequence is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    /// Not started
    Idle,
    /// Counting down to the next shot
    Counting,
    /// The shutter just fired; countdown is zero for one tick
    Flash,
    /// All shots taken
    Done,
}

/// Session data owned by the controller
#[derive(Debug, Clone)]
pub struct CaptureSession {
    pub images: Vec<Frame>,
    pub started: bool,
    pub countdown: u32,
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not capturing; nothing changed
    Ignored,
    /// Countdown decremented, shutter not yet due
    Counted { remaining: u32 },
    /// Shutter fired and a frame was stored at `index`
    Captured { index: usize },
    /// Shutter fired but the camera had no frame
    Missed,
    /// Countdown re-armed for the next shot
    Rearmed,
    /// Shutter fired, frame stored, strip complete
    Finished,
}

impl TickOutcome {
    /// Whether the shutter fired on this tick
    pub fn is_shutter(self) -> bool {
        matches!(
            self,
            TickOutcome::Captured { .. } | TickOutcome::Missed | TickOutcome::Finished
        )
    }
}

#[derive(Debug)]
pub struct CaptureController {
    session: CaptureSession,
    phase: CapturePhase,
    max_captures: usize,
    countdown_start: u32,
}

impl CaptureController {
    /// `max_captures` and `countdown_start` are clamped to at least 1
    pub fn new(max_captures: usize, countdown_start: u32) -> Self {
        let countdown_start = countdown_start.max(1);
        Self {
            session: CaptureSession {
                images: Vec::new(),
                started: false,
                countdown: countdown_start,
            },
            phase: CapturePhase::Idle,
            max_captures: max_captures.max(1),
            countdown_start,
        }
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    pub fn images(&self) -> &[Frame] {
        &self.session.images
    }

    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    pub fn countdown(&self) -> u32 {
        self.session.countdown
    }

    pub fn max_captures(&self) -> usize {
        self.max_captures
    }

    pub fn countdown_start(&self) -> u32 {
        self.countdown_start
    }

    pub fn is_initial(&self) -> bool {
        !self.session.started && self.session.images.is_empty()
    }

    pub fn is_done(&self) -> bool {
        self.phase == CapturePhase::Done
    }

    /// Begin the sequence. Only valid from the initial state; returns
    /// whether the sequence started.
    pub fn start(&mut self) -> bool {
        if !self.is_initial() {
            log::debug!("Ignoring start: session already in progress");
            return false;
        }
        self.session.started = true;
        self.session.countdown = self.countdown_start;
        self.phase = CapturePhase::Counting;
        log::info!(
            "Capture started: {} shots, countdown from {}",
            self.max_captures,
            self.countdown_start
        );
        true
    }

    /// Advance the sequence by one timer step
    pub fn tick(&mut self, camera: &mut dyn FrameSource) -> TickOutcome {
        match self.phase {
            CapturePhase::Idle | CapturePhase::Done => TickOutcome::Ignored,

            CapturePhase::Flash => {
                self.session.countdown = self.countdown_start;
                self.phase = CapturePhase::Counting;
                TickOutcome::Rearmed
            }

            CapturePhase::Counting => {
                self.session.countdown = self.session.countdown.saturating_sub(1);
                if self.session.countdown > 0 {
                    return TickOutcome::Counted {
                        remaining: self.session.countdown,
                    };
                }
                self.fire_shutter(camera)
            }
        }
    }

    fn fire_shutter(&mut self, camera: &mut dyn FrameSource) -> TickOutcome {
        let Some(frame) = camera.grab_frame() else {
            log::warn!(
                "Capture miss: no camera frame ({}/{} taken)",
                self.session.images.len(),
                self.max_captures
            );
            self.phase = CapturePhase::Flash;
            return TickOutcome::Missed;
        };

        let index = self.session.images.len();
        self.session.images.push(frame);
        log::info!("Captured photo {}/{}", index + 1, self.max_captures);

        if self.session.images.len() >= self.max_captures {
            self.phase = CapturePhase::Done;
            log::info!("Capture sequence complete");
            TickOutcome::Finished
        } else {
            self.phase = CapturePhase::Flash;
            TickOutcome::Captured { index }
        }
    }

    /// Drop all captured frames and return to the initial state
    pub fn reset(&mut self) {
        self.session.images.clear();
        self.session.started = false;
        self.session.countdown = self.countdown_start;
        self.phase = CapturePhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::scripted::ScriptedCamera;

    /// Tick until the shutter fires once, returning its outcome
    fn run_countdown(ctl: &mut CaptureController, cam: &mut ScriptedCamera) -> TickOutcome {
        loop {
            let outcome = ctl.tick(cam);
            if outcome.is_shutter() || outcome == TickOutcome::Ignored {
                return outcome;
            }
        }
    }

    #[test]
    fn test_initial_state() {
        let ctl = CaptureController::new(4, 3);
        assert!(ctl.is_initial());
        assert_eq!(ctl.phase(), CapturePhase::Idle);
        assert_eq!(ctl.countdown(), 3);
        assert!(ctl.images().is_empty());
    }

    #[test]
    fn test_tick_before_start_is_ignored() {
        let mut ctl = CaptureController::new(4, 3);
        let mut cam = ScriptedCamera::always();
        assert_eq!(ctl.tick(&mut cam), TickOutcome::Ignored);
        assert_eq!(ctl.countdown(), 3);
        assert_eq!(cam.grabs, 0);
    }

    #[test]
    fn test_countdown_sequence() {
        let mut ctl = CaptureController::new(4, 3);
        let mut cam = ScriptedCamera::always();
        assert!(ctl.start());

        assert_eq!(ctl.tick(&mut cam), TickOutcome::Counted { remaining: 2 });
        assert_eq!(ctl.tick(&mut cam), TickOutcome::Counted { remaining: 1 });
        assert_eq!(ctl.tick(&mut cam), TickOutcome::Captured { index: 0 });
        assert_eq!(ctl.countdown(), 0);
        assert_eq!(ctl.phase(), CapturePhase::Flash);

        assert_eq!(ctl.tick(&mut cam), TickOutcome::Rearmed);
        assert_eq!(ctl.countdown(), 3);
        assert_eq!(ctl.phase(), CapturePhase::Counting);
    }

    #[test]
    fn test_full_strip_reaches_done() {
        let mut ctl = CaptureController::new(4, 3);
        let mut cam = ScriptedCamera::always();
        ctl.start();

        for expected in 0..3 {
            assert_eq!(
                run_countdown(&mut ctl, &mut cam),
                TickOutcome::Captured { index: expected }
            );
        }
        assert_eq!(run_countdown(&mut ctl, &mut cam), TickOutcome::Finished);
        assert_eq!(ctl.images().len(), 4);
        assert!(ctl.is_done());

        // Frames are kept in capture order
        let seqs: Vec<u64> = ctl.images().iter().map(|f| f.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_ticks_after_done_are_noops() {
        let mut ctl = CaptureController::new(2, 1);
        let mut cam = ScriptedCamera::always();
        ctl.start();
        while !ctl.is_done() {
            ctl.tick(&mut cam);
        }

        let countdown = ctl.countdown();
        let grabs = cam.grabs;
        for _ in 0..20 {
            assert_eq!(ctl.tick(&mut cam), TickOutcome::Ignored);
        }
        assert_eq!(ctl.images().len(), 2);
        assert_eq!(ctl.countdown(), countdown);
        assert_eq!(cam.grabs, grabs);
    }

    #[test]
    fn test_image_count_never_exceeds_max() {
        for max in 1..6 {
            let mut ctl = CaptureController::new(max, 2);
            let mut cam = ScriptedCamera::with_script(&[true, false, true, false, false, true]);
            ctl.start();
            for _ in 0..200 {
                ctl.tick(&mut cam);
                assert!(ctl.images().len() <= max);
            }
            assert_eq!(ctl.images().len(), max);
        }
    }

    #[test]
    fn test_missed_frame_is_not_retried() {
        let mut ctl = CaptureController::new(4, 3);
        let mut cam = ScriptedCamera::with_script(&[true, false, true, true]);
        ctl.start();

        let outcomes: Vec<_> = (0..4).map(|_| run_countdown(&mut ctl, &mut cam)).collect();
        assert_eq!(
            outcomes,
            vec![
                TickOutcome::Captured { index: 0 },
                TickOutcome::Missed,
                TickOutcome::Captured { index: 1 },
                TickOutcome::Captured { index: 2 },
            ]
        );
        assert_eq!(ctl.images().len(), 3);
        assert!(!ctl.is_done());
        assert_eq!(cam.grabs, 4);

        // One more countdown completes the strip
        assert_eq!(run_countdown(&mut ctl, &mut cam), TickOutcome::Finished);
        assert_eq!(ctl.images().len(), 4);
        assert!(ctl.is_done());
    }

    #[test]
    fn test_start_only_from_initial() {
        let mut ctl = CaptureController::new(2, 1);
        let mut cam = ScriptedCamera::always();
        assert!(ctl.start());
        assert!(!ctl.start());

        ctl.tick(&mut cam);
        ctl.tick(&mut cam);
        ctl.tick(&mut cam);
        assert!(ctl.is_done());
        assert!(!ctl.start());
        assert_eq!(ctl.images().len(), 2);
    }

    #[test]
    fn test_reset_from_any_state() {
        let mut cam = ScriptedCamera::always();
        for ticks in [0usize, 1, 2, 3, 4, 50] {
            let mut ctl = CaptureController::new(4, 3);
            ctl.start();
            for _ in 0..ticks {
                ctl.tick(&mut cam);
            }
            ctl.reset();

            assert!(ctl.is_initial());
            assert!(!ctl.session().started);
            assert!(ctl.images().is_empty());
            assert_eq!(ctl.countdown(), 3);
            assert_eq!(ctl.phase(), CapturePhase::Idle);
        }
    }

    #[test]
    fn test_reset_allows_new_session() {
        let mut ctl = CaptureController::new(1, 1);
        let mut cam = ScriptedCamera::always();
        ctl.start();
        assert_eq!(ctl.tick(&mut cam), TickOutcome::Finished);

        ctl.reset();
        assert!(ctl.start());
        assert_eq!(ctl.tick(&mut cam), TickOutcome::Finished);
        assert_eq!(ctl.images()[0].seq, 1);
    }

    #[test]
    fn test_zero_settings_are_clamped() {
        let ctl = CaptureController::new(0, 0);
        assert_eq!(ctl.max_captures(), 1);
        assert_eq!(ctl.countdown_start(), 1);
    }
}
