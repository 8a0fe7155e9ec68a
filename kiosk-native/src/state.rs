//! GTK-free booth state machine.
//!
//! Owns the capture session, the strip configuration, the export state and
//! the compositor. The UI layer feeds it [`BoothEvent`]s and executes the
//! [`BoothCommand`]s it returns; nothing in here touches GTK or a timer.

use std::sync::Arc;

use chrono::NaiveDate;
use image::RgbaImage;

use crate::camera::{Frame, FrameSource};
use crate::capture::{CaptureController, TickOutcome};
use crate::compositor::{Compositor, RenderError, RenderedStrip};
use crate::config::Settings;
use crate::export::{ExportArtifact, ExportError, ExportState, ExportTicket};
use crate::style::{Color, FilterKind, FontFamily, FrameChoice, StripConfig, TextColor};
use crate::view::{Screen, ViewFlags};

/// Events that drive the booth
#[derive(Debug, Clone)]
pub enum BoothEvent {
    // User actions
    Start,
    Restart,

    // Countdown timer
    Tick,

    // Configuration panel
    SetBackground(Color),
    SetFilter(FilterKind),
    SetCaption(String),
    SetTextColor(TextColor),
    SetShowDate(bool),
    SetFont(FontFamily),
    SetFrame(FrameChoice),
    RequestExport,

    // Export task results
    ExportFinished { artifact: ExportArtifact },
    ExportFailed { ticket: ExportTicket, error: ExportError },
}

/// Commands emitted by the state machine for the UI/async layer to execute
#[derive(Debug, Clone)]
pub enum BoothCommand {
    /// Start posting `Tick` events at this interval
    StartTicker { interval_ms: u64 },
    /// Stop posting `Tick` events
    StopTicker,
    /// Play the shutter flash
    Flash,
    /// Encode the strip and report back with `ExportFinished`/`ExportFailed`
    EncodeExport {
        ticket: ExportTicket,
        strip: Arc<RgbaImage>,
    },
    /// Update UI to reflect new state
    UpdateUI,
}

/// Format a strip date the way it is printed under the caption
pub fn format_strip_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

pub fn today_label() -> String {
    format_strip_date(chrono::Local::now().date_naive())
}

pub struct BoothStateMachine<C: FrameSource> {
    capture: CaptureController,
    config: StripConfig,
    export: ExportState,
    compositor: Compositor,
    camera: C,
    tick_interval_ms: u64,
    /// Last rendering and the date label it was drawn with
    strip: Option<(String, RenderedStrip)>,
}

impl<C: FrameSource> BoothStateMachine<C> {
    pub fn new(settings: &Settings, compositor: Compositor, camera: C) -> Self {
        Self {
            capture: CaptureController::new(settings.max_captures, settings.countdown_start),
            config: StripConfig::default(),
            export: ExportState::new(),
            compositor,
            camera,
            tick_interval_ms: settings.tick_interval_ms,
            strip: None,
        }
    }

    pub fn capture(&self) -> &CaptureController {
        &self.capture
    }

    pub fn images(&self) -> &[Frame] {
        self.capture.images()
    }

    pub fn config(&self) -> &StripConfig {
        &self.config
    }

    pub fn export(&self) -> &ExportState {
        &self.export
    }

    pub fn view(&self) -> ViewFlags {
        ViewFlags::for_controller(&self.capture)
    }

    pub fn screen(&self) -> Screen {
        self.view().screen
    }

    /// The strip for the current photos and config, rendered on demand
    pub fn strip(&mut self) -> Result<RenderedStrip, RenderError> {
        let date = today_label();
        if let Some((label, strip)) = &self.strip {
            if *label == date {
                return Ok(strip.clone());
            }
        }
        let strip = self
            .compositor
            .render(self.capture.images(), &self.config, &date)?;
        self.strip = Some((date, strip.clone()));
        Ok(strip)
    }

    /// Process an event and return commands to execute
    pub fn process(&mut self, event: BoothEvent) -> Vec<BoothCommand> {
        let mut commands = Vec::new();

        match event {
            BoothEvent::Start => {
                if self.capture.start() {
                    commands.push(BoothCommand::StartTicker {
                        interval_ms: self.tick_interval_ms,
                    });
                    commands.push(BoothCommand::UpdateUI);
                }
            }

            BoothEvent::Tick => {
                let outcome = self.capture.tick(&mut self.camera);
                if outcome.is_shutter() {
                    commands.push(BoothCommand::Flash);
                }
                match outcome {
                    TickOutcome::Ignored => return commands,
                    TickOutcome::Captured { .. } => self.strip = None,
                    TickOutcome::Finished => {
                        self.strip = None;
                        commands.push(BoothCommand::StopTicker);
                    }
                    TickOutcome::Counted { .. } | TickOutcome::Missed | TickOutcome::Rearmed => {}
                }
                commands.push(BoothCommand::UpdateUI);
            }

            BoothEvent::Restart => {
                log::info!("Restarting booth");
                self.capture.reset();
                self.config = self.config.for_next_session();
                self.export.invalidate();
                self.strip = None;
                commands.push(BoothCommand::StopTicker);
                commands.push(BoothCommand::UpdateUI);
            }

            BoothEvent::SetBackground(color) => {
                commands.extend(self.update_config(|c| c.background = color))
            }
            BoothEvent::SetFilter(filter) => {
                commands.extend(self.update_config(|c| c.filter = filter))
            }
            BoothEvent::SetCaption(text) => {
                commands.extend(self.update_config(|c| c.caption = text))
            }
            BoothEvent::SetTextColor(color) => {
                commands.extend(self.update_config(|c| c.text_color = color))
            }
            BoothEvent::SetShowDate(show) => {
                commands.extend(self.update_config(|c| c.show_date = show))
            }
            BoothEvent::SetFont(font) => commands.extend(self.update_config(|c| c.font = font)),
            BoothEvent::SetFrame(frame) => {
                commands.extend(self.update_config(|c| c.frame = frame))
            }

            BoothEvent::RequestExport => {
                if self.screen() != Screen::Review {
                    log::debug!("Ignoring export request outside review");
                    return commands;
                }
                let ticket = self.export.begin();
                log::info!("Export {} requested", ticket);
                match self.strip() {
                    Ok(strip) => commands.push(BoothCommand::EncodeExport {
                        ticket,
                        strip: strip.image,
                    }),
                    Err(e) => {
                        self.export.fail(ticket, &ExportError::Render(e.to_string()));
                    }
                }
                commands.push(BoothCommand::UpdateUI);
            }

            BoothEvent::ExportFinished { artifact } => {
                if self.export.complete(artifact) {
                    commands.push(BoothCommand::UpdateUI);
                }
            }

            BoothEvent::ExportFailed { ticket, error } => {
                if self.export.fail(ticket, &error) {
                    commands.push(BoothCommand::UpdateUI);
                }
            }
        }

        commands
    }

    /// Apply a config change. A real change drops the rendered strip and any
    /// export made from it.
    fn update_config(&mut self, change: impl FnOnce(&mut StripConfig)) -> Vec<BoothCommand> {
        let mut next = self.config.clone();
        change(&mut next);
        if next == self.config {
            return Vec::new();
        }
        log::debug!("Strip config changed: {:?}", next);
        self.config = next;
        self.strip = None;
        self.export.invalidate();
        vec![BoothCommand::UpdateUI]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::scripted::ScriptedCamera;
    use crate::capture::CapturePhase;
    use crate::compositor::LayoutKind;
    use crate::export::export_strip;

    fn machine(camera: ScriptedCamera) -> BoothStateMachine<ScriptedCamera> {
        let settings = Settings {
            max_captures: 4,
            countdown_start: 3,
            ..Settings::default()
        };
        BoothStateMachine::new(&settings, Compositor::default(), camera)
    }

    fn has(cmds: &[BoothCommand], pred: impl Fn(&BoothCommand) -> bool) -> bool {
        cmds.iter().any(pred)
    }

    /// Tick until the shutter has fired `shots` more times
    fn run_shots(sm: &mut BoothStateMachine<ScriptedCamera>, shots: usize) {
        let mut fired = 0;
        while fired < shots {
            let cmds = sm.process(BoothEvent::Tick);
            if has(&cmds, |c| matches!(c, BoothCommand::Flash)) {
                fired += 1;
            }
        }
    }

    fn finished_machine() -> BoothStateMachine<ScriptedCamera> {
        let mut sm = machine(ScriptedCamera::always());
        sm.process(BoothEvent::Start);
        run_shots(&mut sm, 4);
        sm
    }

    #[test]
    fn test_initial_state() {
        let sm = machine(ScriptedCamera::always());
        assert_eq!(sm.screen(), Screen::Initial);
        assert!(sm.images().is_empty());
        assert!(!sm.export().in_progress());
        assert_eq!(sm.config(), &StripConfig::default());
    }

    #[test]
    fn test_start_flow() {
        let mut sm = machine(ScriptedCamera::always());

        let cmds = sm.process(BoothEvent::Start);
        assert!(has(&cmds, |c| matches!(c, BoothCommand::StartTicker { interval_ms: 1000 })));
        assert_eq!(sm.screen(), Screen::Capturing);
        assert_eq!(sm.view().countdown, Some(3));

        // A second start is ignored while capturing
        assert!(sm.process(BoothEvent::Start).is_empty());
    }

    #[test]
    fn test_four_shot_session() {
        let mut sm = machine(ScriptedCamera::always());
        sm.process(BoothEvent::Start);

        let mut stop_seen = false;
        let mut flashes = 0;
        while sm.capture().phase() != CapturePhase::Done {
            let cmds = sm.process(BoothEvent::Tick);
            flashes += cmds.iter().filter(|c| matches!(c, BoothCommand::Flash)).count();
            stop_seen |= has(&cmds, |c| matches!(c, BoothCommand::StopTicker));
        }

        assert_eq!(sm.images().len(), 4);
        assert_eq!(flashes, 4);
        assert!(stop_seen);
        assert_eq!(sm.screen(), Screen::Review);
        assert!(sm.view().show_restart);

        // Further ticks change nothing
        assert!(sm.process(BoothEvent::Tick).is_empty());
        assert_eq!(sm.images().len(), 4);
    }

    #[test]
    fn test_one_missed_shot() {
        let mut sm = machine(ScriptedCamera::with_script(&[true, true, false, true]));
        sm.process(BoothEvent::Start);
        run_shots(&mut sm, 4);

        assert_eq!(sm.images().len(), 3);
        assert_ne!(sm.capture().phase(), CapturePhase::Done);
        assert_eq!(sm.screen(), Screen::Capturing);

        run_shots(&mut sm, 1);
        assert_eq!(sm.images().len(), 4);
        assert_eq!(sm.screen(), Screen::Review);
    }

    #[test]
    fn test_restart_resets_session_and_style() {
        let mut sm = finished_machine();
        sm.process(BoothEvent::SetCaption("Noel".into()));
        sm.process(BoothEvent::SetFilter(FilterKind::Sepia));
        sm.process(BoothEvent::SetFont(FontFamily::Serif));
        sm.process(BoothEvent::SetFrame(FrameChoice::Holly));
        sm.process(BoothEvent::RequestExport);
        assert!(sm.export().in_progress());

        let cmds = sm.process(BoothEvent::Restart);
        assert!(has(&cmds, |c| matches!(c, BoothCommand::StopTicker)));
        assert_eq!(sm.screen(), Screen::Initial);
        assert!(sm.images().is_empty());
        assert_eq!(sm.capture().countdown(), 3);
        assert!(!sm.export().in_progress());
        assert!(sm.config().caption.is_empty());
        assert_eq!(sm.config().filter, FilterKind::None);
        assert_eq!(sm.config().font, FontFamily::Serif);
        assert_eq!(sm.config().frame, FrameChoice::Holly);
    }

    #[test]
    fn test_restart_mid_capture() {
        let mut sm = machine(ScriptedCamera::always());
        sm.process(BoothEvent::Start);
        run_shots(&mut sm, 2);
        sm.process(BoothEvent::Restart);
        assert_eq!(sm.screen(), Screen::Initial);
        assert!(sm.process(BoothEvent::Tick).is_empty());
    }

    #[test]
    fn test_config_setters() {
        let mut sm = finished_machine();
        let red = Color::rgb(255, 0, 0);

        assert!(!sm.process(BoothEvent::SetBackground(red)).is_empty());
        sm.process(BoothEvent::SetTextColor(TextColor::Dark));
        sm.process(BoothEvent::SetShowDate(false));
        assert_eq!(sm.config().background, red);
        assert_eq!(sm.config().text_color, TextColor::Dark);
        assert!(!sm.config().show_date);

        // Unchanged values emit nothing
        assert!(sm.process(BoothEvent::SetBackground(red)).is_empty());
    }

    #[test]
    fn test_strip_follows_frame_choice() {
        let mut sm = finished_machine();
        assert_eq!(sm.strip().unwrap().kind, LayoutKind::Default);
        sm.process(BoothEvent::SetFrame(FrameChoice::Snowflakes));
        assert_eq!(sm.strip().unwrap().kind, LayoutKind::Framed);
        sm.process(BoothEvent::SetFrame(FrameChoice::None));
        assert_eq!(sm.strip().unwrap().kind, LayoutKind::Default);
    }

    #[test]
    fn test_export_only_in_review() {
        let mut sm = machine(ScriptedCamera::always());
        assert!(sm.process(BoothEvent::RequestExport).is_empty());
        sm.process(BoothEvent::Start);
        assert!(sm.process(BoothEvent::RequestExport).is_empty());
        assert!(!sm.export().in_progress());
    }

    #[test]
    fn test_export_round_trip() {
        let mut sm = finished_machine();
        let cmds = sm.process(BoothEvent::RequestExport);
        let (ticket, strip) = cmds
            .iter()
            .find_map(|c| match c {
                BoothCommand::EncodeExport { ticket, strip } => Some((*ticket, strip.clone())),
                _ => None,
            })
            .expect("encode command");
        assert!(sm.export().in_progress());

        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let artifact = rt.block_on(export_strip(ticket, strip)).unwrap();
        sm.process(BoothEvent::ExportFinished { artifact });

        assert!(!sm.export().in_progress());
        let artifact = sm.export().artifact().unwrap();
        assert_eq!(artifact.ticket, ticket);
        assert_eq!(artifact.width, 600);
    }

    #[test]
    fn test_rapid_double_export() {
        let mut sm = finished_machine();
        let ticket_of = |cmds: Vec<BoothCommand>| {
            cmds.into_iter()
                .find_map(|c| match c {
                    BoothCommand::EncodeExport { ticket, .. } => Some(ticket),
                    _ => None,
                })
                .unwrap()
        };
        let first = ticket_of(sm.process(BoothEvent::RequestExport));
        let second = ticket_of(sm.process(BoothEvent::RequestExport));
        assert!(sm.export().in_progress());

        let artifact = |ticket| ExportArtifact {
            ticket,
            data_uri: "data:image/png;base64,".into(),
            width: 600,
            height: 900,
        };

        // First resolves while the second is still running: dropped
        assert!(sm
            .process(BoothEvent::ExportFinished { artifact: artifact(first) })
            .is_empty());
        assert!(sm.export().in_progress());

        sm.process(BoothEvent::ExportFinished { artifact: artifact(second) });
        assert!(!sm.export().in_progress());
        assert_eq!(sm.export().artifact().unwrap().ticket, second);
    }

    #[test]
    fn test_config_change_discards_export() {
        let mut sm = finished_machine();
        sm.process(BoothEvent::RequestExport);
        let ticket = match sm.export().status() {
            crate::export::ExportStatus::InProgress { ticket } => *ticket,
            other => panic!("unexpected status {:?}", other),
        };

        sm.process(BoothEvent::SetCaption("late edit".into()));
        assert!(!sm.export().in_progress());

        // The result for the old config arrives and is ignored
        sm.process(BoothEvent::ExportFinished {
            artifact: ExportArtifact {
                ticket,
                data_uri: String::new(),
                width: 1,
                height: 1,
            },
        });
        assert!(sm.export().artifact().is_none());
    }

    #[test]
    fn test_export_failure_surfaces() {
        let mut sm = finished_machine();
        sm.process(BoothEvent::RequestExport);
        let ticket = match sm.export().status() {
            crate::export::ExportStatus::InProgress { ticket } => *ticket,
            other => panic!("unexpected status {:?}", other),
        };
        let cmds = sm.process(BoothEvent::ExportFailed {
            ticket,
            error: ExportError::Encode("boom".into()),
        });
        assert!(has(&cmds, |c| matches!(c, BoothCommand::UpdateUI)));
        assert!(sm.export().failure().unwrap().contains("boom"));
    }

    #[test]
    fn test_date_format() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 5).unwrap();
        assert_eq!(format_strip_date(date), "October 5, 2026");
    }
}
