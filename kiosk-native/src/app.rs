//! Application context - bridges the GTK-free state machine with GTK UI.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::compositor::Compositor;
use crate::config::Settings;
use crate::export;
use crate::state::{BoothCommand, BoothEvent, BoothStateMachine};
use crate::video::{PipelineCamera, PipelineError, VideoPipeline};

/// Messages sent from timers and async tasks to the GTK main loop
#[derive(Debug, Clone)]
pub enum AppMessage {
    /// Process a booth event through the state machine
    Event(BoothEvent),
}

/// Sender that can dispatch messages to the GTK main loop from any thread
#[derive(Clone)]
pub struct MessageSender {
    tx: mpsc::UnboundedSender<AppMessage>,
}

impl MessageSender {
    pub fn send(&self, msg: AppMessage) {
        let _ = self.tx.send(msg);
    }
}

/// Application context - holds state and provides methods to interact with it
pub struct AppContext {
    /// The GTK-free state machine
    pub state_machine: RefCell<BoothStateMachine<PipelineCamera>>,
    /// GStreamer webcam pipeline
    pub video: VideoPipeline,
    /// Tokio runtime for export encoding
    pub runtime: Arc<tokio::runtime::Runtime>,
    /// Sender for dispatching messages to GTK main loop
    pub message_tx: MessageSender,
    /// Countdown timer source while capturing
    ticker: RefCell<Option<glib::SourceId>>,
}

impl AppContext {
    pub fn new(
        runtime: Arc<tokio::runtime::Runtime>,
        settings: &Settings,
    ) -> Result<(Rc<Self>, mpsc::UnboundedReceiver<AppMessage>), PipelineError> {
        let (tx, rx) = mpsc::unbounded_channel();

        let video = VideoPipeline::new(&settings.camera)?;
        video.setup_bus_watch();
        video.play()?;

        let state_machine =
            BoothStateMachine::new(settings, Compositor::from_settings(settings), video.camera());

        let ctx = Rc::new(Self {
            state_machine: RefCell::new(state_machine),
            video,
            runtime,
            message_tx: MessageSender { tx },
            ticker: RefCell::new(None),
        });

        Ok((ctx, rx))
    }

    /// Send an event to the state machine (from any thread)
    pub fn send_event(&self, event: BoothEvent) {
        self.message_tx.send(AppMessage::Event(event));
    }

    /// Process an event and execute resulting commands
    /// This should be called from the GTK main loop
    pub fn process_event(self: &Rc<Self>, event: BoothEvent) -> Vec<BoothCommand> {
        let commands = self.state_machine.borrow_mut().process(event);

        for cmd in &commands {
            self.execute_command(cmd.clone());
        }

        commands
    }

    /// Execute a command from the state machine
    fn execute_command(self: &Rc<Self>, cmd: BoothCommand) {
        match cmd {
            BoothCommand::StartTicker { interval_ms } => {
                self.stop_ticker();
                let tx = self.message_tx.clone();
                let source = glib::timeout_add_local(Duration::from_millis(interval_ms), move || {
                    tx.send(AppMessage::Event(BoothEvent::Tick));
                    glib::ControlFlow::Continue
                });
                *self.ticker.borrow_mut() = Some(source);
            }

            BoothCommand::StopTicker => self.stop_ticker(),

            BoothCommand::EncodeExport { ticket, strip } => {
                let tx = self.message_tx.clone();

                self.runtime.spawn(async move {
                    let event = match export::export_strip(ticket, strip).await {
                        Ok(artifact) => BoothEvent::ExportFinished { artifact },
                        Err(error) => BoothEvent::ExportFailed { ticket, error },
                    };
                    tx.send(AppMessage::Event(event));
                });
            }

            BoothCommand::Flash | BoothCommand::UpdateUI => {
                // These are handled by the window after processing events
            }
        }
    }

    fn stop_ticker(&self) {
        if let Some(source) = self.ticker.borrow_mut().take() {
            source.remove();
        }
    }
}
