use crate::{AppResult, InputEvent, InputStateMachine, TextInjector};

use tokio::sync::mpsc;
use tracing::{error, info, instrument};

/// Main application loop.
///
/// Drains the single inbox and feeds the state machine; this task is the
/// serialization point for every piece of mutable gesture state. Nothing
/// else touches the machine.
pub struct App<I> {
    machine: InputStateMachine<I>,
    event_rx: mpsc::Receiver<InputEvent>,
}

impl<I: TextInjector> App<I> {
    /// Wire the machine to its inbox.
    pub fn new(machine: InputStateMachine<I>, event_rx: mpsc::Receiver<InputEvent>) -> Self {
        Self { machine, event_rx }
    }

    /// Run until shutdown is requested or the inbox closes.
    #[instrument(skip(self))]
    pub async fn run(mut self) -> AppResult<()> {
        info!("Voicekey started");

        loop {
            tokio::select! {
                maybe_event = self.event_rx.recv() => {
                    match maybe_event {
                        Some(InputEvent::Shutdown) => {
                            info!("Shutdown requested");
                            break;
                        }
                        Some(event) => self.machine.handle(event),
                        None => {
                            info!("All event sources closed, shutting down");
                            break;
                        }
                    }
                }

                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        error!(error = ?e, "Failed to listen for interrupt");
                    }
                    info!("Interrupt received, shutting down");
                    break;
                }
            }
        }

        info!("Voicekey shut down successfully");

        Ok(())
    }
}
