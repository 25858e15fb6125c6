//! Event handling and user feedback

use crate::logging::log_event_with_tracing;
use console::style;
use pkgsig_events::{AppEvent, EventMessage, ValidationEvent};

/// Forwards events to tracing and shows the ones a user cares about
pub struct EventHandler {
    json_output: bool,
}

impl EventHandler {
    pub fn new(json_output: bool) -> Self {
        Self { json_output }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, message: EventMessage) {
        log_event_with_tracing(&message);

        if self.json_output {
            return;
        }

        if let AppEvent::Validation(event) = &message.event {
            match event {
                ValidationEvent::Rejected { reason, .. } => {
                    self.show_warning(&format!("Rejected: {reason}"));
                }
                ValidationEvent::VerifyFailed { message, .. } => {
                    self.show_error(message);
                }
                ValidationEvent::Cancelled { validation_id, .. } => {
                    self.show_warning(&format!("Validation {validation_id} cancelled"));
                }
                _ => {}
            }
        }
    }

    fn show_warning(&self, message: &str) {
        eprintln!("{} {message}", style("warning:").yellow().bold());
    }

    fn show_error(&self, message: &str) {
        eprintln!("{} {message}", style("error:").red().bold());
    }
}
