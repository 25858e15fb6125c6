#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in pkgsig
//!
//! Library crates never print; they emit events through an [`EventEmitter`]
//! and write structured `tracing` records. The binary decides how events are
//! rendered.
//!
//! ## Architecture
//!
//! - **Domain-driven events**: events grouped by functional domain (validation, state)
//! - **Unified `EventEmitter` trait**: single API for all event emissions
//! - **Metadata envelope**: every event travels with an [`EventMeta`] carrying
//!   correlation id, timestamp, level and source

pub mod meta;
pub use meta::{EventLevel, EventMeta, EventSource};

pub mod events;
pub use events::{AppEvent, RejectionReason, StateEvent, ValidationEvent};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

/// An event together with its metadata envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: AppEvent,
}

impl EventMessage {
    #[must_use]
    pub fn new(meta: EventMeta, event: AppEvent) -> Self {
        Self { meta, event }
    }

    /// Wrap an event with metadata derived from the event itself.
    #[must_use]
    pub fn from_event(event: AppEvent) -> Self {
        let meta = EventMeta::new(event.log_level(), event.event_source());
        Self { meta, event }
    }
}

/// Type alias for the event sender
pub type EventSender = UnboundedSender<EventMessage>;

/// Type alias for the event receiver
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<EventMessage>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events throughout pkgsig
///
/// Implemented for the raw [`EventSender`] and for any struct that holds one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event with explicit metadata
    fn emit_with_meta(&self, meta: EventMeta, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(EventMessage::new(meta, event));
        }
    }

    /// Emit an event, deriving metadata from the event
    fn emit(&self, event: AppEvent) {
        let meta = EventMeta::new(event.log_level(), event.event_source());
        self.emit_with_meta(meta, event);
    }

    /// Emit an event correlated with a validation or other operation id
    fn emit_correlated(&self, correlation_id: impl Into<String>, event: AppEvent) {
        let meta = EventMeta::new(event.log_level(), event.event_source())
            .with_correlation_id(correlation_id);
        self.emit_with_meta(meta, event);
    }
}

/// Implementation of `EventEmitter` for the raw `EventSender`
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}
