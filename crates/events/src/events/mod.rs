use serde::{Deserialize, Serialize};

use crate::EventSource;

// Declare all domain modules
pub mod state;
pub mod validation;

// Re-export all domain events
pub use state::*;
pub use validation::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// Signature validation lifecycle events
    Validation(ValidationEvent),

    /// Persistence events (trust store, recorder, extractor)
    State(StateEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::Validation(_) => EventSource::VALIDATION,
            Self::State(_) => EventSource::STATE,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            // Error-level events
            Self::Validation(ValidationEvent::VerifyFailed { .. }) => Level::ERROR,

            // Warning-level events
            Self::Validation(
                ValidationEvent::Rejected { .. } | ValidationEvent::Cancelled { .. },
            ) => Level::WARN,

            // Debug-level events
            Self::Validation(ValidationEvent::SignaturesRead { .. })
            | Self::State(_) => Level::DEBUG,

            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::Validation(_) => "pkgsig::events::validation",
            Self::State(_) => "pkgsig::events::state",
        }
    }
}
