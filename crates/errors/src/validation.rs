//! Validation orchestration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationError {
    #[error("validation {validation_id} already completed with status {status}")]
    AlreadyCompleted {
        validation_id: String,
        status: String,
    },
}

impl UserFacingError for ValidationError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::AlreadyCompleted { .. } => {
                Some("De-duplicate validation requests before dispatching them.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Self::AlreadyCompleted { .. } => Some("validation.already_completed"),
        }
    }
}
