//! State management error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StateError {
    #[error("database error: {message}")]
    DatabaseError { message: String },

    #[error("migration failed: {message}")]
    MigrationFailed { message: String },

    #[error("no signing state recorded for package key {package_key}")]
    SigningStateNotFound { package_key: i64 },

    #[error("trusted certificate not found: {thumbprint}")]
    CertificateNotFound { thumbprint: String },

    #[error("state corrupted: {message}")]
    StateCorrupted { message: String },
}

impl UserFacingError for StateError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::DatabaseError { .. } => Some("Check that the state database path is writable."),
            Self::MigrationFailed { .. } => {
                Some("The state database schema could not be upgraded; restore from backup.")
            }
            Self::SigningStateNotFound { .. } => {
                Some("Run `pkgsig validate` for the package before querying its status.")
            }
            Self::CertificateNotFound { .. } => Some("List trusted certificates with `pkgsig trust list`."),
            Self::StateCorrupted { .. } => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::DatabaseError { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::DatabaseError { .. } => "state.database",
            Self::MigrationFailed { .. } => "state.migration_failed",
            Self::SigningStateNotFound { .. } => "state.signing_state_not_found",
            Self::CertificateNotFound { .. } => "state.certificate_not_found",
            Self::StateCorrupted { .. } => "state.corrupted",
        })
    }
}
