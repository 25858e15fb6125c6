//! Validation request and outcome types

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;
use uuid::Uuid;

/// Database key of the package under validation.
pub type PackageKey = i64;

/// One validation attempt, created by the upstream dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRequest {
    pub package_id: String,
    pub package_version: String,
    /// Where the package content can be fetched from.
    pub content_url: Url,
    /// Correlation id of this validation attempt.
    pub validation_id: Uuid,
}

impl ValidationRequest {
    /// Create a new validation request
    #[must_use]
    pub fn new(
        package_id: impl Into<String>,
        package_version: impl Into<String>,
        content_url: Url,
        validation_id: Uuid,
    ) -> Self {
        Self {
            package_id: package_id.into(),
            package_version: package_version.into(),
            content_url,
            validation_id,
        }
    }
}

impl fmt::Display for ValidationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.package_id, self.package_version, self.validation_id
        )
    }
}

/// Process-level status of a validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    NotStarted,
    Succeeded,
    Failed,
}

impl ValidationStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    /// Succeeded and Failed are terminal; nothing moves a validation out of them.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::NotStarted)
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-owned record that the orchestrator completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub package_key: PackageKey,
    pub status: ValidationStatus,
}

impl ValidationOutcome {
    /// A fresh outcome in the `NotStarted` state
    #[must_use]
    pub fn new(package_key: PackageKey) -> Self {
        Self {
            package_key,
            status: ValidationStatus::NotStarted,
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
