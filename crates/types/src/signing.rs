//! Signature, certificate and verification types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Business-level signing verdict for a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigningClassification {
    Unsigned,
    Valid,
    Invalid,
}

impl SigningClassification {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unsigned => "unsigned",
            Self::Valid => "valid",
            Self::Invalid => "invalid",
        }
    }

    /// Parse the lowercase storage form produced by [`Self::as_str`].
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "unsigned" => Some(Self::Unsigned),
            "valid" => Some(Self::Valid),
            "invalid" => Some(Self::Invalid),
            _ => None,
        }
    }
}

impl fmt::Display for SigningClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Certificate thumbprint.
///
/// Trust matching compares thumbprints as exact strings; no case folding or
/// trimming is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Thumbprint(String);

impl Thumbprint {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Thumbprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Thumbprint {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Thumbprint {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A certificate from the trust store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedCertificate {
    pub thumbprint: Thumbprint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl TrustedCertificate {
    #[must_use]
    pub fn new(thumbprint: impl Into<Thumbprint>) -> Self {
        Self {
            thumbprint: thumbprint.into(),
            subject: None,
        }
    }

    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

/// One signature parsed from package content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
    /// Thumbprint of the signer's certificate.
    pub thumbprint: Thumbprint,
    /// Encoded signature as found in the package.
    pub encoded: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trusted_comment: Option<String>,
}

impl SignatureRecord {
    #[must_use]
    pub fn new(thumbprint: impl Into<Thumbprint>, encoded: impl Into<String>) -> Self {
        Self {
            thumbprint: thumbprint.into(),
            encoded: encoded.into(),
            trusted_comment: None,
        }
    }

    #[must_use]
    pub fn with_trusted_comment(mut self, comment: impl Into<String>) -> Self {
        self.trusted_comment = Some(comment.into());
        self
    }
}

/// A single diagnostic reported by the signature verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Fatal issues are errors, everything else is a warning.
    pub fatal: bool,
    pub code: String,
    pub message: String,
}

impl Issue {
    #[must_use]
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            fatal: true,
            code: code.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            fatal: false,
            code: code.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Verifier output for one signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SignatureCheck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbprint: Option<Thumbprint>,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

impl SignatureCheck {
    #[must_use]
    pub fn new(issues: Vec<Issue>) -> Self {
        Self {
            thumbprint: None,
            issues,
        }
    }

    #[must_use]
    pub fn for_signer(mut self, thumbprint: Thumbprint) -> Self {
        self.thumbprint = Some(thumbprint);
        self
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|issue| issue.fatal)
    }
}

/// Structured result of verifying all signatures of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub valid: bool,
    #[serde(default)]
    pub results: Vec<SignatureCheck>,
}

impl VerificationResult {
    #[must_use]
    pub fn new(valid: bool) -> Self {
        Self {
            valid,
            results: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_results(valid: bool, results: Vec<SignatureCheck>) -> Self {
        Self { valid, results }
    }

    /// All issues across all sub-results, in encounter order.
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.results.iter().flat_map(|result| result.issues.iter())
    }
}
