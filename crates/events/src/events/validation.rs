use pkgsig_types::{
    Issue, PackageKey, SigningClassification, Thumbprint, Uuid, ValidationStatus,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a signed package was rejected before cryptographic verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectionReason {
    /// The package must carry exactly one signature.
    SignatureCount { count: usize },
    /// The only signature was made by a certificate that is not trusted.
    UntrustedSigner { thumbprint: Thumbprint },
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SignatureCount { count } => {
                write!(f, "expected exactly one signature, found {count}")
            }
            Self::UntrustedSigner { thumbprint } => {
                write!(f, "signing certificate {thumbprint} is not trusted")
            }
        }
    }
}

/// Signature validation lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidationEvent {
    Started {
        package_id: String,
        package_version: String,
        validation_id: Uuid,
        package_key: PackageKey,
    },

    SignaturesRead {
        package_id: String,
        package_version: String,
        signed: bool,
        count: usize,
    },

    /// Policy rejection (signature count or untrusted signer)
    Rejected {
        package_id: String,
        package_version: String,
        reason: RejectionReason,
    },

    /// The verifier reported the package signature as invalid.
    ///
    /// `message` is the diagnostic line consumed by downstream log tooling and
    /// must not be reformatted.
    VerifyFailed {
        package_id: String,
        package_version: String,
        validation_id: Uuid,
        message: String,
        errors: Vec<Issue>,
        warnings: Vec<Issue>,
    },

    Accepted {
        package_id: String,
        package_version: String,
        classification: SigningClassification,
    },

    Extracted {
        package_id: String,
        package_version: String,
    },

    Recorded {
        package_key: PackageKey,
        package_id: String,
        package_version: String,
        classification: SigningClassification,
        status: ValidationStatus,
    },

    Cancelled {
        package_id: String,
        package_version: String,
        validation_id: Uuid,
    },
}
