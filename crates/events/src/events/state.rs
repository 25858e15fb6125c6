use pkgsig_types::{PackageKey, SigningClassification, Thumbprint};
use serde::{Deserialize, Serialize};

/// Persistence events emitted by the SQLite-backed collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateEvent {
    SigningStateRecorded {
        package_key: PackageKey,
        classification: SigningClassification,
    },

    SignaturePartsStored {
        package_key: PackageKey,
        signatures: usize,
    },

    CertificateTrusted {
        thumbprint: Thumbprint,
    },

    CertificateRemoved {
        thumbprint: Thumbprint,
    },
}
